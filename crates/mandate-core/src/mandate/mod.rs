//! The mandate document.
//!
//! A mandate is a two-party agreement: a client and a server (CAIP-10
//! accounts), a deadline, free-text intent and a tagged `core` payload whose
//! shape is owned by the [`PrimitiveRegistry`](crate::registry::PrimitiveRegistry).
//! Each party attaches one signature over the keccak-256 hash of the JCS
//! canonical form, which excludes `signatures` itself.
//!
//! # Example
//!
//! ```rust
//! use mandate_core::mandate::Mandate;
//! use mandate_core::registry::PrimitiveRegistry;
//! use mandate_core::signing::{LocalSigner, SigningIdentity};
//! use mandate_core::account::AccountId;
//! use serde_json::json;
//!
//! let registry = PrimitiveRegistry::with_builtins();
//! let server = LocalSigner::random();
//! let client = LocalSigner::random();
//!
//! let mut mandate = Mandate::builder()
//!     .client(AccountId::eip155(1, client.address()).to_string())
//!     .server(AccountId::eip155(1, server.address()).to_string())
//!     .deadline("2030-01-01T00:00:00Z")
//!     .intent("transfer 5 USDC")
//!     .build()
//!     .unwrap();
//!
//! mandate
//!     .set_core(&registry, "transfer@1", json!({
//!         "chainId": 1,
//!         "token": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
//!         "amount": "5000000",
//!         "to": "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
//!     }))
//!     .unwrap();
//! assert!(mandate.is("transfer@1"));
//! assert!(mandate.hash_hex().unwrap().starts_with("0x"));
//! ```

mod hash;
mod payload;
mod signing;
mod types;

pub use signing::{MandateVerification, RoleVerification};
pub use types::{Core, Mandate, MandateBuilder, Role, RoleSignature, Signatures, MANDATE_VERSION};

pub(crate) use types::format_timestamp;
