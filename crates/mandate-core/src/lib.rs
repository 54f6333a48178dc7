pub mod account;
pub mod canonical;
pub mod error;
pub mod flow;
pub mod mandate;
pub mod policy;
pub mod primitives;
pub mod registry;
pub mod signing;
pub mod store;
pub mod transport;
pub mod verify;

// Convenience re-exports
pub use account::AccountId;
pub use error::{MandateError, MandateResult};
pub use mandate::{Core, Mandate, MandateBuilder, Role, RoleSignature, Signatures};
pub use policy::VerifyPolicy;
pub use registry::{PayloadValidator, Primitive, PrimitiveRegistry};
pub use signing::{Eip712Domain, LocalSigner, SignatureAlg, SignatureScheme, SigningIdentity};
pub use store::{BlobStore, ObjectStoreBlobStore, StoreError, StoreSpec};
pub use transport::{ChannelTransport, MessageTransport};
pub use verify::{verify_mandate, VerificationReceipt, VerifyOptions};

// Re-export bytes for CLI convenience
pub use bytes::Bytes;
