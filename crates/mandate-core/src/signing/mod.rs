//! Signature schemes for mandate roles.
//!
//! Two algorithms, both secp256k1 with 65-byte `r || s || v` signatures:
//!
//! - `eip191`: personal-message signing over the canonical UTF-8 bytes.
//! - `eip712`: typed-data signing over `Mandate(bytes32 mandateHash)` under a
//!   caller-supplied domain. The domain MUST carry a chain id.

mod digest;
mod signer;

pub use digest::{eip191_digest, eip712_digest, MANDATE_TYPE};
pub use signer::{address_of, recover_address, LocalSigner, SigningIdentity};

use std::fmt;
use std::str::FromStr;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::error::{MandateError, MandateResult};

/// Wire tag for a signature algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAlg {
    Eip191,
    Eip712,
}

impl SignatureAlg {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eip191 => "eip191",
            Self::Eip712 => "eip712",
        }
    }
}

impl fmt::Display for SignatureAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureAlg {
    type Err = MandateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eip191" => Ok(Self::Eip191),
            "eip712" => Ok(Self::Eip712),
            other => Err(MandateError::malformed(format!(
                "unknown signature algorithm: {other}"
            ))),
        }
    }
}

/// EIP-712 domain. Only the fields present take part in the separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Domain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<String>,
}

impl Eip712Domain {
    /// Domain with only a chain id.
    pub fn for_chain(chain_id: u64) -> Self {
        Self {
            chain_id: Some(chain_id),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_verifying_contract(mut self, address: impl Into<String>) -> Self {
        self.verifying_contract = Some(address.into());
        self
    }
}

/// How a role signs: the algorithm plus its per-variant parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureScheme {
    Eip191,
    Eip712(Eip712Domain),
}

impl SignatureScheme {
    pub fn alg(&self) -> SignatureAlg {
        match self {
            Self::Eip191 => SignatureAlg::Eip191,
            Self::Eip712(_) => SignatureAlg::Eip712,
        }
    }

    /// Rebuild the scheme a stored signature was made with.
    ///
    /// `eip712` requires the verifier to supply the signer's domain.
    pub fn for_verification(
        alg: SignatureAlg,
        domain: Option<&Eip712Domain>,
    ) -> MandateResult<Self> {
        match alg {
            SignatureAlg::Eip191 => Ok(Self::Eip191),
            SignatureAlg::Eip712 => match domain {
                Some(d) if d.chain_id.is_some() => Ok(Self::Eip712(d.clone())),
                Some(_) => Err(MandateError::DomainRequired {
                    context: "verification domain has no chainId".to_string(),
                }),
                None => Err(MandateError::DomainRequired {
                    context: "eip712 signature verified without a domain".to_string(),
                }),
            },
        }
    }

    /// The 32-byte digest that is actually signed.
    pub fn digest(&self, canonical: &[u8], mandate_hash: &B256) -> MandateResult<B256> {
        match self {
            Self::Eip191 => Ok(eip191_digest(canonical)),
            Self::Eip712(domain) => eip712_digest(domain, mandate_hash),
        }
    }
}
