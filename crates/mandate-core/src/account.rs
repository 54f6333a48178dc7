//! Chain-qualified account identifiers (CAIP-10).
//!
//! ```text
//! <namespace>:<chain reference>:<address>
//! eip155:1:0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed
//! ```

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{MandateError, MandateResult};

static CAIP10: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([-a-z0-9]{3,8}):([-_a-zA-Z0-9]{1,32}):([-.%a-zA-Z0-9]{1,128})$")
        .expect("static regex")
});

/// EVM namespace.
pub const EIP155: &str = "eip155";

/// A parsed CAIP-10 account id. The original text is preserved exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId {
    raw: String,
    namespace_end: usize,
    reference_end: usize,
}

impl AccountId {
    /// Parse and validate an account id.
    pub fn parse(s: &str) -> MandateResult<Self> {
        let caps = CAIP10.captures(s).ok_or_else(|| {
            MandateError::construction(format!(
                "account id {s:?} is not <namespace>:<chainId>:<address>"
            ))
        })?;
        let namespace_end = caps.get(1).map(|m| m.end()).unwrap_or_default();
        let reference_end = caps.get(2).map(|m| m.end()).unwrap_or_default();
        let id = Self {
            raw: s.to_string(),
            namespace_end,
            reference_end,
        };

        if id.namespace() == EIP155 {
            if !id.chain_reference().chars().all(|c| c.is_ascii_digit()) {
                return Err(MandateError::construction(format!(
                    "eip155 chain id must be numeric: {s:?}"
                )));
            }
            parse_evm_address(id.address())?;
        }
        Ok(id)
    }

    /// Build an `eip155` account id from a chain id and address.
    pub fn eip155(chain_id: u64, address: Address) -> Self {
        let raw = format!("{EIP155}:{chain_id}:{}", address.to_checksum(None));
        let namespace_end = EIP155.len();
        let reference_end = namespace_end + 1 + chain_id.to_string().len();
        Self {
            raw,
            namespace_end,
            reference_end,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.raw[..self.namespace_end]
    }

    pub fn chain_reference(&self) -> &str {
        &self.raw[self.namespace_end + 1..self.reference_end]
    }

    /// The plain address component, as written.
    pub fn address(&self) -> &str {
        &self.raw[self.reference_end + 1..]
    }

    /// Numeric chain id for `eip155` accounts.
    pub fn chain_id(&self) -> Option<u64> {
        if self.namespace() == EIP155 {
            self.chain_reference().parse().ok()
        } else {
            None
        }
    }

    /// Case-insensitive comparison of the address component.
    pub fn matches_address(&self, address: &str) -> bool {
        self.address().eq_ignore_ascii_case(address)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Parse a `0x`-prefixed 20-byte EVM address, any casing.
pub fn parse_evm_address(s: &str) -> MandateResult<Address> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| MandateError::construction(format!("address must be 0x-prefixed: {s:?}")))?;
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(MandateError::construction(format!(
            "address must be 20 bytes of hex: {s:?}"
        )));
    }
    let bytes = hex::decode(digits)
        .map_err(|e| MandateError::construction(format!("invalid address hex {s:?}: {e}")))?;
    Ok(Address::from_slice(&bytes))
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for AccountId {
    type Err = MandateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = MandateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.raw
    }
}
