use alloy_primitives::B256;
use serde::Serialize;

use super::types::{CoreSlot, Mandate};
use crate::account::AccountId;
use crate::canonical;
use crate::error::MandateResult;

/// Input struct for the mandate hash.
///
/// Every document field except `signatures`, which would be self-referential.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HashableMandate<'a> {
    mandate_id: &'a str,
    version: &'a str,
    client: &'a AccountId,
    server: &'a AccountId,
    created_at: &'a str,
    deadline: &'a str,
    intent: &'a str,
    core: CoreSlot<'a>,
}

impl<'a> From<&'a Mandate> for HashableMandate<'a> {
    fn from(m: &'a Mandate) -> Self {
        Self {
            mandate_id: &m.mandate_id,
            version: &m.version,
            client: &m.client,
            server: &m.server,
            created_at: &m.created_at,
            deadline: &m.deadline,
            intent: &m.intent,
            core: CoreSlot(&m.core),
        }
    }
}

impl Mandate {
    /// JCS canonical form of the document without `signatures`.
    pub fn to_canonical_string(&self) -> MandateResult<String> {
        canonical::to_string(&HashableMandate::from(self))
    }

    /// keccak-256 of the canonical form.
    pub fn hash(&self) -> MandateResult<B256> {
        canonical::hash(&HashableMandate::from(self))
    }

    /// `0x`-prefixed hex of [`Mandate::hash`].
    pub fn hash_hex(&self) -> MandateResult<String> {
        Ok(canonical::hash_hex(&self.hash()?))
    }
}
