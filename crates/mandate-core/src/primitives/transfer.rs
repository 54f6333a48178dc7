use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{parse_address, parse_amount};
use crate::registry::Primitive;

/// `transfer@1`: move `amount` base units of `token` to `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferV1 {
    pub chain_id: u64,
    pub token: String,
    pub amount: String,
    pub to: String,
    /// Members beyond the minimal shape, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Primitive for TransferV1 {
    const KIND: &'static str = "transfer@1";

    fn check_shape(&self) -> Result<(), String> {
        parse_address("token", &self.token)?;
        parse_address("to", &self.to)?;
        parse_amount("amount", &self.amount)?;
        Ok(())
    }

    fn check_rules(&self) -> Result<(), String> {
        if parse_amount("amount", &self.amount)?.is_zero() {
            return Err("amount must be non-zero".to_string());
        }
        Ok(())
    }
}
