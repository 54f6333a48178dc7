use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{parse_address, parse_amount};
use crate::registry::Primitive;

/// Maximum slippage tolerance (100%).
const MAX_SLIPPAGE_BPS: u32 = 10_000;

/// `swap@1`: exchange `amount_in` of `token_in` for at least `min_out` of
/// `token_out`, delivered to `recipient`.
///
/// The named fields are the minimum a swap must carry. Any other members are
/// kept in `extra` so re-validation never drops signed content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapV1 {
    pub chain_id: u64,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
    pub min_out: String,
    pub recipient: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage_bps: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Primitive for SwapV1 {
    const KIND: &'static str = "swap@1";

    fn check_shape(&self) -> Result<(), String> {
        parse_address("tokenIn", &self.token_in)?;
        parse_address("tokenOut", &self.token_out)?;
        parse_address("recipient", &self.recipient)?;
        parse_amount("amountIn", &self.amount_in)?;
        parse_amount("minOut", &self.min_out)?;
        if let Some(bps) = self.slippage_bps {
            if bps > MAX_SLIPPAGE_BPS {
                return Err(format!("slippageBps {bps} exceeds {MAX_SLIPPAGE_BPS}"));
            }
        }
        Ok(())
    }

    fn check_rules(&self) -> Result<(), String> {
        if parse_amount("amountIn", &self.amount_in)?.is_zero() {
            return Err("amountIn must be non-zero".to_string());
        }
        if parse_amount("minOut", &self.min_out)?.is_zero() {
            return Err("minOut must be non-zero".to_string());
        }
        if parse_address("tokenIn", &self.token_in)? == parse_address("tokenOut", &self.token_out)? {
            return Err("tokenIn and tokenOut must differ".to_string());
        }
        Ok(())
    }
}
