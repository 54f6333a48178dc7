//! Built-in payload primitives.
//!
//! | Kind | Type | Purpose |
//! |------|------|---------|
//! | `swap@1` | [`SwapV1`] | Exchange `amountIn` of one token for at least `minOut` of another |
//! | `transfer@1` | [`TransferV1`] | Move `amount` of a token to an address |
//!
//! Amounts are base-unit decimal strings (MUST NOT use float).

mod swap;
mod transfer;

pub use swap::SwapV1;
pub use transfer::TransferV1;

use alloy_primitives::{Address, U256};

use crate::account::parse_evm_address;

/// Parse a base-unit decimal amount that fits in 256 bits.
pub(crate) fn parse_amount(field: &str, value: &str) -> Result<U256, String> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("{field} must be a decimal integer string, got {value:?}"));
    }
    U256::from_str_radix(value, 10).map_err(|e| format!("{field} out of range: {e}"))
}

pub(crate) fn parse_address(field: &str, value: &str) -> Result<Address, String> {
    parse_evm_address(value).map_err(|e| format!("{field}: {e}"))
}
