//! Exit codes for the `mandate` binary.
//!
//! Verification failures map through `MandateError::exit_code`:
//!
//! | code | meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | success                                   |
//! | 1    | invalid input, payload or usage           |
//! | 2    | signature missing                         |
//! | 3    | party does not match the required address |
//! | 4    | hash mismatch or bad signature            |
//! | 5    | deadline passed                           |
//! | 6    | key, store or transport failure           |

use mandate_core::{MandateError, StoreError};

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const COLLABORATOR_FAILURE: i32 = 6;

/// Exit code for an error bubbled up through `anyhow`.
pub fn for_error(err: &anyhow::Error) -> i32 {
    if let Some(mandate_err) = err.downcast_ref::<MandateError>() {
        mandate_err.exit_code()
    } else if err.downcast_ref::<StoreError>().is_some() {
        COLLABORATOR_FAILURE
    } else {
        FAILURE
    }
}
