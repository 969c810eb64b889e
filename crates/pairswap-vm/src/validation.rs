use pairswap_core::{Op, Transaction};
use pairswap_state::{ChainState, Storage};

use crate::error::VmError;

/// Transaction validation result
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<VmError>,
    /// Native base asset the transaction spends up front
    pub required_balance: u64,
}

impl ValidationResult {
    pub fn ok(required_balance: u64) -> Self {
        ValidationResult {
            is_valid: true,
            error: None,
            required_balance,
        }
    }

    pub fn err(error: VmError) -> Self {
        ValidationResult {
            is_valid: false,
            error: Some(error),
            required_balance: 0,
        }
    }
}

/// Validate a transaction before execution
pub fn validate_transaction<S: Storage>(tx: &Transaction, state: &ChainState<S>) -> ValidationResult {
    // 1. Verify signature
    if tx.verify_signature().is_err() {
        return ValidationResult::err(VmError::InvalidSignature);
    }

    if tx.ops.is_empty() {
        return ValidationResult::err(VmError::InvalidOperation(
            "Transaction has no operations".to_string(),
        ));
    }

    // 2. Verify nonce
    let expected_nonce = state.nonce(&tx.sender).saturating_add(1);
    if tx.nonce != expected_nonce {
        return ValidationResult::err(VmError::InvalidNonce {
            expected: expected_nonce,
            got: tx.nonce,
        });
    }

    // 3. Referenced tokens must exist
    for op in &tx.ops {
        let token = match op {
            Op::TokenTransfer { token, .. } | Op::Approve { token, .. } => Some(token),
            _ => None,
        };
        if let Some(token) = token {
            if state.get_token(token).is_none() {
                return ValidationResult::err(VmError::TokenNotFound(*token));
            }
        }
    }

    // 4. Native spend must be covered
    let required = tx.native_spend();
    let available = state.native_balance(&tx.sender);
    if available < required {
        return ValidationResult::err(VmError::InsufficientBalance {
            have: available,
            need: required,
        });
    }

    ValidationResult::ok(required)
}
