//! Launchpad errors

use crate::launchpad::native::NativeError;
use crate::token::TokenError;
use serde::Serialize;
use thiserror::Error;

/// Broad failure classes, telling callers what kind of remedy applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Wrong account: retry as the owner
    Authorization,
    /// The referenced token was never listed here
    NotFound,
    /// Funding problem on either side of the trade
    Funds,
    /// The listing currently refuses trades
    Availability,
    /// Malformed or out-of-range arguments
    InvalidInput,
}

/// Launchpad operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchpadError {
    #[error("Token not listed: {0}")]
    NotFound(String),
    #[error("Listing is not active: {0}")]
    InactiveListing(String),
    #[error("Payment mismatch: expected {expected}, attached {attached}")]
    PaymentMismatch { expected: u128, attached: u128 },
    #[error("Insufficient launchpad supply: available {available}, requested {requested}")]
    InsufficientSupply { available: u128, requested: u128 },
    #[error("Insufficient reserve: reserve {reserve}, required {required}")]
    InsufficientReserve { reserve: u128, required: u128 },
    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: u128, need: u128 },
    #[error("Insufficient token balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },
    #[error("Unauthorized: {0} is not the owner")]
    Unauthorized(String),
    #[error("Invalid amount: amount must be greater than 0")]
    InvalidAmount,
    #[error("Invalid price: price must be greater than 0")]
    InvalidPrice,
    #[error("Invalid supply: {0}")]
    InvalidSupply(String),
    #[error("Invalid account: {0}")]
    InvalidAccount(String),
    #[error("Trade too small: {quantity} units are worth less than one native unit")]
    DustTrade { quantity: u128 },
    #[error("Arithmetic overflow while pricing {quantity} units at {price}")]
    ArithmeticOverflow { quantity: u128, price: u128 },
    #[error("Account {0} is reserved for the launchpad")]
    ReservedAccount(String),
    #[error("Token error: {0}")]
    Token(TokenError),
    #[error("Native transfer error: {0}")]
    Native(#[from] NativeError),
}

impl From<TokenError> for LaunchpadError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InsufficientAllowance { have, need } => {
                LaunchpadError::InsufficientAllowance { have, need }
            }
            TokenError::InsufficientBalance { have, need } => {
                LaunchpadError::InsufficientBalance { have, need }
            }
            TokenError::TokenNotFound(address) => LaunchpadError::NotFound(address),
            other => LaunchpadError::Token(other),
        }
    }
}

impl LaunchpadError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LaunchpadError::Unauthorized(_) => ErrorKind::Authorization,
            LaunchpadError::NotFound(_) => ErrorKind::NotFound,
            LaunchpadError::InactiveListing(_) => ErrorKind::Availability,
            LaunchpadError::PaymentMismatch { .. }
            | LaunchpadError::InsufficientSupply { .. }
            | LaunchpadError::InsufficientReserve { .. }
            | LaunchpadError::InsufficientAllowance { .. }
            | LaunchpadError::InsufficientBalance { .. } => ErrorKind::Funds,
            LaunchpadError::Native(NativeError::InsufficientBalance { .. })
            | LaunchpadError::Native(NativeError::TransferRejected(_)) => ErrorKind::Funds,
            LaunchpadError::Native(_)
            | LaunchpadError::Token(_)
            | LaunchpadError::InvalidAmount
            | LaunchpadError::InvalidPrice
            | LaunchpadError::InvalidSupply(_)
            | LaunchpadError::InvalidAccount(_)
            | LaunchpadError::DustTrade { .. }
            | LaunchpadError::ArithmeticOverflow { .. }
            | LaunchpadError::ReservedAccount(_) => ErrorKind::InvalidInput,
        }
    }

    /// Whether the caller should switch accounts rather than change funding
    pub fn is_authorization(&self) -> bool {
        self.kind() == ErrorKind::Authorization
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_errors_map_to_seller_side_variants() {
        let err: LaunchpadError = TokenError::InsufficientAllowance { have: 1, need: 2 }.into();
        assert_eq!(err, LaunchpadError::InsufficientAllowance { have: 1, need: 2 });
        assert_eq!(err.kind(), ErrorKind::Funds);

        let err: LaunchpadError = TokenError::InsufficientBalance { have: 0, need: 5 }.into();
        assert_eq!(err, LaunchpadError::InsufficientBalance { have: 0, need: 5 });

        let err: LaunchpadError = TokenError::InvalidName.into();
        assert_eq!(err, LaunchpadError::Token(TokenError::InvalidName));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_authorization_is_distinct_from_funds() {
        let auth = LaunchpadError::Unauthorized("0xabc".to_string());
        let funds = LaunchpadError::InsufficientReserve {
            reserve: 1,
            required: 2,
        };

        assert!(auth.is_authorization());
        assert!(!funds.is_authorization());
        assert_ne!(auth.kind(), funds.kind());
    }

    #[test]
    fn test_rejected_payout_is_a_funds_failure() {
        let err = LaunchpadError::from(NativeError::TransferRejected("0xowner".to_string()));
        assert_eq!(err.kind(), ErrorKind::Funds);
    }

    #[test]
    fn test_error_messages() {
        let err = LaunchpadError::PaymentMismatch {
            expected: 100,
            attached: 99,
        };
        assert_eq!(err.to_string(), "Payment mismatch: expected 100, attached 99");
    }
}
