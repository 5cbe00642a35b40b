//! ERC-20 style fungible token ledger
//!
//! Provides a standard interface for fungible tokens with:
//! - Balances per address
//! - Allowances for delegated transfers
//! - Transfer and approve operations
//! - A factory that deploys fixed-supply ledgers under fresh addresses
//!
//! # Example
//!
//! ```rust
//! use token_launchpad::token::TokenFactory;
//!
//! let mut factory = TokenFactory::new("0xlaunchpad");
//!
//! // Deploy a new token, the whole supply goes to the deployer
//! let mut token = factory
//!     .deploy("My Token".to_string(), "MTK".to_string(), 18, 1_000_000)
//!     .unwrap();
//!
//! // Transfer tokens
//! token.transfer("0xlaunchpad", "recipient", 1000).unwrap();
//! assert_eq!(token.balance_of("recipient"), 1000);
//! assert!(token.is_balanced());
//! ```

pub mod factory;
pub mod token;

pub use factory::TokenFactory;
pub use token::{
    ApprovalEvent, Token, TokenError, TokenMetadata, TransferEvent, DEFAULT_HISTORY_LIMIT,
    MAX_DECIMALS, MAX_NAME_LEN, MAX_SYMBOL_LEN,
};
