//! Token Launchpad: a fixed-price token issuance and trading registry
//!
//! This crate provides:
//! - An ERC-20 style fungible token ledger with allowances
//! - A token factory with deterministic addresses
//! - A launchpad registry that creates tokens, lists them at a fixed price
//!   and settles buys and sells against its native reserve
//! - An owner role for price updates, reserve withdrawal and ownership transfer
//! - A sequenced event log for indexers
//! - JSON persistence with backups
//! - A CLI and a REST/WebSocket API
//!
//! # Example
//!
//! ```rust
//! use token_launchpad::launchpad::{Launchpad, ONE_TOKEN};
//!
//! let mut launchpad = Launchpad::new("owner").unwrap();
//! let token = launchpad
//!     .create_token("owner", "Test Token", "TST", 1_000_000, ONE_TOKEN / 1000)
//!     .unwrap();
//!
//! launchpad.fund_account("alice", ONE_TOKEN).unwrap();
//! let cost = launchpad.quote(&token, 100 * ONE_TOKEN).unwrap();
//! launchpad.buy_tokens("alice", &token, 100 * ONE_TOKEN, cost).unwrap();
//!
//! // Selling back needs an allowance for the launchpad
//! let spender = launchpad.address().to_string();
//! launchpad.approve(&token, "alice", &spender, 100 * ONE_TOKEN).unwrap();
//! let receipt = launchpad.sell_tokens("alice", &token, 100 * ONE_TOKEN).unwrap();
//! assert_eq!(receipt.amount, cost);
//! ```

pub mod api;
pub mod cli;
pub mod crypto;
pub mod launchpad;
pub mod storage;
pub mod token;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use launchpad::{
    EventRecord, Launchpad, LaunchpadConfig, LaunchpadError, LaunchpadEvent, Listing,
    TradeReceipt, DECIMALS, ONE_TOKEN,
};
pub use storage::{Storage, StorageConfig};
pub use token::{Token, TokenFactory, TokenMetadata};
