//! Fixed-price token launchpad
//!
//! The launchpad deploys a new fungible token on request, keeps the whole
//! supply for itself and sells it at a listed price per whole token. Holders
//! can sell back at the same price; refunds come out of the launchpad's
//! native reserve.
//!
//! # Example
//!
//! ```rust
//! use token_launchpad::launchpad::{parse_ether, Launchpad, ONE_TOKEN};
//!
//! let mut launchpad = Launchpad::new("owner").unwrap();
//! let token = launchpad
//!     .create_token("owner", "Test Token", "TST", 1_000_000, parse_ether("0.001").unwrap())
//!     .unwrap();
//!
//! // Fund a buyer and buy 100 whole tokens for exactly 0.1
//! launchpad.fund_account("alice", ONE_TOKEN).unwrap();
//! let cost = launchpad.quote(&token, 100 * ONE_TOKEN).unwrap();
//! assert_eq!(cost, parse_ether("0.1").unwrap());
//! launchpad.buy_tokens("alice", &token, 100 * ONE_TOKEN, cost).unwrap();
//!
//! assert_eq!(launchpad.balance_of(&token, "alice").unwrap(), 100 * ONE_TOKEN);
//! assert_eq!(launchpad.reserve(), cost);
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod listing;
pub mod native;
pub mod registry;
pub mod units;

pub use config::LaunchpadConfig;
pub use error::{ErrorKind, LaunchpadError};
pub use events::{EventLog, EventRecord, LaunchpadEvent};
pub use listing::Listing;
pub use native::{NativeError, NativeLedger};
pub use registry::{Launchpad, LaunchpadStats, TradeReceipt};
pub use units::{
    format_units, parse_ether, parse_units, quote, scale_whole, UnitsError, DECIMALS, ONE_TOKEN,
};
