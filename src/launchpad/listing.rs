//! Listings
//!
//! One listing per token created by the launchpad, binding the token to its
//! trading price and status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registry record for a launchpad token
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    /// Token address (immutable)
    pub token: String,
    /// Account that requested creation; informational only
    pub creator: String,
    /// Native smallest units per whole token
    pub price: u128,
    /// Whether buys and sells are accepted
    pub active: bool,
    /// When the listing was created
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Create an active listing
    pub fn new(token: String, creator: String, price: u128) -> Self {
        Self {
            token,
            creator,
            price,
            active: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_listing_is_active() {
        let listing = Listing::new("0xtoken".to_string(), "alice".to_string(), 42);
        assert!(listing.active);
        assert_eq!(listing.price, 42);
        assert_eq!(listing.creator, "alice");
    }
}
