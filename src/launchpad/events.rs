//! Launchpad events
//!
//! Every successful state change appends one event to the registry's log.
//! Off-chain consumers discover newly created tokens through these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Something that happened on the launchpad
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum LaunchpadEvent {
    /// A token was created and listed
    TokenCreated {
        token: String,
        name: String,
        symbol: String,
        creator: String,
        total_supply: u128,
        price: u128,
    },
    /// Tokens were bought from the launchpad
    TokensPurchased {
        token: String,
        buyer: String,
        quantity: u128,
        cost: u128,
    },
    /// Tokens were sold back to the launchpad
    TokensSold {
        token: String,
        seller: String,
        quantity: u128,
        refund: u128,
    },
    /// The owner changed a listing's price
    PriceUpdated {
        token: String,
        old_price: u128,
        new_price: u128,
    },
    /// The owner drained the reserve
    ReserveWithdrawn { owner: String, amount: u128 },
    /// Native currency was sent to the reserve
    Deposited { from: String, amount: u128 },
    /// Ownership moved to another account
    OwnershipTransferred {
        previous_owner: String,
        new_owner: String,
    },
}

impl LaunchpadEvent {
    /// Short event name
    pub fn name(&self) -> &'static str {
        match self {
            LaunchpadEvent::TokenCreated { .. } => "TokenCreated",
            LaunchpadEvent::TokensPurchased { .. } => "TokensPurchased",
            LaunchpadEvent::TokensSold { .. } => "TokensSold",
            LaunchpadEvent::PriceUpdated { .. } => "PriceUpdated",
            LaunchpadEvent::ReserveWithdrawn { .. } => "ReserveWithdrawn",
            LaunchpadEvent::Deposited { .. } => "Deposited",
            LaunchpadEvent::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }

    /// Token the event concerns, if any
    pub fn token(&self) -> Option<&str> {
        match self {
            LaunchpadEvent::TokenCreated { token, .. }
            | LaunchpadEvent::TokensPurchased { token, .. }
            | LaunchpadEvent::TokensSold { token, .. }
            | LaunchpadEvent::PriceUpdated { token, .. } => Some(token),
            _ => None,
        }
    }
}

/// An event with its position in the log
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EventRecord {
    /// Position in the log, starting at 0
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub event: LaunchpadEvent,
}

/// Append-only event log
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its record
    pub fn push(&mut self, event: LaunchpadEvent) -> EventRecord {
        let record = EventRecord {
            sequence: self.records.len() as u64,
            timestamp: Utc::now(),
            event,
        };
        self.records.push(record.clone());
        record
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no event was recorded yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, oldest first
    pub fn all(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with a sequence number at or after `sequence`
    pub fn since(&self, sequence: u64) -> &[EventRecord] {
        let start = (sequence as usize).min(self.records.len());
        &self.records[start..]
    }

    /// The most recent `count` records, oldest first
    pub fn recent(&self, count: usize) -> &[EventRecord] {
        let start = self.records.len().saturating_sub(count);
        &self.records[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deposit(amount: u128) -> LaunchpadEvent {
        LaunchpadEvent::Deposited {
            from: "alice".to_string(),
            amount,
        }
    }

    #[test]
    fn test_sequences_are_contiguous() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        for i in 0..3 {
            let record = log.push(deposit(i));
            assert_eq!(record.sequence, i as u64);
        }
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_since_and_recent() {
        let mut log = EventLog::new();
        for i in 0..5 {
            log.push(deposit(i));
        }

        assert_eq!(log.since(3).len(), 2);
        assert_eq!(log.since(3)[0].sequence, 3);
        assert!(log.since(10).is_empty());

        let recent = log.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].sequence, 4);
        assert_eq!(log.recent(100).len(), 5);
    }

    #[test]
    fn test_event_token_address() {
        let mut log = EventLog::new();
        log.push(LaunchpadEvent::TokenCreated {
            token: "0xaaa".to_string(),
            name: "A".to_string(),
            symbol: "A".to_string(),
            creator: "alice".to_string(),
            total_supply: 1,
            price: 1,
        });
        log.push(deposit(1));

        assert_eq!(log.all()[0].event.token(), Some("0xaaa"));
        assert_eq!(log.all()[1].event.token(), None);
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_string(&deposit(7)).unwrap();
        assert!(json.contains("\"Deposited\""));
        assert!(json.contains("\"amount\":7"));

        let back: LaunchpadEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, deposit(7));
    }
}
