//! Native-currency ledger
//!
//! Tracks the native coin balance of every account the launchpad deals
//! with, including the launchpad's own reserve. Accounts can be flagged as
//! non-payable to model recipients that refuse incoming transfers.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Native ledger errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NativeError {
    #[error("Insufficient native balance for {account}: have {have}, need {need}")]
    InsufficientBalance {
        account: String,
        have: u128,
        need: u128,
    },
    #[error("Recipient {0} does not accept native transfers")]
    TransferRejected(String),
    #[error("Native balance overflow for {0}")]
    Overflow(String),
    #[error("Invalid address: cannot transfer to self")]
    SelfTransfer,
}

/// Balances of the native currency
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NativeLedger {
    balances: HashMap<String, u128>,
    #[serde(default)]
    non_payable: HashSet<String>,
}

impl NativeLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of an account
    pub fn balance_of(&self, account: &str) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Sum of all balances
    pub fn total(&self) -> u128 {
        self.balances.values().fold(0u128, |acc, b| acc.saturating_add(*b))
    }

    /// Whether the account accepts incoming transfers
    pub fn accepts(&self, account: &str) -> bool {
        !self.non_payable.contains(account)
    }

    /// Mark an account as (non-)payable
    pub fn set_payable(&mut self, account: &str, payable: bool) {
        if payable {
            self.non_payable.remove(account);
        } else {
            self.non_payable.insert(account.to_string());
        }
    }

    /// Issue new native currency to an account
    pub fn credit(&mut self, account: &str, amount: u128) -> Result<u128, NativeError> {
        let current = self.balance_of(account);
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| NativeError::Overflow(account.to_string()))?;
        self.balances.insert(account.to_string(), updated);
        Ok(updated)
    }

    /// Validate a transfer without applying it
    pub fn check_transfer(&self, from: &str, to: &str, amount: u128) -> Result<(), NativeError> {
        if from == to {
            return Err(NativeError::SelfTransfer);
        }

        if !self.accepts(to) {
            return Err(NativeError::TransferRejected(to.to_string()));
        }

        let have = self.balance_of(from);
        if have < amount {
            return Err(NativeError::InsufficientBalance {
                account: from.to_string(),
                have,
                need: amount,
            });
        }

        if self.balance_of(to).checked_add(amount).is_none() {
            return Err(NativeError::Overflow(to.to_string()));
        }

        Ok(())
    }

    /// Move native currency between two accounts.
    ///
    /// Either both balances change or neither does.
    pub fn transfer(&mut self, from: &str, to: &str, amount: u128) -> Result<(), NativeError> {
        self.check_transfer(from, to, amount)?;

        *self.balances.entry(from.to_string()).or_insert(0) -= amount;
        *self.balances.entry(to.to_string()).or_insert(0) += amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_and_balance() {
        let mut ledger = NativeLedger::new();
        assert_eq!(ledger.balance_of("alice"), 0);

        ledger.credit("alice", 500).unwrap();
        ledger.credit("alice", 250).unwrap();
        assert_eq!(ledger.balance_of("alice"), 750);
        assert_eq!(ledger.total(), 750);
    }

    #[test]
    fn test_credit_overflow() {
        let mut ledger = NativeLedger::new();
        ledger.credit("alice", u128::MAX).unwrap();

        let result = ledger.credit("alice", 1);
        assert!(matches!(result, Err(NativeError::Overflow(_))));
        assert_eq!(ledger.balance_of("alice"), u128::MAX);
    }

    #[test]
    fn test_transfer() {
        let mut ledger = NativeLedger::new();
        ledger.credit("alice", 1000).unwrap();

        ledger.transfer("alice", "bob", 400).unwrap();
        assert_eq!(ledger.balance_of("alice"), 600);
        assert_eq!(ledger.balance_of("bob"), 400);
        assert_eq!(ledger.total(), 1000);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut ledger = NativeLedger::new();
        ledger.credit("alice", 100).unwrap();

        let result = ledger.transfer("alice", "bob", 101);
        assert!(matches!(
            result,
            Err(NativeError::InsufficientBalance { have: 100, need: 101, .. })
        ));
        assert_eq!(ledger.balance_of("alice"), 100);
        assert_eq!(ledger.balance_of("bob"), 0);
    }

    #[test]
    fn test_non_payable_recipient() {
        let mut ledger = NativeLedger::new();
        ledger.credit("alice", 100).unwrap();
        ledger.set_payable("vault", false);

        let result = ledger.transfer("alice", "vault", 10);
        assert!(matches!(result, Err(NativeError::TransferRejected(_))));
        assert_eq!(ledger.balance_of("alice"), 100);

        ledger.set_payable("vault", true);
        ledger.transfer("alice", "vault", 10).unwrap();
        assert_eq!(ledger.balance_of("vault"), 10);
    }

    #[test]
    fn test_zero_transfer_is_allowed() {
        let mut ledger = NativeLedger::new();
        ledger.transfer("alice", "bob", 0).unwrap();
        assert_eq!(ledger.balance_of("bob"), 0);
    }
}
