//! ERC-20 style token implementation
//!
//! A fixed-supply fungible token: the whole supply is minted to a single
//! initial holder at construction and only ever moves between holders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Maximum token name length
pub const MAX_NAME_LEN: usize = 50;

/// Maximum token symbol length
pub const MAX_SYMBOL_LEN: usize = 10;

/// Maximum decimal places
pub const MAX_DECIMALS: u8 = 18;

/// Default number of transfers kept in a token's history
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },
    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: u128, need: u128 },
    #[error("Token not found: {0}")]
    TokenNotFound(String),
    #[error("Token already exists: {0}")]
    TokenAlreadyExists(String),
    #[error("Invalid symbol: must be 1-10 characters")]
    InvalidSymbol,
    #[error("Invalid name: must be 1-50 characters")]
    InvalidName,
    #[error("Invalid decimals: must be 0-18")]
    InvalidDecimals,
    #[error("Invalid supply: must be greater than 0")]
    InvalidSupply,
}

/// Token metadata (immutable after creation)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenMetadata {
    /// Token name (e.g., "Test Token")
    pub name: String,
    /// Token symbol (e.g., "TST")
    pub symbol: String,
    /// Decimal places
    pub decimals: u8,
    /// Total supply in smallest units (fixed at creation)
    pub total_supply: u128,
    /// Timestamp when created
    pub created_at: DateTime<Utc>,
}

impl TokenMetadata {
    /// Create new token metadata with validation
    pub fn new(
        name: String,
        symbol: String,
        decimals: u8,
        total_supply: u128,
    ) -> Result<Self, TokenError> {
        let name_len = name.chars().count();
        if name.trim().is_empty() || name_len > MAX_NAME_LEN {
            return Err(TokenError::InvalidName);
        }

        let symbol_len = symbol.chars().count();
        if symbol.trim().is_empty() || symbol_len > MAX_SYMBOL_LEN {
            return Err(TokenError::InvalidSymbol);
        }

        if decimals > MAX_DECIMALS {
            return Err(TokenError::InvalidDecimals);
        }

        if total_supply == 0 {
            return Err(TokenError::InvalidSupply);
        }

        Ok(Self {
            name,
            symbol,
            decimals,
            total_supply,
            created_at: Utc::now(),
        })
    }
}

/// Transfer event (emitted when tokens are transferred)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TransferEvent {
    pub token: String,
    pub from: String,
    pub to: String,
    pub amount: u128,
    pub timestamp: DateTime<Utc>,
}

/// Approval event (emitted when allowance is set)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ApprovalEvent {
    pub token: String,
    pub owner: String,
    pub spender: String,
    pub amount: u128,
    pub timestamp: DateTime<Utc>,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

/// An ERC-20 style fungible token
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Token {
    /// Unique token address
    pub address: String,
    /// Token metadata
    pub metadata: TokenMetadata,
    /// Balances: address -> amount
    balances: HashMap<String, u128>,
    /// Allowances: owner -> (spender -> amount)
    allowances: HashMap<String, HashMap<String, u128>>,
    /// Recent transfers, oldest first
    pub transfer_history: Vec<TransferEvent>,
    #[serde(default = "default_history_limit")]
    history_limit: usize,
}

impl Token {
    /// Create a new token with the entire supply allocated to `holder`
    pub fn new(address: String, metadata: TokenMetadata, holder: &str) -> Self {
        let mut balances = HashMap::new();
        balances.insert(holder.to_string(), metadata.total_supply);

        Self {
            address,
            metadata,
            balances,
            allowances: HashMap::new(),
            transfer_history: Vec::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Override how many transfers are retained in the history
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    // =========================================================================
    // ERC-20 View Functions
    // =========================================================================

    /// Get token name
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Get token symbol
    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    /// Get decimal places
    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    /// Get total supply
    pub fn total_supply(&self) -> u128 {
        self.metadata.total_supply
    }

    /// Get balance of an address
    pub fn balance_of(&self, address: &str) -> u128 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Get allowance for a spender
    pub fn allowance(&self, owner: &str, spender: &str) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Get holder count
    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|&&b| b > 0).count()
    }

    /// Sum of every holder balance, `None` if it does not fit in a u128
    pub fn balance_sum(&self) -> Option<u128> {
        self.balances
            .values()
            .try_fold(0u128, |acc, &b| acc.checked_add(b))
    }

    /// Closed-ledger check: holder balances add up to the total supply
    pub fn is_balanced(&self) -> bool {
        self.balance_sum() == Some(self.total_supply())
    }

    // =========================================================================
    // ERC-20 Mutating Functions
    // =========================================================================

    /// Transfer tokens from one address to another
    ///
    /// # Arguments
    /// * `from` - Sender address
    /// * `to` - Recipient address
    /// * `amount` - Amount to transfer
    pub fn transfer(
        &mut self,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<TransferEvent, TokenError> {
        self.check_transfer(from, to, amount)?;
        Ok(self.move_balance(from, to, amount))
    }

    /// Approve a spender to transfer tokens on behalf of owner
    ///
    /// # Arguments
    /// * `owner` - Token owner
    /// * `spender` - Address being approved to spend
    /// * `amount` - Maximum amount spender can transfer
    pub fn approve(
        &mut self,
        owner: &str,
        spender: &str,
        amount: u128,
    ) -> Result<ApprovalEvent, TokenError> {
        // Set allowance (can be 0 to revoke)
        self.allowances
            .entry(owner.to_string())
            .or_default()
            .insert(spender.to_string(), amount);

        Ok(ApprovalEvent {
            token: self.address.clone(),
            owner: owner.to_string(),
            spender: spender.to_string(),
            amount,
            timestamp: Utc::now(),
        })
    }

    /// Transfer tokens on behalf of owner (requires prior approval)
    ///
    /// # Arguments
    /// * `spender` - Address performing the transfer (must have allowance)
    /// * `from` - Token owner
    /// * `to` - Recipient
    /// * `amount` - Amount to transfer
    pub fn transfer_from(
        &mut self,
        spender: &str,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<TransferEvent, TokenError> {
        self.check_transfer_from(spender, from, to, amount)?;

        if let Some(allowance) = self
            .allowances
            .get_mut(from)
            .and_then(|spenders| spenders.get_mut(spender))
        {
            *allowance -= amount;
        }

        Ok(self.move_balance(from, to, amount))
    }

    /// Validate a direct transfer without applying it.
    ///
    /// Zero amounts and self-transfers are valid, as in ERC-20.
    pub fn check_transfer(&self, from: &str, _to: &str, amount: u128) -> Result<(), TokenError> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance {
                have: from_balance,
                need: amount,
            });
        }

        Ok(())
    }

    /// Validate a delegated transfer without applying it
    pub fn check_transfer_from(
        &self,
        spender: &str,
        from: &str,
        _to: &str,
        amount: u128,
    ) -> Result<(), TokenError> {
        let current_allowance = self.allowance(from, spender);
        if current_allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                have: current_allowance,
                need: amount,
            });
        }

        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance {
                have: from_balance,
                need: amount,
            });
        }

        Ok(())
    }

    /// Move an already validated amount and record the transfer
    fn move_balance(&mut self, from: &str, to: &str, amount: u128) -> TransferEvent {
        *self.balances.entry(from.to_string()).or_insert(0) -= amount;
        *self.balances.entry(to.to_string()).or_insert(0) += amount;

        let event = TransferEvent {
            token: self.address.clone(),
            from: from.to_string(),
            to: to.to_string(),
            amount,
            timestamp: Utc::now(),
        };

        self.transfer_history.push(event.clone());
        if self.transfer_history.len() > self.history_limit {
            let excess = self.transfer_history.len() - self.history_limit;
            self.transfer_history.drain(..excess);
        }

        event
    }
}
