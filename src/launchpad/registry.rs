//! Token launchpad registry
//!
//! Creates tokens, lists them at a fixed price and settles buys and sells
//! against the launchpad's own native reserve.
//!
//! Every operation validates all of its preconditions before touching any
//! balance, so a failed call leaves the registry exactly as it was.

use crate::crypto::derive_address;
use crate::launchpad::config::LaunchpadConfig;
use crate::launchpad::error::LaunchpadError;
use crate::launchpad::events::{EventLog, EventRecord, LaunchpadEvent};
use crate::launchpad::listing::Listing;
use crate::launchpad::native::NativeLedger;
use crate::launchpad::units::{quote, scale_whole, DECIMALS};
use crate::token::{ApprovalEvent, Token, TokenError, TokenFactory, TransferEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of a settled buy or sell
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TradeReceipt {
    pub token: String,
    pub account: String,
    /// Token units moved
    pub quantity: u128,
    /// Native units paid (buy) or refunded (sell)
    pub amount: u128,
}

/// Summary of the registry state
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct LaunchpadStats {
    pub address: String,
    pub owner: String,
    pub reserve: u128,
    pub listings: usize,
    pub events: usize,
}

/// The launchpad: token factory, listing table and native reserve
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Launchpad {
    /// Launchpad account; holds unsold supply and the reserve
    address: String,
    /// Sole admin
    owner: String,
    config: LaunchpadConfig,
    factory: TokenFactory,
    /// Token ledgers by address
    tokens: HashMap<String, Token>,
    /// Listings by token address
    listings: HashMap<String, Listing>,
    /// Token addresses in creation order
    listing_order: Vec<String>,
    native: NativeLedger,
    events: EventLog,
}

impl Launchpad {
    /// Create a launchpad administered by `owner`
    pub fn new(owner: &str) -> Result<Self, LaunchpadError> {
        Self::with_config(owner, LaunchpadConfig::default())
    }

    /// Create a launchpad with explicit configuration
    pub fn with_config(owner: &str, config: LaunchpadConfig) -> Result<Self, LaunchpadError> {
        if owner.trim().is_empty() {
            return Err(LaunchpadError::InvalidAccount(
                "owner must not be empty".to_string(),
            ));
        }

        let address = derive_address(&["launchpad", owner]);
        let factory =
            TokenFactory::new(&address).with_history_limit(config.transfer_history_limit);

        log::info!("Launchpad {} created, owner {}", address, owner);

        Ok(Self {
            address,
            owner: owner.to_string(),
            config,
            factory,
            tokens: HashMap::new(),
            listings: HashMap::new(),
            listing_order: Vec::new(),
            native: NativeLedger::new(),
            events: EventLog::new(),
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Launchpad account address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Current owner
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn config(&self) -> &LaunchpadConfig {
        &self.config
    }

    /// Native currency held by the launchpad
    pub fn reserve(&self) -> u128 {
        self.native.balance_of(&self.address)
    }

    /// Native balance of any account
    pub fn native_balance(&self, account: &str) -> u128 {
        self.native.balance_of(account)
    }

    /// Listing snapshot for a token
    pub fn listed_tokens(&self, token: &str) -> Result<&Listing, LaunchpadError> {
        self.listings
            .get(token)
            .ok_or_else(|| LaunchpadError::NotFound(token.to_string()))
    }

    /// All listings in creation order
    pub fn listings(&self) -> Vec<&Listing> {
        self.listing_order
            .iter()
            .filter_map(|address| self.listings.get(address))
            .collect()
    }

    /// Number of listings
    pub fn count(&self) -> usize {
        self.listings.len()
    }

    /// Token ledger by address
    pub fn token(&self, token: &str) -> Option<&Token> {
        self.tokens.get(token)
    }

    /// Token balance of a holder
    pub fn balance_of(&self, token: &str, holder: &str) -> Result<u128, LaunchpadError> {
        Ok(self.ledger(token)?.balance_of(holder))
    }

    /// Delegated-transfer allowance
    pub fn allowance(
        &self,
        token: &str,
        owner: &str,
        spender: &str,
    ) -> Result<u128, LaunchpadError> {
        Ok(self.ledger(token)?.allowance(owner, spender))
    }

    /// Native cost of trading `quantity` units at the current listing price
    pub fn quote(&self, token: &str, quantity: u128) -> Result<u128, LaunchpadError> {
        let listing = self.listed_tokens(token)?;
        if quantity == 0 {
            return Err(LaunchpadError::InvalidAmount);
        }
        let cost = self.price_trade(quantity, listing.price)?;
        log::debug!("Quote for {} units of {}: {}", quantity, token, cost);
        Ok(cost)
    }

    /// Event log
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn stats(&self) -> LaunchpadStats {
        LaunchpadStats {
            address: self.address.clone(),
            owner: self.owner.clone(),
            reserve: self.reserve(),
            listings: self.listings.len(),
            events: self.events.len(),
        }
    }

    /// Check the bookkeeping invariants, returning every violation found
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for (address, token) in &self.tokens {
            if !token.is_balanced() {
                violations.push(format!(
                    "token {} balances do not add up to total supply {}",
                    address,
                    token.total_supply()
                ));
            }
            if !self.listings.contains_key(address) {
                violations.push(format!("token {} has no listing", address));
            }
        }

        for address in self.listings.keys() {
            if !self.tokens.contains_key(address) {
                violations.push(format!("listing {} has no token ledger", address));
            }
        }

        if self.listing_order.len() != self.listings.len() {
            violations.push("listing order is out of sync with listings".to_string());
        }

        violations
    }

    // =========================================================================
    // Token creation
    // =========================================================================

    /// Create a token and list it.
    ///
    /// `initial_supply` is in whole tokens; the ledger holds
    /// `initial_supply * 10^18` units, all owned by the launchpad.
    /// Returns the new token's address.
    pub fn create_token(
        &mut self,
        caller: &str,
        name: &str,
        symbol: &str,
        initial_supply: u64,
        price: u128,
    ) -> Result<String, LaunchpadError> {
        self.ensure_external(caller)?;

        if initial_supply == 0 {
            return Err(LaunchpadError::InvalidSupply(
                "initial supply must be greater than 0".to_string(),
            ));
        }
        if price == 0 {
            return Err(LaunchpadError::InvalidPrice);
        }

        let total_supply = scale_whole(initial_supply).ok_or_else(|| {
            LaunchpadError::InvalidSupply(format!("{} whole tokens overflow", initial_supply))
        })?;

        let predicted = self.factory.next_address(symbol);
        if self.tokens.contains_key(&predicted) {
            return Err(TokenError::TokenAlreadyExists(predicted).into());
        }

        let token =
            self.factory
                .deploy(name.to_string(), symbol.to_string(), DECIMALS, total_supply)?;
        let address = token.address.clone();

        self.listings.insert(
            address.clone(),
            Listing::new(address.clone(), caller.to_string(), price),
        );
        self.listing_order.push(address.clone());
        self.tokens.insert(address.clone(), token);

        self.events.push(LaunchpadEvent::TokenCreated {
            token: address.clone(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            creator: caller.to_string(),
            total_supply,
            price,
        });

        log::info!(
            "Token created: {} ({}) at {} by {}, price {}",
            name,
            symbol,
            address,
            caller,
            price
        );

        Ok(address)
    }

    // =========================================================================
    // Trading
    // =========================================================================

    /// Buy `quantity` units from the launchpad, attaching `payment`.
    ///
    /// The payment must equal the quoted cost exactly; overpayment is
    /// rejected, not refunded.
    pub fn buy_tokens(
        &mut self,
        caller: &str,
        token: &str,
        quantity: u128,
        payment: u128,
    ) -> Result<TradeReceipt, LaunchpadError> {
        self.ensure_external(caller)?;
        let price = self.tradable_listing(token)?.price;

        if quantity == 0 {
            return Err(LaunchpadError::InvalidAmount);
        }

        let cost = self.price_trade(quantity, price)?;
        if payment != cost {
            return Err(LaunchpadError::PaymentMismatch {
                expected: cost,
                attached: payment,
            });
        }

        let available = self.ledger(token)?.balance_of(&self.address);
        if available < quantity {
            return Err(LaunchpadError::InsufficientSupply {
                available,
                requested: quantity,
            });
        }

        self.native.check_transfer(caller, &self.address, payment)?;

        // Commit: everything below was validated above
        let ledger = self
            .tokens
            .get_mut(token)
            .ok_or_else(|| LaunchpadError::NotFound(token.to_string()))?;
        ledger.transfer(&self.address, caller, quantity)?;
        self.native.transfer(caller, &self.address, payment)?;

        self.events.push(LaunchpadEvent::TokensPurchased {
            token: token.to_string(),
            buyer: caller.to_string(),
            quantity,
            cost,
        });

        log::info!(
            "{} bought {} units of {} for {}",
            caller,
            quantity,
            token,
            cost
        );

        Ok(TradeReceipt {
            token: token.to_string(),
            account: caller.to_string(),
            quantity,
            amount: cost,
        })
    }

    /// Sell `quantity` units back to the launchpad.
    ///
    /// The caller must have approved the launchpad for at least `quantity`
    /// on the token; the refund is paid from the reserve.
    pub fn sell_tokens(
        &mut self,
        caller: &str,
        token: &str,
        quantity: u128,
    ) -> Result<TradeReceipt, LaunchpadError> {
        self.ensure_external(caller)?;
        let price = self.tradable_listing(token)?.price;

        if quantity == 0 {
            return Err(LaunchpadError::InvalidAmount);
        }

        let refund = self.price_trade(quantity, price)?;
        let reserve = self.reserve();
        if reserve < refund {
            return Err(LaunchpadError::InsufficientReserve {
                reserve,
                required: refund,
            });
        }

        self.native.check_transfer(&self.address, caller, refund)?;
        self.ledger(token)?
            .check_transfer_from(&self.address, caller, &self.address, quantity)?;

        // Commit: everything below was validated above
        let ledger = self
            .tokens
            .get_mut(token)
            .ok_or_else(|| LaunchpadError::NotFound(token.to_string()))?;
        ledger.transfer_from(&self.address, caller, &self.address, quantity)?;
        self.native.transfer(&self.address, caller, refund)?;

        self.events.push(LaunchpadEvent::TokensSold {
            token: token.to_string(),
            seller: caller.to_string(),
            quantity,
            refund,
        });

        log::info!(
            "{} sold {} units of {} for {}",
            caller,
            quantity,
            token,
            refund
        );

        Ok(TradeReceipt {
            token: token.to_string(),
            account: caller.to_string(),
            quantity,
            amount: refund,
        })
    }

    // =========================================================================
    // Token ledger passthrough
    // =========================================================================

    /// Direct token transfer between holders
    pub fn transfer(
        &mut self,
        token: &str,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<TransferEvent, LaunchpadError> {
        self.ensure_external(from)?;
        let ledger = self
            .tokens
            .get_mut(token)
            .ok_or_else(|| LaunchpadError::NotFound(token.to_string()))?;
        Ok(ledger.transfer(from, to, amount)?)
    }

    /// Set the allowance `spender` may move out of `owner`'s balance
    pub fn approve(
        &mut self,
        token: &str,
        owner: &str,
        spender: &str,
        amount: u128,
    ) -> Result<ApprovalEvent, LaunchpadError> {
        self.ensure_external(owner)?;
        let ledger = self
            .tokens
            .get_mut(token)
            .ok_or_else(|| LaunchpadError::NotFound(token.to_string()))?;
        Ok(ledger.approve(owner, spender, amount)?)
    }

    /// Delegated transfer by an approved spender
    pub fn transfer_from(
        &mut self,
        token: &str,
        spender: &str,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<TransferEvent, LaunchpadError> {
        self.ensure_external(spender)?;
        let ledger = self
            .tokens
            .get_mut(token)
            .ok_or_else(|| LaunchpadError::NotFound(token.to_string()))?;
        Ok(ledger.transfer_from(spender, from, to, amount)?)
    }

    // =========================================================================
    // Native currency
    // =========================================================================

    /// Send native currency to the reserve without buying anything
    pub fn deposit(&mut self, from: &str, amount: u128) -> Result<(), LaunchpadError> {
        self.ensure_external(from)?;
        if amount == 0 {
            return Err(LaunchpadError::InvalidAmount);
        }

        self.native.transfer(from, &self.address, amount)?;
        self.events.push(LaunchpadEvent::Deposited {
            from: from.to_string(),
            amount,
        });

        log::info!("{} deposited {} into the reserve", from, amount);
        Ok(())
    }

    /// Development faucet: issue native currency to an account.
    ///
    /// The launchpad itself cannot be funded this way; its reserve only
    /// moves through trades, deposits and withdrawals.
    pub fn fund_account(&mut self, account: &str, amount: u128) -> Result<u128, LaunchpadError> {
        self.ensure_external(account)?;
        if amount == 0 {
            return Err(LaunchpadError::InvalidAmount);
        }

        let balance = self.native.credit(account, amount)?;
        log::debug!("Faucet credited {} to {}", amount, account);
        Ok(balance)
    }

    /// Mark an account as able or unable to receive native transfers
    pub fn set_payable(&mut self, account: &str, payable: bool) -> Result<(), LaunchpadError> {
        self.ensure_external(account)?;
        self.native.set_payable(account, payable);
        Ok(())
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Owner-only: overwrite a listing's price
    pub fn update_token_price(
        &mut self,
        caller: &str,
        token: &str,
        new_price: u128,
    ) -> Result<(), LaunchpadError> {
        self.ensure_owner(caller)?;

        let listing = self
            .listings
            .get_mut(token)
            .ok_or_else(|| LaunchpadError::NotFound(token.to_string()))?;
        let old_price = listing.price;
        listing.price = new_price;

        self.events.push(LaunchpadEvent::PriceUpdated {
            token: token.to_string(),
            old_price,
            new_price,
        });

        log::info!("Price of {} changed from {} to {}", token, old_price, new_price);
        Ok(())
    }

    /// Owner-only: move the whole reserve to the owner
    pub fn withdraw_eth(&mut self, caller: &str) -> Result<u128, LaunchpadError> {
        self.ensure_owner(caller)?;

        let amount = self.reserve();
        self.native.transfer(&self.address, &self.owner, amount)?;

        self.events.push(LaunchpadEvent::ReserveWithdrawn {
            owner: self.owner.clone(),
            amount,
        });

        log::info!("Owner {} withdrew {} from the reserve", self.owner, amount);
        Ok(amount)
    }

    /// Owner-only: hand the admin role to another account
    pub fn transfer_ownership(&mut self, caller: &str, new_owner: &str) -> Result<(), LaunchpadError> {
        self.ensure_owner(caller)?;
        if new_owner.trim().is_empty() {
            return Err(LaunchpadError::InvalidAccount(
                "new owner must not be empty".to_string(),
            ));
        }
        self.ensure_external(new_owner)?;

        let previous_owner = std::mem::replace(&mut self.owner, new_owner.to_string());
        self.events.push(LaunchpadEvent::OwnershipTransferred {
            previous_owner: previous_owner.clone(),
            new_owner: new_owner.to_string(),
        });

        log::info!("Ownership transferred from {} to {}", previous_owner, new_owner);
        Ok(())
    }

    /// Records appended since `sequence`
    pub fn events_since(&self, sequence: u64) -> &[EventRecord] {
        self.events.since(sequence)
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    fn ledger(&self, token: &str) -> Result<&Token, LaunchpadError> {
        self.tokens
            .get(token)
            .ok_or_else(|| LaunchpadError::NotFound(token.to_string()))
    }

    fn tradable_listing(&self, token: &str) -> Result<&Listing, LaunchpadError> {
        let listing = self.listed_tokens(token)?;
        if !listing.active {
            return Err(LaunchpadError::InactiveListing(token.to_string()));
        }
        Ok(listing)
    }

    fn price_trade(&self, quantity: u128, price: u128) -> Result<u128, LaunchpadError> {
        let cost =
            quote(quantity, price).ok_or(LaunchpadError::ArithmeticOverflow { quantity, price })?;
        if cost == 0 && self.config.reject_dust_trades {
            return Err(LaunchpadError::DustTrade { quantity });
        }
        Ok(cost)
    }

    fn ensure_owner(&self, caller: &str) -> Result<(), LaunchpadError> {
        if caller != self.owner {
            log::warn!("Rejected admin call from non-owner {}", caller);
            return Err(LaunchpadError::Unauthorized(caller.to_string()));
        }
        Ok(())
    }

    /// Outside callers may never act as the launchpad account
    fn ensure_external(&self, account: &str) -> Result<(), LaunchpadError> {
        if account.trim().is_empty() {
            return Err(LaunchpadError::InvalidAccount(
                "account must not be empty".to_string(),
            ));
        }
        if account == self.address {
            return Err(LaunchpadError::ReservedAccount(account.to_string()));
        }
        Ok(())
    }
}
