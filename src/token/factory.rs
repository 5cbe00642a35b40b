//! Token factory
//!
//! Builds new fixed-supply token ledgers and hands out a fresh address for
//! every deployment, even when name and symbol repeat.

use crate::crypto::derive_address;
use crate::token::token::{Token, TokenError, TokenMetadata, DEFAULT_HISTORY_LIMIT};
use serde::{Deserialize, Serialize};

/// Deploys token ledgers on behalf of a single deployer account
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenFactory {
    /// Account that deploys (and initially holds) every token
    deployer: String,
    /// Deployment counter for address generation
    nonce: u64,
    /// History limit applied to new ledgers
    history_limit: usize,
}

impl TokenFactory {
    /// Create a factory deploying on behalf of `deployer`
    pub fn new(deployer: &str) -> Self {
        Self {
            deployer: deployer.to_string(),
            nonce: 0,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Set the transfer history limit for tokens deployed from now on
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Deploying account
    pub fn deployer(&self) -> &str {
        &self.deployer
    }

    /// Number of tokens deployed so far
    pub fn deployed(&self) -> u64 {
        self.nonce
    }

    /// Address the next deployment will receive
    pub fn next_address(&self, symbol: &str) -> String {
        derive_address(&[&self.deployer, symbol, &self.nonce.to_string()])
    }

    /// Deploy a new token with the entire supply minted to the deployer.
    ///
    /// The nonce only advances when the metadata is valid, so a rejected
    /// deployment leaves the factory untouched.
    pub fn deploy(
        &mut self,
        name: String,
        symbol: String,
        decimals: u8,
        total_supply: u128,
    ) -> Result<Token, TokenError> {
        let metadata = TokenMetadata::new(name, symbol, decimals, total_supply)?;

        let address = self.next_address(&metadata.symbol);
        self.nonce += 1;

        let token = Token::new(address, metadata, &self.deployer)
            .with_history_limit(self.history_limit);

        log::debug!(
            "Deployed token {} ({}) at {} for {}",
            token.name(),
            token.symbol(),
            token.address,
            self.deployer
        );

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_creation() {
        let factory = TokenFactory::new("0xlaunchpad");
        assert_eq!(factory.deployer(), "0xlaunchpad");
        assert_eq!(factory.deployed(), 0);
    }

    #[test]
    fn test_deploy_mints_to_deployer() {
        let mut factory = TokenFactory::new("0xlaunchpad");

        let token = factory
            .deploy("Test Token".to_string(), "TST".to_string(), 18, 1_000_000)
            .unwrap();

        assert!(token.address.starts_with("0x"));
        assert_eq!(token.balance_of("0xlaunchpad"), 1_000_000);
        assert_eq!(token.holder_count(), 1);
        assert_eq!(factory.deployed(), 1);
    }

    #[test]
    fn test_repeated_metadata_gets_distinct_addresses() {
        let mut factory = TokenFactory::new("0xlaunchpad");

        let first = factory
            .deploy("Same".to_string(), "SAME".to_string(), 18, 10)
            .unwrap();
        let second = factory
            .deploy("Same".to_string(), "SAME".to_string(), 18, 10)
            .unwrap();

        assert_ne!(first.address, second.address);
    }

    #[test]
    fn test_next_address_matches_deployment() {
        let mut factory = TokenFactory::new("0xlaunchpad");
        let predicted = factory.next_address("TST");

        let token = factory
            .deploy("Test".to_string(), "TST".to_string(), 18, 10)
            .unwrap();

        assert_eq!(token.address, predicted);
    }

    #[test]
    fn test_rejected_deploy_keeps_nonce() {
        let mut factory = TokenFactory::new("0xlaunchpad");

        let result = factory.deploy("".to_string(), "TST".to_string(), 18, 10);
        assert!(matches!(result, Err(TokenError::InvalidName)));
        assert_eq!(factory.deployed(), 0);
    }
}
