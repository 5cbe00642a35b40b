//! CLI commands for the launchpad
//!
//! Implements all command handlers for the CLI interface.

use crate::launchpad::{format_units, Launchpad, LaunchpadConfig, DECIMALS};
use crate::storage::{Storage, StorageConfig};
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub launchpad: Launchpad,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load application state from an initialized data directory
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage = Storage::new(StorageConfig {
            data_dir: data_dir.clone(),
            ..Default::default()
        })?;

        if !storage.exists() {
            return Err(format!(
                "No launchpad found in {:?}. Run `launchpad init --owner <address>` first.",
                data_dir
            )
            .into());
        }

        let launchpad = storage.load()?;
        log::debug!("Loaded launchpad {} from {:?}", launchpad.address(), data_dir);

        Ok(Self {
            launchpad,
            storage,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.launchpad)?;
        Ok(())
    }
}

/// Render smallest units as a decimal amount
fn units(value: u128) -> String {
    format_units(value, DECIMALS)
}

/// Initialize a new launchpad
pub fn cmd_init(data_dir: &Path, owner: &str, reject_dust: bool) -> CliResult<()> {
    let storage = Storage::new(StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    })?;

    if storage.exists() {
        println!("⚠️  Launchpad already exists at {:?}", data_dir);
        return Ok(());
    }

    let config = LaunchpadConfig {
        reject_dust_trades: reject_dust,
        ..Default::default()
    };
    let launchpad = Launchpad::with_config(owner, config)?;
    storage.save(&launchpad)?;

    println!("✅ Launchpad initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   🏦 Address: {}", launchpad.address());
    println!("   👤 Owner: {}", launchpad.owner());

    Ok(())
}

/// Create and list a new token
pub fn cmd_create(
    state: &mut AppState,
    caller: &str,
    name: &str,
    symbol: &str,
    supply: u64,
    price: u128,
) -> CliResult<()> {
    let address = state
        .launchpad
        .create_token(caller, name, symbol, supply, price)?;
    state.save()?;

    println!("🪙 Token created!");
    println!("   ├─ Address: {}", address);
    println!("   ├─ Name: {} ({})", name, symbol);
    println!("   ├─ Supply: {} tokens", supply);
    println!("   └─ Price: {} per token", units(price));

    Ok(())
}

/// Buy tokens with an exact payment
pub fn cmd_buy(
    state: &mut AppState,
    caller: &str,
    token: &str,
    amount: u128,
    value: u128,
) -> CliResult<()> {
    let receipt = state.launchpad.buy_tokens(caller, token, amount, value)?;
    state.save()?;

    println!("🛒 Bought {} tokens for {}", units(receipt.quantity), units(receipt.amount));
    println!(
        "   New balance: {}",
        units(state.launchpad.balance_of(token, caller)?)
    );

    Ok(())
}

/// Sell tokens back to the launchpad
pub fn cmd_sell(state: &mut AppState, caller: &str, token: &str, amount: u128) -> CliResult<()> {
    let receipt = state.launchpad.sell_tokens(caller, token, amount)?;
    state.save()?;

    println!("💸 Sold {} tokens for {}", units(receipt.quantity), units(receipt.amount));
    println!(
        "   Native balance: {}",
        units(state.launchpad.native_balance(caller))
    );

    Ok(())
}

/// Approve a spender on a token
pub fn cmd_approve(
    state: &mut AppState,
    token: &str,
    owner: &str,
    spender: &str,
    amount: u128,
) -> CliResult<()> {
    state.launchpad.approve(token, owner, spender, amount)?;
    state.save()?;

    println!("✅ {} may now move {} of {}'s tokens", spender, units(amount), owner);
    Ok(())
}

/// Transfer tokens between holders
pub fn cmd_transfer(
    state: &mut AppState,
    token: &str,
    from: &str,
    to: &str,
    amount: u128,
) -> CliResult<()> {
    state.launchpad.transfer(token, from, to, amount)?;
    state.save()?;

    println!("📤 Transferred {} tokens from {} to {}", units(amount), from, to);
    Ok(())
}

/// Deposit native currency into the reserve
pub fn cmd_deposit(state: &mut AppState, from: &str, amount: u128) -> CliResult<()> {
    state.launchpad.deposit(from, amount)?;
    state.save()?;

    println!("🏦 Deposited {}", units(amount));
    println!("   Reserve: {}", units(state.launchpad.reserve()));
    Ok(())
}

/// Credit native currency from the development faucet
pub fn cmd_fund(state: &mut AppState, account: &str, amount: u128) -> CliResult<()> {
    let balance = state.launchpad.fund_account(account, amount)?;
    state.save()?;

    println!("🚰 Funded {} with {}", account, units(amount));
    println!("   Balance: {}", units(balance));
    Ok(())
}

/// Update a listing's price (owner only)
pub fn cmd_set_price(state: &mut AppState, caller: &str, token: &str, price: u128) -> CliResult<()> {
    state.launchpad.update_token_price(caller, token, price)?;
    state.save()?;

    println!("🏷️  Price of {} set to {}", token, units(price));
    Ok(())
}

/// Withdraw the reserve (owner only)
pub fn cmd_withdraw(state: &mut AppState, caller: &str) -> CliResult<()> {
    let amount = state.launchpad.withdraw_eth(caller)?;
    state.save()?;

    println!("💰 Withdrew {} to {}", units(amount), state.launchpad.owner());
    Ok(())
}

/// Transfer ownership (owner only)
pub fn cmd_transfer_ownership(state: &mut AppState, caller: &str, new_owner: &str) -> CliResult<()> {
    state.launchpad.transfer_ownership(caller, new_owner)?;
    state.save()?;

    println!("👤 Ownership transferred to {}", new_owner);
    Ok(())
}

/// Show a single listing
pub fn cmd_listing(state: &AppState, token: &str) -> CliResult<()> {
    let listing = state.launchpad.listed_tokens(token)?;

    println!("📋 Listing {}", listing.token);
    if let Some(ledger) = state.launchpad.token(token) {
        println!("   ├─ Name: {} ({})", ledger.name(), ledger.symbol());
        println!("   ├─ Total supply: {}", units(ledger.total_supply()));
        println!(
            "   ├─ Unsold: {}",
            units(ledger.balance_of(state.launchpad.address()))
        );
        println!("   ├─ Holders: {}", ledger.holder_count());
    }
    println!("   ├─ Creator: {}", listing.creator);
    println!("   ├─ Price: {} per token", units(listing.price));
    println!("   └─ Active: {}", listing.active);

    Ok(())
}

/// List all listings
pub fn cmd_list(state: &AppState) -> CliResult<()> {
    let listings = state.launchpad.listings();

    if listings.is_empty() {
        println!("📭 No tokens listed yet. Create one with: launchpad create");
        return Ok(());
    }

    println!("📋 Listings ({}):", listings.len());
    for listing in listings {
        let symbol = state
            .launchpad
            .token(&listing.token)
            .map(|t| t.symbol().to_string())
            .unwrap_or_default();
        println!(
            "   {} | {} | {} per token",
            listing.token,
            symbol,
            units(listing.price)
        );
    }

    Ok(())
}

/// Quote the cost of a trade
pub fn cmd_quote(state: &AppState, token: &str, amount: u128) -> CliResult<()> {
    let cost = state.launchpad.quote(token, amount)?;
    println!("🧮 {} tokens cost {}", units(amount), units(cost));
    Ok(())
}

/// Show a token balance
pub fn cmd_balance(state: &AppState, token: &str, holder: &str) -> CliResult<()> {
    let balance = state.launchpad.balance_of(token, holder)?;
    println!("💰 {} holds {} of {}", holder, units(balance), token);
    Ok(())
}

/// Show a native balance
pub fn cmd_native_balance(state: &AppState, account: &str) -> CliResult<()> {
    println!(
        "💰 {} holds {} native",
        account,
        units(state.launchpad.native_balance(account))
    );
    Ok(())
}

/// Show registry info
pub fn cmd_info(state: &AppState) -> CliResult<()> {
    let stats = state.launchpad.stats();

    println!("🚀 Launchpad Info");
    println!("   ├─ Address: {}", stats.address);
    println!("   ├─ Owner: {}", stats.owner);
    println!("   ├─ Reserve: {}", units(stats.reserve));
    println!("   ├─ Listings: {}", stats.listings);
    println!("   └─ Events: {}", stats.events);

    Ok(())
}

/// Show recent events
pub fn cmd_events(state: &AppState, count: usize) -> CliResult<()> {
    let records = state.launchpad.events().recent(count);

    if records.is_empty() {
        println!("📭 No events yet.");
        return Ok(());
    }

    println!("📜 Recent events:");
    for record in records {
        println!(
            "   #{} | {} | {} | {}",
            record.sequence,
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.event.name(),
            serde_json::to_string(&record.event)?
        );
    }

    Ok(())
}

/// Export launchpad state to file
pub fn cmd_export(state: &AppState, path: &Path) -> CliResult<()> {
    crate::storage::save_to_file(&state.launchpad, path)?;
    println!("📦 Launchpad exported to {:?}", path);
    Ok(())
}

/// Import launchpad state from file
pub fn cmd_import(state: &mut AppState, path: &Path) -> CliResult<()> {
    let launchpad = crate::storage::load_from_file(path)?;

    state.launchpad = launchpad;
    state.save()?;

    println!("📥 Launchpad imported from {:?}", path);
    println!("   Listings: {}", state.launchpad.count());
    Ok(())
}

/// List saved backups, newest first
pub fn cmd_backups(state: &AppState) -> CliResult<()> {
    let stats = state.storage.stats()?;

    println!("💾 Storage");
    println!("   ├─ Directory: {:?}", stats.data_dir);
    println!("   ├─ State file: {} bytes", stats.file_size);
    println!("   └─ Backups: {}", stats.backup_count);

    for index in state.storage.list_backups() {
        println!("      #{}", index);
    }

    Ok(())
}

/// Replace the current state with a backup
pub fn cmd_restore(state: &mut AppState, index: usize) -> CliResult<()> {
    state.launchpad = state.storage.restore_backup(index)?;
    state.save()?;

    println!("♻️  Restored backup #{}", index);
    println!("   Listings: {}", state.launchpad.count());
    println!("   Events: {}", state.launchpad.events().len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launchpad::ONE_TOKEN;

    #[test]
    fn test_init_then_load() {
        let temp_dir = tempfile::tempdir().unwrap();

        cmd_init(temp_dir.path(), "owner", false).unwrap();
        let state = AppState::new(temp_dir.path().to_path_buf()).unwrap();

        assert_eq!(state.launchpad.owner(), "owner");
        assert!(!state.launchpad.config().reject_dust_trades);
    }

    #[test]
    fn test_init_with_dust_rejection() {
        let temp_dir = tempfile::tempdir().unwrap();

        cmd_init(temp_dir.path(), "owner", true).unwrap();
        let state = AppState::new(temp_dir.path().to_path_buf()).unwrap();

        assert!(state.launchpad.config().reject_dust_trades);
    }

    #[test]
    fn test_load_without_init_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(AppState::new(temp_dir.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_commands_persist_state() {
        let temp_dir = tempfile::tempdir().unwrap();
        cmd_init(temp_dir.path(), "owner", false).unwrap();

        let mut state = AppState::new(temp_dir.path().to_path_buf()).unwrap();
        cmd_create(&mut state, "owner", "Test Token", "TST", 1_000, ONE_TOKEN / 1000).unwrap();
        let token = state.launchpad.listings()[0].token.clone();
        cmd_fund(&mut state, "alice", ONE_TOKEN).unwrap();
        cmd_buy(&mut state, "alice", &token, 100 * ONE_TOKEN, ONE_TOKEN / 10).unwrap();

        let reloaded = AppState::new(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(
            reloaded.launchpad.balance_of(&token, "alice").unwrap(),
            100 * ONE_TOKEN
        );
        assert_eq!(reloaded.launchpad.reserve(), ONE_TOKEN / 10);
    }

    #[test]
    fn test_failed_command_does_not_persist() {
        let temp_dir = tempfile::tempdir().unwrap();
        cmd_init(temp_dir.path(), "owner", false).unwrap();

        let mut state = AppState::new(temp_dir.path().to_path_buf()).unwrap();
        assert!(cmd_withdraw(&mut state, "mallory").is_err());
        assert!(cmd_set_price(&mut state, "owner", "0xmissing", 1).is_err());

        let reloaded = AppState::new(temp_dir.path().to_path_buf()).unwrap();
        assert!(reloaded.launchpad.events().is_empty());
    }

    #[test]
    fn test_restore_backup_rolls_back_last_command() {
        let temp_dir = tempfile::tempdir().unwrap();
        cmd_init(temp_dir.path(), "owner", false).unwrap();

        let mut state = AppState::new(temp_dir.path().to_path_buf()).unwrap();
        cmd_create(&mut state, "owner", "Test Token", "TST", 1_000, ONE_TOKEN / 1000).unwrap();
        cmd_fund(&mut state, "alice", ONE_TOKEN).unwrap();
        assert_eq!(state.storage.list_backups(), vec![0, 1]);
        cmd_backups(&state).unwrap();

        // Backup 0 holds the state saved before the faucet call
        cmd_restore(&mut state, 0).unwrap();
        assert_eq!(state.launchpad.native_balance("alice"), 0);
        assert_eq!(state.launchpad.count(), 1);

        let reloaded = AppState::new(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(reloaded.launchpad.native_balance("alice"), 0);
        assert_eq!(reloaded.launchpad.count(), 1);

        assert!(cmd_restore(&mut state, 4).is_err());
    }
}
