//! Token Launchpad CLI Application
//!
//! A command-line interface for creating, trading and administering
//! launchpad tokens.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use token_launchpad::api::{create_router, ApiState};
use token_launchpad::cli::{self, AppState};
use token_launchpad::launchpad::parse_ether;
use token_launchpad::storage::{Storage, StorageConfig};

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(version = "0.1.0")]
#[command(about = "A fixed-price token launchpad", long_about = None)]
struct Cli {
    /// Data directory for launchpad storage
    #[arg(short, long, default_value = ".launchpad_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Parse a decimal amount such as "0.001" into smallest units
fn parse_amount(input: &str) -> Result<u128, String> {
    parse_ether(input).map_err(|e| e.to_string())
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new launchpad
    Init {
        /// Owner account (admin)
        #[arg(short, long)]
        owner: String,

        /// Reject trades whose cost rounds down to zero
        #[arg(long)]
        reject_dust: bool,
    },

    /// Create and list a new token
    Create {
        /// Account requesting creation
        #[arg(short, long)]
        caller: String,

        /// Token name
        #[arg(short, long)]
        name: String,

        /// Token symbol
        #[arg(short, long)]
        symbol: String,

        /// Initial supply in whole tokens
        #[arg(long)]
        supply: u64,

        /// Price per whole token in native coins (e.g. 0.001)
        #[arg(short, long, value_parser = parse_amount)]
        price: u128,
    },

    /// Buy tokens from the launchpad
    Buy {
        #[arg(short, long)]
        caller: String,

        /// Token address
        #[arg(short, long)]
        token: String,

        /// Quantity in tokens (e.g. 100 or 0.5)
        #[arg(short, long, value_parser = parse_amount)]
        amount: u128,

        /// Native payment; defaults to the quoted cost
        #[arg(long, value_parser = parse_amount)]
        value: Option<u128>,
    },

    /// Sell tokens back to the launchpad (approve first)
    Sell {
        #[arg(short, long)]
        caller: String,

        /// Token address
        #[arg(short, long)]
        token: String,

        /// Quantity in tokens
        #[arg(short, long, value_parser = parse_amount)]
        amount: u128,
    },

    /// Approve a spender; defaults to the launchpad itself
    Approve {
        /// Token address
        #[arg(short, long)]
        token: String,

        #[arg(short, long)]
        owner: String,

        #[arg(short, long)]
        spender: Option<String>,

        #[arg(short, long, value_parser = parse_amount)]
        amount: u128,
    },

    /// Transfer tokens between holders
    Transfer {
        /// Token address
        #[arg(short, long)]
        token: String,

        #[arg(short, long)]
        from: String,

        #[arg(long)]
        to: String,

        #[arg(short, long, value_parser = parse_amount)]
        amount: u128,
    },

    /// Deposit native coins into the reserve
    Deposit {
        #[arg(short, long)]
        from: String,

        #[arg(short, long, value_parser = parse_amount)]
        amount: u128,
    },

    /// Credit native coins from the development faucet
    Fund {
        #[arg(long)]
        account: String,

        #[arg(short, long, value_parser = parse_amount)]
        amount: u128,
    },

    /// Update a listing's price (owner only)
    SetPrice {
        #[arg(short, long)]
        caller: String,

        /// Token address
        #[arg(short, long)]
        token: String,

        /// New price per whole token in native coins
        #[arg(short, long, value_parser = parse_amount)]
        price: u128,
    },

    /// Withdraw the whole reserve (owner only)
    Withdraw {
        #[arg(short, long)]
        caller: String,
    },

    /// Hand the owner role to another account (owner only)
    TransferOwnership {
        #[arg(short, long)]
        caller: String,

        #[arg(short, long)]
        new_owner: String,
    },

    /// Show a listing
    Listing {
        /// Token address
        #[arg(short, long)]
        token: String,
    },

    /// List all listings
    List,

    /// Quote the cost of a trade
    Quote {
        /// Token address
        #[arg(short, long)]
        token: String,

        /// Quantity in tokens
        #[arg(short, long, value_parser = parse_amount)]
        amount: u128,
    },

    /// Show a token balance
    Balance {
        /// Token address
        #[arg(short, long)]
        token: String,

        #[arg(long)]
        holder: String,
    },

    /// Show a native balance
    NativeBalance {
        #[arg(long)]
        account: String,
    },

    /// Display launchpad information
    Info,

    /// Show recent events
    Events {
        /// Number of events to show
        #[arg(short, long, default_value = "10")]
        count: usize,
    },

    /// Export launchpad state to file
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import launchpad state from file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show storage stats and saved backups
    Backups,

    /// Restore state from a backup (0 is the newest)
    Restore {
        #[arg(short, long)]
        index: usize,
    },

    /// REST API server
    Api {
        #[command(subcommand)]
        action: ApiCommands,
    },
}

#[derive(Subcommand)]
enum ApiCommands {
    /// Start the REST API server
    Start {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Bearer token required on owner routes
        #[arg(long)]
        admin_token: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Handle init command separately (doesn't need full state)
    if let Commands::Init { owner, reject_dust } = &cli.command {
        return cli::cmd_init(&cli.data_dir, owner, *reject_dust);
    }

    // Handle API commands with tokio runtime
    if let Commands::Api { ref action } = cli.command {
        return run_api_command(action, &cli.data_dir);
    }

    let mut state = AppState::new(cli.data_dir.clone())?;

    match cli.command {
        Commands::Init { .. } => unreachable!(),
        Commands::Api { .. } => unreachable!(),

        Commands::Create {
            caller,
            name,
            symbol,
            supply,
            price,
        } => {
            cli::cmd_create(&mut state, &caller, &name, &symbol, supply, price)?;
        }

        Commands::Buy {
            caller,
            token,
            amount,
            value,
        } => {
            let value = match value {
                Some(value) => value,
                None => state.launchpad.quote(&token, amount)?,
            };
            cli::cmd_buy(&mut state, &caller, &token, amount, value)?;
        }

        Commands::Sell {
            caller,
            token,
            amount,
        } => {
            cli::cmd_sell(&mut state, &caller, &token, amount)?;
        }

        Commands::Approve {
            token,
            owner,
            spender,
            amount,
        } => {
            let spender = spender.unwrap_or_else(|| state.launchpad.address().to_string());
            cli::cmd_approve(&mut state, &token, &owner, &spender, amount)?;
        }

        Commands::Transfer {
            token,
            from,
            to,
            amount,
        } => {
            cli::cmd_transfer(&mut state, &token, &from, &to, amount)?;
        }

        Commands::Deposit { from, amount } => {
            cli::cmd_deposit(&mut state, &from, amount)?;
        }

        Commands::Fund { account, amount } => {
            cli::cmd_fund(&mut state, &account, amount)?;
        }

        Commands::SetPrice {
            caller,
            token,
            price,
        } => {
            cli::cmd_set_price(&mut state, &caller, &token, price)?;
        }

        Commands::Withdraw { caller } => {
            cli::cmd_withdraw(&mut state, &caller)?;
        }

        Commands::TransferOwnership { caller, new_owner } => {
            cli::cmd_transfer_ownership(&mut state, &caller, &new_owner)?;
        }

        Commands::Listing { token } => {
            cli::cmd_listing(&state, &token)?;
        }

        Commands::List => {
            cli::cmd_list(&state)?;
        }

        Commands::Quote { token, amount } => {
            cli::cmd_quote(&state, &token, amount)?;
        }

        Commands::Balance { token, holder } => {
            cli::cmd_balance(&state, &token, &holder)?;
        }

        Commands::NativeBalance { account } => {
            cli::cmd_native_balance(&state, &account)?;
        }

        Commands::Info => {
            cli::cmd_info(&state)?;
        }

        Commands::Events { count } => {
            cli::cmd_events(&state, count)?;
        }

        Commands::Export { output } => {
            cli::cmd_export(&state, &output)?;
        }

        Commands::Import { input } => {
            cli::cmd_import(&mut state, &input)?;
        }

        Commands::Backups => {
            cli::cmd_backups(&state)?;
        }

        Commands::Restore { index } => {
            cli::cmd_restore(&mut state, index)?;
        }
    }

    Ok(())
}

fn run_api_command(action: &ApiCommands, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        match action {
            ApiCommands::Start { port, admin_token } => {
                let storage = Storage::new(StorageConfig {
                    data_dir: data_dir.to_path_buf(),
                    ..Default::default()
                })?;

                if !storage.exists() {
                    return Err(format!(
                        "No launchpad found in {:?}. Run `launchpad init --owner <address>` first.",
                        data_dir
                    )
                    .into());
                }

                println!("📂 Loading launchpad...");
                let launchpad = storage.load()?;
                println!("   🏦 Address: {}", launchpad.address());
                println!("   👤 Owner: {}", launchpad.owner());

                let state = match admin_token {
                    Some(token) => ApiState::new(launchpad, storage).with_admin_token(token),
                    None => {
                        log::warn!("No admin token set; owner routes trust the caller field");
                        ApiState::new(launchpad, storage)
                    }
                };
                let shutdown_state = state.clone();

                let app = create_router(state);

                let addr = format!("0.0.0.0:{}", port);
                println!("🚀 REST API server starting on http://localhost:{}", port);
                println!();
                println!("📡 Endpoints:");
                println!("   GET  /health                           - Health check");
                println!("   GET  /ws                               - Event stream (WebSocket)");
                println!("   GET  /api/launchpad                    - Registry info");
                println!("   GET  /api/events?since=N               - Event log");
                println!("   GET  /api/tokens                       - List tokens");
                println!("   POST /api/tokens                       - Create token");
                println!("   GET  /api/tokens/{{token}}               - Listing");
                println!("   GET  /api/tokens/{{token}}/quote         - Quote a trade");
                println!("   GET  /api/tokens/{{token}}/history       - Transfer history");
                println!("   POST /api/tokens/{{token}}/buy           - Buy");
                println!("   POST /api/tokens/{{token}}/sell          - Sell");
                println!("   POST /api/tokens/{{token}}/approve       - Approve spender");
                println!("   POST /api/tokens/{{token}}/transfer      - Transfer");
                println!("   POST /api/tokens/{{token}}/transferFrom  - Delegated transfer");
                println!("   GET  /api/tokens/{{token}}/balance/{{h}}   - Token balance");
                println!("   GET  /api/tokens/{{token}}/allowance     - Allowance");
                println!("   POST /api/tokens/{{token}}/price         - Update price (owner)");
                println!("   POST /api/withdraw                     - Withdraw reserve (owner)");
                println!("   POST /api/ownership                    - Transfer ownership (owner)");
                println!("   POST /api/deposit                      - Deposit to reserve");
                println!("   POST /api/faucet                       - Development faucet");
                println!("   GET  /api/native/{{account}}             - Native balance");
                println!();

                // Handle Ctrl+C with a final save
                tokio::spawn(async move {
                    tokio::signal::ctrl_c().await.ok();
                    println!("\n📴 Shutting down API server...");

                    println!("💾 Saving data...");
                    let launchpad = shutdown_state.launchpad.read().await;
                    match shutdown_state.storage.save(&launchpad) {
                        Ok(()) => println!("✅ Data saved successfully!"),
                        Err(e) => log::error!("Failed to save launchpad on shutdown: {}", e),
                    }
                    std::process::exit(0);
                });

                let listener = tokio::net::TcpListener::bind(&addr).await?;
                axum::serve(listener, app).await?;
            }
        }

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
