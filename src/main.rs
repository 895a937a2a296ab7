//! Token Ledger CLI Application
//!
//! A command-line interface for creating and operating a token ledger.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use token_ledger::api::{create_router, endpoint_summary, ApiState};
use token_ledger::cli::{self, AppState};
use token_ledger::storage::{Storage, StorageConfig};
use token_ledger::token::{LogSink, SharedLedger};

#[derive(Parser)]
#[command(name = "ledger")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "A fungible token ledger with allowances", long_about = None)]
struct Cli {
    /// Data directory for ledger storage
    #[arg(short, long, default_value = ".ledger_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new ledger
    Init {
        /// Token name
        #[arg(short, long)]
        name: String,

        /// Token symbol
        #[arg(short, long)]
        symbol: String,

        /// Decimal places
        #[arg(long, default_value = "18")]
        decimals: u8,

        /// Initial supply in display units
        #[arg(long)]
        supply: String,

        /// Account credited with the supply (a new wallet is created if omitted)
        #[arg(short, long)]
        creator: Option<String>,
    },

    /// Account (wallet) operations
    Account {
        #[command(subcommand)]
        action: AccountCommands,
    },

    /// Display ledger information
    Info,

    /// Show the balance of an account
    Balance {
        #[arg(short, long)]
        address: String,
    },

    /// Show the remaining allowance of a spender
    Allowance {
        #[arg(short, long)]
        owner: String,

        #[arg(short, long)]
        spender: String,
    },

    /// Transfer tokens from a local account
    Transfer {
        #[arg(short, long)]
        from: String,

        #[arg(short, long)]
        to: String,

        /// Amount in display units
        #[arg(short, long)]
        amount: String,
    },

    /// Allow a spender to move tokens from a local account
    Approve {
        #[arg(short, long)]
        owner: String,

        #[arg(short, long)]
        spender: String,

        /// Amount in display units (0 revokes)
        #[arg(short, long)]
        amount: String,
    },

    /// Move tokens on behalf of an owner using an allowance
    TransferFrom {
        /// Local account holding the allowance
        #[arg(short, long)]
        spender: String,

        #[arg(short, long)]
        from: String,

        #[arg(short, long)]
        to: String,

        /// Amount in display units
        #[arg(short, long)]
        amount: String,
    },

    /// Show recent notifications
    Events {
        /// Number of notifications to show
        #[arg(short, long, default_value = "20")]
        count: usize,

        /// Only notifications involving this account
        #[arg(long)]
        account: Option<String>,
    },

    /// Export ledger to file
    Export {
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import ledger from file
    Import {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List ledger backups
    Backups,

    /// Restore the ledger from a backup
    Restore {
        /// Backup index (0 is the most recent)
        #[arg(short, long, default_value = "0")]
        backup: usize,
    },

    /// REST API server
    Api {
        #[command(subcommand)]
        action: ApiCommands,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Create a new account
    New {
        /// Optional label for the account
        #[arg(short, long)]
        label: Option<String>,
    },

    /// List all local accounts
    List,
}

#[derive(Subcommand)]
enum ApiCommands {
    /// Start the REST API server
    Start {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Commands that do not need a loaded ledger
    match &cli.command {
        Commands::Init {
            name,
            symbol,
            decimals,
            supply,
            creator,
        } => {
            return cli::cmd_init(
                &cli.data_dir,
                name,
                symbol,
                *decimals,
                supply,
                creator.as_deref(),
            );
        }
        Commands::Account { action } => {
            return match action {
                AccountCommands::New { label } => {
                    cli::cmd_account_new(&cli.data_dir, label.as_deref())
                }
                AccountCommands::List => cli::cmd_account_list(&cli.data_dir),
            };
        }
        Commands::Api { action } => return run_api_command(action, &cli.data_dir),
        _ => {}
    }

    let mut state = AppState::new(&cli.data_dir)?;

    match cli.command {
        Commands::Init { .. } | Commands::Account { .. } | Commands::Api { .. } => {
            unreachable!()
        }

        Commands::Info => cli::cmd_info(&state)?,

        Commands::Balance { address } => cli::cmd_balance(&state, &address)?,

        Commands::Allowance { owner, spender } => cli::cmd_allowance(&state, &owner, &spender)?,

        Commands::Transfer { from, to, amount } => {
            cli::cmd_transfer(&mut state, &from, &to, &amount)?
        }

        Commands::Approve {
            owner,
            spender,
            amount,
        } => cli::cmd_approve(&mut state, &owner, &spender, &amount)?,

        Commands::TransferFrom {
            spender,
            from,
            to,
            amount,
        } => cli::cmd_transfer_from(&mut state, &spender, &from, &to, &amount)?,

        Commands::Events { count, account } => {
            cli::cmd_events(&state, count, account.as_deref())?
        }

        Commands::Export { output } => cli::cmd_export(&state, &output)?,

        Commands::Import { input } => cli::cmd_import(&mut state, &input)?,

        Commands::Backups => cli::cmd_backups(&state)?,

        Commands::Restore { backup } => cli::cmd_restore(&mut state, backup)?,
    }

    Ok(())
}

fn run_api_command(action: &ApiCommands, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        match action {
            ApiCommands::Start { port } => {
                let storage_config = StorageConfig {
                    data_dir: data_dir.to_path_buf(),
                    ..Default::default()
                };
                let storage = Arc::new(Storage::new(storage_config)?);

                if !storage.exists() {
                    return Err(format!(
                        "No ledger found in {:?}. Create one with: ledger init",
                        data_dir
                    )
                    .into());
                }

                println!("📂 Loading ledger...");
                let ledger = SharedLedger::new(storage.load()?);
                ledger.subscribe(Arc::new(LogSink));

                let state = ApiState::new(ledger, storage);
                let shutdown_state = state.clone();
                let app = create_router(state);

                let addr = format!("0.0.0.0:{}", port);
                println!("🚀 REST API server starting on http://localhost:{}", port);
                println!();
                println!("📖 Available endpoints:");
                for (method, path, description) in endpoint_summary() {
                    println!("   {:<5}{:<36}- {}", method, path, description);
                }
                println!();

                // Handle Ctrl+C with graceful shutdown
                tokio::spawn(async move {
                    tokio::signal::ctrl_c().await.ok();
                    println!("\n📴 Shutting down API server...");

                    let _guard = shutdown_state
                        .save_lock
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                    let snapshot = shutdown_state.ledger.snapshot();
                    match shutdown_state.storage.save(&snapshot) {
                        Ok(()) => println!("✅ Ledger saved"),
                        Err(e) => log::error!("Failed to save ledger on shutdown: {}", e),
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
