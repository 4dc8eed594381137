//! Nexus wallet CLI
//!
//! Interactive shell over a single wallet session.

use clap::{Parser, Subcommand};
use nexus_wallet::prompt::{AutoConfirm, ConfirmationProvider, Console};
use nexus_wallet::wallet::SecureWallet;
use nexus_wallet::{
    AlloyChainProvider, ChainProvider, Config, DemoSimulator, Error, Result, RpcConfig,
    SendError, Session, SessionManager, SessionMode, TransactionSubmitter, TransferEvent,
    TxOutcome, WALLET_PRIVATE_KEY_ENV,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "nexus")]
#[command(about = "Wallet session client with a simulated demo mode")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Chain used for Live sessions (overrides the config file)
    #[arg(long, global = true)]
    chain_id: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive wallet shell (default)
    Shell {
        /// Enter demo mode without asking when no wallet is configured
        #[arg(long)]
        demo: bool,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so they don't interleave with prompts
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = match cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(chain_id) = cli.chain_id {
        config.chain_id = chain_id;
    }

    match cli.command.unwrap_or(Commands::Shell { demo: false }) {
        Commands::Shell { demo } => run_shell(config, demo).await?,
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Build the Live wallet provider, or `None` when no signing key is set
fn load_provider(config: &Config) -> Result<Option<Arc<dyn ChainProvider>>> {
    let Some(wallet) = SecureWallet::from_env(WALLET_PRIVATE_KEY_ENV)? else {
        tracing::info!(
            "No {} set - no wallet provider available",
            WALLET_PRIVATE_KEY_ENV
        );
        return Ok(None);
    };

    let rpc_config = RpcConfig::from_env();
    let provider = AlloyChainProvider::from_rpc_config(&rpc_config, config.chain_id, &wallet)
        .map_err(|e| Error::Config(e.to_string()))?;

    tracing::info!(
        address = %wallet.address(),
        chain_id = config.chain_id,
        "Loaded wallet provider"
    );
    Ok(Some(Arc::new(provider)))
}

async fn run_shell(config: Config, auto_demo: bool) -> Result<()> {
    let console = Arc::new(Console::new());
    let confirmation: Arc<dyn ConfirmationProvider> = if auto_demo {
        Arc::new(AutoConfirm(true))
    } else {
        console.clone()
    };

    let manager = Arc::new(SessionManager::new(
        load_provider(&config)?,
        confirmation,
        DemoSimulator::new(config.demo.clone()),
    ));
    let submitter = TransactionSubmitter::new(manager.clone(), console.clone());

    // Pending hashes are shown before the confirmation arrives
    let mut events = submitter.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(TransferEvent::Submitted { tx_hash, .. }) => {
                    println!("Transaction sent! Hash: {}", tx_hash);
                    println!("Waiting for confirmation...");
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    });

    print_help();
    while let Some(line) = console.read_line("nexus> ").await {
        let mut parts = line.split_whitespace();
        match parts.next() {
            None => {}
            Some("connect") => match manager.connect().await {
                Ok(session) => print_session(&session, &config),
                Err(e) => println!("Connection failed: {}", e),
            },
            Some("refresh") => match manager.refresh_balance().await {
                Ok(session) => print_session(&session, &config),
                Err(e) => println!("Refresh failed: {}", e),
            },
            Some("send") => {
                let result = match (parts.next(), parts.next()) {
                    (Some(to), Some(amount)) => submitter.send(to, amount).await,
                    _ => submitter.send_interactive().await,
                };
                match result {
                    Ok(outcome) => print_outcome(&outcome),
                    Err(SendError::Cancelled) => println!("Transfer cancelled"),
                    Err(e) => println!("Transaction failed: {}", e),
                }
            }
            Some("disconnect") => {
                manager.disconnect();
                println!("Disconnected");
            }
            Some("status") => print_session(&manager.session(), &config),
            Some("explorer") => match manager.session().explorer_url(&config.explorer_host) {
                Some(url) => println!("{}", url),
                None => println!("Not connected"),
            },
            Some("help") => print_help(),
            Some("quit") | Some("exit") => break,
            Some(other) => println!("Unknown command: {} (try 'help')", other),
        }
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  connect              connect the wallet (or enter demo mode)");
    println!("  refresh              re-read the balance");
    println!("  send [to amount]     send native currency");
    println!("  status               show the session");
    println!("  explorer             show the block-explorer link");
    println!("  disconnect           forget the session");
    println!("  quit");
}

fn print_session(session: &Session, config: &Config) {
    let (Some(account), Some(network)) = (session.account(), session.network()) else {
        println!("Not connected");
        return;
    };
    println!("Connected to {}", network);
    if let Some(balance) = session.display_balance() {
        println!("Balance: {} {}", balance, config.currency_symbol);
    }
    println!("Account: {}", account);
}

fn print_outcome(outcome: &TxOutcome) {
    match outcome.mode {
        SessionMode::Demo => {
            println!("Transaction Simulated!");
            println!("Hash: {}", outcome.tx_hash);
        }
        SessionMode::Live => {
            println!("Transaction Confirmed!");
            println!("Hash: {}", outcome.tx_hash);
            if let Some(block) = outcome.block_number {
                println!("Block: {}", block);
            }
        }
    }
}
