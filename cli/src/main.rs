mod headless;
mod logging;
mod tui;

use clap::{Parser, Subcommand};
use microlend::AppConfig;

#[derive(Parser)]
#[command(name = "microlend")]
#[command(about = "Wallet client for the MicroLending contract")]
struct Cli {
    /// Wallet JSON-RPC endpoint (overrides wallet.rpc_url)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Deployed contract address (overrides contract.address)
    #[arg(long, global = true)]
    contract: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the Terminal User Interface
    Tui,
    /// Connect, resolve the account's role and print it
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Request a loan from a lending pool (Borrower)
    RequestLoan {
        #[arg(long)]
        pool_id: String,
        /// Amount in ETH, e.g. 0.5
        #[arg(long)]
        amount: String,
        /// Duration in days
        #[arg(long)]
        duration: String,
    },
    /// Create a lending pool (Lender)
    CreatePool {
        /// Maximum loan amount in ETH
        #[arg(long)]
        max_amount: String,
        #[arg(long)]
        interest_rate: String,
        #[arg(long)]
        min_credit_score: String,
    },
    /// Override a user's credit score (Admin)
    UpdateScore {
        #[arg(long)]
        address: String,
        #[arg(long)]
        score: String,
    },
}

impl Cli {
    fn config(&self) -> anyhow::Result<AppConfig> {
        let mut config = AppConfig::load()?;
        if let Some(url) = &self.rpc_url {
            config.wallet.rpc_url = Some(url.clone());
        }
        if let Some(address) = &self.contract {
            config.contract.address = Some(address.clone());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config()?;

    match cli.command {
        Commands::Tui => {
            let log_path = logging::init_file()?;
            tracing::info!(path = %log_path.display(), "Starting MicroLend TUI v{}", env!("CARGO_PKG_VERSION"));
            tui::run_tui(config).await
        }
        command => {
            logging::init_stderr();
            headless::run(command, config).await
        }
    }
}
