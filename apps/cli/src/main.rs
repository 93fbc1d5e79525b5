mod commands;
mod config;
mod main_lib;
mod storage;

use clap::{Parser, Subcommand};
use commands::DonateArgs;
use config::Config;
use main_lib::{build_context, init_tracing};

#[derive(Parser)]
#[command(name = "donasi")]
#[command(about = "Donate to the orphanage and track your payment")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in, confirm and send a donation
    Donate(DonateArgs),
    /// Show the payment status of the last donation
    Status {
        /// Check once instead of watching until the payment settles
        #[arg(long, default_value_t = false)]
        once: bool,
        /// Link the payment page sent the donor back to
        #[arg(long)]
        return_url: Option<String>,
    },
    /// Show one donation program
    Program { id: String },
    /// List donation programs
    Programs,
    /// Forget the tracked donation and the stored session
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();
    let cli = Cli::parse();
    let ctx = build_context(config)?;

    match cli.command {
        Commands::Donate(args) => commands::donate(&ctx, args).await,
        Commands::Status { once, return_url } => {
            commands::status(&ctx, once, return_url.as_deref()).await
        }
        Commands::Program { id } => commands::program(&ctx, &id).await,
        Commands::Programs => commands::programs(&ctx).await,
        Commands::Reset => commands::reset(&ctx),
    }
}
