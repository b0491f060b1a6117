use crate::commands::{run_compare, run_plans, CompareArgs, PlansArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fehb_compare::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "FEHB Plan Compare",
    about = "Estimate and rank annual FEHB plan costs from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank every eligible plan for a household and print the report as JSON
    Compare(CompareArgs),
    /// List the plans serviceable at a ZIP code without estimating costs
    Plans(PlansArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Compare(args) => run_compare(args),
        Command::Plans(args) => run_plans(args),
    }
}
