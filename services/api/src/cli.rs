use crate::render::{
    render_dashboard, render_leaderboard, render_loan_book, render_tiers, DashboardArgs,
    LoanBookArgs, RankArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lending_core::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Lending Progression Service",
    about = "Serve and inspect borrower repayment progress and loan tier eligibility",
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
    /// Render a borrower dashboard from a repayment schedule export
    Dashboard(DashboardArgs),
    /// Summarize every borrower in a microloans loan book export
    LoanBook(LoanBookArgs),
    /// Rank the scoring feed and print the leaderboard
    Rank(RankArgs),
    /// List the loan tier catalog
    Tiers,
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
        Command::Dashboard(args) => render_dashboard(args),
        Command::LoanBook(args) => render_loan_book(args),
        Command::Rank(args) => render_leaderboard(args),
        Command::Tiers => {
            render_tiers();
            Ok(())
        }
    }
}
