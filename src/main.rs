use std::path::PathBuf;

use clap::{Parser, Subcommand};
use scholarship_reports::config::FundConfig;
use scholarship_reports::pipeline::{self, DonorReportRequest, GrantReportRequest};
use scholarship_reports::{FundError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose)?;
    let config = FundConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Donors(args) => {
            pipeline::donor_report(&args.into(), &config)?;
        }
        Command::Grants(args) => {
            pipeline::grant_report(&args.into(), &config)?;
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| FundError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Donor and scholarship grant reports from accounting exports."
)]
struct Cli {
    /// TOML file overriding the built-in fiscal years, thresholds and award groups.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every skipped row.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Donor counts, major donors, retention and the mailing list.
    Donors(DonorArgs),
    /// Grant ledger balances, totals and award-group counts.
    Grants(GrantArgs),
}

#[derive(clap::Args)]
struct DonorArgs {
    /// Payment export listing donations.
    #[arg(long)]
    payments: PathBuf,

    /// Worksheet of the payment export; the first sheet when omitted.
    #[arg(long)]
    payments_sheet: Option<String>,

    /// Address list used for the mailing list.
    #[arg(long)]
    addresses: Option<PathBuf>,

    /// Worksheet of the address list.
    #[arg(long)]
    addresses_sheet: Option<String>,

    /// Fiscal year of the mailing and lapsed-donor lists, e.g. FY2025.
    #[arg(long)]
    fiscal_year: Option<String>,

    /// Output file path (.xlsx or .json).
    #[arg(long)]
    output: PathBuf,
}

#[derive(clap::Args)]
struct GrantArgs {
    /// Bill export with grants and transfers.
    #[arg(long)]
    bills: PathBuf,

    /// Worksheet of the bill export.
    #[arg(long)]
    bills_sheet: Option<String>,

    /// Payment export with grant payments, write-offs and refunds.
    #[arg(long)]
    payments: Option<PathBuf>,

    /// Worksheet of the payment export.
    #[arg(long)]
    payments_sheet: Option<String>,

    /// Fail when a grant bill falls outside every award group.
    #[arg(long)]
    strict_awards: bool,

    /// Output file path (.xlsx or .json).
    #[arg(long)]
    output: PathBuf,
}

impl From<DonorArgs> for DonorReportRequest {
    fn from(args: DonorArgs) -> Self {
        Self {
            payments: args.payments,
            payments_sheet: args.payments_sheet,
            addresses: args.addresses,
            addresses_sheet: args.addresses_sheet,
            fiscal_year: args.fiscal_year,
            output: args.output,
        }
    }
}

impl From<GrantArgs> for GrantReportRequest {
    fn from(args: GrantArgs) -> Self {
        Self {
            bills: args.bills,
            bills_sheet: args.bills_sheet,
            payments: args.payments,
            payments_sheet: args.payments_sheet,
            strict_awards: args.strict_awards,
            output: args.output,
        }
    }
}
