// salesgrid - purchase patterns of 18-35 year old customers, computed twice
// (SQL aggregate and in-memory joins) and reconciled

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use salesgrid_cli::exit_codes::{exit_code, EXIT_MISMATCH, EXIT_SUCCESS};
use salesgrid_cli::{report, SalesAnalytics};
use salesgrid_config::{Overrides, Settings};
use salesgrid_engine::SalesError;
use salesgrid_io::csv::read_purchases;
use salesgrid_recon::reconcile;

#[derive(Parser)]
#[command(name = "salesgrid")]
#[command(about = "Customer purchase patterns from a SQLite sales database, computed two ways and reconciled")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Run both computation paths, export CSVs, reconcile (default)
    #[command(after_help = "\
Exit code 0 means both paths agree, 1 means they differ.

Examples:
  salesgrid
  salesgrid run --db data/sales.db --output-dir output
  salesgrid run --min-age 21 --max-age 30 --preview
  salesgrid run --json | jq .recon.summary")]
    Run(RunArgs),

    /// Reconcile two previously exported CSV files
    #[command(after_help = "\
Examples:
  salesgrid compare output/sql_sales_analysis.csv output/frame_sales_analysis.csv
  salesgrid compare yesterday.csv today.csv --json")]
    Compare {
        /// Left file (Customer;Age;Item;Quantity)
        left: PathBuf,

        /// Right file (Customer;Age;Item;Quantity)
        right: PathBuf,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Log progress to stderr
        #[arg(long, short = 'v')]
        verbose: bool,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// SQLite database with Customer, Sales, Orders and Items tables
    #[arg(long, env = "SALESGRID_DB")]
    db: Option<PathBuf>,

    /// Directory for the two CSV files (created if missing)
    #[arg(long, env = "SALESGRID_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Base output file name; files are written as sql_<NAME> and frame_<NAME>
    #[arg(long, value_name = "NAME")]
    output_name: Option<String>,

    /// Lowest age included (default 18)
    #[arg(long)]
    min_age: Option<i64>,

    /// Highest age included (default 35)
    #[arg(long)]
    max_age: Option<i64>,

    /// Config file (default: <config dir>/salesgrid/config.toml when present)
    #[arg(long, env = "SALESGRID_CONFIG")]
    config: Option<PathBuf>,

    /// Output JSON report to stdout instead of human summary
    #[arg(long)]
    json: bool,

    /// Print the saved rows as a table
    #[arg(long)]
    preview: bool,

    /// Print nothing on success
    #[arg(long, short = 'q')]
    quiet: bool,

    /// Log progress to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl RunArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            database: self.db.clone(),
            output_dir: self.output_dir.clone(),
            output_name: self.output_name.clone(),
            min_age: self.min_age,
            max_age: self.max_age,
        }
    }
}

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    /// Exit with a code but no message (the report already explained it).
    fn silent(code: u8) -> Self {
        Self { code, message: String::new(), hint: None }
    }
}

impl From<SalesError> for CliError {
    fn from(err: SalesError) -> Self {
        let code = exit_code(&err);
        let hint = match &err {
            SalesError::Connection(_) => Some("pass --db <PATH> or set SALESGRID_DB".to_string()),
            SalesError::MissingTable { .. } | SalesError::MissingColumn { .. } => Some(
                "expected Customer(customer_id, age), Sales(sales_id, customer_id), \
                 Orders(order_id, sales_id, item_id, quantity), Items(item_id, item_name)"
                    .to_string(),
            ),
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}

/// Initialize logging from SALESGRID_LOG, falling back to warn (info with -v).
fn init_logging(verbose: bool) {
    let fallback = if verbose { "info" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("SALESGRID_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run(cli.run));

    let result = match command {
        Commands::Run(args) => {
            init_logging(args.verbose);
            cmd_run(args)
        }
        Commands::Compare { left, right, json, verbose } => {
            init_logging(verbose);
            cmd_compare(left, right, json)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// run
// ============================================================================

fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let settings = Settings::discover(args.config.as_deref())?.apply(&args.overrides())?;

    let mut analytics = SalesAnalytics::from_settings(&settings);
    analytics.connect()?;
    let analysis = analytics.analyze(&settings.output.name, &settings.output.dir);
    let closed = analytics.close();
    let analysis = analysis?;
    closed?;

    if args.json {
        let json = serde_json::to_string_pretty(&analysis)
            .map_err(|e| CliError::from(SalesError::Io(e.to_string())))?;
        print_stdout(&json)?;
    } else if !args.quiet || !analysis.recon.matched {
        print_stdout(report::render_analysis(&analysis, args.preview).trim_end())?;
    }

    if analysis.recon.matched {
        Ok(())
    } else {
        Err(CliError::silent(EXIT_MISMATCH))
    }
}

// ============================================================================
// compare
// ============================================================================

fn cmd_compare(left: PathBuf, right: PathBuf, json: bool) -> Result<(), CliError> {
    let left_records = read_purchases(&left)?;
    let right_records = read_purchases(&right)?;

    let recon = reconcile(
        &left.display().to_string(),
        &left_records,
        &right.display().to_string(),
        &right_records,
    );

    if json {
        let out = serde_json::to_string_pretty(&recon)
            .map_err(|e| CliError::from(SalesError::Io(e.to_string())))?;
        print_stdout(&out)?;
    } else {
        print_stdout(report::render_recon(&recon).trim())?;
    }

    if recon.matched {
        Ok(())
    } else {
        Err(CliError::silent(EXIT_MISMATCH))
    }
}

fn print_stdout(text: &str) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", text).map_err(|e| CliError::from(SalesError::Io(e.to_string())))
}
