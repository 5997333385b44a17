mod registry;
mod settings;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use salesgen_eval::{EvalError, VerificationEngine, VerifyOptions};
use salesgen_generate::locales::LocaleKey;
use salesgen_generate::{
    DatasetStore, GenerateOptions, GenerationConfig, GenerationEngine, GenerationError,
    IdentityPolicy, TimestampMode,
};
use registry::init_logging;
use settings::{ConfigOverrides, parse_locale};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("verification error: {0}")]
    Eval(#[from] EvalError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("dataset has {0} violation(s)")]
    Violations(usize),
}

#[derive(Parser, Debug)]
#[command(name = "salesgen", version, about = "Synthetic sales dataset generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate products, customers and sales into a dataset directory.
    Generate(GenerateArgs),
    /// Check a dataset directory for broken references and totals.
    Verify(VerifyArgs),
    /// Print the JSON Schema of the generation config file.
    ConfigSchema,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// TOML config file; flags below override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Dataset directory.
    #[arg(long, default_value = "data")]
    out_dir: PathBuf,
    /// Number of sales.
    #[arg(long)]
    sales: Option<u64>,
    /// First day of the sales window (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    start_date: Option<NaiveDate>,
    /// Last day of the sales window (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    end_date: Option<NaiveDate>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum)]
    identity: Option<IdentityArg>,
    #[arg(long, value_enum)]
    timestamps: Option<TimestampArg>,
    /// Probability that a sale reuses a known customer.
    #[arg(long, value_name = "P")]
    reuse_probability: Option<f64>,
    /// Do not carry customers over from the previous dataset.
    #[arg(long, default_value_t = false)]
    no_continuity: bool,
    /// Keep exactly this percentage of previous customers.
    #[arg(long, value_name = "PERCENT", conflicts_with = "no_continuity")]
    continuity_percent: Option<u32>,
    /// Customer locale (repeatable): en_US, pt_BR, fr_FR, de_DE.
    #[arg(long = "locale", value_name = "LOCALE", value_parser = parse_locale)]
    locales: Vec<LocaleKey>,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Dataset directory to check.
    dir: PathBuf,
    /// Violations listed in the report.
    #[arg(long, default_value_t = 20)]
    max_examples: usize,
    /// Skip writing integrity_metrics.json and integrity_report.md.
    #[arg(long, default_value_t = false)]
    no_write: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum IdentityArg {
    RandomToken,
    DeterministicHash,
}

impl From<IdentityArg> for IdentityPolicy {
    fn from(value: IdentityArg) -> Self {
        match value {
            IdentityArg::RandomToken => IdentityPolicy::RandomToken,
            IdentityArg::DeterministicHash => IdentityPolicy::DeterministicHash,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TimestampArg {
    Independent,
    DistinctSorted,
}

impl From<TimestampArg> for TimestampMode {
    fn from(value: TimestampArg) -> Self {
        match value {
            TimestampArg::Independent => TimestampMode::Independent,
            TimestampArg::DistinctSorted => TimestampMode::DistinctSorted,
        }
    }
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Verify(args) => run_verify(args),
        Command::ConfigSchema => print_config_schema(),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        config,
        out_dir,
        sales,
        start_date,
        end_date,
        seed,
        identity,
        timestamps,
        reuse_probability,
        no_continuity,
        continuity_percent,
        locales,
    } = args;

    let overrides = ConfigOverrides {
        config_path: config,
        sales,
        start_date,
        end_date,
        seed,
        identity: identity.map(Into::into),
        timestamps: timestamps.map(Into::into),
        reuse_probability,
        no_continuity,
        continuity_percent,
        locales,
    };
    let config = overrides.resolve()?;

    let store = DatasetStore::new(out_dir.clone());
    store.ensure_dir()?;
    init_logging(Some(&store.log_path()))?;

    let result = GenerationEngine::new(GenerateOptions { out_dir }).run(&config)?;
    let report = &result.report;

    println!("dataset: {}", result.dataset_dir.display());
    println!(
        "sales: {}  products: {}  customers: {} ({} preserved, {} new)",
        report.sales_generated,
        report.products,
        report.customers.total,
        report.customers.preserved,
        report.customers.created
    );
    for path in &report.archived {
        println!("archived: {}", path.display());
    }
    println!("report: {}", store.report_path().display());

    Ok(())
}

fn run_verify(args: VerifyArgs) -> Result<(), CliError> {
    init_logging(None)?;

    let options = VerifyOptions {
        strict: false,
        max_examples: args.max_examples,
        write_outputs: !args.no_write,
        out_dir: None,
    };
    let result = VerificationEngine::new(options).run(&args.dir)?;
    println!("{}", result.report);

    tracing::info!(
        dir = %args.dir.display(),
        violations = result.violations.len(),
        "verification finished"
    );

    if result.is_clean() {
        Ok(())
    } else {
        Err(CliError::Violations(result.violations.len()))
    }
}

fn print_config_schema() -> Result<(), CliError> {
    let schema = schemars::schema_for!(GenerationConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
