//! fundscan CLI — filter monthly fund disclosure files by identifier.
//!
//! Commands:
//! - `filter` — extract a flat observation file for the requested funds
//! - `matrix` — pivot observations into date×fund quota and daily-change tables
//! - `cache build` — record each fund's first month of appearance
//! - `cache show` — print a saved presence cache
//! - `params` — print the effective settings for a run without scanning

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use fundscan_core::config::{FilterConfig, Operation, DEFAULT_OUTPUT_NAME};
use fundscan_core::domain::YearMonth;
use fundscan_core::runner::{execute, RunReport};
use fundscan_core::scan::StdoutProgress;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fundscan",
    about = "fundscan — batch filter for monthly fund disclosure files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a flat observation file for the requested funds.
    Filter {
        #[command(flatten)]
        run: RunArgs,

        /// Scan and report without writing the output file.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Pivot observations into quota-level and daily-change tables.
    Matrix {
        #[command(flatten)]
        run: RunArgs,

        /// Scan and report without writing the output files.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Presence cache commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Print the effective settings for a run without scanning anything.
    Params {
        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Scan the period and record each fund's first month of appearance.
    Build {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Print a saved presence cache.
    Show {
        /// Directory holding the input files and the cache side file.
        #[arg(long, default_value = ".")]
        input_dir: PathBuf,

        /// Cache file name, without extension.
        #[arg(long)]
        cache: String,
    },
}

/// Arguments shared by every scanning command.
#[derive(Args)]
struct RunArgs {
    /// First month of the period, inclusive (YYYY-MM).
    #[arg(long)]
    start: YearMonth,

    /// Last month of the period, inclusive (YYYY-MM).
    #[arg(long)]
    end: YearMonth,

    /// Directory holding the monthly input files.
    #[arg(long, default_value = ".")]
    input_dir: PathBuf,

    /// Directory for output files. Defaults to the input directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Base name for output files, without extension.
    #[arg(long, default_value = DEFAULT_OUTPUT_NAME)]
    output_name: String,

    /// Presence cache file name, without extension. For `filter` and
    /// `matrix` this enables the cache-assisted pre-filter; required for
    /// `cache build`.
    #[arg(long)]
    cache: Option<String>,

    /// File with one fund identifier per line. Reads stdin when omitted.
    #[arg(long)]
    ids: Option<PathBuf>,
}

impl RunArgs {
    fn into_config(self, write_output: bool) -> (FilterConfig, Option<PathBuf>) {
        let output_dir = self.output_dir.unwrap_or_else(|| self.input_dir.clone());
        let config = FilterConfig {
            start: self.start,
            end: self.end,
            input_dir: self.input_dir,
            output_dir,
            output_name: self.output_name,
            cache_name: self.cache,
            write_output,
        };
        (config, self.ids)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Filter { run, dry_run } => {
            run_operation(Operation::FlatFilter, run, !dry_run)
        }
        Commands::Matrix { run, dry_run } => {
            run_operation(Operation::MatrixFilter, run, !dry_run)
        }
        Commands::Cache { action } => match action {
            CacheAction::Build { run } => run_operation(Operation::CacheBuild, run, true),
            CacheAction::Show { input_dir, cache } => run_cache_show(input_dir, cache),
        },
        Commands::Params { run } => run_params(run),
    }
}

fn run_operation(op: Operation, run: RunArgs, write_output: bool) -> Result<()> {
    let (config, ids_path) = run.into_config(write_output);
    let requested = read_identifiers(ids_path.as_deref())?;

    let report = execute(op, &config, &requested, &StdoutProgress)?;
    print_report(&report);
    Ok(())
}

fn run_cache_show(input_dir: PathBuf, cache: String) -> Result<()> {
    // Period and identifiers are irrelevant for display; any valid range does.
    let config = FilterConfig {
        start: YearMonth::new(2005, 1).context("bad built-in period")?,
        end: YearMonth::new(2005, 1).context("bad built-in period")?,
        input_dir,
        output_dir: PathBuf::from("."),
        output_name: DEFAULT_OUTPUT_NAME.into(),
        cache_name: Some(cache),
        write_output: false,
    };

    let report = execute(Operation::CacheShow, &config, &BTreeSet::new(), &StdoutProgress)?;
    print_report(&report);
    Ok(())
}

fn run_params(run: RunArgs) -> Result<()> {
    let (config, ids_path) = run.into_config(true);
    let requested = read_identifiers(ids_path.as_deref())?;

    println!("Period:        {} to {}", config.start, config.end);
    println!("Input dir:     {}", config.input_dir.display());
    println!("Output dir:    {}", config.output_dir.display());
    println!("Output name:   {}", config.output_name);
    match config.cache_path() {
        Some(path) => println!("Cache file:    {}", path.display()),
        None => println!("Cache file:    (none)"),
    }
    println!("Identifiers:   {}", requested.len());
    for cnpj in &requested {
        println!("  {cnpj}");
    }
    Ok(())
}

/// Read fund identifiers, one per line, from a file or stdin.
///
/// Blank lines and surrounding whitespace are dropped; duplicates collapse
/// into the set. An empty result is an error up front, not an empty run.
fn read_identifiers(path: Option<&std::path::Path>) -> Result<BTreeSet<String>> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading identifiers from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading identifiers from stdin")?;
            buf
        }
    };

    let ids: BTreeSet<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    if ids.is_empty() {
        bail!("no fund identifiers given (one per line, via --ids or stdin)");
    }
    Ok(ids)
}

fn print_report(report: &RunReport) {
    match report {
        RunReport::Flat {
            observations,
            summary,
            output,
        } => {
            println!();
            println!("=== Filter Result ===");
            println!("Observations:   {observations}");
            println!("Files:          {} processed, {} skipped", summary.files_processed, summary.files_skipped);
            match output {
                Some(path) => println!("Output:         {}", path.display()),
                None => println!("Output:         (dry run, not written)"),
            }
        }
        RunReport::Matrix {
            dates_with_data,
            identifiers,
            summary,
            outputs,
        } => {
            println!();
            println!("=== Matrix Result ===");
            println!("Identifiers:    {identifiers}");
            println!("Dates w/ data:  {dates_with_data}");
            println!("Files:          {} processed, {} skipped", summary.files_processed, summary.files_skipped);
            match outputs {
                Some((cotas, vardia)) => {
                    println!("Quota table:    {}", cotas.display());
                    println!("Change table:   {}", vardia.display());
                }
                None => println!("Outputs:        (dry run, not written)"),
            }
        }
        RunReport::CacheBuilt {
            identifiers, path, ..
        } => {
            println!();
            println!("=== Cache Built ===");
            println!("Identifiers:    {identifiers}");
            println!("Cache file:     {}", path.display());
        }
        RunReport::CacheRecords(records) => {
            println!("{:<20} {}", "Identifier", "First seen");
            for rec in records {
                println!("{:<20} {}", rec.cnpj, rec.first_seen());
            }
            println!("{} record(s)", records.len());
        }
    }
}
