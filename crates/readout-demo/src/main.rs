//! Demo driver for `readout`.
//!
//! ```text
//! readout-demo bar --count 200 --delay-ms 20 --label "Copying "
//! readout-demo dots --every 5
//! readout-demo mill --config mill.yaml -v
//! ls -l | readout-demo table
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use readout::{
    colprint, print_table, Console, IndicatorConfig, IndicatorStyle, SizeFormat, Stream, TermSink,
};
use tracing::{debug, info};

/// Bytes per step when `--bytes` is set.
const CHUNK: u64 = 64 * 1024;

/// Exercise readout progress indicators and column printing
#[derive(Parser, Debug)]
#[command(name = "readout-demo", version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v shows targets, -vv shows debug events)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Draw on standard output instead of standard error
    #[arg(long, global = true)]
    stdout: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Redrawn bar with ETA
    Bar(RunArgs),
    /// Append-only dots
    Dots(RunArgs),
    /// Spinning mill
    Mill(RunArgs),
    /// Print whitespace-separated rows as aligned columns
    Table(TableArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Number of simulated work items
    #[arg(long, default_value_t = 50)]
    count: u64,

    /// Time spent on each item
    #[arg(long, default_value_t = 40)]
    delay_ms: u64,

    /// Render only every N items
    #[arg(long)]
    every: Option<u64>,

    /// Width of the bar segment
    #[arg(long)]
    width: Option<usize>,

    /// Text shown before the indicator
    #[arg(long)]
    label: Option<String>,

    /// Count without drawing anything
    #[arg(long)]
    hide: bool,

    /// YAML file with indicator settings; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Treat items as 64KB chunks and show byte sizes
    #[arg(long)]
    bytes: bool,
}

#[derive(Args, Debug, Clone)]
struct TableArgs {
    /// File to read rows from; standard input when omitted
    file: Option<PathBuf>,

    /// Fit to this width instead of the terminal's
    #[arg(long)]
    width: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Command::Bar(args) => run_progress(IndicatorStyle::Bar, args, &cli),
        Command::Dots(args) => run_progress(IndicatorStyle::Dots, args, &cli),
        Command::Mill(args) => run_progress(IndicatorStyle::Mill, args, &cli),
        Command::Table(args) => run_table(args, &cli),
    }
}

/// Settings from `--config`, with the subcommand's style and any flags on top.
fn indicator_config(style: IndicatorStyle, args: &RunArgs) -> Result<IndicatorConfig> {
    let mut config = match &args.config {
        Some(path) => IndicatorConfig::from_file(path)
            .with_context(|| format!("failed to load indicator config {}", path.display()))?,
        None => IndicatorConfig::default(),
    };
    config.style = style;
    if let Some(every) = args.every {
        config.every = every;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(label) = &args.label {
        config.label = label.clone();
    }
    config.hide |= args.hide;
    if args.bytes {
        config.sizes = SizeFormat::Bytes;
    }
    Ok(config)
}

fn run_progress(style: IndicatorStyle, args: &RunArgs, cli: &Cli) -> Result<()> {
    let config = indicator_config(style, args)?;
    let stream = if cli.stdout {
        Stream::Stdout
    } else {
        config.stream
    };
    let console = Console::new(TermSink::new(stream));
    readout::logging::init(console.clone(), cli.verbose)?;
    debug!(?config, "indicator settings");

    if args.count == 0 {
        info!("nothing to do");
        return Ok(());
    }

    let (step, total) = work_size(args)?;
    let delay = Duration::from_millis(args.delay_ms);
    let mut indicator = config
        .build(&console, Some(total))
        .context("failed to start indicator")?;

    for item in 0..args.count {
        thread::sleep(delay);
        if item == args.count / 2 {
            info!(item, "halfway");
        }
        indicator.advance(step)?;
    }

    indicator.close_with_message(&format!("processed {} items", args.count))?;
    Ok(())
}

/// Units per item and the indicator total.
fn work_size(args: &RunArgs) -> Result<(u64, u64)> {
    let step = if args.bytes { CHUNK } else { 1 };
    let total = args
        .count
        .checked_mul(step)
        .with_context(|| format!("--count {} is too large with --bytes", args.count))?;
    Ok((step, total))
}

fn run_table(args: &TableArgs, cli: &Cli) -> Result<()> {
    let console = Console::new(TermSink::new(Stream::Stdout));
    readout::logging::init(console.clone(), cli.verbose)?;

    let grid = match &args.file {
        Some(path) => read_grid(open(path)?)?,
        None => read_grid(io::stdin().lock())?,
    };
    debug!(rows = grid.len(), "read table");

    match args.width {
        Some(width) => print_table(&console, &grid, Some(width))?,
        None => colprint(&console, &grid)?,
    }
    Ok(())
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("failed to open {}", path.display()))
}

/// One row per non-blank line, one cell per whitespace-separated word.
fn read_grid(input: impl Read) -> Result<Vec<Vec<String>>> {
    let mut grid = Vec::new();
    for line in BufReader::new(input).lines() {
        let line = line.context("failed to read table input")?;
        let row: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if !row.is_empty() {
            grid.push(row);
        }
    }
    Ok(grid)
}
