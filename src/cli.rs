//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::{MetricsCsvReport, SeriesCsvReport};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::staged_output::StagedOutputs;
use crate::adapters::svg_chart_adapter::SvgChartReport;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    build_backtest_config, normalize_ticker, validate_data_config,
};
use crate::domain::error::{Stage, VoltimerError};
use crate::domain::price::PriceSeries;
use crate::domain::signal::{ThresholdMode, ThresholdRule};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_SERIES_CSV: &str = "resultados_volatility.csv";
pub const DEFAULT_METRICS_CSV: &str = "metrics.csv";

#[derive(Parser, Debug)]
#[command(
    name = "voltimer",
    about = "Volatility-timing backtester: low-volatility exposure vs buy and hold"
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides shared by commands that read price data.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct DataArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory holding <TICKER>.csv price files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(long)]
    pub ticker: Option<String>,
}

#[derive(clap::Args, Debug, Default, Clone)]
pub struct BacktestArgs {
    #[command(flatten)]
    pub data: DataArgs,
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    /// Rolling volatility window in trading days
    #[arg(long)]
    pub window: Option<usize>,
    /// full_sample, fixed or expanding
    #[arg(long)]
    pub threshold_mode: Option<ThresholdMode>,
    /// Fixed volatility threshold; implies --threshold-mode fixed
    #[arg(long)]
    pub threshold: Option<f64>,
    #[arg(long)]
    pub annualization_factor: Option<f64>,
    /// Per-date series CSV
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Metrics table CSV
    #[arg(long)]
    pub metrics: Option<PathBuf>,
    /// Equity and metrics chart (SVG)
    #[arg(long)]
    pub chart: Option<PathBuf>,
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the volatility-timing backtest
    Backtest(BacktestArgs),
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the available price range for a ticker
    Info(DataArgs),
}

/// Where a run writes its outputs. `None` skips that output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputPaths {
    pub series_csv: Option<PathBuf>,
    pub metrics_csv: Option<PathBuf>,
    pub chart_svg: Option<PathBuf>,
}

pub fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest(args) => run_backtest(&args),
        Command::Validate { config } => run_validate(&config),
        Command::Info(args) => run_info(&args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, VoltimerError> {
    match path {
        Some(p) => {
            info!(path = %p.display(), "loading config");
            FileConfigAdapter::from_file(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// Config file values with command-line overrides applied on top.
pub fn resolve_backtest_config(
    config: &dyn ConfigPort,
    args: &BacktestArgs,
) -> Result<BacktestConfig, VoltimerError> {
    let mut bt = build_backtest_config(config)?;

    if let Some(ticker) = &args.data.ticker {
        bt.ticker = cli_ticker(ticker)?;
    }
    if args.start_date.is_some() {
        bt.start_date = args.start_date;
    }
    if args.end_date.is_some() {
        bt.end_date = args.end_date;
    }
    if let Some(window) = args.window {
        bt.window = window;
    }
    if let Some(factor) = args.annualization_factor {
        bt.annualization_factor = factor;
    }

    if let (Some(mode), Some(_)) = (args.threshold_mode, args.threshold) {
        if mode != ThresholdMode::Fixed {
            return Err(VoltimerError::invalid_parameter(
                "threshold",
                "--threshold only applies to --threshold-mode fixed",
            ));
        }
    }
    let mode = args.threshold_mode.or(args.threshold.map(|_| ThresholdMode::Fixed));
    match mode {
        Some(ThresholdMode::FullSample) => bt.threshold = ThresholdRule::FullSample,
        Some(ThresholdMode::Fixed) => {
            let value = match (args.threshold, bt.threshold) {
                (Some(v), _) => v,
                (None, ThresholdRule::Fixed(v)) => v,
                (None, _) => {
                    return Err(VoltimerError::invalid_parameter(
                        "threshold",
                        "fixed threshold mode needs --threshold",
                    ));
                }
            };
            bt.threshold = ThresholdRule::Fixed(value);
        }
        Some(ThresholdMode::Expanding) => {
            let min_periods = match bt.threshold {
                ThresholdRule::Expanding { min_periods } => min_periods,
                _ => bt.window,
            };
            bt.threshold = ThresholdRule::Expanding { min_periods };
        }
        None => {}
    }

    if let (Some(start), Some(end)) = (bt.start_date, bt.end_date) {
        if start >= end {
            return Err(VoltimerError::invalid_parameter(
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }

    Ok(bt)
}

fn cli_ticker(raw: &str) -> Result<String, VoltimerError> {
    normalize_ticker(raw).map_err(|reason| VoltimerError::invalid_parameter("ticker", reason))
}

pub fn resolve_data_dir(
    config: &dyn ConfigPort,
    override_dir: Option<&PathBuf>,
) -> Result<PathBuf, VoltimerError> {
    if let Some(dir) = override_dir {
        return Ok(dir.clone());
    }
    validate_data_config(config)?;
    Ok(PathBuf::from(
        config.get_string("data", "dir").unwrap_or_default().trim(),
    ))
}

pub fn resolve_outputs(config: &dyn ConfigPort, args: &BacktestArgs) -> OutputPaths {
    let pick = |flag: &Option<PathBuf>, key: &str, default: Option<&str>| {
        flag.clone()
            .or_else(|| {
                config
                    .get_string("output", key)
                    .filter(|s| !s.trim().is_empty())
                    .map(PathBuf::from)
            })
            .or_else(|| default.map(PathBuf::from))
    };
    OutputPaths {
        series_csv: pick(&args.output, "series_csv", Some(DEFAULT_SERIES_CSV)),
        metrics_csv: pick(&args.metrics, "metrics_csv", Some(DEFAULT_METRICS_CSV)),
        chart_svg: pick(&args.chart, "chart_svg", None),
    }
}

fn run_backtest(args: &BacktestArgs) -> Result<(), VoltimerError> {
    let config = load_config(args.data.config.as_ref())?;
    let bt_config = resolve_backtest_config(&config, args)?;
    let outputs = resolve_outputs(&config, args);
    let data_dir = resolve_data_dir(&config, args.data.data_dir.as_ref())?;

    if args.dry_run {
        print_dry_run(&bt_config, &data_dir, &outputs);
        return Ok(());
    }

    let data_port = CsvAdapter::new(data_dir);
    run_backtest_pipeline(&data_port, &bt_config, &outputs)?;
    Ok(())
}

/// Fetch, clean, run, summarize and export. Outputs are written only after
/// every stage has succeeded.
pub fn run_backtest_pipeline(
    data_port: &dyn PriceDataPort,
    bt_config: &BacktestConfig,
    outputs: &OutputPaths,
) -> Result<BacktestResult, VoltimerError> {
    let raw =
        data_port.fetch_prices(&bt_config.ticker, bt_config.start_date, bt_config.end_date)?;
    let fetched = raw.len();
    let prices = PriceSeries::from_raw(raw.into_iter().map(|p| (p.date, p.close)).collect())
        .map_err(|e| e.at(Stage::Prices))?;
    if prices.len() < fetched {
        warn!(
            dropped = fetched - prices.len(),
            "dropped observations with missing closes"
        );
    }
    info!(
        ticker = %bt_config.ticker,
        prices = prices.len(),
        first = ?prices.first_date(),
        last = ?prices.last_date(),
        "prices loaded"
    );

    let result = backtest_engine::run_backtest(&prices, bt_config)?;

    print_summary(&result);
    write_outputs(&result, outputs).map_err(|e| e.at(Stage::Export))?;
    Ok(result)
}

/// Render every requested output, stage them beside their targets, then move
/// them into place together. Any failure leaves no output file behind.
fn write_outputs(result: &BacktestResult, outputs: &OutputPaths) -> Result<(), VoltimerError> {
    let reports: [(&Option<PathBuf>, &dyn ReportPort); 3] = [
        (&outputs.series_csv, &SeriesCsvReport),
        (&outputs.metrics_csv, &MetricsCsvReport),
        (&outputs.chart_svg, &SvgChartReport),
    ];

    let mut rendered = Vec::with_capacity(reports.len());
    for (path, report) in reports {
        if let Some(path) = path {
            rendered.push((path, report.render(result)?));
        }
    }

    let mut staged = StagedOutputs::new();
    for (path, bytes) in &rendered {
        staged.stage(path, bytes)?;
    }
    staged.commit()?;
    Ok(())
}

fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn print_summary(result: &BacktestResult) {
    let m = &result.metrics;

    println!();
    match result.threshold() {
        Some(t) => println!("Threshold:        {:.6}", t),
        None => println!("Threshold:        expanding median"),
    }
    println!("Exposure:         {}", pct(result.positions.exposure()));
    println!();
    println!("{:<14}{:>12}{:>12}", "", "Strategy", "Buy&Hold");
    println!(
        "{:<14}{:>12}{:>12}",
        "Annual Return",
        pct(m.strategy.annual_return),
        pct(m.benchmark.annual_return)
    );
    println!(
        "{:<14}{:>12}{:>12}",
        "Annual Vol",
        pct(m.strategy.annual_volatility),
        pct(m.benchmark.annual_volatility)
    );
    println!(
        "{:<14}{:>12.2}{:>12.2}",
        "Sharpe", m.strategy.sharpe_ratio, m.benchmark.sharpe_ratio
    );
    println!(
        "{:<14}{:>12}{:>12}",
        "Max Drawdown",
        pct(m.strategy.max_drawdown),
        pct(m.benchmark.max_drawdown)
    );
}

fn print_dry_run(bt_config: &BacktestConfig, data_dir: &Path, outputs: &OutputPaths) {
    let show = |p: &Option<PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    println!("ticker:               {}", bt_config.ticker);
    println!("data dir:             {}", data_dir.display());
    println!(
        "date range:           {} .. {}",
        bt_config
            .start_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "start".into()),
        bt_config
            .end_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "end".into())
    );
    println!("window:               {}", bt_config.window);
    println!("threshold:            {}", bt_config.threshold);
    println!("annualization factor: {}", bt_config.annualization_factor);
    println!("series csv:           {}", show(&outputs.series_csv));
    println!("metrics csv:          {}", show(&outputs.metrics_csv));
    println!("chart svg:            {}", show(&outputs.chart_svg));
    eprintln!("\nDry run complete: configuration is valid");
}

fn run_validate(config_path: &PathBuf) -> Result<(), VoltimerError> {
    let config = load_config(Some(config_path))?;
    let bt_config = build_backtest_config(&config)?;
    validate_data_config(&config)?;
    eprintln!(
        "Configuration is valid: {} window={} threshold={}",
        bt_config.ticker, bt_config.window, bt_config.threshold
    );
    Ok(())
}

fn run_info(args: &DataArgs) -> Result<(), VoltimerError> {
    let config = load_config(args.config.as_ref())?;
    let data_dir = resolve_data_dir(&config, args.data_dir.as_ref())?;
    let ticker = match &args.ticker {
        Some(raw) => cli_ticker(raw)?,
        None => build_backtest_config(&config)?.ticker,
    };

    let adapter = CsvAdapter::new(data_dir);
    match adapter.data_range(&ticker)? {
        Some((first, last, count)) => {
            println!("{}: {} prices, {} to {}", ticker, count, first, last)
        }
        None => eprintln!("{}: no data found", ticker),
    }
    Ok(())
}
