use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use macross::prelude::*;
use prettytable::{Cell, Row, Table};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "macross")]
#[command(about = "A moving average crossover backtester and parameter optimizer", long_about = None)]
struct Cli {
    //log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //backtest a single parameter set
    Run {
        #[command(flatten)]
        input: InputArgs,

        //short moving average window
        #[arg(long)]
        short: Option<usize>,

        //long moving average window
        #[arg(long)]
        long: Option<usize>,

        //buy margin above the long average (fraction)
        #[arg(long)]
        buy: Option<f64>,

        //sell margin below the long average (fraction)
        #[arg(long)]
        sell: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },

    //search the parameter grid, then backtest the winner
    Optimize {
        #[command(flatten)]
        input: InputArgs,

        //evaluate grid points on all cores
        #[arg(long)]
        parallel: bool,

        //drop grid points whose short window is not below the long window
        #[arg(long)]
        skip_inverted: bool,

        //number of leaderboard rows to print
        #[arg(long, default_value = "5")]
        top: usize,

        #[command(flatten)]
        output: OutputArgs,
    },

    //write the default configuration to a JSON file
    InitConfig {
        path: PathBuf,
    },
}

#[derive(Args)]
struct InputArgs {
    //path to a JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    //path to csv data file with a close column (synthetic data when omitted)
    #[arg(long)]
    data: Option<PathBuf>,

    //initial cash
    #[arg(long)]
    initial_cash: Option<f64>,
}

#[derive(Args)]
struct OutputArgs {
    //output path for trades csv
    #[arg(long)]
    output_trades_csv: Option<PathBuf>,

    //output path for equity curve csv
    #[arg(long)]
    output_equity_csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            input,
            short,
            long,
            buy,
            sell,
            output,
        } => {
            let mut config = load_configuration(&input, &output)?;
            if let Some(short) = short {
                config.params.short_window = short;
            }
            if let Some(long) = long {
                config.params.long_window = long;
            }
            if let Some(buy) = buy {
                config.params.buy_threshold = buy;
            }
            if let Some(sell) = sell {
                config.params.sell_threshold = sell;
            }
            run_single(&config)?;
        }
        Commands::Optimize {
            input,
            parallel,
            skip_inverted,
            top,
            output,
        } => {
            let mut config = load_configuration(&input, &output)?;
            config.parallel |= parallel;
            config.skip_inverted_windows |= skip_inverted;
            run_optimization(&config, top)?;
        }
        Commands::InitConfig { path } => {
            BacktestConfiguration::default()
                .to_json_file(&path)
                .context(format!("Failed to write configuration to {:?}", path))?;
            println!("Default configuration written to {:?}", path);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_configuration(input: &InputArgs, output: &OutputArgs) -> Result<BacktestConfiguration> {
    let mut config = match &input.config {
        Some(path) => BacktestConfiguration::from_json_file(path)
            .context(format!("Failed to load configuration from {:?}", path))?,
        None => BacktestConfiguration::default(),
    };

    if let Some(data) = &input.data {
        config.data_path = Some(data.clone());
    }
    if let Some(cash) = input.initial_cash {
        config.initial_cash = cash;
    }
    if let Some(path) = &output.output_trades_csv {
        config.output_trades_csv = Some(path.clone());
    }
    if let Some(path) = &output.output_equity_csv {
        config.output_equity_csv = Some(path.clone());
    }

    Ok(config)
}

fn load_prices(config: &BacktestConfiguration) -> Result<PriceData> {
    match &config.data_path {
        Some(path) => {
            println!("Loading data from {:?}...", path);
            load_csv(path).context(format!("Failed to load data from {:?}", path))
        }
        None => {
            let synthetic = &config.synthetic;
            println!(
                "No data file given, generating {} synthetic prices (seed {})...",
                synthetic.length, synthetic.seed
            );
            let series = noisy_sine(
                synthetic.length,
                synthetic.base,
                synthetic.amplitude,
                synthetic.noise_std,
                synthetic.seed,
            )?;
            Ok(PriceData::from_series(series))
        }
    }
}

fn run_single(config: &BacktestConfiguration) -> Result<()> {
    println!("Moving Average Crossover Backtest");
    println!("=================================\n");

    let data = load_prices(config)?;
    println!("Loaded {} prices\n", data.series.len());

    let params = config.params;
    print_params(&params);

    let result = run_backtest(&data.series, &params, config.initial_cash)?;
    report(config, &data, &result)
}

fn run_optimization(config: &BacktestConfiguration, top: usize) -> Result<()> {
    println!("Moving Average Crossover Optimization");
    println!("=====================================\n");

    let data = load_prices(config)?;
    println!("Loaded {} prices", data.series.len());

    let grid = config.parameter_grid();
    println!("Evaluating {} parameter sets...\n", grid.len());

    let outcome = if config.parallel {
        optimize_parallel(&data.series, &grid, config.initial_cash)?
    } else {
        optimize(&data.series, &grid, config.initial_cash)?
    };

    print_leaderboard(&outcome, top);

    println!("\nBest parameters:");
    print_params(&outcome.best_params);
    println!("Best profit: ${:.2}\n", outcome.best_profit);

    //re-run the winner for the canonical trade log
    let result = run_backtest(&data.series, &outcome.best_params, config.initial_cash)?;
    info!(profit = result.profit, "re-ran best parameter set");
    report(config, &data, &result)
}

fn print_params(params: &ParameterSet) {
    println!(
        "Strategy: MA Crossover (short={}, long={}, buy={}, sell={})",
        params.short_window, params.long_window, params.buy_threshold, params.sell_threshold
    );
}

fn print_leaderboard(outcome: &OptimizationResult, top: usize) {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Rank"),
        Cell::new("Short"),
        Cell::new("Long"),
        Cell::new("Buy"),
        Cell::new("Sell"),
        Cell::new("Trades"),
        Cell::new("Profit"),
    ]));

    for (rank, trial) in outcome.top(top).iter().enumerate() {
        table.add_row(Row::new(vec![
            Cell::new(&format!("{}", rank + 1)),
            Cell::new(&format!("{}", trial.params.short_window)),
            Cell::new(&format!("{}", trial.params.long_window)),
            Cell::new(&format!("{}", trial.params.buy_threshold)),
            Cell::new(&format!("{}", trial.params.sell_threshold)),
            Cell::new(&format!("{}", trial.num_trades)),
            Cell::new(&format!("${:.2}", trial.profit)),
        ]));
    }

    table.printstd();
}

fn report(config: &BacktestConfiguration, data: &PriceData, result: &BacktestResult) -> Result<()> {
    println!("Trade History:");
    if result.trades.is_empty() {
        println!("  (no trades)");
    }
    for trade in &result.trades {
        match data.timestamp(trade.step_index) {
            Some(ts) => println!("  {} [{}]", trade, ts.to_rfc3339()),
            None => println!("  {}", trade),
        }
    }
    println!();

    let curve = equity_curve(&data.series, &result.trades, result.initial_cash);
    let summary = SummaryMetrics::from_backtest(result, &curve);

    println!("Backtest Results");
    println!("================\n");
    summary.pretty_print_table();

    if let Some(path) = &config.output_trades_csv {
        save_trades_csv(data, &result.trades, path)?;
        println!("\nTrades saved to {:?}", path);
    }

    if let Some(path) = &config.output_equity_csv {
        save_equity_csv(&curve, path)?;
        println!("Equity curve saved to {:?}", path);
    }

    Ok(())
}

#[derive(Serialize)]
struct TradeRow {
    step: usize,
    action: TradeAction,
    price: f64,
    timestamp: Option<String>,
}

fn save_trades_csv(data: &PriceData, trades: &[TradeRecord], path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).context(format!("Failed to create {:?}", path))?;

    for trade in trades {
        writer.serialize(TradeRow {
            step: trade.step_index,
            action: trade.action,
            price: trade.price,
            timestamp: data.timestamp(trade.step_index).map(|ts| ts.to_rfc3339()),
        })?;
    }

    writer.flush()?;
    Ok(())
}

fn save_equity_csv(curve: &[EquityPoint], path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).context(format!("Failed to create {:?}", path))?;

    for point in curve {
        writer.serialize(point)?;
    }

    writer.flush()?;
    Ok(())
}
