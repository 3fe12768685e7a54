//a Rust-based moving average crossover backtester and parameter optimizer

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod portfolio;
pub mod strategy;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{BacktestConfiguration, GridConfig, SyntheticConfig};
    pub use crate::data::{load_csv, noisy_sine, PriceData, PriceSeries};
    pub use crate::engine::{
        optimize, optimize_parallel, run_backtest, simulate, BacktestResult, OptimizationResult,
        ParameterGrid, ParameterSet, TradeAction, TradeRecord, TrialResult,
    };
    pub use crate::error::BacktestError;
    pub use crate::metrics::{equity_curve, EquityPoint, SummaryMetrics};
    pub use crate::portfolio::{Account, Position};
    pub use crate::strategy::{smooth, Signal, SmoothedSeries, ThresholdCrossover};
}
