pub mod backtest;
pub mod optimizer;
pub mod trade;

pub use backtest::{run_backtest, simulate, BacktestResult};
pub use optimizer::{
    optimize, optimize_parallel, select_best, OptimizationResult, ParameterGrid, ParameterSet,
    TrialResult,
};
pub use trade::{TradeAction, TradeRecord};
