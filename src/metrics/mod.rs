pub mod summary;
pub mod timeseries;

pub use summary::SummaryMetrics;
pub use timeseries::{equity_curve, EquityPoint};
