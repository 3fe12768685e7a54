pub mod sma_crossover;
pub mod smoother;

use serde::{Deserialize, Serialize};

pub use sma_crossover::ThresholdCrossover;
pub use smoother::{rolling_sma, sma, smooth, SmoothedSeries};

//position change requested by a strategy rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
}
