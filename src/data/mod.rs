pub mod loader;
pub mod series;
pub mod synthetic;

pub use loader::{load_csv, parse_timestamp, PriceData};
pub use series::PriceSeries;
pub use synthetic::noisy_sine;
