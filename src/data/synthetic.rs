use crate::data::series::PriceSeries;
use crate::error::{BacktestError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

//generates a reproducible demo series: base + sin(i / 5) * amplitude + gaussian noise
pub fn noisy_sine(
    len: usize,
    base: f64,
    amplitude: f64,
    noise_std: f64,
    seed: u64,
) -> Result<PriceSeries> {
    let normal = Normal::new(0.0, noise_std).map_err(|e| {
        BacktestError::InvalidParameter(format!("noise std {}: {}", noise_std, e))
    })?;
    let mut rng = StdRng::seed_from_u64(seed);

    let prices = (0..len)
        .map(|i| base + (i as f64 / 5.0).sin() * amplitude + normal.sample(&mut rng))
        .collect();

    PriceSeries::new(prices)
}
