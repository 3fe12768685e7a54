use crate::data::PriceSeries;
use crate::error::{BacktestError, Result};
use serde::{Deserialize, Serialize};

//short and long trailing moving averages aligned with the price series
//None marks a warm-up step where the window is not yet full
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedSeries {
    pub short_ma: Vec<Option<f64>>,
    pub long_ma: Vec<Option<f64>>,
}

impl SmoothedSeries {
    pub fn new(short_ma: Vec<Option<f64>>, long_ma: Vec<Option<f64>>) -> Self {
        SmoothedSeries { short_ma, long_ma }
    }

    pub fn len(&self) -> usize {
        self.short_ma.len()
    }

    pub fn is_empty(&self) -> bool {
        self.short_ma.is_empty()
    }

    //both averages at a step, or None while either is still warming up
    pub fn at(&self, index: usize) -> Option<(f64, f64)> {
        match (self.short_ma.get(index), self.long_ma.get(index)) {
            (Some(Some(short)), Some(Some(long))) => Some((*short, *long)),
            _ => None,
        }
    }
}

//helper function to calculate simple moving average
pub fn sma(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    Some(prices.iter().sum::<f64>() / prices.len() as f64)
}

//trailing simple moving average over every step of the series
pub fn rolling_sma(prices: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(BacktestError::InvalidParameter(
            "moving average window must be positive".to_string(),
        ));
    }

    //each entry is summed afresh so a large value leaving the window leaves no residue
    let out = (0..prices.len())
        .map(|i| {
            if i + 1 >= window {
                sma(&prices[i + 1 - window..=i])
            } else {
                None
            }
        })
        .collect();

    Ok(out)
}

//computes the short and long moving averages of a series
pub fn smooth(series: &PriceSeries, short_window: usize, long_window: usize) -> Result<SmoothedSeries> {
    let short_ma = rolling_sma(series.as_slice(), short_window)?;
    let long_ma = rolling_sma(series.as_slice(), long_window)?;
    Ok(SmoothedSeries { short_ma, long_ma })
}
