use crate::error::{BacktestError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Index;

//an ordered, gap-free sequence of closing prices indexed by time step
//every price is finite and strictly positive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct PriceSeries {
    prices: Vec<f64>,
}

impl PriceSeries {
    //creates a series, rejecting empty input and non-finite or non-positive prices
    pub fn new(prices: Vec<f64>) -> Result<Self> {
        if prices.is_empty() {
            return Err(BacktestError::InvalidInput(
                "price series is empty".to_string(),
            ));
        }

        if let Some((index, price)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(BacktestError::InvalidInput(format!(
                "price at step {} must be finite and positive, got {}",
                index, price
            )));
        }

        Ok(PriceSeries { prices })
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    //always false for a constructed series
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.prices
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.prices.iter()
    }

    //returns the final price of the series
    pub fn last(&self) -> f64 {
        self.prices[self.prices.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.prices.get(index).copied()
    }
}

impl Index<usize> for PriceSeries {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.prices[index]
    }
}

impl TryFrom<Vec<f64>> for PriceSeries {
    type Error = BacktestError;

    fn try_from(prices: Vec<f64>) -> Result<Self> {
        PriceSeries::new(prices)
    }
}

impl From<PriceSeries> for Vec<f64> {
    fn from(series: PriceSeries) -> Self {
        series.prices
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.prices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_finite_prices() {
        let series = PriceSeries::new(vec![100.0, 101.5, 99.0]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series[1], 101.5);
        assert_eq!(series.last(), 99.0);
    }

    #[test]
    fn rejects_empty_series() {
        let err = PriceSeries::new(vec![]).unwrap_err();
        assert!(matches!(err, BacktestError::InvalidInput(_)));
    }

    #[test]
    fn rejects_bad_prices() {
        for bad in [f64::NAN, f64::INFINITY, -1.0, 0.0] {
            let err = PriceSeries::new(vec![100.0, bad, 102.0]).unwrap_err();
            assert!(matches!(err, BacktestError::InvalidInput(_)), "{}", bad);
        }
    }

    #[test]
    fn deserializes_through_validation() {
        let series: PriceSeries = serde_json::from_str("[1.0, 2.0]").unwrap();
        assert_eq!(series.as_slice(), &[1.0, 2.0]);
        assert!(serde_json::from_str::<PriceSeries>("[1.0, -2.0]").is_err());
    }
}
