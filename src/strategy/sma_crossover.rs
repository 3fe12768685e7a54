use crate::error::{BacktestError, Result};
use crate::portfolio::Position;
use crate::strategy::Signal;

//moving average crossover rule with fractional margins around the long average
//buys when short > long * (1 + buy_threshold) while flat
//sells when short < long * (1 - sell_threshold) while long
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdCrossover {
    buy_threshold: f64,
    sell_threshold: f64,
}

impl ThresholdCrossover {
    pub fn new(buy_threshold: f64, sell_threshold: f64) -> Result<Self> {
        validate_threshold("buy_threshold", buy_threshold)?;
        validate_threshold("sell_threshold", sell_threshold)?;
        Ok(ThresholdCrossover {
            buy_threshold,
            sell_threshold,
        })
    }

    pub fn buy_threshold(&self) -> f64 {
        self.buy_threshold
    }

    pub fn sell_threshold(&self) -> f64 {
        self.sell_threshold
    }

    //evaluates one step
    //the buy test runs first, the sell test only when the buy condition does not hold
    pub fn signal(&self, short_ma: f64, long_ma: f64, position: Position) -> Option<Signal> {
        if short_ma > long_ma * (1.0 + self.buy_threshold) {
            if position.is_flat() {
                return Some(Signal::Buy);
            }
        } else if short_ma < long_ma * (1.0 - self.sell_threshold) && position.is_long() {
            return Some(Signal::Sell);
        }
        None
    }
}

//thresholds are non-negative finite fractions
pub fn validate_threshold(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(BacktestError::InvalidParameter(format!(
            "{} must be a finite non-negative fraction, got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_thresholds_trigger_on_strict_crossover() {
        let rule = ThresholdCrossover::new(0.0, 0.0).unwrap();

        assert_eq!(rule.signal(101.0, 100.0, Position::Flat), Some(Signal::Buy));
        assert_eq!(rule.signal(100.0, 100.0, Position::Flat), None);
        assert_eq!(rule.signal(100.0, 100.0, Position::Long(1.0)), None);
        assert_eq!(rule.signal(99.0, 100.0, Position::Long(1.0)), Some(Signal::Sell));
    }

    #[test]
    fn margins_widen_the_dead_band() {
        let rule = ThresholdCrossover::new(0.02, 0.05).unwrap();

        assert_eq!(rule.signal(101.0, 100.0, Position::Flat), None);
        assert_eq!(rule.signal(103.0, 100.0, Position::Flat), Some(Signal::Buy));
        assert_eq!(rule.signal(96.0, 100.0, Position::Long(1.0)), None);
        assert_eq!(rule.signal(94.0, 100.0, Position::Long(1.0)), Some(Signal::Sell));
    }

    #[test]
    fn position_state_gates_signals() {
        let rule = ThresholdCrossover::new(0.0, 0.0).unwrap();

        //no pyramiding
        assert_eq!(rule.signal(110.0, 100.0, Position::Long(1.0)), None);
        //no shorting
        assert_eq!(rule.signal(90.0, 100.0, Position::Flat), None);
    }

    #[test]
    fn rejects_malformed_thresholds() {
        assert!(ThresholdCrossover::new(-0.01, 0.0).is_err());
        assert!(ThresholdCrossover::new(0.0, f64::NAN).is_err());
    }
}
