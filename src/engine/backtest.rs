use crate::data::PriceSeries;
use crate::engine::optimizer::ParameterSet;
use crate::engine::trade::{TradeAction, TradeRecord};
use crate::error::{BacktestError, Result};
use crate::portfolio::Account;
use crate::strategy::{smooth, Signal, SmoothedSeries, ThresholdCrossover};
use serde::{Deserialize, Serialize};
use tracing::debug;

//result of a backtest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub trades: Vec<TradeRecord>,
    pub profit: f64,
    pub initial_cash: f64,
    pub final_cash: f64,
}

impl BacktestResult {
    pub fn num_trades(&self) -> usize {
        self.trades.len()
    }

    //final cash as a fraction of starting capital, minus one
    pub fn return_pct(&self) -> f64 {
        self.profit / self.initial_cash
    }
}

//replays a crossover strategy over the series, all-in on buys and all-out on sells
//an open position is liquidated at the last price so profit is always realized
pub fn simulate(
    series: &PriceSeries,
    smoothed: &SmoothedSeries,
    buy_threshold: f64,
    sell_threshold: f64,
    initial_cash: f64,
) -> Result<BacktestResult> {
    //validate everything up front so no pass starts on bad input
    let rule = ThresholdCrossover::new(buy_threshold, sell_threshold)?;
    let mut account = Account::new(initial_cash)?;
    check_alignment(series, smoothed)?;

    let mut trades = Vec::new();

    for (i, &price) in series.iter().enumerate() {
        let (short_ma, long_ma) = match smoothed.at(i) {
            Some(values) => values,
            None => continue,
        };

        match rule.signal(short_ma, long_ma, account.position()) {
            Some(Signal::Buy) => {
                if let Some(quantity) = account.buy_all(price) {
                    debug!(step = i, price, quantity, "buy");
                    trades.push(TradeRecord::new(TradeAction::Buy, price, i));
                }
            }
            Some(Signal::Sell) => {
                if let Some(proceeds) = account.sell_all(price) {
                    debug!(step = i, price, proceeds, "sell");
                    trades.push(TradeRecord::new(TradeAction::Sell, price, i));
                }
            }
            None => {}
        }
    }

    //final liquidation if still holding
    let last_price = series.last();
    if let Some(proceeds) = account.sell_all(last_price) {
        let step = series.len() - 1;
        debug!(step, price = last_price, proceeds, "final sell");
        trades.push(TradeRecord::new(TradeAction::FinalSell, last_price, step));
    }

    Ok(BacktestResult {
        trades,
        profit: account.profit(),
        initial_cash,
        final_cash: account.cash(),
    })
}

//smooths the series with the parameter set's windows, then simulates
pub fn run_backtest(
    series: &PriceSeries,
    params: &ParameterSet,
    initial_cash: f64,
) -> Result<BacktestResult> {
    params.validate()?;
    let smoothed = smooth(series, params.short_window, params.long_window)?;
    simulate(
        series,
        &smoothed,
        params.buy_threshold,
        params.sell_threshold,
        initial_cash,
    )
}

fn check_alignment(series: &PriceSeries, smoothed: &SmoothedSeries) -> Result<()> {
    for len in [smoothed.short_ma.len(), smoothed.long_ma.len()] {
        if len != series.len() {
            return Err(BacktestError::LengthMismatch {
                expected: series.len(),
                actual: len,
            });
        }
    }

    let non_finite = smoothed
        .short_ma
        .iter()
        .chain(smoothed.long_ma.iter())
        .flatten()
        .any(|v| !v.is_finite());
    if non_finite {
        return Err(BacktestError::InvalidInput(
            "moving averages contain non-finite values".to_string(),
        ));
    }

    Ok(())
}
