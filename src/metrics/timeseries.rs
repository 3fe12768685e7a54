use crate::data::PriceSeries;
use crate::engine::{TradeAction, TradeRecord};
use serde::{Deserialize, Serialize};

//a point in the equity curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub step: usize,
    pub price: f64,
    pub equity: f64,
    pub drawdown: f64,
    pub returns: f64,
}

//marks the account to market at every step by replaying the trade log
//trades are applied at their step before the step is valued
pub fn equity_curve(
    series: &PriceSeries,
    trades: &[TradeRecord],
    initial_cash: f64,
) -> Vec<EquityPoint> {
    let mut curve = Vec::with_capacity(series.len());
    let mut cash = initial_cash;
    let mut quantity = 0.0;
    let mut peak = initial_cash;
    let mut prev_equity = initial_cash;
    let mut pending = trades.iter().peekable();

    for (step, &price) in series.iter().enumerate() {
        while let Some(trade) = pending.next_if(|t| t.step_index == step) {
            match trade.action {
                TradeAction::Buy => {
                    quantity = cash / trade.price;
                    cash = 0.0;
                }
                TradeAction::Sell | TradeAction::FinalSell => {
                    cash = quantity * trade.price;
                    quantity = 0.0;
                }
            }
        }

        let equity = cash + quantity * price;

        //update peak
        if equity > peak {
            peak = equity;
        }

        let drawdown = if peak > 0.0 {
            (peak - equity) / peak
        } else {
            0.0
        };

        let returns = if step == 0 {
            0.0
        } else {
            (equity - prev_equity) / prev_equity
        };

        curve.push(EquityPoint {
            step,
            price,
            equity,
            drawdown,
            returns,
        });
        prev_equity = equity;
    }

    curve
}

//calculates maximum drawdown from equity curve
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    equity_curve
        .iter()
        .map(|point| point.drawdown)
        .fold(0.0, f64::max)
}

//calculates returns from equity values
pub fn calculate_returns(equity_values: &[f64]) -> Vec<f64> {
    equity_values
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect()
}
