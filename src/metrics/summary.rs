use crate::engine::{BacktestResult, TradeAction, TradeRecord};
use crate::metrics::timeseries::{calculate_returns, max_drawdown, EquityPoint};
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//summary metrics for a backtest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub initial_cash: f64,
    pub final_cash: f64,
    pub profit: f64,
    pub return_pct: f64,
    pub num_trades: usize,
    pub num_round_trips: usize,
    pub num_winning_trades: usize,
    pub num_losing_trades: usize,
    pub win_rate: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub exposure: f64,
}

impl SummaryMetrics {
    //calculate summary metrics from a backtest result and its equity curve
    pub fn from_backtest(result: &BacktestResult, equity_curve: &[EquityPoint]) -> Self {
        let round_trips = round_trip_pnl(&result.trades, result.initial_cash);

        let num_winning = round_trips.iter().filter(|&&pnl| pnl > 0.0).count();
        let num_losing = round_trips.iter().filter(|&&pnl| pnl < 0.0).count();
        let win_rate = if round_trips.is_empty() {
            0.0
        } else {
            num_winning as f64 / round_trips.len() as f64
        };

        let largest_win = round_trips.iter().fold(0.0f64, |a, &b| a.max(b));
        let largest_loss = round_trips.iter().fold(0.0f64, |a, &b| a.min(b));

        let equity_values: Vec<f64> = equity_curve.iter().map(|p| p.equity).collect();
        let returns = calculate_returns(&equity_values);

        SummaryMetrics {
            initial_cash: result.initial_cash,
            final_cash: result.final_cash,
            profit: result.profit,
            return_pct: result.return_pct(),
            num_trades: result.trades.len(),
            num_round_trips: round_trips.len(),
            num_winning_trades: num_winning,
            num_losing_trades: num_losing,
            win_rate,
            largest_win,
            largest_loss,
            max_drawdown: max_drawdown(equity_curve),
            sharpe_ratio: calculate_sharpe_ratio(&returns),
            exposure: calculate_exposure(&result.trades, equity_curve.len()),
        }
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();
        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        let rows = [
            ("Initial Cash", format!("${:.2}", self.initial_cash)),
            ("Final Cash", format!("${:.2}", self.final_cash)),
            (
                "Profit",
                format!("${:.2} ({:.2}%)", self.profit, self.return_pct * 100.0),
            ),
            ("Trades", format!("{}", self.num_trades)),
            ("Round Trips", format!("{}", self.num_round_trips)),
            ("Win Rate", format!("{:.2}%", self.win_rate * 100.0)),
            ("Largest Win", format!("${:.2}", self.largest_win)),
            ("Largest Loss", format!("${:.2}", self.largest_loss)),
            ("Max Drawdown", format!("{:.2}%", self.max_drawdown * 100.0)),
            ("Sharpe Ratio", format!("{:.3}", self.sharpe_ratio)),
            ("Exposure", format!("{:.2}%", self.exposure * 100.0)),
        ];

        for (name, value) in rows {
            table.add_row(Row::new(vec![Cell::new(name), Cell::new(&value)]));
        }

        table.printstd();
    }
}

//cash profit of each completed buy -> exit pair
fn round_trip_pnl(trades: &[TradeRecord], initial_cash: f64) -> Vec<f64> {
    let mut pnl = Vec::new();
    let mut cash = initial_cash;
    let mut entry: Option<f64> = None;

    for trade in trades {
        match (trade.action, entry) {
            (TradeAction::Buy, None) => entry = Some(trade.price),
            (action, Some(entry_price)) if action.is_exit() => {
                let proceeds = cash / entry_price * trade.price;
                pnl.push(proceeds - cash);
                cash = proceeds;
                entry = None;
            }
            _ => {}
        }
    }

    pnl
}

fn calculate_sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let mean = returns.mean();
    let std_dev = returns.std_dev();

    if std_dev == 0.0 || !std_dev.is_finite() {
        return 0.0;
    }

    //per-step ratio, not annualized
    mean / std_dev
}

//fraction of steps spent holding a position
fn calculate_exposure(trades: &[TradeRecord], num_steps: usize) -> f64 {
    if num_steps == 0 {
        return 0.0;
    }

    let mut held = 0usize;
    let mut entry_step: Option<usize> = None;

    for trade in trades {
        match (trade.action, entry_step) {
            (TradeAction::Buy, None) => entry_step = Some(trade.step_index),
            (TradeAction::Sell, Some(start)) => {
                held += trade.step_index - start;
                entry_step = None;
            }
            //the final liquidation step still counts as held
            (TradeAction::FinalSell, Some(start)) => {
                held += trade.step_index - start + 1;
                entry_step = None;
            }
            _ => {}
        }
    }

    held as f64 / num_steps as f64
}
