use serde::{Deserialize, Serialize};
use std::fmt;

//what a trade record did to the position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
    //forced liquidation at the last price of the series
    FinalSell,
}

impl TradeAction {
    //returns true for actions that close the position
    pub fn is_exit(&self) -> bool {
        matches!(self, TradeAction::Sell | TradeAction::FinalSell)
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "Buy"),
            TradeAction::Sell => write!(f, "Sell"),
            TradeAction::FinalSell => write!(f, "Final Sell"),
        }
    }
}

//one entry of the append-only trade log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub action: TradeAction,
    pub price: f64,
    pub step_index: usize,
}

impl TradeRecord {
    pub fn new(action: TradeAction, price: f64, step_index: usize) -> Self {
        TradeRecord {
            action,
            price,
            step_index,
        }
    }
}

impl fmt::Display for TradeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} (step {})", self.action, self.price, self.step_index)
    }
}
