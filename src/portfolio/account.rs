use crate::error::{BacktestError, Result};
use crate::portfolio::position::Position;

//cash plus a single all-in position
//either all capital is cash and the position is flat, or cash is zero and the position is long
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    //starting capital
    pub initial_cash: f64,

    //current cash balance
    cash: f64,

    //current holding
    position: Position,
}

impl Account {
    //creates a flat account holding only cash
    pub fn new(initial_cash: f64) -> Result<Self> {
        if !initial_cash.is_finite() || initial_cash <= 0.0 {
            return Err(BacktestError::InvalidInput(format!(
                "initial cash must be finite and positive, got {}",
                initial_cash
            )));
        }

        Ok(Account {
            initial_cash,
            cash: initial_cash,
            position: Position::Flat,
        })
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self) -> Position {
        self.position
    }

    //moves all cash into the position at the given price
    //returns the bought quantity, or None when already long
    //or when the cash buys no representable quantity
    pub fn buy_all(&mut self, price: f64) -> Option<f64> {
        if !self.position.is_flat() {
            return None;
        }

        let quantity = self.cash / price;
        if !(quantity > 0.0 && quantity.is_finite()) {
            return None;
        }

        self.cash = 0.0;
        self.position = Position::Long(quantity);
        Some(quantity)
    }

    //converts the whole position back to cash at the given price
    //returns the proceeds, or None when flat
    pub fn sell_all(&mut self, price: f64) -> Option<f64> {
        match self.position {
            Position::Flat => None,
            Position::Long(quantity) => {
                let proceeds = quantity * price;
                self.cash = proceeds;
                self.position = Position::Flat;
                Some(proceeds)
            }
        }
    }

    //mark-to-market value at a price
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.position.market_value(price)
    }

    //realized profit against the starting capital
    pub fn profit(&self) -> f64 {
        self.cash - self.initial_cash
    }
}
