use serde::{Deserialize, Serialize};

//holding state of the single traded asset
//long quantity is always positive, there is no short side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Position {
    #[default]
    Flat,
    Long(f64),
}

impl Position {
    //returns true if the position is flat (no open position)
    pub fn is_flat(&self) -> bool {
        matches!(self, Position::Flat)
    }

    //returns true if the position is long
    pub fn is_long(&self) -> bool {
        matches!(self, Position::Long(_))
    }

    //held quantity, zero when flat
    pub fn quantity(&self) -> f64 {
        match self {
            Position::Flat => 0.0,
            Position::Long(qty) => *qty,
        }
    }

    //returns the market value of the position at a price
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity() * price
    }
}
