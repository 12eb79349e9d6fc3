//! Paper account state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Side, Symbol};

/// Shares held in one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub quantity: Decimal,
    pub avg_price: Decimal,
    pub realized_pnl: Decimal,
}

impl Holding {
    fn empty() -> Self {
        Self {
            quantity: Decimal::ZERO,
            avg_price: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
        }
    }

    /// Cost basis of the shares still held.
    pub fn cost_basis(&self) -> Decimal {
        self.quantity * self.avg_price
    }
}

/// Cash plus long holdings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    pub cash: Decimal,
    pub holdings: BTreeMap<Symbol, Holding>,
    pub realized_pnl: Decimal,
}

impl Account {
    pub fn new(cash: Decimal) -> Self {
        Self {
            cash,
            holdings: BTreeMap::new(),
            realized_pnl: Decimal::ZERO,
        }
    }

    /// Shares held in a symbol (zero if none).
    pub fn held(&self, symbol: &Symbol) -> Decimal {
        self.holdings
            .get(symbol)
            .map(|h| h.quantity)
            .unwrap_or(Decimal::ZERO)
    }

    /// Apply a fill. Buys average into the holding; sells realize P&L
    /// against the average price. Callers check cash and holdings first.
    pub fn apply_fill(&mut self, symbol: &Symbol, side: Side, quantity: Decimal, price: Decimal) {
        let value = quantity * price;
        let holding = self
            .holdings
            .entry(symbol.clone())
            .or_insert_with(Holding::empty);

        match side {
            Side::Buy => {
                let total_cost = holding.cost_basis() + value;
                holding.quantity += quantity;
                holding.avg_price = total_cost / holding.quantity;
                self.cash -= value;
            }
            Side::Sell => {
                let realized = quantity * (price - holding.avg_price);
                holding.quantity -= quantity;
                holding.realized_pnl += realized;
                self.realized_pnl += realized;
                self.cash += value;
            }
        }

        if holding.quantity <= Decimal::ZERO {
            self.holdings.remove(symbol);
        }
    }

    /// Cash plus holdings marked at the given prices (cost basis when unpriced).
    pub fn equity(&self, prices: &BTreeMap<Symbol, Decimal>) -> Decimal {
        let marked: Decimal = self
            .holdings
            .iter()
            .map(|(symbol, h)| match prices.get(symbol) {
                Some(price) => h.quantity * *price,
                None => h.cost_basis(),
            })
            .sum();
        self.cash + marked
    }
}
