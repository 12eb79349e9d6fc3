//! Paper order types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Symbol;
use crate::error::ValidationError;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderType {
    /// Fill at the prevailing price
    Market,
    /// Fill at the given price or better
    Limit { price: Decimal },
}

impl OrderType {
    pub fn limit_price(&self) -> Option<Decimal> {
        match self {
            OrderType::Market => None,
            OrderType::Limit { price } => Some(*price),
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit { price } => write!(f, "LIMIT @ {}", price),
        }
    }
}

/// Time in force for orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    /// Valid for the trading day only
    #[default]
    Day,
    /// Good til canceled
    Gtc,
    /// Immediate or cancel
    Ioc,
    /// Fill or kill
    Fok,
}

impl TimeInForce {
    /// Orders that must not rest on the book if they cannot fill right away.
    pub fn is_immediate(&self) -> bool {
        matches!(self, TimeInForce::Ioc | TimeInForce::Fok)
    }
}

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted by the paper desk, waiting for a price
    Pending,
    /// Completely filled
    Filled,
    /// Canceled by the user or by its time in force
    Canceled,
    /// Rejected at execution (funds, holdings)
    Rejected,
}

impl OrderStatus {
    /// Check if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

/// What the user asked to trade, before it becomes an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTicket {
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: Decimal,
    pub order_type: OrderType,
    #[serde(default)]
    pub time_in_force: TimeInForce,
}

impl OrderTicket {
    /// Create a market order ticket.
    pub fn market(symbol: Symbol, side: Side, quantity: Decimal) -> Self {
        Self {
            symbol,
            side,
            quantity,
            order_type: OrderType::Market,
            time_in_force: TimeInForce::Day,
        }
    }

    /// Create a limit order ticket.
    pub fn limit(symbol: Symbol, side: Side, quantity: Decimal, price: Decimal) -> Self {
        Self {
            symbol,
            side,
            quantity,
            order_type: OrderType::Limit { price },
            time_in_force: TimeInForce::Day,
        }
    }

    /// Set the time in force.
    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }

    /// Reject tickets that cannot become orders.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.quantity <= Decimal::ZERO {
            return Err(ValidationError::InvalidOrder(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }
        if let OrderType::Limit { price } = self.order_type {
            if price <= Decimal::ZERO {
                return Err(ValidationError::InvalidOrder(format!(
                    "limit price must be positive, got {}",
                    price
                )));
            }
        }
        Ok(())
    }
}

/// A single execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    pub quantity: Decimal,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// An order held by the paper desk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub ticket: OrderTicket,
    pub status: OrderStatus,
    pub fill: Option<Fill>,
    /// Why the order was rejected or canceled, if it was
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Open a pending order for a validated ticket.
    pub fn open(ticket: OrderTicket) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            ticket,
            status: OrderStatus::Pending,
            fill: None,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.ticket.symbol
    }

    pub fn is_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }

    /// Record a complete fill.
    pub fn mark_filled(&mut self, price: Decimal) {
        let now = Utc::now();
        self.fill = Some(Fill {
            quantity: self.ticket.quantity,
            price,
            timestamp: now,
        });
        self.status = OrderStatus::Filled;
        self.updated_at = now;
    }

    /// Move to a terminal non-fill state with a reason.
    pub fn close(&mut self, status: OrderStatus, note: impl Into<String>) {
        self.status = status;
        self.note = Some(note.into());
        self.updated_at = Utc::now();
    }

    /// Notional value at the fill price, if filled.
    pub fn filled_value(&self) -> Option<Decimal> {
        self.fill.as_ref().map(|f| f.quantity * f.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn aapl() -> Symbol {
        Symbol::parse("AAPL").unwrap()
    }

    #[test]
    fn test_ticket_validation() {
        assert!(OrderTicket::market(aapl(), Side::Buy, dec!(10)).validate().is_ok());
        assert!(OrderTicket::market(aapl(), Side::Buy, dec!(0)).validate().is_err());
        assert!(OrderTicket::limit(aapl(), Side::Sell, dec!(5), dec!(0)).validate().is_err());
        assert!(OrderTicket::limit(aapl(), Side::Sell, dec!(5), dec!(151.25)).validate().is_ok());
    }

    #[test]
    fn test_order_lifecycle() {
        let mut order = Order::open(OrderTicket::market(aapl(), Side::Buy, dec!(10)));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(!order.status.is_terminal());

        order.mark_filled(dec!(150));
        assert!(order.is_filled());
        assert!(order.status.is_terminal());
        assert_eq!(order.filled_value(), Some(dec!(1500)));
    }

    #[test]
    fn test_time_in_force() {
        assert!(TimeInForce::Ioc.is_immediate());
        assert!(TimeInForce::Fok.is_immediate());
        assert!(!TimeInForce::default().is_immediate());
    }
}
