//! Paper trading broker for simulation.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use tradedesk_core::error::BrokerError;
use tradedesk_core::traits::Broker;
use tradedesk_core::types::{
    Account, Holding, Order, OrderStatus, OrderTicket, Side, Symbol, TimeInForce,
};
use uuid::Uuid;

/// Paper trading broker.
///
/// Orders rest as pending until [`PaperBroker::execute_at_price`] offers them
/// a market price. Long-only: a sell can never exceed the held quantity.
pub struct PaperBroker {
    account: Arc<Mutex<Account>>,
    orders: Arc<Mutex<HashMap<Uuid, Order>>>,
    slippage_pct: Decimal,
}

impl PaperBroker {
    /// Create a new paper broker with initial capital.
    pub fn new(initial_capital: Decimal) -> Self {
        Self {
            account: Arc::new(Mutex::new(Account::new(initial_capital))),
            orders: Arc::new(Mutex::new(HashMap::new())),
            slippage_pct: Decimal::ZERO,
        }
    }

    /// Set slippage percentage applied against the trader on every fill.
    pub fn with_slippage(mut self, slippage_pct: Decimal) -> Self {
        self.slippage_pct = slippage_pct.max(Decimal::ZERO);
        self
    }

    pub fn slippage_pct(&self) -> Decimal {
        self.slippage_pct
    }

    fn account(&self) -> MutexGuard<'_, Account> {
        self.account.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn orders(&self) -> MutexGuard<'_, HashMap<Uuid, Order>> {
        self.orders.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fill_price(&self, side: Side, market_price: Decimal) -> Decimal {
        let slip = self.slippage_pct / dec!(100);
        let price = match side {
            Side::Buy => market_price * (dec!(1) + slip),
            Side::Sell => market_price * (dec!(1) - slip),
        };
        price.round_dp(4)
    }

    /// Try to fill a pending order at the given market price.
    ///
    /// A limit order that is not marketable stays pending, unless it is
    /// IOC/FOK, in which case it is canceled. A buy the account cannot pay
    /// for, or a sell larger than the holding, returns an error; IOC/FOK
    /// orders are rejected in that case, others stay pending. Orders that
    /// are no longer pending are returned unchanged.
    pub fn execute_at_price(
        &self,
        order_id: Uuid,
        market_price: Decimal,
    ) -> Result<Order, BrokerError> {
        if market_price <= Decimal::ZERO {
            return Err(BrokerError::OrderRejected(format!(
                "market price must be positive, got {}",
                market_price
            )));
        }

        let mut orders = self.orders();
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| BrokerError::OrderNotFound(order_id.to_string()))?;

        if order.status.is_terminal() {
            return Ok(order.clone());
        }

        let OrderTicket {
            ref symbol,
            side,
            quantity,
            order_type,
            time_in_force,
        } = order.ticket;
        let symbol = symbol.clone();
        let fill_price = self.fill_price(side, market_price);

        // Check if limit order can be filled
        if let Some(limit) = order_type.limit_price() {
            let marketable = match side {
                Side::Buy => fill_price <= limit,
                Side::Sell => fill_price >= limit,
            };
            if !marketable {
                if time_in_force.is_immediate() {
                    order.close(
                        OrderStatus::Canceled,
                        format!("limit {} not marketable at {}", limit, fill_price),
                    );
                    info!(order = %order_id, %symbol, "immediate limit order canceled unfilled");
                }
                return Ok(order.clone());
            }
        }

        let mut account = self.account();
        let shortfall = match side {
            Side::Buy => {
                let cost = fill_price * quantity;
                (cost > account.cash).then(|| BrokerError::InsufficientFunds {
                    required: cost,
                    available: account.cash,
                })
            }
            Side::Sell => {
                let held = account.held(&symbol);
                (quantity > held).then(|| BrokerError::InsufficientPosition {
                    symbol: symbol.to_string(),
                    requested: quantity,
                    held,
                })
            }
        };

        if let Some(err) = shortfall {
            if time_in_force.is_immediate() {
                order.close(OrderStatus::Rejected, err.to_string());
            }
            warn!(order = %order_id, %symbol, error = %err, "fill refused");
            return Err(err);
        }

        account.apply_fill(&symbol, side, quantity, fill_price);
        order.mark_filled(fill_price);
        info!(
            order = %order_id,
            %symbol,
            %side,
            %quantity,
            price = %fill_price,
            cash = %account.cash,
            "order filled"
        );

        Ok(order.clone())
    }

    /// Cancel every pending DAY order, as at the session close.
    pub fn close_session(&self) -> Vec<Order> {
        let mut orders = self.orders();
        let expired: Vec<Order> = orders
            .values_mut()
            .filter(|o| !o.status.is_terminal() && o.ticket.time_in_force == TimeInForce::Day)
            .map(|o| {
                o.close(OrderStatus::Canceled, "day order expired");
                o.clone()
            })
            .collect();
        debug!(expired = expired.len(), "session closed");
        expired
    }

    /// Current holdings.
    pub fn positions(&self) -> Vec<(Symbol, Holding)> {
        self.account()
            .holdings
            .iter()
            .map(|(symbol, holding)| (symbol.clone(), holding.clone()))
            .collect()
    }

    /// Get a snapshot of the account.
    pub fn account_snapshot(&self) -> Account {
        self.account().clone()
    }
}

#[async_trait]
impl Broker for PaperBroker {
    async fn get_account(&self) -> Result<Account, BrokerError> {
        Ok(self.account_snapshot())
    }

    async fn submit_order(&self, ticket: OrderTicket) -> Result<Order, BrokerError> {
        ticket.validate()?;

        // Funds are checked at fill time since the fill price is unknown here.
        if ticket.side == Side::Sell {
            let held = self.account().held(&ticket.symbol);
            if ticket.quantity > held {
                return Err(BrokerError::InsufficientPosition {
                    symbol: ticket.symbol.to_string(),
                    requested: ticket.quantity,
                    held,
                });
            }
        }

        let order = Order::open(ticket);
        info!(
            order = %order.id,
            symbol = %order.symbol(),
            side = %order.ticket.side,
            quantity = %order.ticket.quantity,
            kind = %order.ticket.order_type,
            "order submitted"
        );

        self.orders().insert(order.id, order.clone());
        Ok(order)
    }

    async fn cancel_order(&self, order_id: Uuid) -> Result<Order, BrokerError> {
        let mut orders = self.orders();
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| BrokerError::OrderNotFound(order_id.to_string()))?;

        if order.status.is_terminal() {
            return Err(BrokerError::OrderRejected(format!(
                "order {} is no longer pending",
                order_id
            )));
        }

        order.close(OrderStatus::Canceled, "canceled by user");
        info!(order = %order_id, "order canceled");
        Ok(order.clone())
    }

    async fn get_order(&self, order_id: Uuid) -> Result<Order, BrokerError> {
        self.orders()
            .get(&order_id)
            .cloned()
            .ok_or_else(|| BrokerError::OrderNotFound(order_id.to_string()))
    }

    async fn get_open_orders(&self) -> Result<Vec<Order>, BrokerError> {
        let mut open: Vec<Order> = self
            .orders()
            .values()
            .filter(|o| !o.status.is_terminal())
            .cloned()
            .collect();
        open.sort_by_key(|o| o.created_at);
        Ok(open)
    }

    fn name(&self) -> &str {
        "Paper Broker"
    }
}
