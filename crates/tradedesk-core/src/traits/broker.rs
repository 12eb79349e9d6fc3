//! Broker trait definition.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::BrokerError;
use crate::types::{Account, Order, OrderTicket};

/// Order entry for the desk.
///
/// The only implementation shipped is the paper broker; real routing lives
/// outside this workspace.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Get a snapshot of the account.
    async fn get_account(&self) -> Result<Account, BrokerError>;

    /// Submit a new order.
    ///
    /// # Returns
    /// The created order with an ID and initial status
    async fn submit_order(&self, ticket: OrderTicket) -> Result<Order, BrokerError>;

    /// Cancel a pending order.
    async fn cancel_order(&self, order_id: Uuid) -> Result<Order, BrokerError>;

    /// Get the current state of an order.
    async fn get_order(&self, order_id: Uuid) -> Result<Order, BrokerError>;

    /// Get all orders that are still pending.
    async fn get_open_orders(&self) -> Result<Vec<Order>, BrokerError>;

    /// Get the broker name.
    fn name(&self) -> &str;
}
