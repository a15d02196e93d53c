//! Gateway traits the bridge consumes.
//!
//! Implementations own the ERP transport (sessions, retries, timeouts).
//! The bridge only awaits one call at a time per synchronization.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use erp_bridge_core::{Address, ExternalId, InternalId, OrderPayload};

use super::GatewayError;
use super::records::{
    Customer, InventoryItem, Invoice, ItemFulfillment, RemoteFulfillment, RemoteSalesOrder,
    SalesOrderUpdate, Submission,
};

/// Sales order records.
#[async_trait]
pub trait SalesOrderGateway: Send + Sync {
    /// Find a sales order by the external id the bridge assigned it.
    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<RemoteSalesOrder>, GatewayError>;

    /// Fetch a sales order by internal id.
    async fn get(&self, internal_id: &InternalId) -> Result<RemoteSalesOrder, GatewayError>;

    /// Create a sales order.
    async fn add(&self, order: &RemoteSalesOrder) -> Result<Submission, GatewayError>;

    /// Update an existing sales order in place with `fields`.
    async fn update(
        &self,
        order: &RemoteSalesOrder,
        fields: &SalesOrderUpdate,
    ) -> Result<Submission, GatewayError>;
}

/// Customer records, keyed externally by email.
#[async_trait]
pub trait CustomerGateway: Send + Sync {
    async fn find_by_external_id(&self, email: &str) -> Result<Option<Customer>, GatewayError>;

    /// Create a customer from the order that introduced them.
    async fn create(&self, order: &OrderPayload) -> Result<Customer, GatewayError>;

    /// Add `address` to the customer's address book.
    async fn update_address(
        &self,
        customer: &Customer,
        address: Option<&Address>,
    ) -> Result<(), GatewayError>;
}

/// Inventory and virtual (non-inventory) items.
#[async_trait]
pub trait InventoryGateway: Send + Sync {
    /// Resolve a SKU or product id to an inventory item.
    async fn find_by_item_id(&self, reference: &str)
    -> Result<Option<InventoryItem>, GatewayError>;

    /// Resolve the named virtual item, creating it when it does not exist.
    async fn find_or_create_virtual(&self, name: &str) -> Result<InventoryItem, GatewayError>;
}

/// A bounded search over item fulfillments.
///
/// Matches fulfillments whose last modification falls within
/// `[modified_from, modified_to]`, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfillmentQuery {
    pub modified_from: DateTime<Utc>,
    pub modified_to: DateTime<Utc>,
    /// Maximum number of records to return.
    pub page_size: usize,
}

impl FulfillmentQuery {
    #[must_use]
    pub fn contains(&self, modified: DateTime<Utc>) -> bool {
        self.modified_from <= modified && modified <= self.modified_to
    }
}

/// Item fulfillment records.
#[async_trait]
pub trait FulfillmentGateway: Send + Sync {
    async fn add(&self, fulfillment: &ItemFulfillment) -> Result<Submission, GatewayError>;

    /// Search item fulfillment transactions only; other transaction types
    /// modified in the same window are excluded.
    ///
    /// When more than `page_size` records match, the oldest `page_size` by
    /// last modification are returned. Result order is unspecified.
    async fn search(
        &self,
        query: &FulfillmentQuery,
    ) -> Result<Vec<RemoteFulfillment>, GatewayError>;
}

/// Invoice records.
#[async_trait]
pub trait InvoiceGateway: Send + Sync {
    async fn add(&self, invoice: &Invoice) -> Result<Submission, GatewayError>;
}
