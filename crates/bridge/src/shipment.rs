//! Shipments in both directions.
//!
//! Inbound, a storefront shipment advances its ERP sales order: an order
//! awaiting fulfillment gets an item fulfillment and then an invoice, an
//! order awaiting billing gets only the invoice. Outbound, recently
//! modified ERP fulfillments become [`ShipmentMessage`]s for the storefront.

use std::collections::HashMap;

use erp_bridge_core::{
    ExternalId, InternalId, SalesOrderStatus, ShipStatus, ShipmentItem, ShipmentMessage,
    ShipmentPayload, Watermark,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info, instrument, warn};

use crate::SyncContext;
use crate::erp::{
    ExtraFields, FulfillmentItem, Invoice, ItemFulfillment, RecordRef, RemoteFulfillment,
    RemoteSalesOrder, Submission,
};
use crate::error::{Result, SyncError};
use crate::poller::FulfillmentPoller;

/// One polled page of shipment messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentBatch {
    pub messages: Vec<ShipmentMessage>,
    /// Where the next poll should start; `None` when nothing was found, in
    /// which case the current watermark stays.
    pub next_watermark: Option<Watermark>,
}

/// Synchronizes shipments between the storefront and the ERP.
#[derive(Debug, Clone, Copy)]
pub struct ShipmentSync<'a> {
    ctx: &'a SyncContext,
}

impl<'a> ShipmentSync<'a> {
    #[must_use]
    pub const fn new(ctx: &'a SyncContext) -> Self {
        Self { ctx }
    }

    /// Advance the payload's sales order and return it as it was found.
    ///
    /// | Order status        | Fulfillment | Invoice              |
    /// |---------------------|-------------|----------------------|
    /// | Pending Fulfillment | created     | if fulfillment added |
    /// | Pending Billing     | -           | created              |
    /// | anything else       | -           | -                    |
    ///
    /// # Errors
    ///
    /// Returns `SyncError::OrderNotFound` if the order is not in the ERP,
    /// `SyncError::Rejected` if the ERP returns error notices for a write,
    /// or `SyncError::Gateway` on gateway failures.
    #[instrument(skip_all, fields(order = ?payload.order_external_id()))]
    pub async fn import(&self, payload: &ShipmentPayload) -> Result<RemoteSalesOrder> {
        let external_id = payload
            .order_external_id()
            .ok_or(SyncError::MissingOrderReference)?;
        let order = self
            .ctx
            .gateways
            .sales_orders
            .find_by_external_id(&external_id)
            .await?
            .ok_or_else(|| SyncError::OrderNotFound(external_id.clone()))?;
        let order_id = order
            .internal_id
            .clone()
            .ok_or(SyncError::OrderNotFound(external_id))?;

        let fulfilled = if order.status == Some(SalesOrderStatus::PendingFulfillment) {
            self.create_item_fulfillment(&order_id, payload).await?
        } else {
            false
        };

        if fulfilled || order.status == Some(SalesOrderStatus::PendingBilling) {
            self.create_invoice(&order_id, payload).await?;
        } else {
            debug!(status = ?order.status, "Sales order not awaiting fulfillment or billing");
        }

        Ok(order)
    }

    /// Create an item fulfillment for the order.
    ///
    /// Returns whether the ERP accepted it.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Rejected` if the ERP returns error notices.
    #[instrument(skip(self, payload), fields(order_id = %order_id))]
    pub async fn create_item_fulfillment(
        &self,
        order_id: &InternalId,
        payload: &ShipmentPayload,
    ) -> Result<bool> {
        let mut fulfillment = ItemFulfillment {
            created_from: RecordRef::internal(order_id.clone()),
            ship_address: self
                .ctx
                .addresses
                .to_remote(payload.shipping_address.as_ref()),
            ..ItemFulfillment::default()
        };
        if let Some(fields) = &payload.fulfillment_fields {
            let applied = fulfillment.apply_extra_fields(fields);
            debug!(applied, "Applied extra fulfillment fields");
        }

        let submission = self.ctx.gateways.fulfillments.add(&fulfillment).await?;
        verify(&submission, "item fulfillment")?;

        info!(fulfillment_id = ?submission.internal_id, "Created item fulfillment");
        Ok(submission.is_accepted())
    }

    /// Create an untaxed invoice for the order.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Rejected` if the ERP returns error notices.
    #[instrument(skip(self, payload), fields(order_id = %order_id))]
    pub async fn create_invoice(
        &self,
        order_id: &InternalId,
        payload: &ShipmentPayload,
    ) -> Result<bool> {
        let mut invoice = Invoice {
            created_from: RecordRef::internal(order_id.clone()),
            tax_rate: Decimal::ZERO,
            is_taxable: false,
            ..Invoice::default()
        };
        if let Some(fields) = &payload.invoice_fields {
            let applied = invoice.apply_extra_fields(fields);
            debug!(applied, "Applied extra invoice fields");
        }

        let submission = self.ctx.gateways.invoices.add(&invoice).await?;
        verify(&submission, "invoice")?;

        info!(invoice_id = ?submission.internal_id, "Created invoice");
        Ok(submission.is_accepted())
    }

    /// Poll for fulfillments and turn them into messages.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Gateway` if the search or an order lookup fails.
    pub async fn poll(&self, poller: &FulfillmentPoller) -> Result<ShipmentBatch> {
        let fulfillments = poller.latest().await?;
        Ok(ShipmentBatch {
            messages: self.messages(&fulfillments).await?,
            next_watermark: last_modified_date(&fulfillments),
        })
    }

    /// One message per fulfillment, in the given order.
    ///
    /// Each originating sales order is fetched at most once.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Gateway` if an order lookup fails.
    #[instrument(skip_all, fields(count = fulfillments.len()))]
    pub async fn messages(&self, fulfillments: &[RemoteFulfillment]) -> Result<Vec<ShipmentMessage>> {
        let mut order_ids: HashMap<InternalId, Option<ExternalId>> = HashMap::new();
        let mut messages = Vec::with_capacity(fulfillments.len());

        for fulfillment in fulfillments {
            let order_id = match &fulfillment.created_from.internal_id {
                Some(internal_id) => {
                    if let Some(cached) = order_ids.get(internal_id) {
                        cached.clone()
                    } else {
                        let order = self.ctx.gateways.sales_orders.get(internal_id).await?;
                        order_ids.insert(internal_id.clone(), order.external_id.clone());
                        order.external_id
                    }
                }
                None => fulfillment.created_from.external_id.clone(),
            };
            messages.push(self.message(fulfillment, order_id));
        }

        debug!(orders = order_ids.len(), "Built shipment messages");
        Ok(messages)
    }

    fn message(
        &self,
        fulfillment: &RemoteFulfillment,
        order_id: Option<ExternalId>,
    ) -> ShipmentMessage {
        let ship_method = fulfillment.ship_method.as_ref();

        ShipmentMessage {
            id: fulfillment.internal_id.clone(),
            order_id,
            cost: fulfillment.shipping_cost,
            status: fulfillment
                .ship_status
                .as_ref()
                .map_or(ShipStatus::DEFAULT_LABEL, ShipStatus::label)
                .to_owned(),
            shipping_method: ship_method.and_then(|m| m.name.clone()),
            shipping_method_id: ship_method.and_then(|m| m.internal_id.clone()),
            tracking: fulfillment
                .packages
                .iter()
                .filter_map(|p| p.tracking_number.as_deref())
                .collect::<Vec<_>>()
                .join(", "),
            shipped_at: fulfillment.tran_date,
            shipping_address: self
                .ctx
                .addresses
                .to_storefront(fulfillment.ship_address.as_ref()),
            items: fulfillment.items.iter().map(shipment_item).collect(),
        }
    }
}

/// The watermark that resumes polling after `fulfillments`.
#[must_use]
pub fn last_modified_date(fulfillments: &[RemoteFulfillment]) -> Option<Watermark> {
    fulfillments
        .iter()
        .map(|f| f.last_modified)
        .max()
        .map(Watermark::after)
}

fn shipment_item(line: &FulfillmentItem) -> ShipmentItem {
    let name = line.item.name.clone().unwrap_or_default();
    ShipmentItem {
        product_id: name.clone(),
        name,
        quantity: line.quantity.trunc().to_i64().unwrap_or_default(),
    }
}

fn verify(submission: &Submission, record: &'static str) -> Result<()> {
    match submission.error_text() {
        Some(message) => {
            warn!(record, %message, "ERP rejected write");
            Err(SyncError::Rejected { record, message })
        }
        None => Ok(()),
    }
}
