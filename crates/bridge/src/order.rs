//! Storefront order to ERP sales order synchronization.
//!
//! An [`OrderSync`] handles one order payload. It first resolves whether the
//! order already exists in the ERP (by external id), then either creates a
//! new sales order or updates the existing one in place. Running it twice
//! for the same payload updates the order created by the first run.

use erp_bridge_core::{ExternalId, OrderPayload, SalesOrderStatus, Totals};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::SyncContext;
use crate::config::AdjustmentKind;
use crate::erp::{RecordRef, RemoteNotice, RemoteSalesOrder, SalesOrderItem, SalesOrderUpdate};
use crate::error::{Result, SyncError};

/// Which path an upsert took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new sales order was created.
    Created,
    /// The existing sales order was updated.
    Updated,
    /// The ERP rejected the write; see [`OrderSync::errors`].
    Rejected,
}

/// Synchronizes one storefront order.
#[derive(Debug)]
pub struct OrderSync<'a> {
    ctx: &'a SyncContext,
    payload: &'a OrderPayload,
    external_id: ExternalId,
    existing: Option<RemoteSalesOrder>,
    sales_order: RemoteSalesOrder,
    notices: Vec<RemoteNotice>,
}

impl<'a> OrderSync<'a> {
    /// Look the order up in the ERP and prepare the record to write.
    ///
    /// An existing order is addressed by its internal and external ids only,
    /// so an update leaves its status and custom form alone. A new order
    /// starts as Pending Fulfillment, with the configured custom form if
    /// there is one.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::MissingOrderReference` if the payload has neither
    /// a number nor an id, or `SyncError::Gateway` if the lookup fails.
    #[instrument(skip_all, fields(external_id = ?payload.external_id()))]
    pub async fn resolve(ctx: &'a SyncContext, payload: &'a OrderPayload) -> Result<Self> {
        let external_id = payload
            .external_id()
            .ok_or(SyncError::MissingOrderReference)?;

        let existing = ctx
            .gateways
            .sales_orders
            .find_by_external_id(&external_id)
            .await?;

        let sales_order = match &existing {
            Some(found) => RemoteSalesOrder {
                internal_id: found.internal_id.clone(),
                external_id: found.external_id.clone(),
                ..RemoteSalesOrder::default()
            },
            None => RemoteSalesOrder {
                status: Some(SalesOrderStatus::PendingFulfillment),
                external_id: Some(external_id.clone()),
                custom_form: ctx.config.custom_form_id.clone().map(RecordRef::internal),
                ..RemoteSalesOrder::default()
            },
        };

        debug!(imported = existing.is_some(), "Resolved sales order");

        Ok(Self {
            ctx,
            payload,
            external_id,
            existing,
            sales_order,
            notices: Vec::new(),
        })
    }

    /// Whether the order already exists in the ERP.
    #[must_use]
    pub const fn is_imported(&self) -> bool {
        self.existing.is_some()
    }

    /// The sales order as last written (or prepared).
    #[must_use]
    pub const fn sales_order(&self) -> &RemoteSalesOrder {
        &self.sales_order
    }

    /// The storefront order number (or id) the order is keyed by in the ERP.
    #[must_use]
    pub const fn external_id(&self) -> &ExternalId {
        &self.external_id
    }

    /// Whether the order's payments cover its total.
    #[must_use]
    pub fn paid(&self) -> bool {
        self.payload.is_paid()
    }

    /// Messages the ERP returned with the last write, joined for display.
    #[must_use]
    pub fn errors(&self) -> String {
        self.notices
            .iter()
            .map(|n| n.message.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Create the order if it is new, update it otherwise.
    ///
    /// # Errors
    ///
    /// See [`OrderSync::create`] and [`OrderSync::update`].
    pub async fn sync(&mut self) -> Result<SyncOutcome> {
        let (accepted, outcome) = if self.is_imported() {
            (self.update().await?, SyncOutcome::Updated)
        } else {
            (self.create().await?, SyncOutcome::Created)
        };
        Ok(if accepted {
            outcome
        } else {
            SyncOutcome::Rejected
        })
    }

    /// Create the sales order.
    ///
    /// Returns `Ok(false)` when the ERP rejects the order; the reasons are
    /// available from [`OrderSync::errors`]. On success the ERP-assigned
    /// transaction id and customer reference are read back onto
    /// [`OrderSync::sales_order`].
    ///
    /// # Errors
    ///
    /// Returns `SyncError::ItemNotFound` if a line item is not in the ERP
    /// (nothing is submitted), `SyncError::OrderNotFound` if the order cannot
    /// be read back after creation, or `SyncError::Gateway` on gateway
    /// failures.
    #[instrument(skip(self), fields(external_id = %self.external_id))]
    pub async fn create(&mut self) -> Result<bool> {
        let entity = self.set_up_customer().await?;
        let items = self.build_item_list().await?;
        let addresses = &self.ctx.addresses;

        self.sales_order.entity = Some(entity);
        self.sales_order.items = items;
        // Tax arrives as its own line; ERP-side tax would change the total.
        self.sales_order.is_taxable = Some(false);
        self.sales_order.bill_address = addresses.to_remote(self.payload.billing_address.as_ref());
        self.sales_order.shipping_cost = Some(self.payload.totals.shipping);
        self.sales_order.ship_address = addresses.to_remote(self.payload.shipping_address.as_ref());
        self.sales_order.tran_date = self.payload.placed_on;

        let orders = &self.ctx.gateways.sales_orders;
        let submission = orders.add(&self.sales_order).await?;
        let accepted = submission.is_accepted();
        let internal_id = submission.internal_id;
        self.notices = submission.notices;

        if !accepted {
            warn!(errors = %self.errors(), "ERP rejected sales order");
            return Ok(false);
        }

        let fresh = orders
            .find_by_external_id(&self.external_id)
            .await?
            .ok_or_else(|| SyncError::OrderNotFound(self.external_id.clone()))?;

        self.sales_order.internal_id = fresh.internal_id.or(internal_id);
        self.sales_order.tran_id = fresh.tran_id;
        if fresh.entity.is_some() {
            self.sales_order.entity = fresh.entity;
        }

        info!(
            internal_id = ?self.sales_order.internal_id,
            tran_id = ?self.sales_order.tran_id,
            "Created sales order"
        );
        Ok(true)
    }

    /// Update the existing sales order's lines, addresses and shipping cost.
    ///
    /// Returns `Ok(false)` when the ERP rejects the update.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::ItemNotFound` if a line item is not in the ERP,
    /// or `SyncError::Gateway` on gateway failures.
    #[instrument(skip(self), fields(external_id = %self.external_id))]
    pub async fn update(&mut self) -> Result<bool> {
        let addresses = &self.ctx.addresses;
        let fields = SalesOrderUpdate {
            items: self.build_item_list().await?,
            bill_address: addresses.to_remote(self.payload.billing_address.as_ref()),
            shipping_cost: self.payload.totals.shipping,
            ship_address: addresses.to_remote(self.payload.shipping_address.as_ref()),
        };

        let submission = self
            .ctx
            .gateways
            .sales_orders
            .update(&self.sales_order, &fields)
            .await?;
        let accepted = submission.is_accepted();
        self.notices = submission.notices;

        if accepted {
            self.sales_order.items = fields.items;
            self.sales_order.bill_address = fields.bill_address;
            self.sales_order.shipping_cost = Some(fields.shipping_cost);
            self.sales_order.ship_address = fields.ship_address;
            info!(internal_id = ?self.sales_order.internal_id, "Updated sales order");
        } else {
            warn!(errors = %self.errors(), "ERP rejected sales order update");
        }
        Ok(accepted)
    }

    /// Find the customer by email, creating them if needed.
    ///
    /// A customer without any stored address gets the order's shipping
    /// address.
    async fn set_up_customer(&self) -> Result<RecordRef> {
        let customers = &self.ctx.gateways.customers;

        let customer = match customers.find_by_external_id(&self.payload.email).await? {
            Some(customer) => {
                if customer.addresses.is_empty() {
                    debug!("Backfilling customer address");
                    customers
                        .update_address(&customer, self.payload.shipping_address.as_ref())
                        .await?;
                }
                customer
            }
            None => {
                debug!("Creating customer");
                customers.create(self.payload).await?
            }
        };

        Ok(RecordRef::external(customer.external_id))
    }

    /// Product lines followed by non-zero tax, discount and adjustment lines.
    async fn build_item_list(&self) -> Result<Vec<SalesOrderItem>> {
        let inventory = &self.ctx.gateways.inventory;
        let mut items =
            Vec::with_capacity(self.payload.line_items.len() + AdjustmentKind::ALL.len());

        for (index, line) in self.payload.line_items.iter().enumerate() {
            let reference = line
                .reference()
                .ok_or(SyncError::MissingItemReference(index))?;
            let item = inventory
                .find_by_item_id(reference)
                .await?
                .ok_or_else(|| SyncError::ItemNotFound(reference.to_owned()))?;
            items.push(SalesOrderItem::product(
                item.internal_id,
                line.quantity,
                line.amount(),
            ));
        }

        for kind in AdjustmentKind::ALL {
            let value = adjustment_total(&self.payload.totals, kind);
            if value.is_zero() {
                continue;
            }
            let name = self.ctx.config.virtual_item_name(kind);
            let item = inventory.find_or_create_virtual(&name).await?;
            items.push(SalesOrderItem::adjustment(item.internal_id, value));
        }

        Ok(items)
    }
}

const fn adjustment_total(totals: &Totals, kind: AdjustmentKind) -> Decimal {
    match kind {
        AdjustmentKind::Tax => totals.tax,
        AdjustmentKind::Discount => totals.discount,
        AdjustmentKind::Adjustment => totals.adjustment,
    }
}
