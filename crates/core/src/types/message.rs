//! Outbound shipment notifications built from ERP fulfillments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ExternalId, InternalId};
use super::payload::Address;

/// A shipment notification for the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentMessage {
    /// Fulfillment internal id.
    pub id: InternalId,
    /// External identifier of the order the fulfillment was created from.
    pub order_id: Option<ExternalId>,
    pub cost: Option<Decimal>,
    pub status: String,
    /// Ship method name, absent when the ERP reference cannot be resolved.
    pub shipping_method: Option<String>,
    pub shipping_method_id: Option<InternalId>,
    /// Tracking numbers joined with `", "`.
    pub tracking: String,
    pub shipped_at: Option<DateTime<Utc>>,
    pub shipping_address: Option<Address>,
    pub items: Vec<ShipmentItem>,
}

/// A shipped line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentItem {
    pub name: String,
    pub product_id: String,
    pub quantity: i64,
}
