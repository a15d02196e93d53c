//! Inbound payloads sent by the storefront.
//!
//! Field names follow the storefront's JSON (`firstname`, `zipcode`,
//! `placed_on`), so payloads deserialize without renames.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::ExternalId;

/// An order as placed on the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayload {
    /// Storefront order number (preferred external identifier).
    #[serde(default)]
    pub number: Option<String>,
    /// Storefront order id, used when no number is present.
    #[serde(default)]
    pub id: Option<String>,
    /// Customer email, the customer's external identifier in the ERP.
    pub email: String,
    #[serde(default)]
    pub line_items: Vec<OrderLineItem>,
    pub totals: Totals,
    #[serde(default)]
    pub billing_address: Option<Address>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub placed_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl OrderPayload {
    /// External identifier of the order: the number, falling back to the id.
    #[must_use]
    pub fn external_id(&self) -> Option<ExternalId> {
        self.number
            .as_deref()
            .or(self.id.as_deref())
            .map(ExternalId::from)
    }

    /// Sum of all payment amounts.
    #[must_use]
    pub fn payment_total(&self) -> Decimal {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// Whether the payments cover the order total.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_total() >= self.totals.order
    }
}

/// A purchased product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: u32,
    /// Unit price.
    pub price: Decimal,
}

impl OrderLineItem {
    /// Reference used to look the item up in the ERP: SKU, else product id.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.sku.as_deref().or(self.product_id.as_deref())
    }

    /// Line amount, `quantity × price`.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.quantity) * self.price
    }
}

/// Order totals. Missing adjustment totals count as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub order: Decimal,
    #[serde(default)]
    pub shipping: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub adjustment: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub amount: Decimal,
}

/// A storefront address. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A shipment notification sent by the storefront for an existing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentPayload {
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    /// Extra fields applied to the invoice record.
    #[serde(default)]
    pub invoice_fields: Option<Map<String, Value>>,
    /// Extra fields applied to the fulfillment record.
    #[serde(default)]
    pub fulfillment_fields: Option<Map<String, Value>>,
}

impl ShipmentPayload {
    /// External identifier of the shipped order.
    #[must_use]
    pub fn order_external_id(&self) -> Option<ExternalId> {
        self.order_number
            .as_deref()
            .or(self.order_id.as_deref())
            .map(ExternalId::from)
    }
}
