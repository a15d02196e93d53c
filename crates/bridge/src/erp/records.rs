//! ERP record shapes exchanged with the gateways.
//!
//! These mirror the subset of the ERP schema the bridge reads and writes.
//! Every field the ERP may leave unset is an `Option`; `None` fields are
//! not sent on writes.

use chrono::{DateTime, Utc};
use erp_bridge_core::{ExternalId, InternalId, SalesOrderStatus, ShipStatus, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// References
// =============================================================================

/// A pointer to another ERP record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<InternalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<ExternalId>,
    /// Display name, only populated on reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RecordRef {
    /// Reference a record by its ERP internal id.
    #[must_use]
    pub fn internal(id: impl Into<InternalId>) -> Self {
        Self {
            internal_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Reference a record by its external id.
    #[must_use]
    pub fn external(id: impl Into<ExternalId>) -> Self {
        Self {
            external_id: Some(id.into()),
            ..Self::default()
        }
    }
}

/// An address in the ERP's transaction address schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addressee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// ERP country enumeration value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Digits only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

// =============================================================================
// Sales orders
// =============================================================================

/// A sales order line.
///
/// Product lines carry a quantity and an amount; adjustment lines (tax,
/// discount, fees) carry only a rate against a virtual item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOrderItem {
    pub item: RecordRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
}

impl SalesOrderItem {
    /// A product line priced at `amount`.
    #[must_use]
    pub const fn product(item: InternalId, quantity: u32, amount: Decimal) -> Self {
        Self {
            item: RecordRef {
                internal_id: Some(item),
                external_id: None,
                name: None,
            },
            quantity: Some(quantity),
            amount: Some(amount),
            rate: None,
        }
    }

    /// An adjustment line against a virtual item.
    #[must_use]
    pub const fn adjustment(item: InternalId, rate: Decimal) -> Self {
        Self {
            item: RecordRef {
                internal_id: Some(item),
                external_id: None,
                name: None,
            },
            quantity: None,
            amount: None,
            rate: Some(rate),
        }
    }
}

/// A remote sales order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSalesOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<InternalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<ExternalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tran_id: Option<TransactionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SalesOrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_form: Option<RecordRef>,
    /// The customer the order belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<RecordRef>,
    #[serde(default)]
    pub items: Vec<SalesOrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_taxable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_address: Option<RemoteAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_address: Option<RemoteAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tran_date: Option<DateTime<Utc>>,
}

/// Fields sent when updating an existing sales order in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOrderUpdate {
    pub items: Vec<SalesOrderItem>,
    pub bill_address: Option<RemoteAddress>,
    pub shipping_cost: Decimal,
    pub ship_address: Option<RemoteAddress>,
}

// =============================================================================
// Customers and items
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub internal_id: Option<InternalId>,
    /// The customer's email.
    pub external_id: ExternalId,
    /// Address book entries.
    #[serde(default)]
    pub addresses: Vec<RemoteAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub internal_id: InternalId,
    #[serde(default)]
    pub name: Option<String>,
}

// =============================================================================
// Fulfillments and invoices
// =============================================================================

/// An item fulfillment to create against a sales order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFulfillment {
    pub created_from: RecordRef,
    pub ship_address: Option<RemoteAddress>,
    pub memo: Option<String>,
    pub tran_date: Option<String>,
    pub ship_status: Option<String>,
    pub ship_method: Option<RecordRef>,
    pub department: Option<RecordRef>,
    pub location: Option<RecordRef>,
    pub class: Option<RecordRef>,
}

/// An invoice to create against a sales order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub created_from: RecordRef,
    pub tax_rate: Decimal,
    pub is_taxable: bool,
    pub memo: Option<String>,
    pub other_ref_num: Option<String>,
    pub tran_date: Option<String>,
    pub ship_method: Option<RecordRef>,
    pub terms: Option<RecordRef>,
    pub sales_rep: Option<RecordRef>,
    pub department: Option<RecordRef>,
    pub location: Option<RecordRef>,
    pub class: Option<RecordRef>,
}

/// A package on a fulfillment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub tracking_number: Option<String>,
}

/// A fulfilled line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentItem {
    pub item: RecordRef,
    pub quantity: Decimal,
}

/// A fulfillment as read back from the ERP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFulfillment {
    pub internal_id: InternalId,
    /// The sales order the fulfillment was created from.
    pub created_from: RecordRef,
    #[serde(default)]
    pub ship_status: Option<ShipStatus>,
    /// `None`, or a reference whose name could not be resolved, when the
    /// ship method record is broken.
    #[serde(default)]
    pub ship_method: Option<RecordRef>,
    #[serde(default)]
    pub shipping_cost: Option<Decimal>,
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub tran_date: Option<DateTime<Utc>>,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub ship_address: Option<RemoteAddress>,
    #[serde(default)]
    pub items: Vec<FulfillmentItem>,
}

// =============================================================================
// Submissions
// =============================================================================

/// Severity of a notice returned with a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warn,
    Info,
}

/// A status notice the ERP attached to a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNotice {
    pub severity: Severity,
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

impl RemoteNotice {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warn,
            code: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Outcome of an add or update call that reached the ERP.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    /// Internal id of the written record; `None` when the write was rejected.
    pub internal_id: Option<InternalId>,
    pub notices: Vec<RemoteNotice>,
}

impl Submission {
    /// A successful write with no notices.
    #[must_use]
    pub const fn accepted(internal_id: InternalId) -> Self {
        Self {
            internal_id: Some(internal_id),
            notices: Vec::new(),
        }
    }

    /// A rejected write.
    #[must_use]
    pub const fn rejected(notices: Vec<RemoteNotice>) -> Self {
        Self {
            internal_id: None,
            notices,
        }
    }

    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.internal_id.is_some()
    }

    /// Error-severity notices joined into one message, if there are any.
    #[must_use]
    pub fn error_text(&self) -> Option<String> {
        let text = self
            .notices
            .iter()
            .filter(|n| n.is_error())
            .map(|n| n.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        (!text.is_empty()).then_some(text)
    }
}
