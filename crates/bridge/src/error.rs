//! Unified error handling for synchronizations.

use erp_bridge_core::ExternalId;
use thiserror::Error;

use crate::config::ConfigError;
use crate::erp::GatewayError;

/// Errors that abort a synchronization.
///
/// Recoverable conditions (a missing address, a broken ship method
/// reference) never surface here; they degrade to absent values.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An order line references an item the ERP does not know.
    #[error("Inventory item \"{0}\" not found in ERP")]
    ItemNotFound(String),

    /// An order line has neither a SKU nor a product id.
    #[error("Line item {0} has no SKU or product id")]
    MissingItemReference(usize),

    /// A payload carries neither an order number nor an order id.
    #[error("Payload has no order number or id")]
    MissingOrderReference,

    /// The referenced sales order does not exist in the ERP.
    #[error("Sales order \"{0}\" not found in ERP")]
    OrderNotFound(ExternalId),

    /// The ERP rejected a write with error-severity notices.
    #[error("ERP rejected {record}: {message}")]
    Rejected {
        /// Record type that was being written.
        record: &'static str,
        /// Joined error messages.
        message: String,
    },

    /// A gateway call failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Configuration needed by the operation is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
