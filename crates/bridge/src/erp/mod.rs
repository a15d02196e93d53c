//! ERP records and the gateways that read and write them.
//!
//! # Architecture
//!
//! - [`records`] - Record shapes (sales orders, fulfillments, invoices, ...)
//! - [`gateway`] - Async traits implemented by the ERP transport
//! - [`fields`] - Typed tables for caller-supplied extra fields
//!
//! The bridge never talks to the ERP directly; it is handed an
//! [`ErpGateways`] bundle and awaits one gateway call at a time.

pub mod fields;
pub mod gateway;
pub mod records;

use std::sync::Arc;

use thiserror::Error;

pub use fields::{ExtraFields, FieldSetter, FieldSpec};
pub use gateway::{
    CustomerGateway, FulfillmentGateway, FulfillmentQuery, InventoryGateway, InvoiceGateway,
    SalesOrderGateway,
};
pub use records::*;

/// Errors raised by gateway implementations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The ERP could not be reached or returned an unusable response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A record addressed by id does not exist.
    #[error("{record} {id} not found")]
    NotFound {
        /// Record type (e.g. "Sales order").
        record: &'static str,
        /// The id that was looked up.
        id: String,
    },
}

/// The gateways a synchronization runs against.
#[derive(Clone)]
pub struct ErpGateways {
    pub sales_orders: Arc<dyn SalesOrderGateway>,
    pub customers: Arc<dyn CustomerGateway>,
    pub inventory: Arc<dyn InventoryGateway>,
    pub fulfillments: Arc<dyn FulfillmentGateway>,
    pub invoices: Arc<dyn InvoiceGateway>,
}

impl std::fmt::Debug for ErpGateways {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpGateways").finish_non_exhaustive()
    }
}
