//! Storefront to ERP synchronization.
//!
//! # Architecture
//!
//! - [`order`] - Upsert storefront orders as ERP sales orders
//! - [`shipment`] - Fulfill and invoice orders; turn ERP fulfillments into
//!   storefront shipment messages
//! - [`poller`] - Watermark-driven fulfillment polling
//! - [`address`] - Address translation in both directions
//! - [`erp`] - ERP records and the gateway traits the bridge runs against
//! - [`config`] - Settings loaded from the environment
//!
//! Every operation takes a [`SyncContext`] and awaits its gateway calls one
//! at a time. Nothing is cached between operations.
//!
//! # Example
//!
//! ```rust,ignore
//! let ctx = SyncContext::new(gateways, BridgeConfig::from_env()?, addresses);
//!
//! let mut sync = OrderSync::resolve(&ctx, &payload).await?;
//! match sync.sync().await? {
//!     SyncOutcome::Rejected => eprintln!("{}", sync.errors()),
//!     outcome => println!("{outcome:?}"),
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod config;
pub mod erp;
pub mod error;
pub mod order;
pub mod poller;
pub mod shipment;

#[cfg(test)]
mod testing;

pub use address::{AddressTranslator, CodeTable, CountryCodes, StateCodes};
pub use config::{AdjustmentKind, BridgeConfig, ConfigError, Settings};
pub use erp::{ErpGateways, GatewayError};
pub use error::{Result, SyncError};
pub use order::{OrderSync, SyncOutcome};
pub use poller::FulfillmentPoller;
pub use shipment::{ShipmentBatch, ShipmentSync};

/// What a synchronization runs against.
#[derive(Debug, Clone)]
pub struct SyncContext {
    pub gateways: ErpGateways,
    pub config: BridgeConfig,
    pub addresses: AddressTranslator,
}

impl SyncContext {
    #[must_use]
    pub const fn new(
        gateways: ErpGateways,
        config: BridgeConfig,
        addresses: AddressTranslator,
    ) -> Self {
        Self {
            gateways,
            config,
            addresses,
        }
    }

    /// A fulfillment poller using the configured watermark and page size.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no poll timestamp is configured.
    pub fn poller(&self) -> Result<FulfillmentPoller, ConfigError> {
        FulfillmentPoller::from_config(&self.gateways, &self.config)
    }
}
