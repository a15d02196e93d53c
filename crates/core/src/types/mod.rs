//! Core types for the ERP bridge.
//!
//! This module provides type-safe wrappers for the concepts shared between
//! the storefront payloads and the ERP records.

pub mod id;
pub mod message;
pub mod payload;
pub mod status;
pub mod watermark;

pub use id::*;
pub use message::{ShipmentItem, ShipmentMessage};
pub use payload::{
    Address, OrderLineItem, OrderPayload, Payment, ShipmentPayload, Totals,
};
pub use status::*;
pub use watermark::{Watermark, WatermarkError};
