//! ERP Bridge Core - Shared types library.
//!
//! This crate provides the types exchanged between the storefront and the
//! ERP synchronization engine in `erp-bridge`:
//! - inbound order and shipment payloads sent by the storefront
//! - outbound shipment notifications built from ERP fulfillments
//! - identifiers, statuses and the fulfillment polling watermark
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no ERP transport, no
//! configuration loading. This keeps it lightweight and allows it to be used
//! by anything that produces or consumes bridge payloads.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, payloads, messages, statuses and the watermark

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
