//! Bridge configuration.
//!
//! Settings are plain string key/value pairs. They are usually loaded from
//! environment variables prefixed with `ERP_` (the prefix is stripped and the
//! rest lowercased, so `ERP_ITEM_FOR_TAXES` becomes `item_for_taxes`).
//!
//! # Keys
//!
//! All keys are optional.
//! - `sales_order_custom_form_id` - Custom form applied to new sales orders
//! - `item_for_taxes` - Virtual item for tax lines (default: Store Tax)
//! - `item_for_discounts` - Virtual item for discount lines (default: Store Discount)
//! - `item_for_adjustments` - Virtual item for adjustment lines (default: Store Adjustment)
//! - `poll_fulfillment_timestamp` - Fulfillment poll watermark (RFC 3339)
//! - `poll_page_size` - Maximum fulfillments per poll (default: 1000)

use std::collections::HashMap;

use erp_bridge_core::{InternalId, Watermark, WatermarkError};
use thiserror::Error;

const ENV_PREFIX: &str = "ERP_";
const DEFAULT_POLL_PAGE_SIZE: usize = 1000;
const MAX_POLL_PAGE_SIZE: usize = 1000;

pub const KEY_CUSTOM_FORM_ID: &str = "sales_order_custom_form_id";
pub const KEY_POLL_TIMESTAMP: &str = "poll_fulfillment_timestamp";
pub const KEY_POLL_PAGE_SIZE: &str = "poll_page_size";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing setting: {0}")]
    Missing(&'static str),
    #[error("Invalid setting {0}: {1}")]
    Invalid(&'static str, String),
    #[error("Invalid setting poll_fulfillment_timestamp: {0}")]
    Watermark(#[from] WatermarkError),
}

/// Raw string settings.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    /// Load settings from `ERP_`-prefixed environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_pairs(std::env::vars().filter_map(|(key, value)| {
            key.strip_prefix(ENV_PREFIX)
                .map(|key| (key.to_ascii_lowercase(), value))
        }))
    }

    /// Build settings from key/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The value for `key`, ignoring blank values.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// The value for `key`, or `default` when unset or blank.
    #[must_use]
    pub fn fetch(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_owned()
    }
}

/// A monetary total that is sent to the ERP as a line against a virtual item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdjustmentKind {
    Tax,
    Discount,
    Adjustment,
}

impl AdjustmentKind {
    /// Every kind, in the order lines are appended to an order.
    pub const ALL: [Self; 3] = [Self::Tax, Self::Discount, Self::Adjustment];

    /// Setting naming the virtual item for this kind.
    #[must_use]
    pub const fn setting_key(self) -> &'static str {
        match self {
            Self::Tax => "item_for_taxes",
            Self::Discount => "item_for_discounts",
            Self::Adjustment => "item_for_adjustments",
        }
    }

    /// Virtual item name used when none is configured.
    #[must_use]
    pub const fn default_item_name(self) -> &'static str {
        match self {
            Self::Tax => "Store Tax",
            Self::Discount => "Store Discount",
            Self::Adjustment => "Store Adjustment",
        }
    }
}

impl std::fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tax => write!(f, "tax"),
            Self::Discount => write!(f, "discount"),
            Self::Adjustment => write!(f, "adjustment"),
        }
    }
}

/// Typed bridge configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    settings: Settings,
    /// Custom form applied to newly created sales orders.
    pub custom_form_id: Option<InternalId>,
    /// Where the next fulfillment poll starts.
    pub poll_watermark: Option<Watermark>,
    /// Maximum number of fulfillments fetched per poll.
    pub poll_page_size: usize,
}

impl BridgeConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a setting is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_settings(Settings::from_env())
    }

    /// Derive typed configuration from raw settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Watermark` if the poll timestamp is not
    /// RFC 3339, or `ConfigError::Invalid` if the page size is not a number
    /// between 1 and 1000.
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let custom_form_id = settings.get(KEY_CUSTOM_FORM_ID).map(InternalId::from);

        let poll_watermark = settings
            .get(KEY_POLL_TIMESTAMP)
            .map(Watermark::parse)
            .transpose()?;

        let poll_page_size = match settings.get(KEY_POLL_PAGE_SIZE) {
            None => DEFAULT_POLL_PAGE_SIZE,
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|size| (1..=MAX_POLL_PAGE_SIZE).contains(size))
                .ok_or_else(|| {
                    ConfigError::Invalid(
                        KEY_POLL_PAGE_SIZE,
                        format!("must be between 1 and {MAX_POLL_PAGE_SIZE}, got {raw}"),
                    )
                })?,
        };

        Ok(Self {
            settings,
            custom_form_id,
            poll_watermark,
            poll_page_size,
        })
    }

    /// Name of the virtual item that carries `kind` totals.
    #[must_use]
    pub fn virtual_item_name(&self, kind: AdjustmentKind) -> String {
        self.settings
            .fetch(kind.setting_key(), kind.default_item_name())
    }

    /// Raw settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            custom_form_id: None,
            poll_watermark: None,
            poll_page_size: DEFAULT_POLL_PAGE_SIZE,
        }
    }
}
