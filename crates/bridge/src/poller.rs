//! Watermark-driven polling of recently modified item fulfillments.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use erp_bridge_core::Watermark;
use tracing::{debug, instrument, warn};

use crate::config::{BridgeConfig, ConfigError, KEY_POLL_TIMESTAMP};
use crate::erp::{ErpGateways, FulfillmentGateway, FulfillmentQuery, RemoteFulfillment};
use crate::error::Result;

/// Largest page a poll returns.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Fetches fulfillments modified at or after a watermark.
///
/// Results are always ordered by last modification, oldest first, and
/// capped at the page size. Feeding [`Watermark::after`] of the last record
/// back in as the next watermark never returns the same fulfillment twice
/// and never skips one: when the page cap would split records sharing a
/// timestamp, the whole group is left for the next poll.
#[derive(Clone)]
pub struct FulfillmentPoller {
    gateway: Arc<dyn FulfillmentGateway>,
    watermark: Watermark,
    page_size: usize,
}

impl FulfillmentPoller {
    /// A poller starting at `watermark`. `page_size` is clamped to
    /// `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn FulfillmentGateway>,
        watermark: Watermark,
        page_size: usize,
    ) -> Self {
        Self {
            gateway,
            watermark,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// A poller using the configured watermark and page size.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no poll timestamp is configured.
    pub fn from_config(gateways: &ErpGateways, config: &BridgeConfig) -> Result<Self, ConfigError> {
        let watermark = config
            .poll_watermark
            .ok_or(ConfigError::Missing(KEY_POLL_TIMESTAMP))?;
        Ok(Self::new(
            Arc::clone(&gateways.fulfillments),
            watermark,
            config.poll_page_size,
        ))
    }

    #[must_use]
    pub const fn watermark(&self) -> Watermark {
        self.watermark
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Fulfillments modified between the watermark and now.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Gateway` if the search fails.
    pub async fn latest(&self) -> Result<Vec<RemoteFulfillment>> {
        self.latest_until(Utc::now()).await
    }

    /// Fulfillments modified between the watermark and `until`, inclusive.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Gateway` if the search fails.
    #[instrument(skip(self), fields(watermark = %self.watermark))]
    pub async fn latest_until(&self, until: DateTime<Utc>) -> Result<Vec<RemoteFulfillment>> {
        // One record past the page shows whether the cap splits a timestamp.
        let query = FulfillmentQuery {
            modified_from: self.watermark.as_datetime(),
            modified_to: until,
            page_size: self.page_size + 1,
        };

        let mut fulfillments = self.gateway.search(&query).await?;
        fulfillments.retain(|f| query.contains(f.last_modified));
        // Stable, so records sharing a timestamp keep the gateway's order.
        fulfillments.sort_by_key(|f| f.last_modified);

        if let Some(boundary) = fulfillments.get(self.page_size).map(|f| f.last_modified) {
            fulfillments.truncate(self.page_size);
            let tied = fulfillments
                .iter()
                .rev()
                .take_while(|f| f.last_modified == boundary)
                .count();
            if tied < fulfillments.len() {
                fulfillments.truncate(fulfillments.len() - tied);
            } else {
                warn!(
                    %boundary,
                    page_size = self.page_size,
                    "Page holds a single timestamp; later records at it will be skipped"
                );
            }
        }

        debug!(count = fulfillments.len(), "Fetched fulfillments");
        Ok(fulfillments)
    }
}

impl std::fmt::Debug for FulfillmentPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FulfillmentPoller")
            .field("watermark", &self.watermark)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use erp_bridge_core::InternalId;

    use super::*;
    use crate::config::Settings;
    use crate::erp::RecordRef;
    use crate::testing::MemoryErp;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, second)
            .unwrap()
    }

    fn fulfillment(id: &str, last_modified: DateTime<Utc>) -> RemoteFulfillment {
        RemoteFulfillment {
            internal_id: InternalId::new(id),
            created_from: RecordRef::internal("SO-1"),
            ship_status: None,
            ship_method: None,
            shipping_cost: None,
            packages: vec![],
            tran_date: None,
            last_modified,
            ship_address: None,
            items: vec![],
        }
    }

    fn ids(fulfillments: &[RemoteFulfillment]) -> Vec<&str> {
        fulfillments.iter().map(|f| f.internal_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_results_are_oldest_first() {
        let erp = MemoryErp::default();
        erp.add_fulfillment(fulfillment("3", at(12, 0, 0)));
        erp.add_fulfillment(fulfillment("1", at(10, 0, 0)));
        erp.add_fulfillment(fulfillment("2a", at(11, 0, 0)));
        erp.add_fulfillment(fulfillment("2b", at(11, 0, 0)));
        erp.add_fulfillment(fulfillment("old", at(9, 0, 0)));

        let poller = FulfillmentPoller::new(
            erp.gateways().fulfillments,
            Watermark::new(at(10, 0, 0)),
            1000,
        );
        let batch = poller.latest_until(at(13, 0, 0)).await.unwrap();

        assert_eq!(ids(&batch), vec!["1", "2a", "2b", "3"]);

        let searches = erp.searches();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].modified_from, at(10, 0, 0));
        assert_eq!(searches[0].modified_to, at(13, 0, 0));
    }

    #[tokio::test]
    async fn test_next_watermark_never_repeats_records() {
        let erp = MemoryErp::default();
        erp.add_fulfillment(fulfillment("1", at(10, 0, 0)));
        erp.add_fulfillment(fulfillment("2", at(10, 30, 0)));

        let gateway = erp.gateways().fulfillments;
        let first = FulfillmentPoller::new(Arc::clone(&gateway), Watermark::new(at(9, 0, 0)), 1000)
            .latest_until(at(11, 0, 0))
            .await
            .unwrap();
        assert_eq!(ids(&first), vec!["1", "2"]);

        erp.add_fulfillment(fulfillment("3", at(10, 30, 1)));
        let next = Watermark::after(first[1].last_modified);
        let second = FulfillmentPoller::new(gateway, next, 1000)
            .latest_until(at(11, 0, 0))
            .await
            .unwrap();
        assert_eq!(ids(&second), vec!["3"]);
    }

    #[tokio::test]
    async fn test_page_size_caps_results() {
        let erp = MemoryErp::default();
        for minute in (0..5).rev() {
            erp.add_fulfillment(fulfillment(&minute.to_string(), at(10, minute, 0)));
        }

        let poller = FulfillmentPoller::new(
            erp.gateways().fulfillments,
            Watermark::new(at(10, 0, 0)),
            2,
        );
        let batch = poller.latest_until(at(11, 0, 0)).await.unwrap();

        assert_eq!(ids(&batch), vec!["0", "1"]);
        assert_eq!(erp.searches()[0].page_size, 3);
    }

    #[tokio::test]
    async fn test_page_cap_never_splits_a_timestamp() {
        let erp = MemoryErp::default();
        erp.add_fulfillment(fulfillment("a", at(10, 0, 0)));
        erp.add_fulfillment(fulfillment("b", at(10, 1, 0)));
        erp.add_fulfillment(fulfillment("c", at(10, 1, 0)));

        let gateway = erp.gateways().fulfillments;
        let first = FulfillmentPoller::new(Arc::clone(&gateway), Watermark::new(at(10, 0, 0)), 2)
            .latest_until(at(11, 0, 0))
            .await
            .unwrap();
        assert_eq!(ids(&first), vec!["a"]);

        let next = Watermark::after(first[0].last_modified);
        let second = FulfillmentPoller::new(gateway, next, 2)
            .latest_until(at(11, 0, 0))
            .await
            .unwrap();
        assert_eq!(ids(&second), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_single_timestamp_page_is_kept() {
        let erp = MemoryErp::default();
        for id in ["a", "b", "c"] {
            erp.add_fulfillment(fulfillment(id, at(10, 0, 0)));
        }

        let poller = FulfillmentPoller::new(
            erp.gateways().fulfillments,
            Watermark::new(at(10, 0, 0)),
            2,
        );
        let batch = poller.latest_until(at(11, 0, 0)).await.unwrap();

        assert_eq!(ids(&batch), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_records_outside_window_are_dropped() {
        let erp = MemoryErp::default();
        erp.ignore_search_window();
        erp.add_fulfillment(fulfillment("early", at(9, 59, 59)));
        erp.add_fulfillment(fulfillment("inside", at(10, 30, 0)));
        erp.add_fulfillment(fulfillment("late", at(11, 0, 1)));

        let poller = FulfillmentPoller::new(
            erp.gateways().fulfillments,
            Watermark::new(at(10, 0, 0)),
            1000,
        );
        let batch = poller.latest_until(at(11, 0, 0)).await.unwrap();

        assert_eq!(ids(&batch), vec!["inside"]);
    }

    #[test]
    fn test_page_size_is_clamped() {
        let erp = MemoryErp::default();
        let watermark = Watermark::new(at(10, 0, 0));
        let poller = FulfillmentPoller::new(erp.gateways().fulfillments, watermark, 5000);
        assert_eq!(poller.page_size(), MAX_PAGE_SIZE);
        let poller = FulfillmentPoller::new(erp.gateways().fulfillments, watermark, 0);
        assert_eq!(poller.page_size(), 1);
    }

    #[test]
    fn test_from_config_requires_watermark() {
        let erp = MemoryErp::default();
        let result = FulfillmentPoller::from_config(&erp.gateways(), &BridgeConfig::default());
        assert!(matches!(
            result,
            Err(ConfigError::Missing("poll_fulfillment_timestamp"))
        ));

        let config = BridgeConfig::from_settings(Settings::from_pairs([
            ("poll_fulfillment_timestamp", "2024-03-01T10:00:00Z"),
            ("poll_page_size", "50"),
        ]))
        .unwrap();
        let poller = FulfillmentPoller::from_config(&erp.gateways(), &config).unwrap();
        assert_eq!(poller.watermark().as_datetime(), at(10, 0, 0));
        assert_eq!(poller.page_size(), 50);
    }
}
