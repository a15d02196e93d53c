//! Status types for ERP records.
//!
//! The ERP reports statuses in two spellings: a display name on reads
//! ("Pending Fulfillment") and an enumeration value on writes
//! (`_pendingFulfillment`). Both parse into the same variant; serialization
//! always produces the enumeration value.

use serde::{Deserialize, Serialize};

/// Prefix the ERP puts in front of every enumeration value.
pub const ENUM_SENTINEL: char = '_';

/// Lifecycle status of a remote sales order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SalesOrderStatus {
    PendingApproval,
    PendingFulfillment,
    PartiallyFulfilled,
    PendingBillingPartiallyFulfilled,
    PendingBilling,
    Billed,
    Closed,
    Cancelled,
    /// Any status this bridge does not act on, kept verbatim.
    Other(String),
}

impl SalesOrderStatus {
    const KNOWN: [(Self, &'static str, &'static str); 8] = [
        (Self::PendingApproval, "Pending Approval", "_pendingApproval"),
        (Self::PendingFulfillment, "Pending Fulfillment", "_pendingFulfillment"),
        (Self::PartiallyFulfilled, "Partially Fulfilled", "_partiallyFulfilled"),
        (
            Self::PendingBillingPartiallyFulfilled,
            "Pending Billing/Partially Fulfilled",
            "_pendingBillingPartFulfilled",
        ),
        (Self::PendingBilling, "Pending Billing", "_pendingBilling"),
        (Self::Billed, "Billed", "_fullyBilled"),
        (Self::Closed, "Closed", "_closed"),
        (Self::Cancelled, "Cancelled", "_cancelled"),
    ];

    /// Parse either the display name or the enumeration value.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|(_, display, value)| *display == s || *value == s)
            .map_or_else(|| Self::Other(s.to_owned()), |(status, _, _)| status.clone())
    }

    /// Display name as reported on reads.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Other(raw) => raw,
            known => Self::KNOWN
                .iter()
                .find(|(status, _, _)| status == known)
                .map_or("", |(_, display, _)| *display),
        }
    }

    /// Enumeration value used when writing the status.
    #[must_use]
    pub fn enum_value(&self) -> &str {
        match self {
            Self::Other(raw) => raw,
            known => Self::KNOWN
                .iter()
                .find(|(status, _, _)| status == known)
                .map_or("", |(_, _, value)| *value),
        }
    }
}

impl std::fmt::Display for SalesOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl From<String> for SalesOrderStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<SalesOrderStatus> for String {
    fn from(status: SalesOrderStatus) -> Self {
        status.enum_value().to_owned()
    }
}

/// Ship status of a remote fulfillment, as the raw enumeration value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipStatus(String);

impl ShipStatus {
    /// Label used when the ERP reports no ship status.
    pub const DEFAULT_LABEL: &'static str = "shipped";

    /// Wrap a raw enumeration value (e.g. `_shipped`).
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Storefront-facing label: the value without its sentinel prefix.
    ///
    /// Values that do not carry the sentinel are returned unchanged, so a
    /// schema without the prefix convention is not truncated.
    #[must_use]
    pub fn label(&self) -> &str {
        let label = self.0.strip_prefix(ENUM_SENTINEL).unwrap_or(&self.0);
        if label.is_empty() {
            Self::DEFAULT_LABEL
        } else {
            label
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parses_both_spellings() {
        assert_eq!(
            SalesOrderStatus::parse("Pending Fulfillment"),
            SalesOrderStatus::PendingFulfillment
        );
        assert_eq!(
            SalesOrderStatus::parse("_pendingBilling"),
            SalesOrderStatus::PendingBilling
        );
        assert_eq!(
            SalesOrderStatus::parse("Something Else"),
            SalesOrderStatus::Other("Something Else".to_string())
        );
    }

    #[test]
    fn test_status_spellings() {
        let status = SalesOrderStatus::PendingFulfillment;
        assert_eq!(status.to_string(), "Pending Fulfillment");
        assert_eq!(status.enum_value(), "_pendingFulfillment");
    }

    #[test]
    fn test_status_serde_writes_enum_value() {
        let json = serde_json::to_string(&SalesOrderStatus::PendingFulfillment).unwrap();
        assert_eq!(json, "\"_pendingFulfillment\"");

        let parsed: SalesOrderStatus = serde_json::from_str("\"Closed\"").unwrap();
        assert_eq!(parsed, SalesOrderStatus::Closed);
        let parsed: SalesOrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, SalesOrderStatus::PendingFulfillment);
    }

    #[test]
    fn test_ship_status_label() {
        assert_eq!(ShipStatus::new("_shipped").label(), "shipped");
        assert_eq!(ShipStatus::new("_packed").label(), "packed");
        assert_eq!(ShipStatus::new("picked").label(), "picked");
        assert_eq!(ShipStatus::new("").label(), "shipped");
        assert_eq!(ShipStatus::new("_").label(), "shipped");
    }
}
