//! Newtype IDs for type-safe record references.
//!
//! The ERP hands out opaque identifiers and the storefront assigns its own,
//! and both are plain strings on the wire. Use the `define_id!` macro to keep
//! them from being mixed up.

/// Macro to define a type-safe, string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use erp_bridge_core::define_id;
/// define_id!(CustomerRef);
/// define_id!(OrderRef);
///
/// let customer = CustomerRef::new("42");
/// let order = OrderRef::new("42");
///
/// // These are different types, so this won't compile:
/// // let _: CustomerRef = order;
/// assert_eq!(customer.as_str(), order.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

// Identifier assigned by the ERP when a record is created.
define_id!(InternalId);
// Identifier assigned by the caller; the idempotency key for upserts.
define_id!(ExternalId);
// Human-facing transaction number assigned by the ERP (e.g. "SO1042").
define_id!(TransactionId);
