//! Caller-supplied extra fields for fulfillment and invoice records.
//!
//! Each record type declares the fields callers may set through a table of
//! typed setters. A key is applied as follows:
//!
//! 1. If the table has a plain field with that exact name, the value is set.
//! 2. Otherwise, if the key ends in `_id` or `_ref` and the table has a
//!    reference field named by the rest of the key, the reference is set to
//!    the record with that internal id (`ship_method_id: 42` sets
//!    `ship_method` to internal id 42).
//! 3. Anything else is ignored.

use serde_json::{Map, Value};
use tracing::debug;

use super::records::{Invoice, ItemFulfillment, RecordRef};

/// Suffixes that mark a key as naming a reference field.
const REFERENCE_SUFFIXES: [&str; 2] = ["_id", "_ref"];

/// How a field is set.
pub enum FieldSetter<R> {
    /// A scalar value, passed as text.
    Plain(fn(&mut R, String)),
    /// A reference to another record by internal id.
    Reference(fn(&mut R, RecordRef)),
}

/// A settable field of record type `R`.
pub struct FieldSpec<R> {
    pub name: &'static str,
    pub setter: FieldSetter<R>,
}

/// Record types that accept extra fields.
pub trait ExtraFields: Sized + 'static {
    /// The fields callers may set.
    fn field_schema() -> &'static [FieldSpec<Self>];

    /// Apply every supported entry of `fields`; returns how many were applied.
    fn apply_extra_fields(&mut self, fields: &Map<String, Value>) -> usize {
        let mut applied = 0;
        for (key, value) in fields {
            if apply_one(self, key, value) {
                applied += 1;
            } else {
                debug!(field = %key, "Ignoring unsupported extra field");
            }
        }
        applied
    }
}

fn apply_one<R: ExtraFields>(record: &mut R, key: &str, value: &Value) -> bool {
    let Some(text) = scalar_text(value) else {
        return false;
    };
    let schema = R::field_schema();

    let plain = schema.iter().find_map(|spec| match spec.setter {
        FieldSetter::Plain(set) if spec.name == key => Some(set),
        _ => None,
    });
    if let Some(set) = plain {
        set(record, text);
        return true;
    }

    let Some(stem) = REFERENCE_SUFFIXES
        .iter()
        .find_map(|suffix| key.strip_suffix(suffix))
    else {
        return false;
    };
    let reference = schema.iter().find_map(|spec| match spec.setter {
        FieldSetter::Reference(set) if spec.name == stem => Some(set),
        _ => None,
    });
    if let Some(set) = reference {
        set(record, RecordRef::internal(text));
        return true;
    }
    false
}

/// Text form of a scalar JSON value; `None` for nulls, arrays and objects.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl ExtraFields for ItemFulfillment {
    fn field_schema() -> &'static [FieldSpec<Self>] {
        const FIELDS: &[FieldSpec<ItemFulfillment>] = &[
            FieldSpec {
                name: "memo",
                setter: FieldSetter::Plain(|r, v| r.memo = Some(v)),
            },
            FieldSpec {
                name: "tran_date",
                setter: FieldSetter::Plain(|r, v| r.tran_date = Some(v)),
            },
            FieldSpec {
                name: "ship_status",
                setter: FieldSetter::Plain(|r, v| r.ship_status = Some(v)),
            },
            FieldSpec {
                name: "ship_method",
                setter: FieldSetter::Reference(|r, v| r.ship_method = Some(v)),
            },
            FieldSpec {
                name: "department",
                setter: FieldSetter::Reference(|r, v| r.department = Some(v)),
            },
            FieldSpec {
                name: "location",
                setter: FieldSetter::Reference(|r, v| r.location = Some(v)),
            },
            FieldSpec {
                name: "class",
                setter: FieldSetter::Reference(|r, v| r.class = Some(v)),
            },
        ];
        FIELDS
    }
}

impl ExtraFields for Invoice {
    fn field_schema() -> &'static [FieldSpec<Self>] {
        const FIELDS: &[FieldSpec<Invoice>] = &[
            FieldSpec {
                name: "memo",
                setter: FieldSetter::Plain(|r, v| r.memo = Some(v)),
            },
            FieldSpec {
                name: "other_ref_num",
                setter: FieldSetter::Plain(|r, v| r.other_ref_num = Some(v)),
            },
            FieldSpec {
                name: "tran_date",
                setter: FieldSetter::Plain(|r, v| r.tran_date = Some(v)),
            },
            FieldSpec {
                name: "ship_method",
                setter: FieldSetter::Reference(|r, v| r.ship_method = Some(v)),
            },
            FieldSpec {
                name: "terms",
                setter: FieldSetter::Reference(|r, v| r.terms = Some(v)),
            },
            FieldSpec {
                name: "sales_rep",
                setter: FieldSetter::Reference(|r, v| r.sales_rep = Some(v)),
            },
            FieldSpec {
                name: "department",
                setter: FieldSetter::Reference(|r, v| r.department = Some(v)),
            },
            FieldSpec {
                name: "location",
                setter: FieldSetter::Reference(|r, v| r.location = Some(v)),
            },
            FieldSpec {
                name: "class",
                setter: FieldSetter::Reference(|r, v| r.class = Some(v)),
            },
        ];
        FIELDS
    }
}
