//! Key-value argument normalization
//!
//! The `*w` logging methods and [`Logger::with_fields`](crate::Logger::with_fields)
//! take a flat list of alternating keys and values. [`normalize`] pairs them up
//! into typed [`Field`]s. Malformed input never fails the call: normalization
//! stops at the first problem, keeps what was paired so far and reports a
//! [`KvDiagnostic`] that the logger turns into a record of its own.

use super::field::{Field, FieldValue};
use std::time::Duration;

/// One element of a key-value argument list
#[derive(Debug, Clone, PartialEq)]
pub enum KvArg {
    Value(FieldValue),
    /// A typed field. Never valid in a key-value list; reported as misuse.
    Field(Field),
}

impl From<Field> for KvArg {
    fn from(field: Field) -> Self {
        KvArg::Field(field)
    }
}

impl From<FieldValue> for KvArg {
    fn from(value: FieldValue) -> Self {
        KvArg::Value(value)
    }
}

macro_rules! impl_kv_arg_from {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for KvArg {
                fn from(v: $t) -> Self {
                    KvArg::Value(FieldValue::from(v))
                }
            }
        )*
    };
}

impl_kv_arg_from!(
    String,
    &str,
    &String,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    bool,
    Duration,
    serde_json::Value,
);

/// Why normalization stopped early
#[derive(Debug, Clone, PartialEq)]
pub enum KvDiagnostic {
    /// A typed [`Field`] appeared where a key was expected
    TypedFieldAsKey(Field),
    /// The list ended with a key that has no value
    OrphanKey(FieldValue),
    /// A key position held something other than a string
    NonStringKey(FieldValue),
}

impl KvDiagnostic {
    pub fn message(&self) -> &'static str {
        match self {
            KvDiagnostic::TypedFieldAsKey(_) => {
                "strongly-typed field passed as a key-value argument"
            }
            KvDiagnostic::OrphanKey(_) => {
                "odd number of arguments passed as key-value pairs for logging"
            }
            KvDiagnostic::NonStringKey(_) => {
                "non-string key argument passed to logging, ignoring all later arguments"
            }
        }
    }

    /// The field attached to the diagnostic record, naming the culprit.
    pub fn field(&self) -> Field {
        match self {
            KvDiagnostic::TypedFieldAsKey(field) => Field::string("typed field", field.to_string()),
            KvDiagnostic::OrphanKey(key) => Field::new("ignored key", key.clone()),
            KvDiagnostic::NonStringKey(key) => Field::new("invalid key", key.clone()),
        }
    }
}

/// Result of [`normalize`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Normalized {
    pub fields: Vec<Field>,
    pub diagnostic: Option<KvDiagnostic>,
}

/// Pair `args` into fields, then append `additional` unconditionally.
///
/// Checks run per key position in this order: typed field, trailing key
/// without value, non-string key. The first failure ends the scan.
pub fn normalize(args: Vec<KvArg>, additional: Vec<Field>) -> Normalized {
    if args.is_empty() {
        return Normalized {
            fields: additional,
            diagnostic: None,
        };
    }

    let mut fields = Vec::with_capacity(args.len() / 2 + additional.len());
    let mut diagnostic = None;
    let mut iter = args.into_iter();

    while let Some(key) = iter.next() {
        let key = match key {
            KvArg::Field(field) => {
                diagnostic = Some(KvDiagnostic::TypedFieldAsKey(field));
                break;
            }
            KvArg::Value(key) => key,
        };

        let Some(value) = iter.next() else {
            diagnostic = Some(KvDiagnostic::OrphanKey(key));
            break;
        };

        let FieldValue::String(key) = key else {
            diagnostic = Some(KvDiagnostic::NonStringKey(key));
            break;
        };

        let value = match value {
            KvArg::Value(value) => value,
            // A typed field in value position is kept as its rendered form.
            KvArg::Field(field) => FieldValue::String(field.to_string()),
        };
        fields.push(Field { key, value });
    }

    fields.extend(additional);
    Normalized { fields, diagnostic }
}
