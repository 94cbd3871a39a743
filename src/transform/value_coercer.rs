//! Value coercion transformer
//!
//! Converts database records into JSON objects. Values JSON can represent
//! natively pass through; everything else becomes its textual form.

use crate::etl::Transformer;
use crate::record::{ColumnValue, Record};
use eyre::Result;
use serde_json::{Map, Number, Value};

/// Transformer that turns a [`Record`] into a JSON object
///
/// Columns keep their order. Timestamps, decimals, UUIDs and other
/// non-JSON values are written as strings and do not round-trip back to
/// their original type.
///
/// # Example
/// ```
/// use pg_ftp_export::etl::Transformer;
/// use pg_ftp_export::record::{ColumnValue, Record};
/// use pg_ftp_export::transform::ValueCoercer;
/// use serde_json::json;
///
/// let mut record = Record::new();
/// record.insert("id", ColumnValue::Integer(1));
/// record.insert("name", ColumnValue::Text("Ann".to_string()));
///
/// let output = ValueCoercer.transform(record).unwrap();
/// assert_eq!(output, json!({"id": 1, "name": "Ann"}));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCoercer;

impl Transformer for ValueCoercer {
    type Input = Record;
    type Output = Value;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        let object: Map<String, Value> = input
            .into_iter()
            .map(|(name, value)| (name, coerce(value)))
            .collect();
        Ok(Value::Object(object))
    }
}

/// Map a column value to JSON, falling back to its string form
pub fn coerce(value: ColumnValue) -> Value {
    match value {
        ColumnValue::Null => Value::Null,
        ColumnValue::Bool(b) => Value::Bool(b),
        ColumnValue::Integer(i) => Value::Number(i.into()),
        ColumnValue::Text(s) => Value::String(s),
        ColumnValue::Json(v) => v,
        ColumnValue::Float(x) => Number::from_f64(x)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(x.to_string())),
        ColumnValue::Array(items) => Value::Array(items.into_iter().map(coerce).collect()),
        other => Value::String(other.to_string()),
    }
}
