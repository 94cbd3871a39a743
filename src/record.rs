//! Database record representation
//!
//! Column values are dynamically typed in the database; each one is carried
//! as a [`ColumnValue`] variant until it is coerced to JSON.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use std::fmt;
use uuid::Uuid;

/// A single column value as read from the database
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// `json`/`jsonb` columns, already JSON-native
    Json(serde_json::Value),
    /// Exact decimal text, e.g. `"12.50"` or `"NaN"`
    Decimal(String),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Date(NaiveDate),
    Time(NaiveTime),
    Uuid(Uuid),
    Bytes(Vec<u8>),
    /// One-dimensional arrays, elements in order
    Array(Vec<ColumnValue>),
}

/// `strftime` pattern with microseconds only when there is a fractional part
fn with_fraction<T: Timelike>(
    value: &T,
    whole: &'static str,
    fractional: &'static str,
) -> &'static str {
    if value.nanosecond() == 0 {
        whole
    } else {
        fractional
    }
}

impl fmt::Display for ColumnValue {
    /// Textual form of the value, used when it has no native JSON representation
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => write!(f, "{}", s),
            Self::Json(v) => write!(f, "{}", v),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Timestamp(ts) => {
                let pattern = with_fraction(ts, "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.6f");
                write!(f, "{}", ts.format(pattern))
            }
            Self::TimestampTz(ts) => {
                let pattern =
                    with_fraction(ts, "%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%.6f%:z");
                write!(f, "{}", ts.format(pattern))
            }
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Time(t) => {
                let pattern = with_fraction(t, "%H:%M:%S", "%H:%M:%S%.6f");
                write!(f, "{}", t.format(pattern))
            }
            Self::Uuid(u) => write!(f, "{}", u.hyphenated()),
            Self::Bytes(bytes) => {
                write!(f, "\\x")?;
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Self::Array(items) => {
                write!(f, "{{")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// One table row: column names mapped to values, in column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: Vec<(String, ColumnValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, replacing an existing column of the same name in place
    pub fn insert(&mut self, name: impl Into<String>, value: ColumnValue) {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.columns.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ColumnValue> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl IntoIterator for Record {
    type Item = (String, ColumnValue);
    type IntoIter = std::vec::IntoIter<(String, ColumnValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, ColumnValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, ColumnValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}
