//! Column type decoding

use super::extractor::quote_identifier;
use super::numeric::PgNumeric;
use crate::record::{ColumnValue, Record};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use eyre::{Result, WrapErr};
use std::error::Error;
use tokio_postgres::types::{FromSql, Kind, Type};
use tokio_postgres::{Column, Row};

type BoxError = Box<dyn Error + Sync + Send>;

/// How values of a column are read from a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Bool,
    Int2,
    Int4,
    Int8,
    Oid,
    Float4,
    Float8,
    Numeric,
    Text,
    Json,
    Timestamp,
    TimestampTz,
    Date,
    Time,
    Uuid,
    Bytes,
    /// Enum labels, sent as their text
    Enum,
    /// Arrays whose element type has a decoder
    Array,
    /// Anything else; selected as `::text` and read as text
    Other,
}

impl ColumnKind {
    /// Pick the decoder for a Postgres type
    pub fn of(ty: &Type) -> Self {
        match *ty {
            Type::BOOL => Self::Bool,
            Type::INT2 => Self::Int2,
            Type::INT4 => Self::Int4,
            Type::INT8 => Self::Int8,
            Type::OID => Self::Oid,
            Type::FLOAT4 => Self::Float4,
            Type::FLOAT8 => Self::Float8,
            Type::NUMERIC => Self::Numeric,
            Type::JSON | Type::JSONB => Self::Json,
            Type::TIMESTAMP => Self::Timestamp,
            Type::TIMESTAMPTZ => Self::TimestampTz,
            Type::DATE => Self::Date,
            Type::TIME => Self::Time,
            Type::UUID => Self::Uuid,
            Type::BYTEA => Self::Bytes,
            // text, varchar, bpchar, name, citext and friends
            _ if <String as FromSql<'_>>::accepts(ty) => Self::Text,
            _ => match ty.kind() {
                Kind::Enum(_) => Self::Enum,
                Kind::Array(member) if Self::of(member).is_binary() => Self::Array,
                _ => Self::Other,
            },
        }
    }

    /// Whether values of this kind are decoded from the binary protocol
    pub fn is_binary(self) -> bool {
        self != Self::Other
    }
}

/// Select list reading every column, with `::text` casts for columns
/// that have no binary decoder
///
/// Returns `None` when every column can be read as-is.
pub fn select_list(columns: &[Column]) -> Option<String> {
    if columns
        .iter()
        .all(|column| ColumnKind::of(column.type_()).is_binary())
    {
        return None;
    }

    let list = columns
        .iter()
        .map(|column| {
            let name = quote_identifier(column.name());
            if ColumnKind::of(column.type_()).is_binary() {
                name
            } else {
                format!("{}::text AS {}", name, name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    Some(list)
}

/// Decode one row into a [`Record`], keeping column order
pub fn decode_row(row: &Row) -> Result<Record> {
    let mut record = Record::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let Cell(value) = row.try_get::<_, Cell>(idx).wrap_err_with(|| {
            format!(
                "Failed to decode column {} of type {}",
                column.name(),
                column.type_()
            )
        })?;
        record.insert(column.name(), value);
    }
    Ok(record)
}

/// A column value decoded from its binary form, `NULL` included
#[derive(Debug, Clone, PartialEq)]
pub struct Cell(pub ColumnValue);

impl<'a> FromSql<'a> for Cell {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        decode_value(ty, raw).map(Cell)
    }

    fn from_sql_null(_: &Type) -> Result<Self, BoxError> {
        Ok(Cell(ColumnValue::Null))
    }

    fn accepts(ty: &Type) -> bool {
        ColumnKind::of(ty).is_binary()
    }
}

fn decode_value(ty: &Type, raw: &[u8]) -> Result<ColumnValue, BoxError> {
    let value = match ColumnKind::of(ty) {
        ColumnKind::Bool => ColumnValue::Bool(bool::from_sql(ty, raw)?),
        ColumnKind::Int2 => ColumnValue::Integer(i16::from_sql(ty, raw)?.into()),
        ColumnKind::Int4 => ColumnValue::Integer(i32::from_sql(ty, raw)?.into()),
        ColumnKind::Int8 => ColumnValue::Integer(i64::from_sql(ty, raw)?),
        ColumnKind::Oid => ColumnValue::Integer(u32::from_sql(ty, raw)?.into()),
        ColumnKind::Float4 => ColumnValue::Float(f32::from_sql(ty, raw)?.into()),
        ColumnKind::Float8 => ColumnValue::Float(f64::from_sql(ty, raw)?),
        ColumnKind::Numeric => ColumnValue::Decimal(PgNumeric::from_sql(ty, raw)?.to_string()),
        ColumnKind::Text => ColumnValue::Text(String::from_sql(ty, raw)?),
        ColumnKind::Enum => ColumnValue::Text(std::str::from_utf8(raw)?.to_string()),
        ColumnKind::Json => ColumnValue::Json(serde_json::Value::from_sql(ty, raw)?),
        ColumnKind::Timestamp => ColumnValue::Timestamp(NaiveDateTime::from_sql(ty, raw)?),
        ColumnKind::TimestampTz => ColumnValue::TimestampTz(DateTime::<Utc>::from_sql(ty, raw)?),
        ColumnKind::Date => ColumnValue::Date(NaiveDate::from_sql(ty, raw)?),
        ColumnKind::Time => ColumnValue::Time(NaiveTime::from_sql(ty, raw)?),
        ColumnKind::Uuid => ColumnValue::Uuid(uuid::Uuid::from_sql(ty, raw)?),
        ColumnKind::Bytes => ColumnValue::Bytes(Vec::<u8>::from_sql(ty, raw)?),
        ColumnKind::Array => decode_array(ty, raw)?,
        ColumnKind::Other => return Err(format!("no binary decoder for type {}", ty).into()),
    };
    Ok(value)
}

/// Decode an array of any dimension into nested [`ColumnValue::Array`]s
///
/// Layout: dimension count, null flag, element type, then a length and
/// lower bound per dimension, then each element as a length (-1 for `NULL`)
/// followed by its bytes, in row-major order.
fn decode_array(ty: &Type, mut raw: &[u8]) -> Result<ColumnValue, BoxError> {
    let Kind::Array(member) = ty.kind() else {
        return Err(format!("{} is not an array type", ty).into());
    };

    let ndim = read_i32(&mut raw)?;
    let _has_null = read_i32(&mut raw)?;
    let _element_type = read_i32(&mut raw)?;

    let mut dims = Vec::new();
    for _ in 0..ndim {
        dims.push(usize::try_from(read_i32(&mut raw)?)?);
        let _lower_bound = read_i32(&mut raw)?;
    }

    let count: usize = if dims.is_empty() {
        0
    } else {
        dims.iter().product()
    };
    let mut elements = Vec::new();
    for _ in 0..count {
        let len = read_i32(&mut raw)?;
        let element = match usize::try_from(len) {
            Err(_) => ColumnValue::Null,
            Ok(len) => {
                if raw.len() < len {
                    return Err("array element is truncated".into());
                }
                let (bytes, rest) = raw.split_at(len);
                raw = rest;
                decode_value(member, bytes)?
            }
        };
        elements.push(element);
    }

    Ok(nest(elements, &dims))
}

fn nest(elements: Vec<ColumnValue>, dims: &[usize]) -> ColumnValue {
    match dims {
        [outer, inner @ ..] if !inner.is_empty() => {
            let size: usize = inner.iter().product();
            let mut elements = elements.into_iter();
            let rows = (0..*outer)
                .map(|_| nest(elements.by_ref().take(size).collect(), inner))
                .collect();
            ColumnValue::Array(rows)
        }
        _ => ColumnValue::Array(elements),
    }
}

fn read_i32(raw: &mut &[u8]) -> Result<i32, BoxError> {
    let bytes: &[u8] = raw;
    let (head, rest) = bytes
        .split_first_chunk::<4>()
        .ok_or("array is truncated")?;
    *raw = rest;
    Ok(i32::from_be_bytes(*head))
}
