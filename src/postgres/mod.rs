//! PostgreSQL source
//!
//! Reads a whole table and turns each row into a [`Record`](crate::record::Record).

mod column;
mod extractor;
mod numeric;

pub use column::{Cell, ColumnKind, decode_row, select_list};
pub use extractor::{PostgresExtractor, quote_identifier, quote_table};
pub use numeric::{ParseNumericError, PgNumeric};
