//! Transform implementations for exported records

mod value_coercer;

pub use value_coercer::{ValueCoercer, coerce};
