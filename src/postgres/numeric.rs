//! Exact decoding of `numeric` values
//!
//! The binary wire format is a header of four 16-bit fields (digit count,
//! weight, sign, display scale) followed by base-10000 digits. Values are kept
//! in that form and rendered the way Postgres prints them, so no precision is
//! lost regardless of magnitude or scale.

use std::error::Error;
use std::fmt;
use tokio_postgres::types::{FromSql, Type};

const SIGN_POSITIVE: u16 = 0x0000;
const SIGN_NEGATIVE: u16 = 0x4000;
const SIGN_NAN: u16 = 0xC000;
const SIGN_POSITIVE_INFINITY: u16 = 0xD000;
const SIGN_NEGATIVE_INFINITY: u16 = 0xF000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseNumericError {
    #[error("numeric value is truncated")]
    Truncated,
    #[error("invalid numeric sign {0:#06x}")]
    InvalidSign(u16),
    #[error("invalid numeric digit {0}")]
    InvalidDigit(u16),
}

/// A Postgres `numeric` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PgNumeric {
    NaN,
    PositiveInfinity,
    NegativeInfinity,
    Value {
        negative: bool,
        /// Power of 10000 of the first digit
        weight: i16,
        /// Number of decimal digits after the point
        scale: u16,
        digits: Vec<u16>,
    },
}

impl PgNumeric {
    /// Parse the binary representation sent by the server
    pub fn from_bytes(raw: &[u8]) -> Result<Self, ParseNumericError> {
        let field = |idx: usize| -> Result<u16, ParseNumericError> {
            raw.get(idx * 2..idx * 2 + 2)
                .map(|b| u16::from_be_bytes([b[0], b[1]]))
                .ok_or(ParseNumericError::Truncated)
        };

        let ndigits = field(0)? as usize;
        let weight = field(1)? as i16;
        let sign = field(2)?;
        let scale = field(3)?;

        let negative = match sign {
            SIGN_POSITIVE => false,
            SIGN_NEGATIVE => true,
            SIGN_NAN => return Ok(Self::NaN),
            SIGN_POSITIVE_INFINITY => return Ok(Self::PositiveInfinity),
            SIGN_NEGATIVE_INFINITY => return Ok(Self::NegativeInfinity),
            other => return Err(ParseNumericError::InvalidSign(other)),
        };

        let digits = (4..4 + ndigits)
            .map(|idx| match field(idx)? {
                digit @ 0..=9999 => Ok(digit),
                digit => Err(ParseNumericError::InvalidDigit(digit)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::Value {
            negative,
            weight,
            scale,
            digits,
        })
    }
}

impl fmt::Display for PgNumeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (negative, weight, scale, digits) = match self {
            Self::NaN => return write!(f, "NaN"),
            Self::PositiveInfinity => return write!(f, "Infinity"),
            Self::NegativeInfinity => return write!(f, "-Infinity"),
            Self::Value {
                negative,
                weight,
                scale,
                digits,
            } => (*negative, i32::from(*weight), usize::from(*scale), digits),
        };
        let digit = |idx: i32| {
            usize::try_from(idx)
                .ok()
                .and_then(|idx| digits.get(idx).copied())
                .unwrap_or(0)
        };

        if negative {
            write!(f, "-")?;
        }

        if weight < 0 {
            write!(f, "0")?;
        } else {
            write!(f, "{}", digit(0))?;
            for idx in 1..=weight {
                write!(f, "{:04}", digit(idx))?;
            }
        }

        if scale > 0 {
            let mut fraction = String::with_capacity(scale + 4);
            let mut idx = weight + 1;
            while fraction.len() < scale {
                fraction.push_str(&format!("{:04}", digit(idx)));
                idx += 1;
            }
            fraction.truncate(scale);
            write!(f, ".{}", fraction)?;
        }

        Ok(())
    }
}

impl<'a> FromSql<'a> for PgNumeric {
    fn from_sql(_: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(Self::from_bytes(raw)?)
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}
