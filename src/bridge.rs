//! Capability views over numeric and boolean-convertible values.

use crate::codec::{FromBson, ToBson};
use crate::decimal::Decimal128;
use crate::error::BsonError;
use crate::value::BsonValue;

/// Exact coercion of any numeric variant to `i32`.
pub(crate) fn coerce_i32(value: &BsonValue) -> Result<i32, BsonError> {
    match value {
        BsonValue::Int32(v) => Ok(*v),
        BsonValue::Int64(v) => i32::try_from(*v)
            .map_err(|_| BsonError::decode(format!("Int64 {v} out of i32 range"))),
        BsonValue::Double(d) => double_to_i64(*d)
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| BsonError::decode(format!("Double {d} is not an exact i32"))),
        BsonValue::Decimal128(dec) => dec.to_i32(),
        BsonValue::DateTime(dt) => i32::try_from(dt.millis())
            .map_err(|_| BsonError::decode("DateTime out of i32 range")),
        BsonValue::Timestamp(ts) => i32::try_from(ts.as_u64())
            .map_err(|_| BsonError::decode("Timestamp out of i32 range")),
        other => Err(BsonError::type_mismatch("numeric value", other.kind_name())),
    }
}

/// Exact coercion of any numeric variant to `i64`.
pub(crate) fn coerce_i64(value: &BsonValue) -> Result<i64, BsonError> {
    match value {
        BsonValue::Int32(v) => Ok(i64::from(*v)),
        BsonValue::Int64(v) => Ok(*v),
        BsonValue::Double(d) => double_to_i64(*d)
            .ok_or_else(|| BsonError::decode(format!("Double {d} is not an exact i64"))),
        BsonValue::Decimal128(dec) => dec.to_i64(),
        BsonValue::DateTime(dt) => Ok(dt.millis()),
        BsonValue::Timestamp(ts) => i64::try_from(ts.as_u64())
            .map_err(|_| BsonError::decode("Timestamp out of i64 range")),
        other => Err(BsonError::type_mismatch("numeric value", other.kind_name())),
    }
}

/// Exact coercion of any numeric variant to `f64`.
pub(crate) fn coerce_f64(value: &BsonValue) -> Result<f64, BsonError> {
    match value {
        BsonValue::Double(d) => Ok(*d),
        BsonValue::Int32(v) => Ok(f64::from(*v)),
        BsonValue::Int64(v) => i64_to_double(*v)
            .ok_or_else(|| BsonError::decode(format!("Int64 {v} is not an exact double"))),
        BsonValue::Decimal128(dec) => dec.to_f64(),
        BsonValue::DateTime(dt) => i64_to_double(dt.millis())
            .ok_or_else(|| BsonError::decode("DateTime is not an exact double")),
        BsonValue::Timestamp(ts) => i64::try_from(ts.as_u64())
            .ok()
            .and_then(i64_to_double)
            .ok_or_else(|| BsonError::decode("Timestamp is not an exact double")),
        other => Err(BsonError::type_mismatch("numeric value", other.kind_name())),
    }
}

/// Exact coercion of any numeric variant to `Decimal128`.
pub(crate) fn coerce_decimal(value: &BsonValue) -> Result<Decimal128, BsonError> {
    match value {
        BsonValue::Int32(v) => Ok(Decimal128::from_i32(*v)),
        BsonValue::Int64(v) => Ok(Decimal128::from_i64(*v)),
        BsonValue::Double(d) => Ok(Decimal128::from_f64(*d)),
        BsonValue::Decimal128(dec) => Ok(*dec),
        BsonValue::DateTime(dt) => Ok(Decimal128::from_i64(dt.millis())),
        BsonValue::Timestamp(ts) => Ok(Decimal128::from_u64(ts.as_u64())),
        other => Err(BsonError::type_mismatch("numeric value", other.kind_name())),
    }
}

/// An `f64` as an `i64`, when the double is a whole number in range.
#[allow(clippy::cast_possible_truncation)]
fn double_to_i64(d: f64) -> Option<i64> {
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0; // 2^63
    if d.fract() == 0.0 && d >= -I64_BOUND && d < I64_BOUND {
        Some(d as i64)
    } else {
        None
    }
}

/// An `i64` as an `f64`, when the integer is exactly representable.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn i64_to_double(v: i64) -> Option<f64> {
    let d = v as f64;
    if d.is_finite() && d as i128 == i128::from(v) {
        Some(d)
    } else {
        None
    }
}

/// A view over any numeric variant exposing the exact-coercion lattice.
///
/// The codec for this type reads any carrying variant and writes the
/// original variant back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct BsonNumberLike(BsonValue);

impl BsonNumberLike {
    /// The wrapped value.
    #[must_use]
    pub const fn value(&self) -> &BsonValue {
        &self.0
    }

    /// Unwrap into the original variant.
    #[must_use]
    pub fn into_value(self) -> BsonValue {
        self.0
    }

    /// Exact conversion to `i32`.
    ///
    /// # Errors
    ///
    /// Returns [`BsonError::Decode`] when the value is not exactly
    /// representable.
    pub fn to_i32(&self) -> Result<i32, BsonError> {
        coerce_i32(&self.0)
    }

    /// Exact conversion to `i64`. For DateTime this is the epoch millis,
    /// for Timestamp the packed 64-bit form.
    ///
    /// # Errors
    ///
    /// Returns [`BsonError::Decode`] when the value is not exactly
    /// representable.
    pub fn to_i64(&self) -> Result<i64, BsonError> {
        coerce_i64(&self.0)
    }

    /// Exact conversion to `f64`.
    ///
    /// # Errors
    ///
    /// Returns [`BsonError::Decode`] when the value is not exactly
    /// representable.
    pub fn to_f64(&self) -> Result<f64, BsonError> {
        coerce_f64(&self.0)
    }

    /// Exact conversion to `Decimal128`.
    ///
    /// # Errors
    ///
    /// Returns [`BsonError::Decode`] when the value is not exactly
    /// representable.
    pub fn to_decimal(&self) -> Result<Decimal128, BsonError> {
        coerce_decimal(&self.0)
    }
}

impl TryFrom<BsonValue> for BsonNumberLike {
    type Error = BsonError;

    fn try_from(value: BsonValue) -> Result<Self, Self::Error> {
        match value {
            BsonValue::Int32(_)
            | BsonValue::Int64(_)
            | BsonValue::Double(_)
            | BsonValue::Decimal128(_)
            | BsonValue::DateTime(_)
            | BsonValue::Timestamp(_) => Ok(Self(value)),
            other => Err(BsonError::type_mismatch("numeric value", other.kind_name())),
        }
    }
}

impl FromBson for BsonNumberLike {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        Self::try_from(value.clone())
    }
}

impl ToBson for BsonNumberLike {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        Ok(self.0.clone())
    }
}

/// A view over boolean-convertible variants: booleans themselves,
/// numerics (true iff non-zero), and Null/Undefined (false).
///
/// The codec for this type reads any carrying variant and writes the
/// original variant back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct BsonBooleanLike(BsonValue);

impl BsonBooleanLike {
    /// The wrapped value.
    #[must_use]
    pub const fn value(&self) -> &BsonValue {
        &self.0
    }

    /// Unwrap into the original variant.
    #[must_use]
    pub fn into_value(self) -> BsonValue {
        self.0
    }

    /// The boolean view. Total over all carrying variants.
    #[must_use]
    pub fn to_bool(&self) -> bool {
        match &self.0 {
            BsonValue::Boolean(b) => *b,
            BsonValue::Int32(v) => *v != 0,
            BsonValue::Int64(v) => *v != 0,
            BsonValue::Double(d) => *d != 0.0,
            BsonValue::Decimal128(dec) => {
                dec.finite_parts().map_or(true, |(_, _, coeff)| coeff != 0)
            }
            _ => false,
        }
    }
}

impl TryFrom<BsonValue> for BsonBooleanLike {
    type Error = BsonError;

    fn try_from(value: BsonValue) -> Result<Self, Self::Error> {
        match value {
            BsonValue::Boolean(_)
            | BsonValue::Int32(_)
            | BsonValue::Int64(_)
            | BsonValue::Double(_)
            | BsonValue::Decimal128(_)
            | BsonValue::Null
            | BsonValue::Undefined => Ok(Self(value)),
            other => Err(BsonError::type_mismatch(
                "boolean-like value",
                other.kind_name(),
            )),
        }
    }
}

impl FromBson for BsonBooleanLike {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        Self::try_from(value.clone())
    }
}

impl ToBson for BsonBooleanLike {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        Ok(self.0.clone())
    }
}
