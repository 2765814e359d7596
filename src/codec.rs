use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::array::BsonArray;
use crate::bridge::{coerce_decimal, coerce_f64, coerce_i32, coerce_i64};
use crate::decimal::Decimal128;
use crate::document::BsonDocument;
use crate::error::BsonError;
use crate::oid::ObjectId;
#[cfg(feature = "uuid")]
use crate::spec::BinarySubtype;
use crate::value::{
    BsonBinary, BsonDateTime, BsonJavaScript, BsonJavaScriptWithScope, BsonRegex, BsonSymbol,
    BsonTimestamp, BsonValue,
};

/// Read a value of `Self` out of a BSON value.
///
/// Integral implementations take the permissive widening: any numeric
/// variant that exactly represents the target value succeeds, so an
/// `i32` reads from `Double(2.0)` but not from `Double(2.5)`.
pub trait FromBson: Sized {
    /// Decode `Self` from `value`.
    ///
    /// # Errors
    ///
    /// Returns an error when the value does not match the expected BSON
    /// type or violates a semantic constraint.
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError>;
}

/// Write a value of `Self` as a BSON value.
pub trait ToBson {
    /// Encode `self` as a BSON value.
    ///
    /// # Errors
    ///
    /// Returns an error when the value cannot be represented.
    fn to_bson(&self) -> Result<BsonValue, BsonError>;
}

/// Read a value of `Self` out of a BSON document specifically.
///
/// Derived record and sum codecs implement this; the paired [`FromBson`]
/// impl rejects non-document variants.
pub trait FromBsonDocument: Sized {
    /// Decode `Self` from `doc`.
    ///
    /// # Errors
    ///
    /// Returns an error when a required field is missing or a field
    /// fails to decode; field failures carry the field name.
    fn from_bson_document(doc: &BsonDocument) -> Result<Self, BsonError>;
}

/// Write a value of `Self` as a BSON document specifically.
pub trait ToBsonDocument {
    /// Encode `self` as a BSON document.
    ///
    /// # Errors
    ///
    /// Returns an error when a field cannot be written.
    fn to_bson_document(&self) -> Result<BsonDocument, BsonError>;
}

impl FromBson for BsonValue {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        Ok(value.clone())
    }
}

impl ToBson for BsonValue {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        Ok(self.clone())
    }
}

impl FromBson for bool {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        value
            .as_bool()
            .ok_or_else(|| BsonError::type_mismatch("Boolean", value.kind_name()))
    }
}

impl ToBson for bool {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        Ok(BsonValue::Boolean(*self))
    }
}

impl FromBson for i32 {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        coerce_i32(value)
    }
}

impl ToBson for i32 {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        Ok(BsonValue::Int32(*self))
    }
}

impl FromBson for i64 {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        coerce_i64(value)
    }
}

impl ToBson for i64 {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        Ok(BsonValue::Int64(*self))
    }
}

macro_rules! impl_small_int {
    ($($t:ty),* $(,)?) => {$(
        impl FromBson for $t {
            fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
                let wide = coerce_i64(value)?;
                Self::try_from(wide).map_err(|_| {
                    BsonError::decode(format!(
                        "integer {wide} out of {} range",
                        stringify!($t)
                    ))
                })
            }
        }

        impl ToBson for $t {
            fn to_bson(&self) -> Result<BsonValue, BsonError> {
                Ok(BsonValue::Int32(i32::from(*self)))
            }
        }
    )*};
}

impl_small_int!(i8, i16, u8, u16);

impl FromBson for u32 {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        let wide = coerce_i64(value)?;
        Self::try_from(wide)
            .map_err(|_| BsonError::decode(format!("integer {wide} out of u32 range")))
    }
}

impl ToBson for u32 {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        Ok(i32::try_from(*self).map_or_else(|_| BsonValue::Int64(i64::from(*self)), BsonValue::Int32))
    }
}

impl FromBson for u64 {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        let wide = coerce_i64(value)?;
        Self::try_from(wide)
            .map_err(|_| BsonError::decode(format!("integer {wide} out of u64 range")))
    }
}

impl ToBson for u64 {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        i64::try_from(*self)
            .map(BsonValue::Int64)
            .map_err(|_| BsonError::encode(format!("u64 {self} out of Int64 range")))
    }
}

impl FromBson for f64 {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        coerce_f64(value)
    }
}

impl ToBson for f64 {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        Ok(BsonValue::Double(*self))
    }
}

impl FromBson for f32 {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        let wide = coerce_f64(value)?;
        #[allow(clippy::cast_possible_truncation)]
        let narrow = wide as Self;
        if f64::from(narrow) == wide || wide.is_nan() {
            Ok(narrow)
        } else {
            Err(BsonError::decode(format!(
                "Double {wide} is not an exact f32"
            )))
        }
    }
}

impl ToBson for f32 {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        Ok(BsonValue::Double(f64::from(*self)))
    }
}

impl FromBson for String {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| BsonError::type_mismatch("String", value.kind_name()))
    }
}

impl ToBson for String {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        Ok(BsonValue::String(self.clone()))
    }
}

impl ToBson for &str {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        Ok(BsonValue::String((*self).to_owned()))
    }
}

impl FromBson for Decimal128 {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        coerce_decimal(value)
    }
}

impl ToBson for Decimal128 {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        Ok(BsonValue::Decimal128(*self))
    }
}

impl FromBson for ObjectId {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        value
            .as_object_id()
            .ok_or_else(|| BsonError::type_mismatch("ObjectId", value.kind_name()))
    }
}

impl ToBson for ObjectId {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        Ok(BsonValue::ObjectId(*self))
    }
}

macro_rules! impl_payload {
    ($($t:ty => $variant:ident),* $(,)?) => {$(
        impl FromBson for $t {
            fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
                match value {
                    BsonValue::$variant(inner) => Ok(inner.clone()),
                    other => Err(BsonError::type_mismatch(
                        stringify!($variant),
                        other.kind_name(),
                    )),
                }
            }
        }

        impl ToBson for $t {
            fn to_bson(&self) -> Result<BsonValue, BsonError> {
                Ok(BsonValue::$variant(self.clone()))
            }
        }
    )*};
}

impl_payload!(
    BsonBinary => Binary,
    BsonRegex => Regex,
    BsonDateTime => DateTime,
    BsonTimestamp => Timestamp,
    BsonJavaScript => JavaScript,
    BsonJavaScriptWithScope => JavaScriptWithScope,
    BsonSymbol => Symbol,
    BsonDocument => Document,
    BsonArray => Array,
);

impl FromBsonDocument for BsonDocument {
    fn from_bson_document(doc: &BsonDocument) -> Result<Self, BsonError> {
        Ok(doc.clone())
    }
}

impl ToBsonDocument for BsonDocument {
    fn to_bson_document(&self) -> Result<BsonDocument, BsonError> {
        Ok(self.clone())
    }
}

impl<T: FromBson> FromBson for Option<T> {
    /// Null reads as `None`. Field-level *absence* is handled by the
    /// document accessors and derived codecs, not here.
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_bson(value).map(Some)
        }
    }
}

impl<T: ToBson> ToBson for Option<T> {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        match self {
            Some(inner) => inner.to_bson(),
            None => Ok(BsonValue::Null),
        }
    }
}

impl<T: FromBson> FromBson for Box<T> {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        T::from_bson(value).map(Self::new)
    }
}

impl<T: ToBson> ToBson for Box<T> {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        self.as_ref().to_bson()
    }
}

fn read_array<T, C>(value: &BsonValue) -> Result<C, BsonError>
where
    T: FromBson,
    C: FromIterator<T>,
{
    let arr = value
        .as_array()
        .ok_or_else(|| BsonError::type_mismatch("Array", value.kind_name()))?;
    arr.iter()
        .enumerate()
        .map(|(i, v)| T::from_bson(v).map_err(|e| e.in_field(i.to_string())))
        .collect()
}

fn write_array<'a, T, I>(values: I) -> Result<BsonValue, BsonError>
where
    T: ToBson + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let arr: BsonArray = values
        .into_iter()
        .map(ToBson::to_bson)
        .collect::<Result<Vec<_>, _>>()?
        .into();
    Ok(BsonValue::Array(arr))
}

impl<T: FromBson> FromBson for Vec<T> {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        read_array(value)
    }
}

impl<T: ToBson> ToBson for Vec<T> {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        write_array(self)
    }
}

impl<T: FromBson + Eq + Hash> FromBson for HashSet<T> {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        read_array(value)
    }
}

impl<T: ToBson + Eq + Hash> ToBson for HashSet<T> {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        write_array(self)
    }
}

impl<T: FromBson + Ord> FromBson for BTreeSet<T> {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        read_array(value)
    }
}

impl<T: ToBson + Ord> ToBson for BTreeSet<T> {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        write_array(self)
    }
}

fn read_string_map<T, C>(value: &BsonValue) -> Result<C, BsonError>
where
    T: FromBson,
    C: FromIterator<(String, T)>,
{
    let doc = value
        .as_document()
        .ok_or_else(|| BsonError::type_mismatch("Document", value.kind_name()))?;
    doc.iter()
        .map(|e| {
            T::from_bson(&e.value)
                .map(|v| (e.name.clone(), v))
                .map_err(|err| err.in_field(e.name.clone()))
        })
        .collect()
}

fn write_string_map<'a, T, I>(entries: I) -> Result<BsonValue, BsonError>
where
    T: ToBson + 'a,
    I: IntoIterator<Item = (&'a String, &'a T)>,
{
    let mut doc = BsonDocument::new();
    for (key, value) in entries {
        doc.push(key.clone(), value.to_bson()?);
    }
    Ok(BsonValue::Document(doc))
}

impl<T: FromBson> FromBson for HashMap<String, T> {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        read_string_map(value)
    }
}

impl<T: ToBson> ToBson for HashMap<String, T> {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        write_string_map(self)
    }
}

impl<T: FromBson> FromBson for BTreeMap<String, T> {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        read_string_map(value)
    }
}

impl<T: ToBson> ToBson for BTreeMap<String, T> {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        write_string_map(self)
    }
}

impl FromBson for SystemTime {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        let millis = value
            .as_datetime()
            .ok_or_else(|| BsonError::type_mismatch("DateTime", value.kind_name()))?
            .millis();
        let distance = Duration::from_millis(millis.unsigned_abs());
        let time = if millis >= 0 {
            UNIX_EPOCH.checked_add(distance)
        } else {
            UNIX_EPOCH.checked_sub(distance)
        };
        time.ok_or_else(|| BsonError::decode("DateTime out of SystemTime range"))
    }
}

impl ToBson for SystemTime {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        let millis = match self.duration_since(UNIX_EPOCH) {
            Ok(since) => i64::try_from(since.as_millis())
                .map_err(|_| BsonError::encode("SystemTime out of DateTime range"))?,
            Err(before) => i64::try_from(before.duration().as_millis())
                .map(|m| -m)
                .map_err(|_| BsonError::encode("SystemTime out of DateTime range"))?,
        };
        Ok(BsonValue::DateTime(BsonDateTime(millis)))
    }
}

#[cfg(feature = "chrono")]
impl FromBson for chrono::DateTime<chrono::Utc> {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        value
            .as_datetime()
            .ok_or_else(|| BsonError::type_mismatch("DateTime", value.kind_name()))?
            .to_chrono()
            .ok_or_else(|| BsonError::decode("DateTime out of chrono range"))
    }
}

#[cfg(feature = "chrono")]
impl ToBson for chrono::DateTime<chrono::Utc> {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        Ok(BsonValue::DateTime(BsonDateTime(self.timestamp_millis())))
    }
}

#[cfg(feature = "uuid")]
impl FromBson for uuid::Uuid {
    fn from_bson(value: &BsonValue) -> Result<Self, BsonError> {
        let bin = value
            .as_binary()
            .ok_or_else(|| BsonError::type_mismatch("Binary", value.kind_name()))?;
        if bin.subtype != BinarySubtype::Uuid {
            return Err(BsonError::decode(format!(
                "expected binary subtype 4 for UUID, found {}",
                u8::from(bin.subtype)
            )));
        }
        Self::from_slice(&bin.bytes)
            .map_err(|_| BsonError::decode("UUID binary payload must be 16 bytes"))
    }
}

#[cfg(feature = "uuid")]
impl ToBson for uuid::Uuid {
    fn to_bson(&self) -> Result<BsonValue, BsonError> {
        Ok(BsonValue::Binary(BsonBinary::new(
            BinarySubtype::Uuid,
            self.as_bytes().to_vec(),
        )))
    }
}
