use core::fmt;

use crate::array::BsonArray;
use crate::decimal::Decimal128;
use crate::document::BsonDocument;
use crate::oid::ObjectId;
use crate::spec::{BinarySubtype, ElementType};

/// Binary data with a subtype byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BsonBinary {
    /// The subtype byte.
    pub subtype: BinarySubtype,
    /// The opaque payload.
    pub bytes: Vec<u8>,
}

impl BsonBinary {
    /// Construct a binary value.
    pub fn new(subtype: BinarySubtype, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            subtype,
            bytes: bytes.into(),
        }
    }

    /// Serialized size: length prefix, subtype byte, payload.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        5 + self.bytes.len()
    }
}

/// A regular expression: pattern plus option flags.
///
/// Flags are single characters and must be stored in alphabetical order
/// for the value to be byte-identical with other producers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BsonRegex {
    /// The regex pattern.
    pub pattern: String,
    /// The option flags, e.g. `"i"` or `"imsx"`.
    pub options: String,
}

impl BsonRegex {
    /// Construct a regex value.
    pub fn new(pattern: impl Into<String>, options: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            options: options.into(),
        }
    }

    /// Serialized size: two NUL-terminated cstrings, no length prefix.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        2 + self.pattern.len() + self.options.len()
    }
}

/// A UTC datetime as signed milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BsonDateTime(
    /// Milliseconds since the Unix epoch.
    pub i64,
);

impl BsonDateTime {
    /// The current instant, truncated to millisecond precision.
    #[must_use]
    pub fn now() -> Self {
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX));
        Self(millis)
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub const fn millis(self) -> i64 {
        self.0
    }

    /// Convert to a `chrono` UTC datetime, `None` if out of chrono's range.
    #[cfg(feature = "chrono")]
    #[must_use]
    pub fn to_chrono(self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.0)
    }
}

#[cfg(feature = "chrono")]
impl From<chrono::DateTime<chrono::Utc>> for BsonDateTime {
    fn from(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self(dt.timestamp_millis())
    }
}

/// An internal MongoDB timestamp: seconds in the high half, an ordinal in
/// the low half of a packed 64-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BsonTimestamp {
    /// Seconds since the Unix epoch.
    pub time: u32,
    /// Ordinal within the second.
    pub increment: u32,
}

impl BsonTimestamp {
    /// Construct from seconds and ordinal.
    #[must_use]
    pub const fn new(time: u32, increment: u32) -> Self {
        Self { time, increment }
    }

    /// The packed 64-bit wire representation.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        ((self.time as u64) << 32) | self.increment as u64
    }

    /// Unpack the 64-bit wire representation.
    #[must_use]
    pub const fn from_u64(raw: u64) -> Self {
        Self {
            time: (raw >> 32) as u32,
            increment: raw as u32,
        }
    }
}

/// JavaScript source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BsonJavaScript(
    /// The source text.
    pub String,
);

/// JavaScript source text with a scope document.
#[derive(Debug, Clone, PartialEq)]
pub struct BsonJavaScriptWithScope {
    /// The source text.
    pub code: String,
    /// Bindings visible to the code.
    pub scope: BsonDocument,
}

impl BsonJavaScriptWithScope {
    /// Serialized size: total-length prefix, length-prefixed code string,
    /// scope document.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        4 + (5 + self.code.len()) + self.scope.byte_size()
    }
}

/// Symbol text (deprecated by the BSON spec, still round-tripped).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BsonSymbol(
    /// The symbol text.
    pub String,
);

/// A BSON value: the closed sum of every type BSON 1.1 can encode.
///
/// Values are immutable; document and array combinators return fresh
/// values. [`BsonValue::byte_size`] is exact: it equals the number of
/// bytes [`crate::encode::to_vec`] emits for the value in place.
#[derive(Debug, Clone, PartialEq)]
pub enum BsonValue {
    /// 64-bit binary floating point.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Embedded document.
    Document(BsonDocument),
    /// Array.
    Array(BsonArray),
    /// Binary data with a subtype.
    Binary(BsonBinary),
    /// Undefined (deprecated, still decoded).
    Undefined,
    /// 12-byte object identifier.
    ObjectId(ObjectId),
    /// Boolean.
    Boolean(bool),
    /// UTC datetime in signed millis.
    DateTime(BsonDateTime),
    /// Null.
    Null,
    /// Regular expression.
    Regex(BsonRegex),
    /// JavaScript code.
    JavaScript(BsonJavaScript),
    /// Symbol (deprecated, still decoded).
    Symbol(BsonSymbol),
    /// JavaScript code with scope.
    JavaScriptWithScope(BsonJavaScriptWithScope),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Internal timestamp.
    Timestamp(BsonTimestamp),
    /// Signed 64-bit integer.
    Int64(i64),
    /// 128-bit decimal floating point.
    Decimal128(Decimal128),
    /// Smaller than any other value.
    MinKey,
    /// Larger than any other value.
    MaxKey,
}

impl BsonValue {
    /// The wire tag for this value.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Double(_) => ElementType::Double,
            Self::String(_) => ElementType::String,
            Self::Document(_) => ElementType::Document,
            Self::Array(_) => ElementType::Array,
            Self::Binary(_) => ElementType::Binary,
            Self::Undefined => ElementType::Undefined,
            Self::ObjectId(_) => ElementType::ObjectId,
            Self::Boolean(_) => ElementType::Boolean,
            Self::DateTime(_) => ElementType::DateTime,
            Self::Null => ElementType::Null,
            Self::Regex(_) => ElementType::Regex,
            Self::JavaScript(_) => ElementType::JavaScript,
            Self::Symbol(_) => ElementType::Symbol,
            Self::JavaScriptWithScope(_) => ElementType::JavaScriptWithScope,
            Self::Int32(_) => ElementType::Int32,
            Self::Timestamp(_) => ElementType::Timestamp,
            Self::Int64(_) => ElementType::Int64,
            Self::Decimal128(_) => ElementType::Decimal128,
            Self::MinKey => ElementType::MinKey,
            Self::MaxKey => ElementType::MaxKey,
        }
    }

    /// Stable kind name used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Double(_) => "Double",
            Self::String(_) => "String",
            Self::Document(_) => "Document",
            Self::Array(_) => "Array",
            Self::Binary(_) => "Binary",
            Self::Undefined => "Undefined",
            Self::ObjectId(_) => "ObjectId",
            Self::Boolean(_) => "Boolean",
            Self::DateTime(_) => "DateTime",
            Self::Null => "Null",
            Self::Regex(_) => "Regex",
            Self::JavaScript(_) => "JavaScript",
            Self::Symbol(_) => "Symbol",
            Self::JavaScriptWithScope(_) => "JavaScriptWithScope",
            Self::Int32(_) => "Int32",
            Self::Timestamp(_) => "Timestamp",
            Self::Int64(_) => "Int64",
            Self::Decimal128(_) => "Decimal128",
            Self::MinKey => "MinKey",
            Self::MaxKey => "MaxKey",
        }
    }

    /// Number of bytes the value's payload occupies on the wire, not
    /// counting the tag byte or element name.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        match self {
            Self::Double(_) | Self::DateTime(_) | Self::Timestamp(_) | Self::Int64(_) => 8,
            Self::String(s) => 5 + s.len(),
            Self::Document(doc) => doc.byte_size(),
            Self::Array(arr) => arr.byte_size(),
            Self::Binary(bin) => bin.byte_size(),
            Self::Undefined | Self::Null | Self::MinKey | Self::MaxKey => 0,
            Self::ObjectId(_) => 12,
            Self::Boolean(_) => 1,
            Self::Regex(re) => re.byte_size(),
            Self::JavaScript(BsonJavaScript(code)) => 5 + code.len(),
            Self::Symbol(BsonSymbol(text)) => 5 + text.len(),
            Self::JavaScriptWithScope(jsws) => jsws.byte_size(),
            Self::Int32(_) => 4,
            Self::Decimal128(_) => 16,
        }
    }

    /// Returns `true` for [`BsonValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The double payload, if this is a Double.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// The string payload, if this is a String.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The document payload, if this is a Document.
    #[must_use]
    pub const fn as_document(&self) -> Option<&BsonDocument> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// The array payload, if this is an Array.
    #[must_use]
    pub const fn as_array(&self) -> Option<&BsonArray> {
        match self {
            Self::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// The boolean payload, if this is a Boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer payload, if this is an Int32.
    #[must_use]
    pub const fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// The integer payload, if this is an Int64.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// The ObjectId payload, if this is an ObjectId.
    #[must_use]
    pub const fn as_object_id(&self) -> Option<ObjectId> {
        match self {
            Self::ObjectId(oid) => Some(*oid),
            _ => None,
        }
    }

    /// The datetime payload, if this is a DateTime.
    #[must_use]
    pub const fn as_datetime(&self) -> Option<BsonDateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// The timestamp payload, if this is a Timestamp.
    #[must_use]
    pub const fn as_timestamp(&self) -> Option<BsonTimestamp> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// The decimal payload, if this is a Decimal128.
    #[must_use]
    pub const fn as_decimal128(&self) -> Option<Decimal128> {
        match self {
            Self::Decimal128(dec) => Some(*dec),
            _ => None,
        }
    }

    /// The binary payload, if this is a Binary.
    #[must_use]
    pub const fn as_binary(&self) -> Option<&BsonBinary> {
        match self {
            Self::Binary(bin) => Some(bin),
            _ => None,
        }
    }
}

fn shell_quote(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("'")?;
    for chunk in text.split_inclusive('\'') {
        match chunk.strip_suffix('\'') {
            Some(head) => {
                f.write_str(head)?;
                f.write_str("\\'")?;
            }
            None => f.write_str(chunk)?,
        }
    }
    f.write_str("'")
}

#[cfg(feature = "chrono")]
fn shell_datetime(f: &mut fmt::Formatter<'_>, dt: BsonDateTime) -> fmt::Result {
    match dt.to_chrono() {
        Some(utc) => write!(f, "ISODate('{}')", utc.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
        None => write!(f, "ISODate({})", dt.millis()),
    }
}

#[cfg(not(feature = "chrono"))]
fn shell_datetime(f: &mut fmt::Formatter<'_>, dt: BsonDateTime) -> fmt::Result {
    write!(f, "ISODate({})", dt.millis())
}

/// Debug helper producing MongoDB-shell-like notation. Not part of the
/// byte contract.
impl fmt::Display for BsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Double(v) => write!(f, "{v:?}"),
            Self::String(s) => shell_quote(f, s),
            Self::Document(doc) => write!(f, "{doc}"),
            Self::Array(arr) => write!(f, "{arr}"),
            Self::Binary(bin) => {
                write!(
                    f,
                    "BinData({}, '{}')",
                    u8::from(bin.subtype),
                    hex::encode(&bin.bytes)
                )
            }
            Self::Undefined => f.write_str("undefined"),
            Self::ObjectId(oid) => write!(f, "ObjectId('{oid}')"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::DateTime(dt) => shell_datetime(f, *dt),
            Self::Null => f.write_str("null"),
            Self::Regex(re) => write!(f, "/{}/{}", re.pattern, re.options),
            Self::JavaScript(BsonJavaScript(code))
            | Self::JavaScriptWithScope(BsonJavaScriptWithScope { code, .. }) => {
                f.write_str(code)
            }
            Self::Symbol(BsonSymbol(text)) => {
                f.write_str("Symbol(")?;
                shell_quote(f, text)?;
                f.write_str(")")
            }
            Self::Int32(v) => write!(f, "{v}"),
            Self::Timestamp(ts) => write!(f, "Timestamp({}, {})", ts.time, ts.increment),
            Self::Int64(v) => write!(f, "NumberLong({v})"),
            Self::Decimal128(dec) => write!(f, "NumberDecimal('{dec}')"),
            Self::MinKey => f.write_str("MinKey"),
            Self::MaxKey => f.write_str("MaxKey"),
        }
    }
}

impl From<f64> for BsonValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<f32> for BsonValue {
    fn from(v: f32) -> Self {
        Self::Double(f64::from(v))
    }
}

impl From<&str> for BsonValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for BsonValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for BsonValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i32> for BsonValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for BsonValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<u32> for BsonValue {
    fn from(v: u32) -> Self {
        i32::try_from(v).map_or_else(|_| Self::Int64(i64::from(v)), Self::Int32)
    }
}

impl From<BsonDocument> for BsonValue {
    fn from(doc: BsonDocument) -> Self {
        Self::Document(doc)
    }
}

impl From<BsonArray> for BsonValue {
    fn from(arr: BsonArray) -> Self {
        Self::Array(arr)
    }
}

impl From<BsonBinary> for BsonValue {
    fn from(bin: BsonBinary) -> Self {
        Self::Binary(bin)
    }
}

impl From<ObjectId> for BsonValue {
    fn from(oid: ObjectId) -> Self {
        Self::ObjectId(oid)
    }
}

impl From<BsonDateTime> for BsonValue {
    fn from(dt: BsonDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<BsonTimestamp> for BsonValue {
    fn from(ts: BsonTimestamp) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<BsonRegex> for BsonValue {
    fn from(re: BsonRegex) -> Self {
        Self::Regex(re)
    }
}

impl From<BsonJavaScript> for BsonValue {
    fn from(js: BsonJavaScript) -> Self {
        Self::JavaScript(js)
    }
}

impl From<BsonJavaScriptWithScope> for BsonValue {
    fn from(jsws: BsonJavaScriptWithScope) -> Self {
        Self::JavaScriptWithScope(jsws)
    }
}

impl From<BsonSymbol> for BsonValue {
    fn from(sym: BsonSymbol) -> Self {
        Self::Symbol(sym)
    }
}

impl From<Decimal128> for BsonValue {
    fn from(dec: Decimal128) -> Self {
        Self::Decimal128(dec)
    }
}

#[cfg(feature = "chrono")]
impl From<chrono::DateTime<chrono::Utc>> for BsonValue {
    fn from(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self::DateTime(BsonDateTime::from(dt))
    }
}

#[cfg(feature = "uuid")]
impl From<uuid::Uuid> for BsonValue {
    fn from(id: uuid::Uuid) -> Self {
        Self::Binary(BsonBinary::new(
            BinarySubtype::Uuid,
            id.as_bytes().to_vec(),
        ))
    }
}

impl<T: Into<BsonValue>> From<Vec<T>> for BsonValue {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().collect())
    }
}

impl<T: Into<BsonValue>> From<Option<T>> for BsonValue {
    /// `None` lowers to Null; element *omission* for `None` is the
    /// document-level [`crate::BsonDocument::append_opt`].
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
