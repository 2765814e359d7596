//! Wire-format constants: element type tags and binary subtypes.

/// The 1-byte type tag identifying each BSON element on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementType {
    /// 64-bit binary floating point.
    Double = 0x01,
    /// UTF-8 string.
    String = 0x02,
    /// Embedded document.
    Document = 0x03,
    /// Array.
    Array = 0x04,
    /// Binary data.
    Binary = 0x05,
    /// Undefined (deprecated by the BSON spec, still decoded).
    Undefined = 0x06,
    /// ObjectId.
    ObjectId = 0x07,
    /// Boolean.
    Boolean = 0x08,
    /// UTC datetime, signed millis since the Unix epoch.
    DateTime = 0x09,
    /// Null.
    Null = 0x0A,
    /// Regular expression.
    Regex = 0x0B,
    /// JavaScript code.
    JavaScript = 0x0D,
    /// Symbol (deprecated, still decoded).
    Symbol = 0x0E,
    /// JavaScript code with scope.
    JavaScriptWithScope = 0x0F,
    /// Signed 32-bit integer.
    Int32 = 0x10,
    /// Internal MongoDB timestamp.
    Timestamp = 0x11,
    /// Signed 64-bit integer.
    Int64 = 0x12,
    /// 128-bit decimal floating point.
    Decimal128 = 0x13,
    /// Smaller than any other value.
    MinKey = 0xFF,
    /// Larger than any other value.
    MaxKey = 0x7F,
}

impl ElementType {
    /// Resolve a wire tag byte, or `None` for an unknown tag.
    #[must_use]
    pub const fn from_byte(tag: u8) -> Option<Self> {
        Some(match tag {
            0x01 => Self::Double,
            0x02 => Self::String,
            0x03 => Self::Document,
            0x04 => Self::Array,
            0x05 => Self::Binary,
            0x06 => Self::Undefined,
            0x07 => Self::ObjectId,
            0x08 => Self::Boolean,
            0x09 => Self::DateTime,
            0x0A => Self::Null,
            0x0B => Self::Regex,
            0x0D => Self::JavaScript,
            0x0E => Self::Symbol,
            0x0F => Self::JavaScriptWithScope,
            0x10 => Self::Int32,
            0x11 => Self::Timestamp,
            0x12 => Self::Int64,
            0x13 => Self::Decimal128,
            0xFF => Self::MinKey,
            0x7F => Self::MaxKey,
            _ => return None,
        })
    }
}

/// The subtype byte carried by BSON binary values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinarySubtype {
    /// Generic binary data.
    Generic,
    /// Function.
    Function,
    /// Old generic binary (deprecated).
    BinaryOld,
    /// Old UUID representation (deprecated).
    UuidOld,
    /// UUID (RFC 4122 bytes).
    Uuid,
    /// MD5 digest.
    Md5,
    /// User-defined subtypes, `0x80` and above.
    UserDefined(u8),
}

impl From<BinarySubtype> for u8 {
    fn from(subtype: BinarySubtype) -> Self {
        match subtype {
            BinarySubtype::Generic => 0x00,
            BinarySubtype::Function => 0x01,
            BinarySubtype::BinaryOld => 0x02,
            BinarySubtype::UuidOld => 0x03,
            BinarySubtype::Uuid => 0x04,
            BinarySubtype::Md5 => 0x05,
            BinarySubtype::UserDefined(b) => b,
        }
    }
}

impl From<u8> for BinarySubtype {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => Self::Generic,
            0x01 => Self::Function,
            0x02 => Self::BinaryOld,
            0x03 => Self::UuidOld,
            0x04 => Self::Uuid,
            0x05 => Self::Md5,
            b => Self::UserDefined(b),
        }
    }
}
