//! Bytes-to-document deserialization with structural validation.
//!
//! Every error carries the byte offset where the violation was
//! detected. Resource limits are enforced deterministically via
//! [`DecodeLimits`].

use crate::array::BsonArray;
use crate::decimal::Decimal128;
use crate::document::BsonDocument;
use crate::error::BsonError;
use crate::oid::ObjectId;
use crate::spec::ElementType;
use crate::value::{
    BsonBinary, BsonDateTime, BsonJavaScript, BsonJavaScriptWithScope, BsonRegex, BsonSymbol,
    BsonTimestamp, BsonValue,
};

/// Default maximum input size: the 16 MiB MongoDB document cap.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 16 * 1024 * 1024;

/// Default maximum nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Decode-time resource limits.
///
/// Limits are enforced deterministically; exceeding any of them yields
/// a [`BsonError::Malformed`] at the offending offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum total input length in bytes.
    pub max_input_bytes: usize,
    /// Maximum document/array nesting depth.
    pub max_depth: usize,
    /// Maximum total element count across the decoded tree.
    pub max_total_elements: usize,
}

impl DecodeLimits {
    /// Conservative limits derived from a maximum input size.
    #[must_use]
    pub const fn for_bytes(max_input_bytes: usize) -> Self {
        Self {
            max_input_bytes,
            max_depth: DEFAULT_MAX_DEPTH,
            // Every element costs at least 2 bytes on the wire.
            max_total_elements: max_input_bytes / 2,
        }
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self::for_bytes(DEFAULT_MAX_INPUT_BYTES)
    }
}

/// Deserialize a document from BSON bytes with default limits.
///
/// # Errors
///
/// Returns [`BsonError::Malformed`] with a byte offset when the input is
/// not well-formed BSON or exceeds the default [`DecodeLimits`].
pub fn from_slice(bytes: &[u8]) -> Result<BsonDocument, BsonError> {
    from_slice_with_limits(bytes, DecodeLimits::default())
}

/// Deserialize a document from BSON bytes with explicit limits.
///
/// # Errors
///
/// Returns [`BsonError::Malformed`] with a byte offset when the input is
/// not well-formed BSON or exceeds `limits`.
pub fn from_slice_with_limits(
    bytes: &[u8],
    limits: DecodeLimits,
) -> Result<BsonDocument, BsonError> {
    if bytes.len() > limits.max_input_bytes {
        return Err(BsonError::malformed(0, "input exceeds decode limits"));
    }
    let mut cursor = Cursor {
        input: bytes,
        pos: 0,
    };
    let mut elements = 0usize;
    let doc = read_document(&mut cursor, limits, 0, &mut elements)?;
    if cursor.pos != bytes.len() {
        return Err(BsonError::malformed(
            cursor.pos,
            "trailing bytes after document",
        ));
    }
    Ok(doc)
}

struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn fail(&self, reason: &'static str) -> BsonError {
        BsonError::malformed(self.pos, reason)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], BsonError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.input.len())
            .ok_or_else(|| self.fail("unexpected end of input"))?;
        let slice = &self.input[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, BsonError> {
        Ok(self.take(1)?[0])
    }

    fn read_i32(&mut self) -> Result<i32, BsonError> {
        let raw = self.take(4)?;
        Ok(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn read_u64(&mut self) -> Result<u64, BsonError> {
        let raw = self.take(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(raw);
        Ok(u64::from_le_bytes(bytes))
    }

    fn read_i64(&mut self) -> Result<i64, BsonError> {
        let raw = self.take(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(raw);
        Ok(i64::from_le_bytes(bytes))
    }

    fn read_f64(&mut self) -> Result<f64, BsonError> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// A NUL-terminated UTF-8 string without a length prefix.
    fn read_cstring(&mut self) -> Result<&'a str, BsonError> {
        let rest = &self.input[self.pos..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| self.fail("unterminated cstring"))?;
        let text = simdutf8::basic::from_utf8(&rest[..nul])
            .map_err(|_| self.fail("cstring is not valid UTF-8"))?;
        self.pos += nul + 1;
        Ok(text)
    }

    /// A length-prefixed, NUL-terminated UTF-8 string.
    fn read_string(&mut self) -> Result<&'a str, BsonError> {
        let declared = self.read_i32()?;
        let len = usize::try_from(declared)
            .ok()
            .filter(|&len| len >= 1)
            .ok_or_else(|| self.fail("invalid string length"))?;
        let raw = self.take(len)?;
        let (payload, terminator) = raw.split_at(len - 1);
        if terminator != [0] {
            return Err(BsonError::malformed(
                self.pos - 1,
                "string is not NUL-terminated",
            ));
        }
        simdutf8::basic::from_utf8(payload)
            .map_err(|_| BsonError::malformed(self.pos - len, "string is not valid UTF-8"))
    }
}

struct Frame {
    end: usize,
}

/// Read a document's length prefix and validate it against the input.
fn enter(cursor: &mut Cursor<'_>, limits: DecodeLimits, depth: usize) -> Result<Frame, BsonError> {
    if depth > limits.max_depth {
        return Err(cursor.fail("nesting depth limit exceeded"));
    }
    let start = cursor.pos;
    let declared = cursor.read_i32()?;
    let total = usize::try_from(declared)
        .ok()
        .filter(|&total| total >= 5)
        .ok_or_else(|| BsonError::malformed(start, "invalid document length"))?;
    let end = start
        .checked_add(total)
        .filter(|&end| end <= cursor.input.len())
        .ok_or_else(|| BsonError::malformed(start, "document length exceeds input"))?;
    Ok(Frame { end })
}

fn read_document(
    cursor: &mut Cursor<'_>,
    limits: DecodeLimits,
    depth: usize,
    elements: &mut usize,
) -> Result<BsonDocument, BsonError> {
    let frame = enter(cursor, limits, depth)?;
    let mut doc = BsonDocument::new();
    loop {
        let tag = cursor.read_u8()?;
        if tag == 0 {
            if cursor.pos != frame.end {
                return Err(cursor.fail("document length mismatch"));
            }
            return Ok(doc);
        }
        let tag_offset = cursor.pos - 1;
        let element_type = ElementType::from_byte(tag)
            .ok_or_else(|| BsonError::malformed(tag_offset, "unknown element type"))?;
        let name = cursor.read_cstring()?.to_owned();
        bump(cursor, limits, elements)?;
        let value = read_value(cursor, element_type, limits, depth, elements)?;
        doc.push(name, value);
    }
}

/// Arrays share the document wire shape; the decimal-index names are
/// skipped rather than validated, matching the reference decoders.
fn read_array(
    cursor: &mut Cursor<'_>,
    limits: DecodeLimits,
    depth: usize,
    elements: &mut usize,
) -> Result<BsonArray, BsonError> {
    let frame = enter(cursor, limits, depth)?;
    let mut arr = BsonArray::new();
    loop {
        let tag = cursor.read_u8()?;
        if tag == 0 {
            if cursor.pos != frame.end {
                return Err(cursor.fail("array length mismatch"));
            }
            return Ok(arr);
        }
        let tag_offset = cursor.pos - 1;
        let element_type = ElementType::from_byte(tag)
            .ok_or_else(|| BsonError::malformed(tag_offset, "unknown element type"))?;
        cursor.read_cstring()?;
        bump(cursor, limits, elements)?;
        let value = read_value(cursor, element_type, limits, depth, elements)?;
        arr.push(value);
    }
}

fn bump(
    cursor: &Cursor<'_>,
    limits: DecodeLimits,
    elements: &mut usize,
) -> Result<(), BsonError> {
    *elements += 1;
    if *elements > limits.max_total_elements {
        return Err(cursor.fail("total element limit exceeded"));
    }
    Ok(())
}

fn read_value(
    cursor: &mut Cursor<'_>,
    element_type: ElementType,
    limits: DecodeLimits,
    depth: usize,
    elements: &mut usize,
) -> Result<BsonValue, BsonError> {
    Ok(match element_type {
        ElementType::Double => BsonValue::Double(cursor.read_f64()?),
        ElementType::String => BsonValue::String(cursor.read_string()?.to_owned()),
        ElementType::Document => {
            BsonValue::Document(read_document(cursor, limits, depth + 1, elements)?)
        }
        ElementType::Array => BsonValue::Array(read_array(cursor, limits, depth + 1, elements)?),
        ElementType::Binary => {
            let declared = cursor.read_i32()?;
            let len = usize::try_from(declared)
                .map_err(|_| cursor.fail("negative binary length"))?;
            let subtype = cursor.read_u8()?;
            let bytes = cursor.take(len)?.to_vec();
            BsonValue::Binary(BsonBinary::new(subtype.into(), bytes))
        }
        ElementType::Undefined => BsonValue::Undefined,
        ElementType::ObjectId => {
            let raw = cursor.take(12)?;
            let mut bytes = [0u8; 12];
            bytes.copy_from_slice(raw);
            BsonValue::ObjectId(ObjectId::from_bytes(bytes))
        }
        ElementType::Boolean => match cursor.read_u8()? {
            0 => BsonValue::Boolean(false),
            1 => BsonValue::Boolean(true),
            _ => return Err(BsonError::malformed(cursor.pos - 1, "invalid boolean byte")),
        },
        ElementType::DateTime => BsonValue::DateTime(BsonDateTime(cursor.read_i64()?)),
        ElementType::Null => BsonValue::Null,
        ElementType::Regex => {
            let pattern = cursor.read_cstring()?.to_owned();
            let options = cursor.read_cstring()?.to_owned();
            BsonValue::Regex(BsonRegex { pattern, options })
        }
        ElementType::JavaScript => {
            BsonValue::JavaScript(BsonJavaScript(cursor.read_string()?.to_owned()))
        }
        ElementType::Symbol => BsonValue::Symbol(BsonSymbol(cursor.read_string()?.to_owned())),
        ElementType::JavaScriptWithScope => {
            let start = cursor.pos;
            let declared = cursor.read_i32()?;
            let total = usize::try_from(declared)
                .map_err(|_| BsonError::malformed(start, "invalid code-with-scope length"))?;
            let code = cursor.read_string()?.to_owned();
            let scope = read_document(cursor, limits, depth + 1, elements)?;
            if cursor.pos != start + total {
                return Err(BsonError::malformed(start, "code-with-scope length mismatch"));
            }
            BsonValue::JavaScriptWithScope(BsonJavaScriptWithScope { code, scope })
        }
        ElementType::Int32 => BsonValue::Int32(cursor.read_i32()?),
        ElementType::Timestamp => BsonValue::Timestamp(BsonTimestamp::from_u64(cursor.read_u64()?)),
        ElementType::Int64 => BsonValue::Int64(cursor.read_i64()?),
        ElementType::Decimal128 => {
            let low = cursor.read_u64()?;
            let high = cursor.read_u64()?;
            BsonValue::Decimal128(Decimal128::from_raw(high, low))
        }
        ElementType::MinKey => BsonValue::MinKey,
        ElementType::MaxKey => BsonValue::MaxKey,
    })
}
