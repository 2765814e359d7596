//! Document-to-bytes serialization, BSON 1.1 wire format.

use crate::array::BsonArray;
use crate::document::BsonDocument;
use crate::error::BsonError;
use crate::value::BsonValue;

/// Serialize a document to BSON bytes.
///
/// The output length always equals [`BsonDocument::byte_size`].
///
/// # Errors
///
/// Returns [`BsonError::Encode`] when a document or string exceeds the
/// `i32` length limit, or an element name or cstring payload contains an
/// interior NUL.
pub fn to_vec(doc: &BsonDocument) -> Result<Vec<u8>, BsonError> {
    let mut buf = Vec::with_capacity(doc.byte_size());
    write_document(&mut buf, doc)?;
    Ok(buf)
}

fn length_prefix(size: usize) -> Result<i32, BsonError> {
    i32::try_from(size).map_err(|_| BsonError::encode("document exceeds the 2 GiB wire limit"))
}

fn write_cstring(buf: &mut Vec<u8>, text: &str) -> Result<(), BsonError> {
    if text.as_bytes().contains(&0) {
        return Err(BsonError::encode(format!(
            "cstring '{text}' contains an interior NUL"
        )));
    }
    buf.extend_from_slice(text.as_bytes());
    buf.push(0);
    Ok(())
}

fn write_string(buf: &mut Vec<u8>, text: &str) -> Result<(), BsonError> {
    let len = length_prefix(text.len() + 1)?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(text.as_bytes());
    buf.push(0);
    Ok(())
}

fn write_document(buf: &mut Vec<u8>, doc: &BsonDocument) -> Result<(), BsonError> {
    let total = length_prefix(doc.byte_size())?;
    buf.extend_from_slice(&total.to_le_bytes());
    for element in doc.iter() {
        buf.push(element.value.element_type() as u8);
        write_cstring(buf, &element.name)?;
        write_value(buf, &element.value)?;
    }
    buf.push(0);
    Ok(())
}

fn write_bson_array(buf: &mut Vec<u8>, arr: &BsonArray) -> Result<(), BsonError> {
    let total = length_prefix(arr.byte_size())?;
    buf.extend_from_slice(&total.to_le_bytes());
    for (i, value) in arr.iter().enumerate() {
        buf.push(value.element_type() as u8);
        buf.extend_from_slice(i.to_string().as_bytes());
        buf.push(0);
        write_value(buf, value)?;
    }
    buf.push(0);
    Ok(())
}

fn write_value(buf: &mut Vec<u8>, value: &BsonValue) -> Result<(), BsonError> {
    match value {
        BsonValue::Double(v) => buf.extend_from_slice(&v.to_le_bytes()),
        BsonValue::String(s) => write_string(buf, s)?,
        BsonValue::Document(doc) => write_document(buf, doc)?,
        BsonValue::Array(arr) => write_bson_array(buf, arr)?,
        BsonValue::Binary(bin) => {
            let len = length_prefix(bin.bytes.len())?;
            buf.extend_from_slice(&len.to_le_bytes());
            buf.push(u8::from(bin.subtype));
            buf.extend_from_slice(&bin.bytes);
        }
        BsonValue::Undefined
        | BsonValue::Null
        | BsonValue::MinKey
        | BsonValue::MaxKey => {}
        BsonValue::ObjectId(oid) => buf.extend_from_slice(&oid.bytes()),
        BsonValue::Boolean(b) => buf.push(u8::from(*b)),
        BsonValue::DateTime(dt) => buf.extend_from_slice(&dt.millis().to_le_bytes()),
        BsonValue::Regex(re) => {
            write_cstring(buf, &re.pattern)?;
            write_cstring(buf, &re.options)?;
        }
        BsonValue::JavaScript(js) => write_string(buf, &js.0)?,
        BsonValue::Symbol(sym) => write_string(buf, &sym.0)?,
        BsonValue::JavaScriptWithScope(jsws) => {
            let total = length_prefix(jsws.byte_size())?;
            buf.extend_from_slice(&total.to_le_bytes());
            write_string(buf, &jsws.code)?;
            write_document(buf, &jsws.scope)?;
        }
        BsonValue::Int32(v) => buf.extend_from_slice(&v.to_le_bytes()),
        BsonValue::Timestamp(ts) => buf.extend_from_slice(&ts.as_u64().to_le_bytes()),
        BsonValue::Int64(v) => buf.extend_from_slice(&v.to_le_bytes()),
        BsonValue::Decimal128(dec) => {
            buf.extend_from_slice(&dec.low().to_le_bytes());
            buf.extend_from_slice(&dec.high().to_le_bytes());
        }
    }
    Ok(())
}
