use wirebson::{
    doc, from_slice, from_slice_with_limits, to_vec, BinarySubtype, BsonBinary, BsonDocument,
    BsonError, BsonRegex, BsonTimestamp, BsonValue, DecodeLimits, Decimal128,
};

#[test]
fn single_string_field_matches_the_reference_bytes() {
    let doc = doc! { "hi": "y'all" };
    let bytes = to_vec(&doc).unwrap();
    assert_eq!(
        bytes,
        b"\x13\x00\x00\x00\x02hi\x00\x06\x00\x00\x00y'all\x00\x00"
    );
    assert_eq!(doc.byte_size(), bytes.len());
    assert_eq!(from_slice(&bytes).unwrap(), doc);
}

#[test]
fn single_int32_field_matches_the_reference_bytes() {
    let doc = doc! { "a": 1i32 };
    let bytes = to_vec(&doc).unwrap();
    assert_eq!(bytes, b"\x0c\x00\x00\x00\x10a\x00\x01\x00\x00\x00\x00");
    assert_eq!(doc.byte_size(), bytes.len());
}

#[test]
fn arrays_encode_with_decimal_index_names() {
    let doc = doc! { "v": [1i32, true] };
    let bytes = to_vec(&doc).unwrap();
    let expected: &[u8] = &[
        0x18, 0x00, 0x00, 0x00, // total length 24
        0x04, b'v', 0x00, // array element
        0x10, 0x00, 0x00, 0x00, // inner length 16
        0x10, b'0', 0x00, 0x01, 0x00, 0x00, 0x00, // "0": Int32(1)
        0x08, b'1', 0x00, 0x01, // "1": true
        0x00, // inner terminator
        0x00, // outer terminator
    ];
    assert_eq!(bytes, expected);
    assert_eq!(doc.byte_size(), bytes.len());
    assert_eq!(from_slice(&bytes).unwrap(), doc);
}

#[test]
fn every_variant_survives_a_wire_round_trip() {
    let doc = doc! {
        "double": 1.25,
        "text": "hello",
        "nested": { "inner": true },
        "array": [1i32, "two", null],
        "binary": (BsonValue::Binary(BsonBinary::new(BinarySubtype::Generic, vec![1, 2, 3]))),
        "boolean": false,
        "datetime": (BsonValue::DateTime(wirebson::BsonDateTime(1_700_000_000_000))),
        "null": null,
        "regex": (BsonValue::Regex(BsonRegex::new("^x", "im"))),
        "int32": 7i32,
        "timestamp": (BsonValue::Timestamp(BsonTimestamp::new(10, 1))),
        "int64": 7i64,
        "decimal": (BsonValue::Decimal128("1.5".parse::<Decimal128>().unwrap())),
        "min": (BsonValue::MinKey),
        "max": (BsonValue::MaxKey),
        "undefined": (BsonValue::Undefined)
    };
    let bytes = to_vec(&doc).unwrap();
    assert_eq!(doc.byte_size(), bytes.len());
    let back = from_slice(&bytes).unwrap();
    assert_eq!(back, doc);
    // Round-tripping again is byte-for-byte stable.
    assert_eq!(to_vec(&back).unwrap(), bytes);
}

#[test]
fn decimal128_fields_encode_low_half_first_little_endian() {
    // BID bits for 1.5: biased exponent 6175, coefficient 15.
    let doc = doc! { "d": (BsonValue::Decimal128("1.5".parse::<Decimal128>().unwrap())) };
    let bytes = to_vec(&doc).unwrap();
    let expected: &[u8] = &[
        0x18, 0x00, 0x00, 0x00, // total length 24
        0x13, b'd', 0x00, // decimal element
        0x0F, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // low  = 15
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x3E, 0x30, // high = 0x303E...
        0x00, // terminator
    ];
    assert_eq!(bytes, expected);
    assert_eq!(doc.byte_size(), bytes.len());

    let back = from_slice(&bytes).unwrap();
    let decoded = back.get("d").and_then(BsonValue::as_decimal128).unwrap();
    assert_eq!(decoded.to_string(), "1.5");
    assert_eq!(back, doc);
}

#[test]
fn duplicate_names_survive_decoding() {
    // { a: 1i32, a: 2i32 } hand-assembled; decoding preserves both.
    let mut bytes = vec![0x13, 0x00, 0x00, 0x00];
    bytes.extend_from_slice(&[0x10, b'a', 0x00, 0x01, 0x00, 0x00, 0x00]);
    bytes.extend_from_slice(&[0x10, b'a', 0x00, 0x02, 0x00, 0x00, 0x00]);
    bytes.push(0x00);
    let doc = from_slice(&bytes).unwrap();
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.get("a"), Some(&BsonValue::Int32(2)));
}

#[test]
fn truncated_input_reports_an_offset() {
    let bytes = to_vec(&doc! { "hi": "y'all" }).unwrap();
    let err = from_slice(&bytes[..bytes.len() - 2]).unwrap_err();
    assert!(matches!(err, BsonError::Malformed { .. }));
}

#[test]
fn unknown_element_type_is_rejected() {
    let bytes = [0x08, 0x00, 0x00, 0x00, 0x7E, b'a', 0x00, 0x00];
    let err = from_slice(&bytes).unwrap_err();
    assert_eq!(err, BsonError::malformed(4, "unknown element type"));
}

#[test]
fn declared_length_must_match_the_terminator() {
    // Length claims 13 bytes but the document ends after 12.
    let bytes = [
        0x0d, 0x00, 0x00, 0x00, 0x10, b'a', 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
    ];
    let err = from_slice(&bytes).unwrap_err();
    assert!(matches!(err, BsonError::Malformed { .. }));
}

#[test]
fn trailing_bytes_are_rejected() {
    let mut bytes = to_vec(&doc! { "a": 1i32 }).unwrap();
    bytes.push(0xFF);
    let err = from_slice(&bytes).unwrap_err();
    assert_eq!(err, BsonError::malformed(12, "trailing bytes after document"));
}

#[test]
fn invalid_boolean_byte_is_rejected() {
    let bytes = [0x09, 0x00, 0x00, 0x00, 0x08, b'b', 0x00, 0x02, 0x00];
    let err = from_slice(&bytes).unwrap_err();
    assert_eq!(err, BsonError::malformed(7, "invalid boolean byte"));
}

#[test]
fn invalid_utf8_is_rejected() {
    // String payload 0xFF is not UTF-8.
    let bytes = [
        0x0e, 0x00, 0x00, 0x00, 0x02, b's', 0x00, 0x02, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00,
    ];
    let err = from_slice(&bytes).unwrap_err();
    assert!(matches!(
        err,
        BsonError::Malformed {
            reason: "string is not valid UTF-8",
            ..
        }
    ));
}

#[test]
fn depth_limit_is_enforced() {
    let mut doc = doc! { "leaf": 1i32 };
    for _ in 0..6 {
        doc = doc! { "next": (BsonValue::Document(doc)) };
    }
    let bytes = to_vec(&doc).unwrap();
    let limits = DecodeLimits {
        max_depth: 3,
        ..DecodeLimits::default()
    };
    let err = from_slice_with_limits(&bytes, limits).unwrap_err();
    assert!(matches!(
        err,
        BsonError::Malformed {
            reason: "nesting depth limit exceeded",
            ..
        }
    ));
    assert!(from_slice(&bytes).is_ok());
}

#[test]
fn element_limit_is_enforced() {
    let doc = doc! { "a": 1i32, "b": 2i32, "c": 3i32 };
    let bytes = to_vec(&doc).unwrap();
    let limits = DecodeLimits {
        max_total_elements: 2,
        ..DecodeLimits::default()
    };
    let err = from_slice_with_limits(&bytes, limits).unwrap_err();
    assert!(matches!(
        err,
        BsonError::Malformed {
            reason: "total element limit exceeded",
            ..
        }
    ));
}

#[test]
fn input_size_limit_is_enforced() {
    let bytes = to_vec(&doc! { "a": "0123456789" }).unwrap();
    let limits = DecodeLimits::for_bytes(8);
    let err = from_slice_with_limits(&bytes, limits).unwrap_err();
    assert_eq!(err, BsonError::malformed(0, "input exceeds decode limits"));
}

#[test]
fn interior_nul_in_names_cannot_be_encoded() {
    let mut doc = BsonDocument::new();
    doc.push("a\0b", 1i32);
    let err = to_vec(&doc).unwrap_err();
    assert!(matches!(err, BsonError::Encode { .. }));
}

#[test]
fn code_with_scope_round_trips() {
    let value = BsonValue::JavaScriptWithScope(wirebson::BsonJavaScriptWithScope {
        code: "function() { return x; }".to_owned(),
        scope: doc! { "x": 3i32 },
    });
    let expected_size = value.byte_size();
    let doc = doc! { "js": (value) };
    let bytes = to_vec(&doc).unwrap();
    assert_eq!(doc.byte_size(), bytes.len());
    let back = from_slice(&bytes).unwrap();
    assert_eq!(back, doc);
    assert_eq!(back.get("js").unwrap().byte_size(), expected_size);
}
