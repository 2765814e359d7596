// Property-based round-trip and byte-size checks.
//
// Generated trees are intentionally shallow to keep CI fast.
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use wirebson::{
    from_slice, to_vec, BsonArray, BsonBinary, BsonDateTime, BsonDocument, BsonElement,
    BsonJavaScript, BsonRegex, BsonSymbol, BsonTimestamp, BsonValue, Decimal128, ObjectId,
};

/// Element names: no interior NUL, since names travel as cstrings.
fn arb_key() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{0,12}"
}

fn arb_scalar() -> impl Strategy<Value = BsonValue> {
    prop_oneof![
        any::<f64>()
            .prop_filter("NaN breaks value equality", |f| !f.is_nan())
            .prop_map(BsonValue::Double),
        any::<String>().prop_map(BsonValue::from),
        any::<bool>().prop_map(BsonValue::Boolean),
        any::<i32>().prop_map(BsonValue::Int32),
        any::<i64>().prop_map(BsonValue::Int64),
        any::<i64>().prop_map(|ms| BsonValue::DateTime(BsonDateTime(ms))),
        (any::<u32>(), any::<u32>())
            .prop_map(|(t, i)| BsonValue::Timestamp(BsonTimestamp::new(t, i))),
        any::<[u8; 12]>().prop_map(|raw| BsonValue::ObjectId(ObjectId::from_bytes(raw))),
        (any::<u64>(), any::<u64>())
            .prop_map(|(high, low)| BsonValue::Decimal128(Decimal128::from_raw(high, low))),
        (any::<u8>(), proptest::collection::vec(any::<u8>(), 0..32))
            .prop_map(|(subtype, bytes)| {
                BsonValue::Binary(BsonBinary::new(subtype.into(), bytes))
            }),
        ("[a-z^$.*]{0,8}", "[imsx]{0,4}")
            .prop_map(|(pattern, options)| BsonValue::Regex(BsonRegex::new(pattern, options))),
        any::<String>().prop_map(|code| BsonValue::JavaScript(BsonJavaScript(code))),
        any::<String>().prop_map(|text| BsonValue::Symbol(BsonSymbol(text))),
        Just(BsonValue::Null),
        Just(BsonValue::Undefined),
        Just(BsonValue::MinKey),
        Just(BsonValue::MaxKey),
    ]
}

fn arb_value() -> impl Strategy<Value = BsonValue> {
    arb_scalar().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6)
                .prop_map(|values| BsonValue::Array(BsonArray::from(values))),
            proptest::collection::vec((arb_key(), inner), 0..6).prop_map(|entries| {
                BsonValue::Document(entries.into_iter().collect())
            }),
        ]
    })
}

fn arb_document() -> impl Strategy<Value = BsonDocument> {
    proptest::collection::vec((arb_key(), arb_value()), 0..8)
        .prop_map(|entries| entries.into_iter().collect())
}

proptest! {
    #[test]
    fn byte_size_equals_encoded_length(doc in arb_document()) {
        let bytes = to_vec(&doc).unwrap();
        prop_assert_eq!(doc.byte_size(), bytes.len());
    }

    #[test]
    fn wire_round_trips_preserve_documents(doc in arb_document()) {
        let bytes = to_vec(&doc).unwrap();
        let back = from_slice(&bytes).unwrap();
        prop_assert_eq!(&back, &doc);
        // Re-encoding is byte-for-byte deterministic.
        prop_assert_eq!(to_vec(&back).unwrap(), bytes);
    }

    #[test]
    fn document_equality_ignores_order(entries in proptest::collection::hash_map(
        arb_key(),
        arb_value(),
        0..6,
    )) {
        let ordered: Vec<BsonElement> = entries
            .into_iter()
            .map(|(k, v)| BsonElement::new(k, v))
            .collect();
        let forward: BsonDocument = ordered.iter().cloned().collect();
        let reverse: BsonDocument = ordered.into_iter().rev().collect();
        prop_assert_eq!(forward, reverse);
    }

    #[test]
    fn strict_documents_expose_at_most_one_element_per_name(
        entries in proptest::collection::vec((arb_key(), arb_value()), 0..8),
    ) {
        let strict = BsonDocument::strict(
            entries.iter().map(|(k, v)| BsonElement::new(k.clone(), v.clone())),
        );
        let names: Vec<&str> = strict.iter().map(|e| e.name.as_str()).collect();
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        prop_assert_eq!(names.len(), deduped.len());
        // Projection agrees with the loose document's last-wins map.
        let loose: BsonDocument = entries.into_iter().collect();
        prop_assert_eq!(strict.to_map(), loose.to_map());
    }

    #[test]
    fn decimal_strings_parse_back(raw in (any::<u64>(), any::<u64>())) {
        let decimal = Decimal128::from_raw(raw.0, raw.1);
        if let Some((negative, exponent, coefficient)) = decimal.finite_parts() {
            let parsed: Decimal128 = decimal.to_string().parse().unwrap();
            prop_assert_eq!(
                parsed.finite_parts().unwrap(),
                (negative, exponent, coefficient)
            );
        }
    }
}
