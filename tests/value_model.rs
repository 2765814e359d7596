use wirebson::{
    doc, BsonArray, BsonDateTime, BsonDocument, BsonElement, BsonError, BsonRegex, BsonTimestamp,
    BsonValue, Decimal128, ObjectId,
};

#[test]
fn scalar_byte_sizes_match_the_wire_table() {
    assert_eq!(BsonValue::Double(1.2).byte_size(), 8);
    assert_eq!(BsonValue::from("hai").byte_size(), 8);
    assert_eq!(BsonValue::Boolean(true).byte_size(), 1);
    assert_eq!(BsonValue::Int32(42).byte_size(), 4);
    assert_eq!(BsonValue::Int64(42).byte_size(), 8);
    assert_eq!(BsonValue::DateTime(BsonDateTime(0)).byte_size(), 8);
    assert_eq!(BsonValue::Timestamp(BsonTimestamp::new(1, 2)).byte_size(), 8);
    assert_eq!(BsonValue::ObjectId(ObjectId::from_bytes([0; 12])).byte_size(), 12);
    assert_eq!(BsonValue::Decimal128(Decimal128::from_i64(1)).byte_size(), 16);
    assert_eq!(BsonValue::Null.byte_size(), 0);
    assert_eq!(BsonValue::Undefined.byte_size(), 0);
    assert_eq!(BsonValue::MinKey.byte_size(), 0);
    assert_eq!(BsonValue::MaxKey.byte_size(), 0);
    assert_eq!(
        BsonValue::Regex(BsonRegex::new("ab", "i")).byte_size(),
        2 + 2 + 1
    );
}

#[test]
fn empty_document_is_five_bytes() {
    assert_eq!(BsonDocument::new().byte_size(), 5);
    assert_eq!(doc! { "a": 1i32 }.byte_size(), 5 + 1 + 2 + 4);
}

#[test]
fn document_equality_ignores_element_order() {
    let ab = doc! { "a": 1i32, "b": 2i32 };
    let ba = doc! { "b": 2i32, "a": 1i32 };
    assert_eq!(ab, ba);

    let other = doc! { "a": 1i32, "b": 3i32 };
    assert_ne!(ab, other);
}

#[test]
fn array_equality_is_position_sensitive() {
    let ab: BsonArray = [1i32, 2].into_iter().collect();
    let ba: BsonArray = [2i32, 1].into_iter().collect();
    assert_ne!(ab, ba);
    assert_eq!(ab, [1i32, 2].into_iter().collect::<BsonArray>());
}

#[test]
fn duplicate_names_project_to_the_last_occurrence() {
    let doc: BsonDocument = [("a", 1i32), ("a", 2i32)].into_iter().collect();
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.get("a"), Some(&BsonValue::Int32(2)));
    assert_eq!(doc.to_map().get("a"), Some(&&BsonValue::Int32(2)));

    // Map equality makes a duplicated document equal to its projection.
    assert_eq!(doc, doc! { "a": 2i32 });
}

#[test]
fn strict_documents_replace_in_place() {
    let strict = BsonDocument::strict([("a", 1i32), ("b", 2i32), ("a", 3i32)]);
    assert!(strict.is_strict());
    assert_eq!(strict.len(), 2);
    assert_eq!(strict.elements()[0].name, "a");
    assert_eq!(strict.elements()[0].value, BsonValue::Int32(3));
    assert_eq!(strict.elements()[1].name, "b");

    let mut grown = strict.clone();
    grown.push("b", 9i32);
    assert_eq!(grown.len(), 2);
    assert_eq!(grown.get("b"), Some(&BsonValue::Int32(9)));
}

#[test]
fn strict_survives_combinators() {
    let strict = BsonDocument::strict([("a", 1i32)]);
    let merged = strict.concat(&doc! { "a": 5i32, "b": 6i32 });
    assert!(merged.is_strict());
    assert_eq!(merged.len(), 2);
    assert_eq!(merged.get("a"), Some(&BsonValue::Int32(5)));

    let trimmed = merged.remove_keys(&["a"]);
    assert!(trimmed.is_strict());
    assert_eq!(trimmed.len(), 1);
    assert!(!trimmed.contains_key("a"));
}

#[test]
fn concat_and_append_return_fresh_documents() {
    let base = doc! { "a": 1i32 };
    let merged = base.concat(&doc! { "b": 2i32 });
    assert_eq!(base.len(), 1);
    assert_eq!(merged.len(), 2);

    let appended = base.append_elements([BsonElement::new("c", 3i32)]);
    assert_eq!(appended.len(), 2);
    assert_eq!(appended.first().map(|e| e.name.as_str()), Some("a"));
}

#[test]
fn append_opt_omits_none() {
    let mut doc = BsonDocument::new();
    doc.append_opt("present", Some("v"));
    doc.append_opt("absent", None::<&str>);
    assert_eq!(doc.len(), 1);
    assert!(doc.contains_key("present"));
    assert!(!doc.contains_key("absent"));
}

#[test]
fn typed_accessors_distinguish_absence_null_and_failure() {
    let doc = doc! { "name": "jane", "missing_t": null, "count": 7i32 };

    assert_eq!(doc.get_as::<String>("name"), Some("jane".to_owned()));
    assert_eq!(doc.get_as::<String>("count"), None);
    assert_eq!(doc.get_as::<String>("nope"), None);

    assert!(matches!(
        doc.try_get_as::<String>("nope"),
        Err(BsonError::ValueNotFound { .. })
    ));
    assert!(matches!(
        doc.try_get_as::<String>("missing_t"),
        Err(BsonError::ValueNotFound { .. })
    ));
    assert!(matches!(
        doc.try_get_as::<String>("count"),
        Err(BsonError::InField { .. })
    ));

    assert_eq!(doc.get_as_or("count", 0i32), 7);
    assert_eq!(doc.get_as_or("nope", 13i32), 13);

    assert_eq!(doc.try_get_opt::<String>("nope"), Ok(None));
    assert_eq!(doc.try_get_opt::<String>("missing_t"), Ok(None));
    assert_eq!(doc.try_get_opt::<String>("name"), Ok(Some("jane".to_owned())));
    assert!(doc.try_get_opt::<String>("count").is_err());
}

#[test]
fn array_accessors_report_index_paths() {
    let arr: BsonArray = ["x"].into_iter().collect();
    assert_eq!(arr.get_as::<String>(0), Some("x".to_owned()));
    assert!(matches!(
        arr.try_get_as::<String>(3),
        Err(BsonError::ValueNotFound { path }) if path == "[3]"
    ));
    assert_eq!(arr.try_get_opt::<i32>(3), Ok(None));
}

#[test]
fn shell_notation_for_scalars() {
    assert_eq!(BsonValue::from("y'all").to_string(), r"'y\'all'");
    assert_eq!(BsonValue::Int64(12).to_string(), "NumberLong(12)");
    assert_eq!(
        BsonValue::Timestamp(BsonTimestamp::new(4, 2)).to_string(),
        "Timestamp(4, 2)"
    );
    assert_eq!(BsonValue::MinKey.to_string(), "MinKey");
    assert_eq!(BsonValue::Undefined.to_string(), "undefined");
    assert_eq!(
        BsonValue::Regex(BsonRegex::new("^a+", "i")).to_string(),
        "/^a+/i"
    );
    assert_eq!(
        BsonValue::Decimal128(Decimal128::from_i64(10)).to_string(),
        "NumberDecimal('10')"
    );

    let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
    assert_eq!(
        BsonValue::ObjectId(oid).to_string(),
        "ObjectId('507f1f77bcf86cd799439011')"
    );
}

#[cfg(feature = "chrono")]
#[test]
fn shell_notation_for_datetimes() {
    assert_eq!(
        BsonValue::DateTime(BsonDateTime(0)).to_string(),
        "ISODate('1970-01-01T00:00:00.000Z')"
    );
}

#[test]
fn shell_notation_for_containers() {
    let doc = doc! { "a": 1i32, "b": [true, null] };
    assert_eq!(doc.to_string(), "{ 'a': 1, 'b': [true, null] }");
    assert_eq!(BsonDocument::new().to_string(), "{}");
}
