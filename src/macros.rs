//! Construction macros for BSON values and documents.

/// Build a [`crate::BsonValue`] from a JSON-like literal.
///
/// Arrays and nested documents recurse; leaf expressions are lowered
/// through `Into<BsonValue>`, so `Option` leaves become Null when `None`.
///
/// ```
/// use wirebson::bson;
///
/// let value = bson!({ "tags": ["a", "b"], "count": 2 });
/// assert!(value.as_document().is_some());
/// ```
#[macro_export]
macro_rules! bson {
    (null) => {
        $crate::BsonValue::Null
    };
    ([ $($elem:tt),* $(,)? ]) => {{
        let mut __arr = $crate::BsonArray::new();
        $( __arr.push($crate::bson!($elem)); )*
        $crate::BsonValue::Array(__arr)
    }};
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::BsonValue::Document($crate::doc! { $($key: $value),* })
    };
    ($other:expr) => {
        $crate::BsonValue::from($other)
    };
}

/// Build a [`crate::BsonDocument`] from a JSON-like literal.
///
/// Keys are identifiers or string literals; values follow the [`bson!`]
/// grammar.
///
/// ```
/// use wirebson::doc;
///
/// let doc = doc! { "name": "jane", "age": 27 };
/// assert_eq!(doc.len(), 2);
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::BsonDocument::new()
    };
    { $($key:tt : $value:tt),* $(,)? } => {{
        let mut __doc = $crate::BsonDocument::new();
        $( __doc.push($crate::__doc_key!($key), $crate::bson!($value)); )*
        __doc
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __doc_key {
    ($key:ident) => {
        ::core::stringify!($key)
    };
    ($key:literal) => {
        $key
    };
    (($key:expr)) => {
        $key
    };
}
