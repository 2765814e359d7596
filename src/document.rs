use core::fmt;
use std::collections::HashMap;

use crate::codec::FromBson;
use crate::error::BsonError;
use crate::value::BsonValue;

/// One named entry inside a document.
#[derive(Debug, Clone, PartialEq)]
pub struct BsonElement {
    /// The element name.
    pub name: String,
    /// The element value.
    pub value: BsonValue,
}

impl BsonElement {
    /// Construct an element.
    pub fn new(name: impl Into<String>, value: impl Into<BsonValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Serialized size: tag byte, NUL-terminated name, value payload.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        1 + self.name.len() + 1 + self.value.byte_size()
    }
}

impl<N: Into<String>, V: Into<BsonValue>> From<(N, V)> for BsonElement {
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}

/// An ordered collection of named BSON values.
///
/// A plain document preserves insertion order and permits duplicate
/// names; projecting to a map keeps the *last* occurrence of a name. A
/// *strict* document (see [`BsonDocument::strict`]) guarantees at most
/// one element per name: mutations replace the prior element in place,
/// so relative order follows first appearance.
///
/// Equality is name-map equality: two documents compare equal when they
/// hold the same name-to-value mapping, regardless of element order.
#[derive(Debug, Clone, Default)]
pub struct BsonDocument {
    elements: Vec<BsonElement>,
    strict: bool,
}

impl BsonDocument {
    /// An empty document.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            elements: Vec::new(),
            strict: false,
        }
    }

    /// Build a strict document. Later occurrences of a duplicated name
    /// replace the earlier value while keeping the earlier position.
    pub fn strict<I>(elements: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<BsonElement>,
    {
        let mut doc = Self {
            elements: Vec::new(),
            strict: true,
        };
        for element in elements {
            let element = element.into();
            doc.push(element.name, element.value);
        }
        doc
    }

    /// Returns `true` when this document maintains the name-uniqueness
    /// invariant.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// Re-build this document under the strict invariant.
    #[must_use]
    pub fn into_strict(self) -> Self {
        if self.strict {
            self
        } else {
            Self::strict(self.elements)
        }
    }

    /// The ordered element list, duplicates included.
    #[must_use]
    pub fn elements(&self) -> &[BsonElement] {
        &self.elements
    }

    /// Iterate over elements in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, BsonElement> {
        self.elements.iter()
    }

    /// The first element, if any.
    #[must_use]
    pub fn first(&self) -> Option<&BsonElement> {
        self.elements.first()
    }

    /// Number of elements, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` when the document has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Look up a value by name. When the name appears more than once the
    /// last occurrence wins, consistent with [`BsonDocument::to_map`].
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BsonValue> {
        self.elements
            .iter()
            .rev()
            .find(|e| e.name == name)
            .map(|e| &e.value)
    }

    /// Returns `true` when an element with `name` exists.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.elements.iter().any(|e| e.name == name)
    }

    /// Project to a name-to-value map; the last occurrence of a
    /// duplicated name wins.
    #[must_use]
    pub fn to_map(&self) -> HashMap<&str, &BsonValue> {
        self.elements
            .iter()
            .map(|e| (e.name.as_str(), &e.value))
            .collect()
    }

    /// The string payload of `name`, if present and a String.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(BsonValue::as_str)
    }

    /// Append an element, or replace in place under the strict invariant.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<BsonValue>) {
        let name = name.into();
        let value = value.into();
        if self.strict {
            if let Some(existing) = self.elements.iter_mut().find(|e| e.name == name) {
                existing.value = value;
                return;
            }
        }
        self.elements.push(BsonElement { name, value });
    }

    /// Append an element only when `value` is `Some`; `None` yields no
    /// element at all (as opposed to an explicit Null).
    pub fn append_opt(&mut self, name: impl Into<String>, value: Option<impl Into<BsonValue>>) {
        if let Some(value) = value {
            self.push(name, value);
        }
    }

    /// A fresh document holding this document's elements followed by
    /// `other`'s. Strictness is preserved: when `self` is strict the
    /// result is strict and `other`'s duplicates replace in place.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for element in &other.elements {
            out.push(element.name.clone(), element.value.clone());
        }
        out
    }

    /// A fresh document with `elements` appended.
    #[must_use]
    pub fn append_elements<I>(&self, elements: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<BsonElement>,
    {
        let mut out = self.clone();
        for element in elements {
            let element = element.into();
            out.push(element.name, element.value);
        }
        out
    }

    /// A fresh document without any element named in `keys`.
    #[must_use]
    pub fn remove_keys(&self, keys: &[&str]) -> Self {
        Self {
            elements: self
                .elements
                .iter()
                .filter(|e| !keys.contains(&e.name.as_str()))
                .cloned()
                .collect(),
            strict: self.strict,
        }
    }

    /// Serialized size: total-length prefix, elements, trailing NUL.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        5 + self
            .elements
            .iter()
            .map(BsonElement::byte_size)
            .sum::<usize>()
    }

    /// Read `name` with `T`'s reader. Returns `None` when the key is
    /// absent, the value is Null, or the reader fails.
    #[must_use]
    pub fn get_as<T: FromBson>(&self, name: &str) -> Option<T> {
        self.try_get_as(name).ok()
    }

    /// Read `name` with `T`'s reader. Absent-or-Null fails with
    /// [`BsonError::ValueNotFound`]; reader failures propagate with the
    /// field name attached.
    pub fn try_get_as<T: FromBson>(&self, name: &str) -> Result<T, BsonError> {
        match self.get(name) {
            None | Some(BsonValue::Null) => Err(BsonError::value_not_found(name)),
            Some(value) => T::from_bson(value).map_err(|e| e.in_field(name)),
        }
    }

    /// Read `name` with `T`'s reader, substituting `default` on absence,
    /// Null, or any reader failure.
    #[must_use]
    pub fn get_as_or<T: FromBson>(&self, name: &str, default: T) -> T {
        self.get_as(name).unwrap_or(default)
    }

    /// Read `name` with `T`'s reader, computing a default on absence,
    /// Null, or any reader failure.
    pub fn get_as_or_else<T: FromBson>(&self, name: &str, default: impl FnOnce() -> T) -> T {
        self.get_as(name).unwrap_or_else(default)
    }

    /// Read an optional field without flattening failure into absence:
    /// absent-or-Null is `Ok(None)`, a successful read is `Ok(Some(_))`,
    /// and a reader failure is an error.
    pub fn try_get_opt<T: FromBson>(&self, name: &str) -> Result<Option<T>, BsonError> {
        match self.get(name) {
            None | Some(BsonValue::Null) => Ok(None),
            Some(value) => T::from_bson(value)
                .map(Some)
                .map_err(|e| e.in_field(name)),
        }
    }
}

impl PartialEq for BsonDocument {
    fn eq(&self, other: &Self) -> bool {
        self.to_map() == other.to_map()
    }
}

impl<E: Into<BsonElement>> FromIterator<E> for BsonDocument {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().map(Into::into).collect(),
            strict: false,
        }
    }
}

impl<E: Into<BsonElement>> Extend<E> for BsonDocument {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for element in iter {
            let element = element.into();
            self.push(element.name, element.value);
        }
    }
}

impl IntoIterator for BsonDocument {
    type Item = BsonElement;
    type IntoIter = std::vec::IntoIter<BsonElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a> IntoIterator for &'a BsonDocument {
    type Item = &'a BsonElement;
    type IntoIter = core::slice::Iter<'a, BsonElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl fmt::Display for BsonDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, " '{}': {}", element.name, element.value)?;
        }
        if self.elements.is_empty() {
            f.write_str("}")
        } else {
            f.write_str(" }")
        }
    }
}
