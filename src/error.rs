use thiserror::Error;

/// An error produced while reading, writing, or decoding BSON.
///
/// Errors are returned as values; no operation in this crate panics on
/// malformed input. Record-level readers wrap nested failures in
/// [`BsonError::InField`] so the offending path is visible in the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BsonError {
    /// A value did not match the BSON type expected at this position.
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        /// What the reader expected, e.g. a BSON kind name.
        expected: String,
        /// What was actually found.
        actual: String,
    },

    /// A required key was absent from a document, or an index was out of
    /// range in an array. Absent and explicit Null are treated alike.
    #[error("value not found at '{path}'")]
    ValueNotFound {
        /// Key or index path of the missing value.
        path: String,
    },

    /// Decoding succeeded structurally but a semantic constraint failed,
    /// e.g. a Decimal128 not representable as the requested integer, or
    /// an invalid ObjectId hex string.
    #[error("decode failure: {message}")]
    Decode {
        /// Human-readable description of the violated constraint.
        message: String,
    },

    /// A value could not be written, e.g. a document exceeding the wire
    /// size limit or an element name containing an interior NUL.
    #[error("encode failure: {message}")]
    Encode {
        /// Human-readable description of the violated constraint.
        message: String,
    },

    /// A byte buffer is not well-formed BSON. The offset points at the
    /// byte position where the error was detected.
    #[error("malformed BSON at offset {offset}: {reason}")]
    Malformed {
        /// Byte offset into the input where the error was detected.
        offset: usize,
        /// Stable description of the structural violation.
        reason: &'static str,
    },

    /// A nested failure annotated with the field (or index) it occurred in.
    #[error("error reading field '{name}': {source}")]
    InField {
        /// Field name or array index.
        name: String,
        /// The underlying failure.
        source: Box<BsonError>,
    },
}

impl BsonError {
    /// Construct a [`BsonError::TypeMismatch`].
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Construct a [`BsonError::ValueNotFound`] for `path`.
    pub fn value_not_found(path: impl Into<String>) -> Self {
        Self::ValueNotFound { path: path.into() }
    }

    /// Construct a [`BsonError::Decode`] with `message`.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Construct a [`BsonError::Encode`] with `message`.
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Construct a [`BsonError::Malformed`] at `offset`.
    #[must_use]
    pub const fn malformed(offset: usize, reason: &'static str) -> Self {
        Self::Malformed { offset, reason }
    }

    /// Wrap this error with the name of the field it occurred in.
    #[must_use]
    pub fn in_field(self, name: impl Into<String>) -> Self {
        Self::InField {
            name: name.into(),
            source: Box::new(self),
        }
    }
}
