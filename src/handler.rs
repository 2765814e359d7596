//! Runtime reader/writer values with combinators.
//!
//! The trait layer in [`crate::codec`] resolves codecs at compile time;
//! this module provides the same capabilities as first-class values that
//! can be mapped, composed, and late-bound. Handlers are cheap to clone
//! and freely shareable across threads.

use std::sync::{Arc, OnceLock};

use crate::codec::{FromBson, ToBson};
use crate::error::BsonError;
use crate::value::BsonValue;

type ReadFn<T> = dyn Fn(&BsonValue) -> Result<T, BsonError> + Send + Sync;
type WriteFn<T> = dyn Fn(&T) -> Result<BsonValue, BsonError> + Send + Sync;

/// A first-class BSON reader for `T`.
pub struct Reader<T> {
    read: Arc<ReadFn<T>>,
}

impl<T> Clone for Reader<T> {
    fn clone(&self) -> Self {
        Self {
            read: Arc::clone(&self.read),
        }
    }
}

impl<T: 'static> Reader<T> {
    /// Wrap a closure as a reader.
    pub fn from_fn(
        read: impl Fn(&BsonValue) -> Result<T, BsonError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            read: Arc::new(read),
        }
    }

    /// The canonical reader backed by `T`'s [`FromBson`] impl.
    #[must_use]
    pub fn of() -> Self
    where
        T: FromBson,
    {
        Self::from_fn(T::from_bson)
    }

    /// Late-bind a reader: `make` runs at most once, on first use. This
    /// is the fix-point constructor for self-referential codecs.
    pub fn lazy(make: impl Fn() -> Self + Send + Sync + 'static) -> Self {
        let slot: OnceLock<Self> = OnceLock::new();
        Self::from_fn(move |value| slot.get_or_init(&make).read(value))
    }

    /// Decode a value.
    ///
    /// # Errors
    ///
    /// Propagates the underlying reader's failure.
    pub fn read(&self, value: &BsonValue) -> Result<T, BsonError> {
        (self.read)(value)
    }

    /// Decode a value, flattening failure into `None`.
    #[must_use]
    pub fn read_opt(&self, value: &BsonValue) -> Option<T> {
        self.read(value).ok()
    }

    /// Decode a value, substituting a default on any failure.
    pub fn read_or_else(&self, value: &BsonValue, default: impl FnOnce() -> T) -> T {
        self.read(value).unwrap_or_else(|_| default())
    }

    /// A reader producing `f(t)` for every successful read.
    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Reader<U> {
        Reader::from_fn(move |value| self.read(value).map(&f))
    }

    /// A reader post-processing every successful read fallibly.
    pub fn after_read<U: 'static>(
        self,
        f: impl Fn(T) -> Result<U, BsonError> + Send + Sync + 'static,
    ) -> Reader<U> {
        Reader::from_fn(move |value| self.read(value).and_then(&f))
    }

    /// A reader transforming the input value before reading.
    #[must_use]
    pub fn before_read(
        self,
        f: impl Fn(&BsonValue) -> BsonValue + Send + Sync + 'static,
    ) -> Self {
        Self::from_fn(move |value| self.read(&f(value)))
    }

    /// A reader keeping only the values `f` accepts; rejected values
    /// fail with [`BsonError::Decode`].
    pub fn collect<U: 'static>(
        self,
        f: impl Fn(T) -> Option<U> + Send + Sync + 'static,
    ) -> Reader<U> {
        Reader::from_fn(move |value| {
            self.read(value).and_then(|t| {
                f(t).ok_or_else(|| BsonError::decode("value rejected by collect"))
            })
        })
    }

    /// A reader for any supertype `U` of `T`.
    #[must_use]
    pub fn widen<U: From<T> + 'static>(self) -> Reader<U> {
        self.map(U::from)
    }
}

/// A first-class BSON writer for `T`.
pub struct Writer<T> {
    write: Arc<WriteFn<T>>,
}

impl<T> Clone for Writer<T> {
    fn clone(&self) -> Self {
        Self {
            write: Arc::clone(&self.write),
        }
    }
}

impl<T: 'static> Writer<T> {
    /// Wrap a closure as a writer.
    pub fn from_fn(
        write: impl Fn(&T) -> Result<BsonValue, BsonError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            write: Arc::new(write),
        }
    }

    /// The canonical writer backed by `T`'s [`ToBson`] impl.
    #[must_use]
    pub fn of() -> Self
    where
        T: ToBson,
    {
        Self::from_fn(T::to_bson)
    }

    /// Late-bind a writer: `make` runs at most once, on first use.
    pub fn lazy(make: impl Fn() -> Self + Send + Sync + 'static) -> Self {
        let slot: OnceLock<Self> = OnceLock::new();
        Self::from_fn(move |value| slot.get_or_init(&make).write(value))
    }

    /// Encode a value.
    ///
    /// # Errors
    ///
    /// Propagates the underlying writer's failure.
    pub fn write(&self, value: &T) -> Result<BsonValue, BsonError> {
        (self.write)(value)
    }

    /// Encode a value, flattening failure into `None`.
    #[must_use]
    pub fn write_opt(&self, value: &T) -> Option<BsonValue> {
        self.write(value).ok()
    }

    /// A writer for `U` that projects into `T` first.
    pub fn contramap<U: 'static>(self, f: impl Fn(&U) -> T + Send + Sync + 'static) -> Writer<U> {
        Writer::from_fn(move |value| self.write(&f(value)))
    }

    /// A writer for `U` with a fallible projection into `T`.
    pub fn before_write<U: 'static>(
        self,
        f: impl Fn(&U) -> Result<T, BsonError> + Send + Sync + 'static,
    ) -> Writer<U> {
        Writer::from_fn(move |value| self.write(&f(value)?))
    }

    /// A writer post-processing every produced BSON value fallibly.
    #[must_use]
    pub fn after_write(
        self,
        f: impl Fn(BsonValue) -> Result<BsonValue, BsonError> + Send + Sync + 'static,
    ) -> Self {
        Self::from_fn(move |value| self.write(value).and_then(&f))
    }

    /// A writer for any subtype `U` convertible into `T`.
    #[must_use]
    pub fn narrow<U: Clone + Into<T> + 'static>(self) -> Writer<U> {
        self.contramap(|u: &U| u.clone().into())
    }
}

/// A paired reader and writer for `T`.
pub struct Handler<T> {
    reader: Reader<T>,
    writer: Writer<T>,
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
            writer: self.writer.clone(),
        }
    }
}

impl<T: 'static> Handler<T> {
    /// Pair an existing reader and writer.
    #[must_use]
    pub const fn new(reader: Reader<T>, writer: Writer<T>) -> Self {
        Self { reader, writer }
    }

    /// The canonical handler backed by `T`'s trait impls.
    #[must_use]
    pub fn of() -> Self
    where
        T: FromBson + ToBson,
    {
        Self::new(Reader::of(), Writer::of())
    }

    /// Build a handler from two closures.
    pub fn by(
        read: impl Fn(&BsonValue) -> Result<T, BsonError> + Send + Sync + 'static,
        write: impl Fn(&T) -> Result<BsonValue, BsonError> + Send + Sync + 'static,
    ) -> Self {
        Self::new(Reader::from_fn(read), Writer::from_fn(write))
    }

    /// Late-bind both halves: `make` runs at most once, on first use.
    pub fn lazy(make: impl Fn() -> Self + Send + Sync + 'static) -> Self {
        let make = Arc::new(make);
        let read_make = Arc::clone(&make);
        let reader = Reader::lazy(move || (*read_make)().reader);
        let writer = Writer::lazy(move || (*make)().writer);
        Self::new(reader, writer)
    }

    /// The reader half.
    #[must_use]
    pub fn as_reader(&self) -> Reader<T> {
        self.reader.clone()
    }

    /// The writer half.
    #[must_use]
    pub fn as_writer(&self) -> Writer<T> {
        self.writer.clone()
    }

    /// Decode a value.
    ///
    /// # Errors
    ///
    /// Propagates the reader's failure.
    pub fn read(&self, value: &BsonValue) -> Result<T, BsonError> {
        self.reader.read(value)
    }

    /// Decode a value, flattening failure into `None`.
    #[must_use]
    pub fn read_opt(&self, value: &BsonValue) -> Option<T> {
        self.reader.read_opt(value)
    }

    /// Encode a value.
    ///
    /// # Errors
    ///
    /// Propagates the writer's failure.
    pub fn write(&self, value: &T) -> Result<BsonValue, BsonError> {
        self.writer.write(value)
    }

    /// Encode a value, flattening failure into `None`.
    #[must_use]
    pub fn write_opt(&self, value: &T) -> Option<BsonValue> {
        self.writer.write_opt(value)
    }

    /// A handler for `U` mapped through an infallible bijection.
    pub fn xmap<U: 'static>(
        self,
        to: impl Fn(T) -> U + Send + Sync + 'static,
        from: impl Fn(&U) -> T + Send + Sync + 'static,
    ) -> Handler<U> {
        Handler::new(self.reader.map(to), self.writer.contramap(from))
    }

    /// A handler for `U` mapped through a fallible bijection.
    pub fn xmap_try<U: 'static>(
        self,
        to: impl Fn(T) -> Result<U, BsonError> + Send + Sync + 'static,
        from: impl Fn(&U) -> Result<T, BsonError> + Send + Sync + 'static,
    ) -> Handler<U> {
        Handler::new(self.reader.after_read(to), self.writer.before_write(from))
    }
}
