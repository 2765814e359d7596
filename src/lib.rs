//! # wirebson
//!
//! A BSON 1.1 document model with an exact wire codec and derivable
//! handlers for user-defined types.
//!
//! ## Design principles
//!
//! - **Values are immutable.** Document and array combinators return
//!   fresh values; codecs are shareable across threads.
//! - **Sizes are exact.** [`BsonValue::byte_size`] equals the length of
//!   the bytes [`encode::to_vec`] emits, for every value.
//! - **Errors are values.** Every fallible operation returns a
//!   [`BsonError`]; decode errors carry byte offsets, record-field
//!   failures carry the field path.
//!
//! ## Layers
//!
//! - The value algebra: [`BsonValue`], [`BsonDocument`], [`BsonArray`],
//!   [`ObjectId`], [`Decimal128`], and friends.
//! - The codec traits: [`FromBson`] / [`ToBson`] with impls for
//!   primitives, collections, dates, and UUIDs, plus the
//!   document-specialized [`FromBsonDocument`] / [`ToBsonDocument`].
//! - Runtime [`Reader`] / [`Writer`] / [`Handler`] values with
//!   combinators (`map`, `contramap`, `after_read`, `lazy`, ...).
//! - `#[derive(FromBson, ToBson)]` (feature `derive`, on by default)
//!   with `#[bson(...)]` attributes for renaming, flattening, skipping,
//!   discriminators, and wire-level naming policies.
//!
//! ## Feature flags
//!
//! - `derive` *(default)*: re-exports the derive macros.
//! - `chrono` *(default)*: `chrono::DateTime<Utc>` handlers and ISODate
//!   pretty-printing.
//! - `uuid` *(default)*: `uuid::Uuid` handlers via binary subtype 4.
//!
//! ## Safety
//!
//! This crate forbids `unsafe` code.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod array;
mod bridge;
mod codec;
mod decimal;
pub mod decode;
mod document;
pub mod encode;
mod error;
mod handler;
mod macros;
mod oid;
mod spec;
mod value;

pub use crate::array::BsonArray;
pub use crate::bridge::{BsonBooleanLike, BsonNumberLike};
pub use crate::codec::{FromBson, FromBsonDocument, ToBson, ToBsonDocument};
pub use crate::decimal::Decimal128;
pub use crate::decode::{from_slice, from_slice_with_limits, DecodeLimits};
pub use crate::document::{BsonDocument, BsonElement};
pub use crate::encode::to_vec;
pub use crate::error::BsonError;
pub use crate::handler::{Handler, Reader, Writer};
pub use crate::oid::ObjectId;
pub use crate::spec::{BinarySubtype, ElementType};
pub use crate::value::{
    BsonBinary, BsonDateTime, BsonJavaScript, BsonJavaScriptWithScope, BsonRegex, BsonSymbol,
    BsonTimestamp, BsonValue,
};

/// Derive a [`FromBson`] + [`FromBsonDocument`] implementation pair for
/// a record or sum type. See the crate docs for the `#[bson(...)]`
/// attribute grammar.
#[cfg(feature = "derive")]
#[cfg_attr(docsrs, doc(cfg(feature = "derive")))]
pub use wirebson_derive::FromBson;

/// Derive a [`ToBson`] + [`ToBsonDocument`] implementation pair for a
/// record or sum type. See the crate docs for the `#[bson(...)]`
/// attribute grammar.
#[cfg(feature = "derive")]
#[cfg_attr(docsrs, doc(cfg(feature = "derive")))]
pub use wirebson_derive::ToBson;
