//! Core types and traits for the sheetlink URL mapping store.
//!
//! This crate provides the shared domain types (mappings, rows, range
//! descriptors) and the [`TabularStore`] trait implemented by every
//! storage adapter.

pub mod error;
pub mod mapping;
pub mod range;
pub mod store;

pub use error::{CoreError, StorageError};
pub use mapping::{ColumnLayout, UrlMapping};
pub use range::SheetRange;
pub use store::{Row, TabularStore};
