//! The mapping service: create and list short/long URL pairs.
//!
//! The service holds no mapping state of its own. Every call goes through a
//! [`TabularStore`](sheetlink_core::TabularStore), which is the sole owner
//! of the data.

pub mod error;
pub mod mappings;
pub mod service;

pub use error::MappingError;
pub use mappings::{CreateMapping, Mappings};
pub use service::{DuplicatePolicy, MappingService};
