//! Disposable containers for sheetlink integration tests.

mod error;
pub mod mysql;

pub use error::{Result, TestInfraError};
