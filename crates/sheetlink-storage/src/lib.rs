//! Storage adapters for the sheetlink mapping store.
//!
//! Every adapter implements [`TabularStore`] over one fixed range:
//!
//! - [`InMemoryTable`] keeps rows in process memory.
//! - [`SheetsTable`] appends to and reads from a Google Sheets spreadsheet.
//! - [`MySqlTable`] keeps rows in a MySQL table ordered by insertion.

pub mod memory;
pub mod mysql;
pub mod sheets;

pub use memory::InMemoryTable;
pub use mysql::MySqlTable;
pub use sheets::{SheetsConfig, SheetsTable, ValueInputOption};
pub use sheetlink_core::{Row, StorageError, TabularStore};
