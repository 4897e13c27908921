use crate::store::Row;
use serde::{Deserialize, Serialize};

/// A short code paired with the URL it points to.
///
/// Neither field is validated: an empty or malformed value is stored and
/// returned as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlMapping {
    /// The short code or alias.
    pub short_url: String,
    /// The target URL.
    pub long_url: String,
}

impl UrlMapping {
    pub fn new(short_url: impl Into<String>, long_url: impl Into<String>) -> Self {
        Self {
            short_url: short_url.into(),
            long_url: long_url.into(),
        }
    }
}

/// Positional mapping between row cells and [`UrlMapping`] fields.
///
/// The same layout must be used on the write and read paths, otherwise a
/// mapping read back from the table will have its fields swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    short_url: usize,
    long_url: usize,
}

impl ColumnLayout {
    /// Column A holds the short code, column B the target URL.
    pub const SHORT_FIRST: ColumnLayout = ColumnLayout {
        short_url: 0,
        long_url: 1,
    };

    /// Column A holds the target URL, column B the short code.
    pub const LONG_FIRST: ColumnLayout = ColumnLayout {
        short_url: 1,
        long_url: 0,
    };

    /// Number of cells written per row.
    pub fn width(&self) -> usize {
        self.short_url.max(self.long_url) + 1
    }

    /// Lays a mapping out as a row of cells.
    pub fn encode(&self, mapping: &UrlMapping) -> Row {
        let mut row = vec![String::new(); self.width()];
        row[self.short_url] = mapping.short_url.clone();
        row[self.long_url] = mapping.long_url.clone();
        row
    }

    /// Reads a mapping back from a row of cells.
    ///
    /// Missing cells become empty strings and cells beyond the layout are
    /// ignored.
    pub fn decode(&self, row: &[String]) -> UrlMapping {
        let cell = |index: usize| row.get(index).cloned().unwrap_or_default();
        UrlMapping {
            short_url: cell(self.short_url),
            long_url: cell(self.long_url),
        }
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::SHORT_FIRST
    }
}
