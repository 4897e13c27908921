use crate::error::CoreError;
use std::fmt::Display;
use std::str::FromStr;

/// A fixed region of a sheet in A1 notation, e.g. `Sheet1!A2:C`.
///
/// Only the forms used to address an append-only table are accepted: an
/// optional sheet name, a start cell (column with an optional row), and an
/// optional end cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetRange {
    sheet: Option<String>,
    start: CellRef,
    end: Option<CellRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CellRef {
    column: String,
    row: Option<u32>,
}

impl SheetRange {
    pub fn sheet(&self) -> Option<&str> {
        self.sheet.as_deref()
    }

    /// First row of the range, if the start cell names one.
    pub fn start_row(&self) -> Option<u32> {
        self.start.row
    }

    fn invalid(range: &str, reason: impl Into<String>) -> CoreError {
        CoreError::InvalidRange {
            range: range.to_string(),
            reason: reason.into(),
        }
    }

    fn parse_sheet(raw: &str, input: &str) -> Result<String, CoreError> {
        let name = match raw.strip_prefix('\'') {
            Some(quoted) => quoted
                .strip_suffix('\'')
                .ok_or_else(|| Self::invalid(input, "unterminated quoted sheet name"))?
                .replace("''", "'"),
            None => raw.to_string(),
        };
        if name.is_empty() {
            return Err(Self::invalid(input, "sheet name is empty"));
        }
        Ok(name)
    }

    fn parse_cell(raw: &str, input: &str) -> Result<CellRef, CoreError> {
        let split = raw
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(raw.len());
        let (column, row) = raw.split_at(split);

        if column.is_empty() {
            return Err(Self::invalid(input, format!("cell '{raw}' has no column")));
        }

        let row = if row.is_empty() {
            None
        } else {
            if !row.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Self::invalid(input, format!("cell '{raw}' has an invalid row")));
            }
            let value: u32 = row
                .parse()
                .map_err(|_| Self::invalid(input, format!("cell '{raw}' has an invalid row")))?;
            if value == 0 {
                return Err(Self::invalid(input, "rows are numbered from 1"));
            }
            Some(value)
        };

        Ok(CellRef {
            column: column.to_ascii_uppercase(),
            row,
        })
    }

    fn needs_quotes(sheet: &str) -> bool {
        !sheet
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

impl FromStr for SheetRange {
    type Err = CoreError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Self::invalid(input, "range is empty"));
        }

        let (sheet, cells) = match trimmed.rsplit_once('!') {
            Some((sheet, cells)) => (Some(Self::parse_sheet(sheet, input)?), cells),
            None => (None, trimmed),
        };

        let (start, end) = match cells.split_once(':') {
            Some((start, end)) => (
                Self::parse_cell(start, input)?,
                Some(Self::parse_cell(end, input)?),
            ),
            None => (Self::parse_cell(cells, input)?, None),
        };

        Ok(Self { sheet, start, end })
    }
}

impl Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.column)?;
        if let Some(row) = self.row {
            write!(f, "{row}")?;
        }
        Ok(())
    }
}

impl Display for SheetRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(sheet) = &self.sheet {
            if Self::needs_quotes(sheet) {
                write!(f, "'{}'!", sheet.replace('\'', "''"))?;
            } else {
                write!(f, "{sheet}!")?;
            }
        }
        write!(f, "{}", self.start)?;
        if let Some(end) = &self.end {
            write!(f, ":{end}")?;
        }
        Ok(())
    }
}

impl Default for SheetRange {
    /// The second row onward of `Sheet1`, three columns wide.
    fn default() -> Self {
        Self {
            sheet: Some("Sheet1".to_string()),
            start: CellRef {
                column: "A".to_string(),
                row: Some(2),
            },
            end: Some(CellRef {
                column: "C".to_string(),
                row: None,
            }),
        }
    }
}
