//! In-memory double for [`SheetStore`], used by tests and local dry runs.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::row::{index_rows, SheetRow};
use crate::store::{SheetError, SheetStore};

/// Worksheets held in memory, header row included, exactly as a remote sheet
/// would store them.
#[derive(Default)]
pub struct MemorySheets {
    sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a worksheet, header row first.
    pub fn insert_sheet(&self, name: impl Into<String>, rows: Vec<Vec<String>>) {
        self.sheets.lock().unwrap().insert(name.into(), rows);
    }
}

#[async_trait]
impl SheetStore for MemorySheets {
    async fn read_rows(&self, sheet_name: &str) -> Result<Vec<SheetRow>, SheetError> {
        let sheets = self.sheets.lock().unwrap();
        let rows = sheets
            .get(sheet_name)
            .ok_or_else(|| SheetError::WorksheetNotFound(sheet_name.to_string()))?;
        Ok(index_rows(rows.iter().skip(1).cloned()))
    }

    async fn write_row(
        &self,
        sheet_name: &str,
        row_index: u32,
        cells: &[String],
    ) -> Result<(), SheetError> {
        let mut sheets = self.sheets.lock().unwrap();
        let rows = sheets
            .get_mut(sheet_name)
            .ok_or_else(|| SheetError::WorksheetNotFound(sheet_name.to_string()))?;
        if row_index == 0 || row_index as usize > rows.len() {
            return Err(SheetError::RowOutOfRange {
                sheet: sheet_name.to_string(),
                index: row_index,
            });
        }
        rows[row_index as usize - 1] = cells.to_vec();
        Ok(())
    }
}
