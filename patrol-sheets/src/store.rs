//! The remote-store contract.

use async_trait::async_trait;

use crate::row::SheetRow;

#[derive(thiserror::Error, Debug)]
pub enum SheetError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("worksheet not found: {0}")]
    WorksheetNotFound(String),

    #[error("remote returned a malformed payload: {0}")]
    Payload(String),

    #[error("row {index} out of range for worksheet {sheet}")]
    RowOutOfRange { sheet: String, index: u32 },
}

/// Read and write rows of a remote spreadsheet, worksheets addressed by
/// name.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// All data rows of the worksheet, in store order, header skipped, each
    /// carrying its derived sheet position (first data row ⇒ 2).
    async fn read_rows(&self, sheet_name: &str) -> Result<Vec<SheetRow>, SheetError>;

    /// Overwrite the row at the given 1-based sheet position.
    async fn write_row(
        &self,
        sheet_name: &str,
        row_index: u32,
        cells: &[String],
    ) -> Result<(), SheetError>;
}
