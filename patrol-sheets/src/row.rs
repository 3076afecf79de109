//! Row shape and the derived-index rule.

use serde::{Deserialize, Serialize};

/// One worksheet row: the cells as the store returned them, plus the row's
/// position in the sheet.
///
/// `index` is purely derived, never set independently: data rows start after
/// the header, so the first retained row carries index 2, its 1-based sheet
/// position. Handing the index back to [`crate::SheetStore::write_row`]
/// overwrites the row it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRow {
    pub cells: Vec<String>,
    pub index: u32,
}

/// Attach derived indices to header-stripped rows, preserving store order.
pub fn index_rows<I>(raw: I) -> Vec<SheetRow>
where
    I: IntoIterator<Item = Vec<String>>,
{
    raw.into_iter()
        .enumerate()
        .map(|(pos, cells)| SheetRow {
            cells,
            index: pos as u32 + 2,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str) -> Vec<String> {
        vec![label.to_string()]
    }

    #[test]
    fn indices_start_after_the_header() {
        let rows = index_rows([row("r0"), row("r1"), row("r2")]);
        let indices: Vec<u32> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![2, 3, 4]);
    }

    #[test]
    fn order_and_cells_are_preserved() {
        let rows = index_rows([row("first"), row("second")]);
        assert_eq!(rows[0].cells, vec!["first"]);
        assert_eq!(rows[1].cells, vec!["second"]);
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(index_rows(Vec::<Vec<String>>::new()).is_empty());
    }
}
