#![forbid(unsafe_code)]

//! Grid map: the current row and column order used to address cells.
//!
//! Built in one step from the flattened rows and the visible columns, so
//! every reader sees either the old map or the new one, never a mix.

use std::collections::HashMap;

use treegrid_core::column::ColumnDescriptor;
use treegrid_core::ids::{CellId, ColumnId, RowId};

/// Ordered row and column ids with reverse indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridMap {
    rows: Vec<RowId>,
    cols: Vec<ColumnId>,
    row_index: HashMap<RowId, usize>,
    col_index: HashMap<ColumnId, usize>,
}

impl GridMap {
    /// Build from explicit orders. Repeated ids keep their first position.
    #[must_use]
    pub fn new(rows: &[RowId], cols: &[ColumnId]) -> Self {
        let mut map = Self::default();
        for id in rows {
            if !map.row_index.contains_key(id) {
                map.row_index.insert(id.clone(), map.rows.len());
                map.rows.push(id.clone());
            }
        }
        for id in cols {
            if !map.col_index.contains_key(id) {
                map.col_index.insert(id.clone(), map.cols.len());
                map.cols.push(id.clone());
            }
        }
        map
    }

    /// Build from row ids and column descriptors.
    ///
    /// Hidden columns are left out; the rest are ordered pinned-left, then
    /// scrollable, then pinned-right, keeping input order inside each group.
    #[must_use]
    pub fn from_columns(rows: &[RowId], columns: &[ColumnDescriptor]) -> Self {
        Self::new(rows, &ordered_column_ids(columns))
    }

    /// Rows in order.
    #[must_use]
    pub fn rows(&self) -> &[RowId] {
        &self.rows
    }

    /// Columns in order.
    #[must_use]
    pub fn cols(&self) -> &[ColumnId] {
        &self.cols
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.cols.len()
    }

    /// Whether no cell can be addressed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }

    /// Position of a row.
    #[must_use]
    pub fn row_index(&self, id: &str) -> Option<usize> {
        self.row_index.get(id).copied()
    }

    /// Position of a column.
    #[must_use]
    pub fn col_index(&self, id: &str) -> Option<usize> {
        self.col_index.get(id).copied()
    }

    /// Row id at a position.
    #[must_use]
    pub fn row_at(&self, index: usize) -> Option<&RowId> {
        self.rows.get(index)
    }

    /// Column id at a position.
    #[must_use]
    pub fn col_at(&self, index: usize) -> Option<&ColumnId> {
        self.cols.get(index)
    }

    /// Grid coordinates `(row, col)` of a cell.
    #[must_use]
    pub fn coords(&self, cell: &CellId) -> Option<(usize, usize)> {
        Some((self.row_index(cell.row_str())?, self.col_index(cell.column_str())?))
    }

    /// Whether both halves of the cell are present.
    #[must_use]
    pub fn contains(&self, cell: &CellId) -> bool {
        self.coords(cell).is_some()
    }

    /// Cell id at grid coordinates.
    #[must_use]
    pub fn cell_at(&self, row: usize, col: usize) -> Option<CellId> {
        Some(CellId::new(self.row_at(row)?, self.col_at(col)?))
    }
}

/// Visible column ids, pinned-left first, then scrollable, then pinned-right.
#[must_use]
pub fn ordered_column_ids(columns: &[ColumnDescriptor]) -> Vec<ColumnId> {
    let mut visible: Vec<&ColumnDescriptor> = columns.iter().filter(|c| c.visible).collect();
    visible.sort_by_key(|c| c.pin.rank());
    visible.into_iter().map(|c| c.id.clone()).collect()
}
