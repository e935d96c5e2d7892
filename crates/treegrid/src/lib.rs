#![forbid(unsafe_code)]

//! Treegrid public facade crate.
//!
//! Re-exports the engine surface from the internal crates and adds a
//! top-level [`Error`] plus a prelude for day-to-day use.
//!
//! ```
//! use treegrid::prelude::*;
//!
//! # fn main() -> treegrid::Result<()> {
//! let mut grid = GridEngine::new(GridConfig::default());
//! grid.set_columns(vec![ColumnDescriptor::new(ColumnId::new("name")?)])?;
//! grid.set_rows(vec![RowNode::new(RowId::new("A")?, "task")])?;
//! assert_eq!(grid.grid_map().row_count(), 1);
//! # Ok(())
//! # }
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use treegrid_core::column::{
    ColumnCaps, ColumnDescriptor, ColumnError, ColumnPinning, ColumnState, PinSide, RendererKey,
    RendererRegistry,
};
pub use treegrid_core::config::GridConfig;
pub use treegrid_core::ids::{CELL_ID_SEPARATOR, CellId, ColumnId, IdError, RowId};
pub use treegrid_core::row::{FieldValue, NodeIndex, RowArena, RowData, RowNode, RowTreeError};
pub use treegrid_core::sort::{SortDirection, SortSpec};

// --- Engine re-exports -----------------------------------------------------

pub use treegrid_engine::column_window::{ColumnWindow, ColumnWindowOutput, MountedColumn};
pub use treegrid_engine::columns::{ColumnChange, ColumnSet};
pub use treegrid_engine::engine::GridEngine;
pub use treegrid_engine::events::{CellEvent, CellEventKind, GridEvent};
pub use treegrid_engine::flatten::{ExpandedSet, FlatRow, Flattener, VisibleRows};
pub use treegrid_engine::grid_map::GridMap;
pub use treegrid_engine::pinned::{Decoration, PinnedLayout, ZLayer};
pub use treegrid_engine::reorder::{DropResult, ReorderCommit, ReorderController};
pub use treegrid_engine::row_window::{Align, RowWindow, RowWindowOutput, VirtualItem};
pub use treegrid_engine::selection::{BorderEdges, Direction, SelectionModel};
pub use treegrid_engine::size_provider::{FixedSizeProvider, SizeProvider};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for treegrid hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An identifier failed validation.
    Id(IdError),
    /// The row tree could not be built.
    Rows(RowTreeError),
    /// A column operation was rejected.
    Column(ColumnError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(err) => write!(f, "{err}"),
            Self::Rows(err) => write!(f, "{err}"),
            Self::Column(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Id(err) => Some(err),
            Self::Rows(err) => Some(err),
            Self::Column(err) => Some(err),
        }
    }
}

impl From<IdError> for Error {
    fn from(err: IdError) -> Self {
        Self::Id(err)
    }
}

impl From<RowTreeError> for Error {
    fn from(err: RowTreeError) -> Self {
        Self::Rows(err)
    }
}

impl From<ColumnError> for Error {
    fn from(err: ColumnError) -> Self {
        Self::Column(err)
    }
}

/// Standard result type for treegrid APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Align, CellEvent, CellEventKind, CellId, ColumnDescriptor, ColumnId, Error,
        ExpandedSet, GridConfig, GridEngine, GridEvent, PinSide, Result, RowId, RowNode,
        SortSpec,
    };

    pub use crate::{core, engine};
}

pub use treegrid_core as core;
pub use treegrid_engine as engine;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn errors_convert_and_chain() {
        let err: Error = RowId::new("").unwrap_err().into();
        assert_eq!(err, Error::Id(IdError::Empty));
        assert!(err.source().is_some());

        let err: Error = ColumnError::UnknownColumn { id: "x".into() }.into();
        assert!(err.to_string().contains("unknown column"));
    }

    #[test]
    fn row_errors_surface_through_facade() {
        fn build() -> Result<GridEngine> {
            let mut grid = GridEngine::default();
            let id = RowId::new("A")?;
            grid.set_rows(vec![
                RowNode::new(id.clone(), "task"),
                RowNode::new(id, "task"),
            ])?;
            Ok(grid)
        }
        assert!(matches!(build(), Err(Error::Rows(RowTreeError::DuplicateRowId { .. }))));
    }
}
