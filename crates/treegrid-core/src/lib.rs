#![forbid(unsafe_code)]

//! Core: identifiers, the row arena, column descriptors, sorting, configuration,
//! and logging.

pub mod column;
pub mod config;
pub mod ids;
pub mod logging;
pub mod row;
pub mod sort;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

pub use column::{
    ColumnCaps, ColumnDescriptor, ColumnError, ColumnPinning, ColumnState, PinSide,
    RendererKey, RendererRegistry,
};
pub use config::GridConfig;
pub use ids::{CELL_ID_SEPARATOR, CellId, ColumnId, IdError, RowId};
pub use row::{FieldValue, NodeIndex, RowArena, RowData, RowNode, RowTreeError};
pub use sort::{SortDirection, SortSpec};
