#![forbid(unsafe_code)]

//! Virtualized hierarchical grid engine.
//!
//! Layered leaves first: [`flatten`] turns the row tree into the visible row
//! list, [`row_window`] and [`column_window`] decide what to mount,
//! [`pinned`] computes sticky offsets and decorations, [`selection`]
//! addresses cells through the [`grid_map`], and [`reorder`] runs the
//! drag-to-reorder state machine. [`engine::GridEngine`] owns all of it.

pub mod column_window;
pub mod columns;
pub mod engine;
pub mod events;
pub mod fenwick;
pub mod flatten;
pub mod grid_map;
pub mod pinned;
pub mod reorder;
pub mod row_window;
pub mod selection;
pub mod size_provider;

pub use column_window::{ColumnWindow, ColumnWindowOutput, MountedColumn};
pub use columns::{ColumnChange, ColumnSet};
pub use engine::GridEngine;
pub use events::{CellEvent, CellEventKind, GridEvent};
pub use fenwick::SizeTree;
pub use flatten::{ExpandedSet, FlatRow, Flattener, VisibleRows};
pub use grid_map::GridMap;
pub use pinned::{Decoration, InsetShadow, PinnedColumn, PinnedLayout, ShadowRole, ZLayer};
pub use reorder::{
    DragPhase, DropResult, ReorderCommit, ReorderController, RowDrag, array_move, closest_center,
};
pub use row_window::{Align, RowWindow, RowWindowOutput, VirtualItem};
pub use selection::{BorderEdges, Direction, SelectionBounds, SelectionModel};
pub use size_provider::{FixedSizeProvider, SizeProvider};
