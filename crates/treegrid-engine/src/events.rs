#![forbid(unsafe_code)]

//! Notifications the engine emits for its collaborators.

use treegrid_core::column::ColumnState;
use treegrid_core::ids::{CellId, RowId};
use treegrid_core::sort::SortSpec;

use crate::columns::ColumnChange;
use crate::reorder::ReorderCommit;

/// Kind of pointer interaction on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellEventKind {
    /// Plain click.
    Click,
    /// Shift-click (range).
    ShiftClick,
    /// Ctrl/cmd-click (additive).
    CtrlClick,
    /// Double click.
    DoubleClick,
    /// Context-menu request.
    ContextMenu,
}

/// A raw pointer interaction on a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEvent {
    /// Target cell.
    pub cell: CellId,
    /// Interaction kind.
    pub kind: CellEventKind,
}

impl CellEvent {
    /// Create an event.
    #[must_use]
    pub fn new(cell: CellId, kind: CellEventKind) -> Self {
        Self { cell, kind }
    }
}

/// Something a collaborator may want to react to or persist.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// The expanded-id set changed; carries the full sorted set.
    ExpansionChanged { expanded: Vec<RowId> },
    /// The sort specification changed.
    SortingChanged { sort: Option<SortSpec> },
    /// A column adjustment took effect; carries the snapshot to persist.
    ColumnsChanged { change: ColumnChange, state: ColumnState },
    /// A drag-reorder was committed.
    RowsReordered(ReorderCommit),
    /// A cell interaction, forwarded after selection bookkeeping.
    CellInteraction(CellEvent),
}
