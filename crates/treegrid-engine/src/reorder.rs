#![forbid(unsafe_code)]

//! Row reorder controller.
//!
//! A small state machine for drag-to-reorder over the flattened row order:
//!
//! ```text
//! Idle --begin(row)--> Dragging { active, over, preview }
//! Dragging --hover/hover_at--> Dragging (over and preview updated)
//! Dragging --drop--> Idle  (commit when source != target)
//! Dragging --cancel--> Idle (nothing applied)
//! ```
//!
//! # Invariants
//!
//! 1. Only the `drop` transition produces a new order; `preview` is transient.
//! 2. A commit moves exactly one row: every other row keeps its relative order.
//! 3. Rows move within the flat display order only. Depth and parent are
//!    never changed.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Fallback |
//! |---------|-------|----------|
//! | Source row missing at drop | Rows refreshed mid-drag | [`DropResult::Rejected`], order untouched |
//! | Target row missing at drop | Rows refreshed mid-drag | [`DropResult::Rejected`], order untouched |
//! | No target under pointer | Pointer left the list | [`DropResult::Unchanged`] |
//! | Escape pressed mid-drag | User cancellation | `cancel()`, state reverts |

use treegrid_core::ids::RowId;

use crate::row_window::VirtualItem;

// ---------------------------------------------------------------------------
// Array move
// ---------------------------------------------------------------------------

/// Remove the item at `from` and reinsert it at `to`.
///
/// Out-of-range indices leave the order unchanged.
#[must_use]
pub fn array_move<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut out = items.to_vec();
    if from < out.len() && to < out.len() && from != to {
        let item = out.remove(from);
        out.insert(to, item);
    }
    out
}

// ---------------------------------------------------------------------------
// Drag state
// ---------------------------------------------------------------------------

/// State of an active row drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDrag {
    /// Row being dragged.
    pub active: RowId,
    /// Row currently under the dragged row, if any.
    pub over: Option<RowId>,
    /// Order before the drag started.
    pub origin: Vec<RowId>,
    /// Order as it would be if dropped now.
    pub preview: Vec<RowId>,
}

/// Controller phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragPhase {
    /// No drag in progress.
    #[default]
    Idle,
    /// A row is being dragged.
    Dragging(RowDrag),
}

/// A committed reorder, handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderCommit {
    /// Row that moved.
    pub row_id: RowId,
    /// Index before the move.
    pub from_index: usize,
    /// Index after the move.
    pub to_index: usize,
    /// Full row order after the move.
    pub order: Vec<RowId>,
}

/// Outcome of a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropResult {
    /// The row moved.
    Committed(ReorderCommit),
    /// Dropped on itself, outside any row, or with no drag in progress.
    Unchanged,
    /// Source or target vanished from the current order.
    Rejected {
        /// Human-readable reason.
        reason: String,
    },
}

impl DropResult {
    /// The commit, if the drop moved a row.
    #[must_use]
    pub fn commit(self) -> Option<ReorderCommit> {
        match self {
            Self::Committed(commit) => Some(commit),
            _ => None,
        }
    }

    /// Whether the drop moved a row.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Drag-to-reorder state machine.
#[derive(Debug, Clone, Default)]
pub struct ReorderController {
    phase: DragPhase,
}

impl ReorderController {
    /// Idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    /// Row being dragged.
    #[must_use]
    pub fn active(&self) -> Option<&RowId> {
        match &self.phase {
            DragPhase::Dragging(drag) => Some(&drag.active),
            DragPhase::Idle => None,
        }
    }

    /// Row under the dragged row.
    #[must_use]
    pub fn over(&self) -> Option<&RowId> {
        match &self.phase {
            DragPhase::Dragging(drag) => drag.over.as_ref(),
            DragPhase::Idle => None,
        }
    }

    /// Order as it would be if dropped now; `None` while idle.
    #[must_use]
    pub fn preview_order(&self) -> Option<&[RowId]> {
        match &self.phase {
            DragPhase::Dragging(drag) => Some(&drag.preview),
            DragPhase::Idle => None,
        }
    }

    /// Start dragging `row` from its handle.
    ///
    /// Ignored (returns `false`) when `row` is not in `order` or a drag is
    /// already in progress.
    pub fn begin(&mut self, row: &RowId, order: &[RowId]) -> bool {
        if self.is_dragging() || !order.contains(row) {
            return false;
        }
        self.phase = DragPhase::Dragging(RowDrag {
            active: row.clone(),
            over: None,
            origin: order.to_vec(),
            preview: order.to_vec(),
        });
        true
    }

    /// Set the row under the dragged row. `None` clears the target.
    pub fn hover(&mut self, over: Option<&RowId>) -> bool {
        let DragPhase::Dragging(drag) = &mut self.phase else {
            return false;
        };
        drag.over = over.cloned();
        let from = drag.origin.iter().position(|r| *r == drag.active);
        let to = over.and_then(|o| drag.origin.iter().position(|r| r == o));
        drag.preview = match (from, to) {
            (Some(from), Some(to)) => array_move(&drag.origin, from, to),
            _ => drag.origin.clone(),
        };
        true
    }

    /// Resolve the target with a closest-center test on the vertical axis.
    ///
    /// `center_y` is the center of the dragged row as currently drawn;
    /// `candidates` are the mounted rows. Returns the chosen target.
    pub fn hover_at<'a, I>(&mut self, center_y: f64, candidates: I) -> Option<RowId>
    where
        I: IntoIterator<Item = (&'a RowId, VirtualItem)>,
    {
        if !self.is_dragging() {
            return None;
        }
        let target = closest_center(center_y, candidates).cloned();
        self.hover(target.as_ref());
        target
    }

    /// Drop onto the current target, checked against the current order.
    ///
    /// `current` is the flat order at drop time; it may differ from the
    /// order at drag start if rows were refreshed.
    pub fn drop_on_current(&mut self, current: &[RowId]) -> DropResult {
        let phase = std::mem::take(&mut self.phase);
        let DragPhase::Dragging(drag) = phase else {
            return DropResult::Unchanged;
        };
        let Some(target) = drag.over else {
            return DropResult::Unchanged;
        };
        let Some(from) = current.iter().position(|r| *r == drag.active) else {
            treegrid_core::debug!(row = drag.active.as_str(), "reorder source vanished");
            return DropResult::Rejected {
                reason: format!("source row {} no longer present", drag.active),
            };
        };
        let Some(to) = current.iter().position(|r| *r == target) else {
            treegrid_core::debug!(row = target.as_str(), "reorder target vanished");
            return DropResult::Rejected {
                reason: format!("target row {target} no longer present"),
            };
        };
        if from == to {
            return DropResult::Unchanged;
        }
        DropResult::Committed(ReorderCommit {
            row_id: drag.active,
            from_index: from,
            to_index: to,
            order: array_move(current, from, to),
        })
    }

    /// Abandon the drag. Returns whether one was in progress.
    pub fn cancel(&mut self) -> bool {
        let was = self.is_dragging();
        self.phase = DragPhase::Idle;
        was
    }
}

/// Candidate whose vertical center is nearest `center_y`. Ties go to the first.
pub fn closest_center<'a, I>(center_y: f64, candidates: I) -> Option<&'a RowId>
where
    I: IntoIterator<Item = (&'a RowId, VirtualItem)>,
{
    candidates
        .into_iter()
        .map(|(id, item)| (id, (item.center() - center_y).abs()))
        .fold(None, |best: Option<(&'a RowId, f64)>, (id, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((id, d)),
        })
        .map(|(id, _)| id)
}
