#![forbid(unsafe_code)]

//! Cell selection model.
//!
//! Selection is addressed through a [`GridMap`]. A gesture has an anchor and
//! a focus cell; the effective selection is the axis-aligned rectangle they
//! span, unioned with rectangles committed by earlier additive gestures
//! (ctrl/cmd-click).
//!
//! # Invariants
//!
//! 1. Every selected cell exists in the current grid map. Registering a new
//!    map drops ids that disappeared.
//! 2. There is at most one focus cell, and it is a cell of the current map.
//! 3. A selected cell in the row-selection column marks its row as
//!    row-selected. That does not select the row's other cells.
//!
//! # Failure Modes
//!
//! Unknown or malformed cell ids are ignored: mutating operations return
//! `false` and queries answer `false` or empty.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use bitflags::bitflags;
use treegrid_core::ids::{CellId, ColumnId, RowId};

use crate::grid_map::GridMap;

bitflags! {
    /// Edges of a selected cell that border an unselected (or missing) cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BorderEdges: u8 {
        /// Edge shared with the row above.
        const TOP    = 0b0001;
        /// Edge shared with the next column.
        const RIGHT  = 0b0010;
        /// Edge shared with the row below.
        const BOTTOM = 0b0100;
        /// Edge shared with the previous column.
        const LEFT   = 0b1000;
    }
}

impl BorderEdges {
    /// Class names for the set edges, in top/right/bottom/left order.
    #[must_use]
    pub fn class_names(self) -> Vec<&'static str> {
        [
            (Self::TOP, "top"),
            (Self::RIGHT, "right"),
            (Self::BOTTOM, "bottom"),
            (Self::LEFT, "left"),
        ]
        .into_iter()
        .filter(|(edge, _)| self.contains(*edge))
        .map(|(_, name)| name)
        .collect()
    }
}

/// Keyboard focus movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Previous row.
    Up,
    /// Next row.
    Down,
    /// Previous column.
    Left,
    /// Next column.
    Right,
}

/// Row and column index ranges covered by the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionBounds {
    /// Row indices.
    pub rows: RangeInclusive<usize>,
    /// Column indices.
    pub cols: RangeInclusive<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveRange {
    anchor: CellId,
    focus: CellId,
    whole_row: bool,
}

/// Selection state owned by the grid.
#[derive(Debug, Clone)]
pub struct SelectionModel {
    map: GridMap,
    generation: u64,
    row_selection_column: ColumnId,
    anchor: Option<CellId>,
    focus: Option<CellId>,
    active: Option<ActiveRange>,
    /// Cells from earlier additive gestures, by id so they survive re-registration.
    committed: HashSet<(RowId, ColumnId)>,
    /// Materialized `(row, col)` indices in the current map.
    selected: HashSet<(usize, usize)>,
    row_selected: HashSet<RowId>,
    selecting: bool,
}

impl SelectionModel {
    /// Empty selection over an empty grid.
    #[must_use]
    pub fn new(row_selection_column: ColumnId) -> Self {
        Self {
            map: GridMap::default(),
            generation: 0,
            row_selection_column,
            anchor: None,
            focus: None,
            active: None,
            committed: HashSet::new(),
            selected: HashSet::new(),
            row_selected: HashSet::new(),
            selecting: false,
        }
    }

    /// Current grid map.
    #[must_use]
    pub fn map(&self) -> &GridMap {
        &self.map
    }

    /// Number of maps registered so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the grid map from row and column orders.
    pub fn register_grid(&mut self, rows: &[RowId], cols: &[ColumnId]) {
        self.register_map(GridMap::new(rows, cols));
    }

    /// Replace the grid map. The latest registration always wins.
    pub fn register_map(&mut self, map: GridMap) {
        let span = treegrid_core::debug_span!(
            "register_grid",
            rows = map.row_count(),
            cols = map.col_count()
        );
        let _guard = span.enter();

        self.map = map;
        self.generation += 1;
        let map = &self.map;
        self.committed
            .retain(|(r, c)| map.row_index(r.as_str()).is_some() && map.col_index(c.as_str()).is_some());
        if self.anchor.as_ref().is_some_and(|c| !map.contains(c)) {
            self.anchor = None;
        }
        if self.focus.as_ref().is_some_and(|c| !map.contains(c)) {
            self.focus = None;
        }
        if self
            .active
            .as_ref()
            .is_some_and(|a| !map.contains(&a.anchor) || !map.contains(&a.focus))
        {
            self.active = None;
            self.selecting = false;
        }
        self.materialize();
    }

    /// Begin a selection gesture at `cell`.
    ///
    /// With `additive` the current selection is kept and the new cell is
    /// unioned with it.
    pub fn start_selection(&mut self, cell: impl AsRef<str>, additive: bool) -> bool {
        let Some(cell) = self.resolve(cell.as_ref()) else {
            return false;
        };
        self.begin_at(cell, additive);
        self.selecting = true;
        true
    }

    /// Move the focus of the gesture in progress to `cell`.
    ///
    /// With `is_row_selection_drag` the rectangle spans every column.
    pub fn extend_selection(&mut self, cell: impl AsRef<str>, is_row_selection_drag: bool) -> bool {
        if !self.selecting {
            return false;
        }
        let Some(cell) = self.resolve(cell.as_ref()) else {
            return false;
        };
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        active.focus = cell.clone();
        active.whole_row = is_row_selection_drag;
        self.focus = Some(cell);
        self.materialize();
        true
    }

    /// Finish the gesture in progress. Returns whether one was in progress.
    pub fn end_selection(&mut self, cell: impl AsRef<str>) -> bool {
        let was = self.selecting;
        self.selecting = false;
        if was && self.resolve(cell.as_ref()).is_none() {
            treegrid_core::trace!("selection ended outside the grid");
        }
        was
    }

    /// Whether a drag selection is in progress.
    #[must_use]
    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    /// Click entry point.
    ///
    /// - plain click: select only `cell`
    /// - `is_range` (shift-click): rectangle from the existing anchor to `cell`
    /// - `additive` (ctrl/cmd-click): union `cell` with the current selection
    pub fn select_cell(&mut self, cell: impl AsRef<str>, additive: bool, is_range: bool) -> bool {
        let Some(cell) = self.resolve(cell.as_ref()) else {
            return false;
        };
        self.selecting = false;
        match self.anchor.clone() {
            Some(anchor) if is_range => {
                if !additive {
                    self.committed.clear();
                }
                self.focus = Some(cell.clone());
                self.active = Some(ActiveRange {
                    anchor,
                    focus: cell,
                    whole_row: false,
                });
                self.materialize();
            }
            _ => self.begin_at(cell, additive),
        }
        true
    }

    /// Move the focus one cell, clamped to the grid.
    ///
    /// With `extend` the anchor stays put and the rectangle grows
    /// (shift+arrow). Without a focus the first cell is focused.
    pub fn move_focus(&mut self, direction: Direction, extend: bool) -> Option<CellId> {
        if self.map.is_empty() {
            return None;
        }
        let (row, col) = match self.focus.as_ref().and_then(|f| self.map.coords(f)) {
            Some((r, c)) => match direction {
                Direction::Up => (r.saturating_sub(1), c),
                Direction::Down => ((r + 1).min(self.map.row_count() - 1), c),
                Direction::Left => (r, c.saturating_sub(1)),
                Direction::Right => (r, (c + 1).min(self.map.col_count() - 1)),
            },
            None => (0, 0),
        };
        let cell = self.map.cell_at(row, col)?;
        match (extend, self.anchor.clone()) {
            (true, Some(anchor)) => {
                self.focus = Some(cell.clone());
                self.active = Some(ActiveRange {
                    anchor,
                    focus: cell.clone(),
                    whole_row: false,
                });
                self.materialize();
            }
            _ => self.begin_at(cell.clone(), false),
        }
        Some(cell)
    }

    /// Clear everything, including anchor and focus.
    pub fn clear_selection(&mut self) {
        self.anchor = None;
        self.focus = None;
        self.active = None;
        self.committed.clear();
        self.selecting = false;
        self.materialize();
    }

    /// Whether `cell` is selected.
    #[must_use]
    pub fn is_cell_selected(&self, cell: impl AsRef<str>) -> bool {
        CellId::parse(cell.as_ref())
            .ok()
            .and_then(|c| self.map.coords(&c))
            .is_some_and(|rc| self.selected.contains(&rc))
    }

    /// Whether `cell` is the focus cell.
    #[must_use]
    pub fn is_cell_focused(&self, cell: impl AsRef<str>) -> bool {
        self.focus
            .as_ref()
            .is_some_and(|f| f.as_str() == cell.as_ref() && self.map.contains(f))
    }

    /// Whether the row is marked through the row-selection column.
    #[must_use]
    pub fn is_row_selected(&self, row: &str) -> bool {
        self.row_selected.contains(row)
    }

    /// Outline edges for `cell`: empty unless it is selected.
    #[must_use]
    pub fn border_edges(&self, cell: impl AsRef<str>) -> BorderEdges {
        let Some((r, c)) = CellId::parse(cell.as_ref())
            .ok()
            .and_then(|c| self.map.coords(&c))
        else {
            return BorderEdges::empty();
        };
        if !self.selected.contains(&(r, c)) {
            return BorderEdges::empty();
        }
        let on = |rc: Option<(usize, usize)>| rc.is_some_and(|rc| self.selected.contains(&rc));
        let mut edges = BorderEdges::empty();
        edges.set(BorderEdges::TOP, !on(r.checked_sub(1).map(|r| (r, c))));
        edges.set(BorderEdges::RIGHT, !on(Some((r, c + 1))));
        edges.set(BorderEdges::BOTTOM, !on(Some((r + 1, c))));
        edges.set(BorderEdges::LEFT, !on(c.checked_sub(1).map(|c| (r, c))));
        edges
    }

    /// Outline class names for `cell` (`top`, `right`, `bottom`, `left`).
    #[must_use]
    pub fn border_classes(&self, cell: impl AsRef<str>) -> Vec<&'static str> {
        self.border_edges(cell).class_names()
    }

    /// Anchor cell of the current gesture.
    #[must_use]
    pub fn anchor(&self) -> Option<&CellId> {
        self.anchor.as_ref()
    }

    /// Focus cell.
    #[must_use]
    pub fn focus(&self) -> Option<&CellId> {
        self.focus.as_ref()
    }

    /// Number of selected cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected cells in row-major grid order.
    #[must_use]
    pub fn selected_cells(&self) -> Vec<CellId> {
        let mut coords: Vec<(usize, usize)> = self.selected.iter().copied().collect();
        coords.sort_unstable();
        coords
            .into_iter()
            .filter_map(|(r, c)| self.map.cell_at(r, c))
            .collect()
    }

    /// Rows with at least one selected cell, in grid order.
    #[must_use]
    pub fn selected_row_ids(&self) -> Vec<RowId> {
        let mut rows: Vec<usize> = self.selected.iter().map(|&(r, _)| r).collect();
        rows.sort_unstable();
        rows.dedup();
        rows.into_iter()
            .filter_map(|r| self.map.row_at(r).cloned())
            .collect()
    }

    /// Rows marked through the row-selection column, in grid order.
    #[must_use]
    pub fn row_selected_ids(&self) -> Vec<RowId> {
        self.map
            .rows()
            .iter()
            .filter(|r| self.row_selected.contains(*r))
            .cloned()
            .collect()
    }

    /// Bounding box of the selection.
    #[must_use]
    pub fn selection_bounds(&self) -> Option<SelectionBounds> {
        let rows = self.selected.iter().map(|&(r, _)| r);
        let cols = self.selected.iter().map(|&(_, c)| c);
        Some(SelectionBounds {
            rows: rows.clone().min()?..=rows.max()?,
            cols: cols.clone().min()?..=cols.max()?,
        })
    }

    fn resolve(&self, raw: &str) -> Option<CellId> {
        let cell = CellId::parse(raw).ok().filter(|c| self.map.contains(c));
        if cell.is_none() {
            treegrid_core::debug!(cell = raw, "unknown cell id ignored");
        }
        cell
    }

    fn begin_at(&mut self, cell: CellId, additive: bool) {
        if additive {
            let current: Vec<(RowId, ColumnId)> = self
                .selected
                .iter()
                .filter_map(|&(r, c)| Some((self.map.row_at(r)?.clone(), self.map.col_at(c)?.clone())))
                .collect();
            self.committed.extend(current);
        } else {
            self.committed.clear();
        }
        self.anchor = Some(cell.clone());
        self.focus = Some(cell.clone());
        self.active = Some(ActiveRange {
            anchor: cell.clone(),
            focus: cell,
            whole_row: false,
        });
        self.materialize();
    }

    fn materialize(&mut self) {
        let map = &self.map;
        let mut selected = HashSet::new();
        for (r, c) in &self.committed {
            if let (Some(r), Some(c)) = (map.row_index(r.as_str()), map.col_index(c.as_str())) {
                selected.insert((r, c));
            }
        }
        if let Some(active) = &self.active
            && let (Some((ar, ac)), Some((fr, fc))) = (map.coords(&active.anchor), map.coords(&active.focus))
        {
            let cols = if active.whole_row {
                0..=map.col_count().saturating_sub(1)
            } else {
                ac.min(fc)..=ac.max(fc)
            };
            for r in ar.min(fr)..=ar.max(fr) {
                for c in cols.clone() {
                    selected.insert((r, c));
                }
            }
        }

        self.row_selected.clear();
        if let Some(rsc) = map.col_index(self.row_selection_column.as_str()) {
            for &(r, c) in &selected {
                if c == rsc
                    && let Some(id) = map.row_at(r)
                {
                    self.row_selected.insert(id.clone());
                }
            }
        }
        self.selected = selected;
    }
}
