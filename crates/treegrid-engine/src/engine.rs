#![forbid(unsafe_code)]

//! The grid engine service.
//!
//! [`GridEngine`] owns every piece of grid state (rows, expansion, sorting,
//! columns, windows, selection, drag) and exposes it through explicit
//! methods. Hosts construct one engine per grid and pass it by reference;
//! there is no global state. Changes that collaborators care about are queued
//! as [`GridEvent`]s and handed out by [`GridEngine::drain_events`].
//!
//! Every mutation that changes row or column composition rebuilds the grid
//! map in the same call, so selection never observes a stale map.

use std::collections::VecDeque;
use std::fmt;

use treegrid_core::column::{ColumnCaps, ColumnDescriptor, ColumnError, ColumnState, PinSide};
use treegrid_core::config::GridConfig;
use treegrid_core::ids::{CellId, RowId};
use treegrid_core::row::{RowArena, RowData, RowNode, RowTreeError};
use treegrid_core::sort::SortSpec;

use crate::column_window::{ColumnWindow, ColumnWindowOutput};
use crate::columns::{ColumnChange, ColumnSet};
use crate::events::{CellEvent, CellEventKind, GridEvent};
use crate::flatten::{ExpandedSet, FlatRow, Flattener, VisibleRows};
use crate::grid_map::GridMap;
use crate::pinned::{Decoration, PinnedLayout, ZLayer};
use crate::reorder::{DropResult, ReorderController};
use crate::row_window::{Align, RowWindow, RowWindowOutput, VirtualItem};
use crate::selection::{Direction, SelectionModel};

type RowFilter = Box<dyn Fn(&RowData) -> bool>;

/// A virtualized tree grid.
pub struct GridEngine {
    config: GridConfig,
    arena: RowArena,
    expanded: ExpandedSet,
    sort: Option<SortSpec>,
    filter: Option<RowFilter>,
    loading: bool,
    hierarchy: bool,
    columns: ColumnSet,
    visible: VisibleRows,
    pinned: PinnedLayout,
    row_window: RowWindow,
    column_window: ColumnWindow,
    selection: SelectionModel,
    reorder: ReorderController,
    events: VecDeque<GridEvent>,
}

impl fmt::Debug for GridEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridEngine")
            .field("rows", &self.arena.len())
            .field("visible", &self.visible.len())
            .field("columns", &self.columns.len())
            .field("sort", &self.sort)
            .field("filtered", &self.filter.is_some())
            .field("loading", &self.loading)
            .field("dragging", &self.reorder.is_dragging())
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl Default for GridEngine {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl GridEngine {
    /// Empty grid in hierarchy display mode.
    #[must_use]
    pub fn new(config: GridConfig) -> Self {
        treegrid_core::debug!(config = %config.to_json(), "grid engine created");
        let hierarchy = true;
        Self {
            row_window: RowWindow::from_config(&config, hierarchy),
            column_window: ColumnWindow::from_config(&config),
            selection: SelectionModel::new(config.row_selection_column.clone()),
            config,
            arena: RowArena::default(),
            expanded: ExpandedSet::new(),
            sort: None,
            filter: None,
            loading: false,
            hierarchy,
            columns: ColumnSet::default(),
            visible: VisibleRows::default(),
            pinned: PinnedLayout::default(),
            reorder: ReorderController::new(),
            events: VecDeque::new(),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    // ----------------------------------------------------------------------
    // Inputs
    // ----------------------------------------------------------------------

    /// Replace the row tree.
    pub fn set_rows(&mut self, roots: Vec<RowNode>) -> Result<(), RowTreeError> {
        self.arena = RowArena::from_roots(roots)?;
        self.refresh_rows();
        Ok(())
    }

    /// Replace the column descriptors.
    pub fn set_columns(&mut self, columns: Vec<ColumnDescriptor>) -> Result<(), ColumnError> {
        self.columns = ColumnSet::new(columns)?;
        self.refresh_columns();
        Ok(())
    }

    /// Replace the expanded-id set (e.g. restored from persistence).
    pub fn set_expanded(&mut self, expanded: ExpandedSet) {
        self.expanded = expanded;
        self.refresh_rows();
    }

    /// Whether more rows are loading; shows placeholder rows while true.
    pub fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.refresh_rows();
        }
    }

    /// Switch between hierarchy and flat display mode (row estimates differ).
    pub fn set_hierarchy_mode(&mut self, hierarchy: bool) {
        self.hierarchy = hierarchy;
        self.row_window.set_estimate(self.config.row_estimate_for(hierarchy));
    }

    /// Whether rows use the hierarchy-mode estimate.
    #[must_use]
    pub fn hierarchy_mode(&self) -> bool {
        self.hierarchy
    }

    /// Keep only rows accepted by `filter`; a rejected row hides its subtree.
    pub fn set_filter<F>(&mut self, filter: F)
    where
        F: Fn(&RowData) -> bool + 'static,
    {
        self.filter = Some(Box::new(filter));
        self.refresh_rows();
    }

    /// Remove the row filter.
    pub fn clear_filter(&mut self) {
        if self.filter.take().is_some() {
            self.refresh_rows();
        }
    }

    // ----------------------------------------------------------------------
    // Expansion
    // ----------------------------------------------------------------------

    /// Expanded ids.
    #[must_use]
    pub fn expanded(&self) -> &ExpandedSet {
        &self.expanded
    }

    /// Expand or collapse one row.
    pub fn set_row_expanded(&mut self, id: &RowId, expanded: bool) -> bool {
        let changed = self.expanded.set(id, expanded);
        self.after_expansion(changed)
    }

    /// Flip one row. Returns the new state.
    pub fn toggle_row(&mut self, id: &RowId) -> bool {
        let now = self.expanded.toggle(id);
        self.after_expansion(true);
        now
    }

    /// Expand or collapse a row and every descendant.
    pub fn set_subtree_expanded(&mut self, id: &RowId, expanded: bool) -> bool {
        let changed = self.expanded.set_subtree(&self.arena, id, expanded);
        self.after_expansion(changed)
    }

    /// Expand every row with children.
    pub fn expand_all(&mut self) -> bool {
        let changed = self.expanded.expand_all(&self.arena);
        self.after_expansion(changed)
    }

    /// Collapse every row.
    pub fn collapse_all(&mut self) -> bool {
        let changed = self.expanded.collapse_all();
        self.after_expansion(changed)
    }

    fn after_expansion(&mut self, changed: bool) -> bool {
        if changed {
            self.events.push_back(GridEvent::ExpansionChanged {
                expanded: self.expanded.sorted_ids(),
            });
            self.refresh_rows();
        }
        changed
    }

    // ----------------------------------------------------------------------
    // Sorting
    // ----------------------------------------------------------------------

    /// Current sort.
    #[must_use]
    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Replace the sort. Returns whether it changed.
    pub fn set_sort(&mut self, sort: Option<SortSpec>) -> bool {
        if self.sort == sort {
            return false;
        }
        self.sort = sort;
        self.events.push_back(GridEvent::SortingChanged {
            sort: self.sort.clone(),
        });
        self.refresh_rows();
        true
    }

    /// Header click: cycle the sort on `column` (none, asc, desc).
    pub fn toggle_sort(&mut self, column: &str) -> Result<Option<SortSpec>, ColumnError> {
        let descriptor = self
            .columns
            .get(column)
            .ok_or_else(|| ColumnError::UnknownColumn {
                id: column.to_owned(),
            })?;
        if !descriptor.caps.contains(ColumnCaps::SORTABLE) {
            return Err(ColumnError::NotAllowed {
                id: descriptor.id.clone(),
                capability: ColumnCaps::SORTABLE,
            });
        }
        let next = SortSpec::cycle(self.sort.as_ref(), &descriptor.id);
        self.set_sort(next.clone());
        Ok(next)
    }

    // ----------------------------------------------------------------------
    // Columns
    // ----------------------------------------------------------------------

    /// Column descriptors.
    #[must_use]
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Show or hide a column.
    pub fn set_column_visible(&mut self, id: &str, visible: bool) -> Result<bool, ColumnError> {
        let change = self.columns.set_visible(id, visible)?;
        Ok(self.after_column_change(change))
    }

    /// Pin or unpin a column.
    pub fn pin_column(&mut self, id: &str, pin: PinSide) -> Result<bool, ColumnError> {
        let change = self.columns.set_pin(id, pin)?;
        Ok(self.after_column_change(change))
    }

    /// Move a column in the logical order.
    pub fn move_column(&mut self, id: &str, to: usize) -> Result<bool, ColumnError> {
        let change = self.columns.move_column(id, to)?;
        Ok(self.after_column_change(change))
    }

    /// Resize a column (clamped to its bounds).
    pub fn resize_column(&mut self, id: &str, size: u32) -> Result<bool, ColumnError> {
        let change = self.columns.resize(id, size)?;
        Ok(self.after_column_change(change))
    }

    /// Apply persisted column settings.
    pub fn apply_column_state(&mut self, state: &ColumnState) -> bool {
        let change = self.columns.apply_state(state);
        self.after_column_change(change)
    }

    fn after_column_change(&mut self, change: Option<ColumnChange>) -> bool {
        let Some(change) = change else {
            return false;
        };
        self.events.push_back(GridEvent::ColumnsChanged {
            change,
            state: self.columns.state(),
        });
        self.refresh_columns();
        true
    }

    // ----------------------------------------------------------------------
    // Viewport and windows
    // ----------------------------------------------------------------------

    /// Scroll container size; `None` while it is not mounted.
    pub fn set_viewport(&mut self, size: Option<(u32, u32)>) {
        self.column_window.set_viewport(size.map(|(w, _)| w));
        self.row_window.set_viewport(size.map(|(_, h)| h));
    }

    /// Scroll offsets (horizontal offset is into the scrollable columns).
    pub fn set_scroll(&mut self, x: u64, y: u64) {
        self.column_window.set_scroll_x(x);
        self.row_window.set_scroll_offset(y);
    }

    /// Scroll a row into view.
    pub fn scroll_to_row(&mut self, id: &str, align: Align) -> Option<u64> {
        let index = self.visible.position(id)?;
        self.row_window.scroll_to_index(index, align)
    }

    /// Record a measured row height.
    pub fn measure_row(&mut self, index: usize, size: u32) -> bool {
        self.row_window.set_measured(index, size)
    }

    /// Flattened rows.
    #[must_use]
    pub fn visible_rows(&self) -> &VisibleRows {
        &self.visible
    }

    /// Row window state.
    #[must_use]
    pub fn row_window(&self) -> &RowWindow {
        &self.row_window
    }

    /// Mounted rows plus total height.
    #[must_use]
    pub fn row_items(&self) -> RowWindowOutput {
        self.row_window.window()
    }

    /// Mounted rows paired with their flattened row.
    ///
    /// Items whose index no longer maps to a row are skipped.
    #[must_use]
    pub fn mounted_rows(&self) -> Vec<(&FlatRow, VirtualItem)> {
        self.row_window
            .window()
            .items
            .into_iter()
            .filter_map(|item| match self.visible.get(item.index) {
                Some(row) => Some((row, item)),
                None => {
                    treegrid_core::warn!(index = item.index, "stale virtual row skipped");
                    None
                }
            })
            .collect()
    }

    /// Mounted columns and paddings.
    #[must_use]
    pub fn column_items(&self) -> ColumnWindowOutput {
        self.column_window.window()
    }

    /// Pinned offsets.
    #[must_use]
    pub fn pinned_layout(&self) -> &PinnedLayout {
        &self.pinned
    }

    /// Outline and divider layers for a cell.
    #[must_use]
    pub fn cell_decoration(&self, cell: &CellId) -> Decoration {
        self.pinned
            .cell_decoration(cell.column_str(), self.selection.border_edges(cell))
    }

    /// Stacking layer for a cell.
    #[must_use]
    pub fn cell_z_layer(&self, cell: &CellId) -> ZLayer {
        self.pinned.z_layer(
            cell.column_str(),
            self.selection.is_cell_selected(cell),
            self.selection.is_cell_focused(cell),
        )
    }

    // ----------------------------------------------------------------------
    // Selection
    // ----------------------------------------------------------------------

    /// Current grid map.
    #[must_use]
    pub fn grid_map(&self) -> &GridMap {
        self.selection.map()
    }

    /// Selection state.
    #[must_use]
    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Begin a drag selection at `cell`.
    pub fn start_selection(&mut self, cell: impl AsRef<str>, additive: bool) -> bool {
        self.selection.start_selection(cell, additive)
    }

    /// Extend the drag selection in progress to `cell`.
    pub fn extend_selection(&mut self, cell: impl AsRef<str>, is_row_selection_drag: bool) -> bool {
        self.selection.extend_selection(cell, is_row_selection_drag)
    }

    /// Finish the drag selection in progress.
    pub fn end_selection(&mut self, cell: impl AsRef<str>) -> bool {
        self.selection.end_selection(cell)
    }

    /// Move the focused cell by one step, optionally extending the rectangle.
    pub fn move_focus(&mut self, direction: Direction, extend: bool) -> Option<CellId> {
        self.selection.move_focus(direction, extend)
    }

    /// Drop every selected cell and the focus.
    pub fn clear_selection(&mut self) {
        self.selection.clear_selection();
    }

    /// Apply selection bookkeeping for a pointer event and forward it.
    pub fn handle_cell_event(&mut self, event: CellEvent) {
        match event.kind {
            CellEventKind::Click => {
                self.selection.select_cell(&event.cell, false, false);
            }
            CellEventKind::ShiftClick => {
                self.selection.select_cell(&event.cell, false, true);
            }
            CellEventKind::CtrlClick => {
                self.selection.select_cell(&event.cell, true, false);
            }
            CellEventKind::DoubleClick | CellEventKind::ContextMenu => {}
        }
        self.events.push_back(GridEvent::CellInteraction(event));
    }

    // ----------------------------------------------------------------------
    // Row reorder
    // ----------------------------------------------------------------------

    /// Reorder controller state.
    #[must_use]
    pub fn reorder(&self) -> &ReorderController {
        &self.reorder
    }

    /// Start dragging from a drag-handle cell.
    ///
    /// Only cells in the drag-handle column of real (non-loading) rows start
    /// a drag. Measurement of the dragged row is suspended until it ends.
    pub fn begin_row_drag(&mut self, handle: &CellId) -> bool {
        if handle.column_str() != self.config.drag_handle_column.as_str() {
            return false;
        }
        let Some(row) = self
            .visible
            .position(handle.row_str())
            .and_then(|i| self.visible.get(i))
            .filter(|r| !r.is_loading)
        else {
            return false;
        };
        let id = row.id.clone();
        if !self.reorder.begin(&id, &self.visible.ids()) {
            return false;
        }
        self.row_window.suspend_measurement(id);
        true
    }

    /// Set the row under the dragged row directly.
    pub fn hover_row(&mut self, over: Option<&RowId>) -> bool {
        self.reorder.hover(over)
    }

    /// Resolve the drop target from the dragged row's vertical center.
    pub fn hover_at(&mut self, center_y: f64) -> Option<RowId> {
        let items = self.row_window.window().items;
        let candidates = items
            .into_iter()
            .filter_map(|item| self.visible.get(item.index).map(|r| (&r.id, item)));
        self.reorder.hover_at(center_y, candidates)
    }

    /// Drop the dragged row. A commit is queued as [`GridEvent::RowsReordered`].
    pub fn drop_row(&mut self) -> DropResult {
        let result = self.reorder.drop_on_current(&self.visible.ids());
        self.row_window.resume_measurement();
        if let DropResult::Committed(commit) = &result {
            self.events.push_back(GridEvent::RowsReordered(commit.clone()));
        }
        result
    }

    /// Abandon the drag; nothing is reordered.
    pub fn cancel_row_drag(&mut self) -> bool {
        self.row_window.resume_measurement();
        self.reorder.cancel()
    }

    // ----------------------------------------------------------------------
    // Events
    // ----------------------------------------------------------------------

    /// Take every queued notification, oldest first.
    pub fn drain_events(&mut self) -> Vec<GridEvent> {
        self.events.drain(..).collect()
    }

    /// Number of queued notifications.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    // ----------------------------------------------------------------------
    // Recompute
    // ----------------------------------------------------------------------

    fn refresh_rows(&mut self) {
        let placeholders = if self.loading {
            self.config.loading_placeholders
        } else {
            0
        };
        self.visible = {
            let mut flattener = Flattener::new(&self.arena, &self.expanded)
                .with_sort(self.sort.as_ref())
                .with_placeholders(placeholders);
            if let Some(filter) = &self.filter {
                flattener = flattener.with_filter(|d: &RowData| filter(d));
            }
            flattener.flatten()
        };
        self.row_window.set_rows(&self.visible.ids());
        self.register_grid();
    }

    fn refresh_columns(&mut self) {
        self.column_window.set_columns(self.columns.columns());
        self.pinned = PinnedLayout::compute(self.columns.columns(), &self.config);
        self.register_grid();
    }

    fn register_grid(&mut self) {
        let map = GridMap::new(&self.visible.ids(), &self.columns.display_order());
        self.selection.register_map(map);
    }
}
