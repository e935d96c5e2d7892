#![forbid(unsafe_code)]

//! Row window calculator.
//!
//! Keeps one size per visible row in a [`SizeTree`] (estimated until a
//! measurement arrives) and answers which rows must be mounted for the current
//! scroll offset and viewport height.
//!
//! # Overscan
//!
//! The mounted range is the strictly visible range widened by `overscan` rows
//! on each side and clamped to `[0, len - 1]`. It is always contiguous.
//!
//! # Invariants
//!
//! 1. `total_size()` equals the sum of the latest known size of every row.
//! 2. `items()[k].start == items()[k - 1].start + items()[k - 1].size`.
//! 3. A row that is being dragged keeps its size until the drag ends.
//! 4. Without a viewport (container not mounted) no rows are emitted.

use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;

use treegrid_core::config::GridConfig;
use treegrid_core::ids::RowId;

use crate::fenwick::SizeTree;
use crate::size_provider::SizeProvider;

/// One mounted row or column: position along the scroll axis and its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualItem {
    /// Index into the full (unwindowed) sequence.
    pub index: usize,
    /// Offset of the leading edge.
    pub start: u64,
    /// Size along the scroll axis.
    pub size: u32,
}

impl VirtualItem {
    /// Offset of the trailing edge.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.start + self.size as u64
    }

    /// Midpoint along the scroll axis.
    #[must_use]
    pub fn center(&self) -> f64 {
        self.start as f64 + f64::from(self.size) / 2.0
    }
}

/// Where a row should land when scrolling it into view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    /// Leading edge at the top of the viewport.
    Start,
    /// Centered in the viewport.
    Center,
    /// Trailing edge at the bottom of the viewport.
    End,
    /// Scroll the minimum amount needed (no-op if already fully visible).
    #[default]
    Auto,
}

/// Windowing result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowWindowOutput {
    /// Mounted rows in index order.
    pub items: Vec<VirtualItem>,
    /// Total scrollable extent.
    pub total: u64,
}

/// Virtualized row positions for the flattened row list.
#[derive(Debug, Clone)]
pub struct RowWindow {
    rows: Vec<RowId>,
    sizes: SizeTree,
    measured: HashMap<RowId, u32>,
    estimate: u32,
    overscan: usize,
    scroll_offset: u64,
    viewport: Option<u32>,
    suspended: Option<RowId>,
}

impl RowWindow {
    /// Empty window with a fixed row estimate.
    #[must_use]
    pub fn new(estimate: u32, overscan: usize) -> Self {
        Self {
            rows: Vec::new(),
            sizes: SizeTree::default(),
            measured: HashMap::new(),
            estimate: estimate.max(1),
            overscan,
            scroll_offset: 0,
            viewport: None,
            suspended: None,
        }
    }

    /// Empty window using the configured estimate for the display mode.
    #[must_use]
    pub fn from_config(config: &GridConfig, hierarchy: bool) -> Self {
        Self::new(config.row_estimate_for(hierarchy), config.row_overscan)
    }

    /// Empty window whose estimate comes from a size provider.
    #[must_use]
    pub fn with_provider<P: SizeProvider>(provider: &P, hierarchy: bool, overscan: usize) -> Self {
        Self::new(provider.estimate(hierarchy), overscan)
    }

    /// Replace the row sequence.
    ///
    /// Rows keep their measured size across calls; measurements for rows that
    /// disappeared are dropped.
    pub fn set_rows(&mut self, rows: &[RowId]) {
        let present: HashSet<&RowId> = rows.iter().collect();
        self.measured.retain(|id, _| present.contains(id));
        self.rows = rows.to_vec();
        self.rebuild();
    }

    /// Change the estimate for unmeasured rows (e.g. hierarchy mode toggled).
    pub fn set_estimate(&mut self, estimate: u32) {
        let estimate = estimate.max(1);
        if estimate != self.estimate {
            self.estimate = estimate;
            self.rebuild();
        }
    }

    /// Rows mounted beyond each edge of the viewport.
    pub fn set_overscan(&mut self, overscan: usize) {
        self.overscan = overscan;
    }

    /// Viewport height; `None` while the scroll container is not mounted.
    pub fn set_viewport(&mut self, height: Option<u32>) {
        self.viewport = height;
    }

    /// Current viewport height.
    #[must_use]
    pub fn viewport(&self) -> Option<u32> {
        self.viewport
    }

    /// Set the scroll offset, clamped to the total extent.
    pub fn set_scroll_offset(&mut self, offset: u64) {
        self.scroll_offset = offset.min(self.sizes.total());
    }

    /// Current scroll offset.
    #[must_use]
    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of the latest known size of every row.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.sizes.total()
    }

    /// Row id at an index.
    #[must_use]
    pub fn row_at(&self, index: usize) -> Option<&RowId> {
        self.rows.get(index)
    }

    /// Position and size of one row.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<VirtualItem> {
        let size = self.sizes.size(index)?;
        Some(VirtualItem {
            index,
            start: self.sizes.start(index),
            size,
        })
    }

    /// Index of the row covering `offset`.
    #[must_use]
    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        self.sizes.index_at(offset)
    }

    /// Stop accepting measurements for `row` (it is being dragged).
    pub fn suspend_measurement(&mut self, row: RowId) {
        self.suspended = Some(row);
    }

    /// Accept measurements for every row again.
    pub fn resume_measurement(&mut self) {
        self.suspended = None;
    }

    /// Row whose measurements are currently ignored.
    #[must_use]
    pub fn suspended(&self) -> Option<&RowId> {
        self.suspended.as_ref()
    }

    /// Record a measured size for the row at `index`.
    ///
    /// Returns `false` (and changes nothing) for a stale index or for the row
    /// currently being dragged.
    pub fn set_measured(&mut self, index: usize, size: u32) -> bool {
        let Some(id) = self.rows.get(index) else {
            treegrid_core::warn!(index, len = self.rows.len(), "stale row index skipped");
            return false;
        };
        if self.suspended.as_ref() == Some(id) {
            treegrid_core::trace!(row = id.as_str(), "measurement suppressed during drag");
            return false;
        }
        if self.sizes.size(index) == Some(size) {
            return false;
        }
        self.measured.insert(id.clone(), size);
        self.sizes.set(index, size)
    }

    /// Measure the row at `index` through a provider.
    ///
    /// A handle that is not attached to a live container defers the
    /// measurement without changing anything.
    pub fn measure<P: SizeProvider>(
        &mut self,
        index: usize,
        provider: &P,
        handle: &P::Handle,
    ) -> bool {
        match provider.measure(handle) {
            Some(size) => self.set_measured(index, size),
            None => {
                treegrid_core::trace!(index, "row not mounted, measurement deferred");
                false
            }
        }
    }

    /// Inclusive index range to mount, or `None` when nothing can be shown.
    #[must_use]
    pub fn range(&self) -> Option<RangeInclusive<usize>> {
        let n = self.rows.len();
        if n == 0 {
            return None;
        }
        let Some(viewport) = self.viewport else {
            treegrid_core::trace!("scroll container not mounted, row window deferred");
            return None;
        };
        let offset = self.scroll_offset.min(self.sizes.total());
        let first = self.sizes.index_at(offset).unwrap_or(0);
        let bottom = offset + u64::from(viewport.saturating_sub(1));
        let last = self.sizes.index_at(bottom).unwrap_or(n - 1).max(first);
        let start = first.saturating_sub(self.overscan);
        let end = last.saturating_add(self.overscan).min(n - 1);
        Some(start..=end)
    }

    /// Rows to mount plus the total extent.
    #[must_use]
    pub fn window(&self) -> RowWindowOutput {
        let items = self
            .range()
            .map(|range| range.filter_map(|i| self.item(i)).collect())
            .unwrap_or_default();
        RowWindowOutput {
            items,
            total: self.sizes.total(),
        }
    }

    /// Scroll so the row at `index` is placed according to `align`.
    ///
    /// Returns the new offset, or `None` for an out-of-range index or an
    /// unmounted container.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> Option<u64> {
        let item = self.item(index)?;
        let viewport = u64::from(self.viewport?);
        let max_offset = self.sizes.total().saturating_sub(viewport);
        let to_start = item.start;
        let to_end = item.end().saturating_sub(viewport);
        let target = match align {
            Align::Start => to_start,
            Align::End => to_end,
            Align::Center => (item.start + u64::from(item.size) / 2).saturating_sub(viewport / 2),
            Align::Auto => {
                if item.start < self.scroll_offset {
                    to_start
                } else if item.end() > self.scroll_offset + viewport {
                    to_end
                } else {
                    self.scroll_offset
                }
            }
        };
        self.scroll_offset = target.min(max_offset);
        Some(self.scroll_offset)
    }

    fn rebuild(&mut self) {
        let sizes: Vec<u32> = self
            .rows
            .iter()
            .map(|id| self.measured.get(id).copied().unwrap_or(self.estimate))
            .collect();
        self.sizes = SizeTree::from_sizes(&sizes);
        self.scroll_offset = self.scroll_offset.min(self.sizes.total());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size_provider::FixedSizeProvider;

    fn ids(n: usize) -> Vec<RowId> {
        (0..n).map(|i| RowId::new(format!("r{i}")).unwrap()).collect()
    }

    fn window(n: usize, estimate: u32, overscan: usize, viewport: u32) -> RowWindow {
        let mut w = RowWindow::new(estimate, overscan);
        w.set_rows(&ids(n));
        w.set_viewport(Some(viewport));
        w
    }

    #[test]
    fn top_of_list_clamps_leading_overscan() {
        let w = window(100, 10, 5, 50);
        // Rows 0..=4 visible, plus 5 trailing overscan.
        assert_eq!(w.range(), Some(0..=9));
        let out = w.window();
        assert_eq!(out.items.len(), 10);
        assert_eq!(out.total, 1000);
        assert_eq!(out.items[3], VirtualItem { index: 3, start: 30, size: 10 });
    }

    #[test]
    fn middle_of_list_overscans_both_sides() {
        let mut w = window(100, 10, 5, 50);
        w.set_scroll_offset(205);
        // Visible rows 20..=25.
        assert_eq!(w.range(), Some(15..=30));
    }

    #[test]
    fn bottom_of_list_clamps_trailing_overscan() {
        let mut w = window(100, 10, 5, 50);
        w.set_scroll_offset(1000);
        assert_eq!(w.range(), Some(94..=99));
    }

    #[test]
    fn unmounted_container_yields_nothing() {
        let mut w = RowWindow::new(10, 5);
        w.set_rows(&ids(10));
        assert_eq!(w.range(), None);
        let out = w.window();
        assert!(out.items.is_empty());
        assert_eq!(out.total, 100);
    }

    #[test]
    fn empty_rows_yield_nothing() {
        let mut w = RowWindow::new(10, 5);
        w.set_viewport(Some(100));
        assert_eq!(w.window(), RowWindowOutput::default());
    }

    #[test]
    fn measurement_updates_starts_and_total() {
        let mut w = window(10, 10, 0, 100);
        assert!(w.set_measured(2, 30));
        assert_eq!(w.total_size(), 120);
        assert_eq!(w.item(3).unwrap().start, 50);
        // Same size again is not a change.
        assert!(!w.set_measured(2, 30));
    }

    #[test]
    fn stale_index_is_skipped() {
        let mut w = window(3, 10, 0, 100);
        assert!(!w.set_measured(7, 30));
        assert_eq!(w.total_size(), 30);
    }

    #[test]
    fn suspended_row_ignores_measurements() {
        let mut w = window(3, 10, 0, 100);
        w.suspend_measurement(RowId::new("r1").unwrap());
        assert!(!w.set_measured(1, 50));
        assert!(w.set_measured(0, 50));
        w.resume_measurement();
        assert!(w.set_measured(1, 50));
        assert_eq!(w.total_size(), 110);
    }

    #[test]
    fn measurements_survive_reordering() {
        let mut w = window(3, 10, 0, 100);
        w.set_measured(0, 40);
        let mut rows = ids(3);
        rows.reverse();
        w.set_rows(&rows);
        assert_eq!(w.item(2).unwrap().size, 40);
        assert_eq!(w.total_size(), 60);
    }

    #[test]
    fn provider_measurement_defers_when_unmounted() {
        let mut w = window(3, 10, 0, 100);
        let p = FixedSizeProvider::new(10, 10);
        assert!(!w.measure(0, &p, &0));
        assert!(w.measure(0, &p, &25));
        assert_eq!(w.item(0).unwrap().size, 25);
    }

    #[test]
    fn estimate_change_keeps_measured_rows() {
        let mut w = window(3, 10, 0, 100);
        w.set_measured(1, 15);
        w.set_estimate(20);
        assert_eq!(w.total_size(), 55);
    }

    #[test]
    fn scroll_to_index_alignments() {
        let mut w = window(100, 10, 0, 50);
        assert_eq!(w.scroll_to_index(40, Align::Start), Some(400));
        assert_eq!(w.scroll_to_index(40, Align::End), Some(360));
        assert_eq!(w.scroll_to_index(40, Align::Center), Some(380));
        // Already fully visible: Auto keeps the offset.
        assert_eq!(w.scroll_to_index(39, Align::Auto), Some(380));
        // Below the viewport: Auto aligns the end.
        assert_eq!(w.scroll_to_index(60, Align::Auto), Some(560));
        // Above: Auto aligns the start.
        assert_eq!(w.scroll_to_index(10, Align::Auto), Some(100));
        // Clamped near the end.
        assert_eq!(w.scroll_to_index(99, Align::Start), Some(950));
        assert_eq!(w.scroll_to_index(100, Align::Start), None);
    }

    #[test]
    fn index_at_offset_maps_into_rows() {
        let w = window(10, 10, 0, 50);
        assert_eq!(w.index_at_offset(0), Some(0));
        assert_eq!(w.index_at_offset(15), Some(1));
        assert_eq!(w.index_at_offset(10_000), Some(9));
    }

    #[test]
    fn from_config_uses_display_mode_estimate() {
        let config = GridConfig::default().with_row_estimates(30, 40);
        let mut w = RowWindow::from_config(&config, true);
        w.set_rows(&ids(2));
        assert_eq!(w.total_size(), 80);
    }
}
