#![forbid(unsafe_code)]

//! Column window calculator (pinned-aware).
//!
//! Visible columns are split into three regions. Pinned-left and pinned-right
//! columns are always mounted. The scrollable middle is windowed like rows,
//! using the horizontal offset and column widths, and reports two paddings
//! that stand in for the middle columns that are not mounted.

use std::ops::RangeInclusive;

use treegrid_core::column::{ColumnDescriptor, PinSide};
use treegrid_core::config::GridConfig;
use treegrid_core::ids::ColumnId;

use crate::fenwick::SizeTree;
use crate::row_window::VirtualItem;

/// A mounted column.
///
/// `item.index` is the position in the full visible column order; `item.start`
/// is the offset within the column's own region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedColumn {
    /// Column id.
    pub id: ColumnId,
    /// Position and width.
    pub item: VirtualItem,
}

/// Windowing result for one horizontal scroll position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnWindowOutput {
    /// Pinned-left columns, all of them.
    pub left: Vec<MountedColumn>,
    /// Mounted slice of the scrollable middle.
    pub middle: Vec<MountedColumn>,
    /// Pinned-right columns, all of them.
    pub right: Vec<MountedColumn>,
    /// Width of the middle columns scrolled past.
    pub padding_left: u64,
    /// Width of the middle columns not yet reached.
    pub padding_right: u64,
}

impl ColumnWindowOutput {
    /// Mounted column ids in render order.
    #[must_use]
    pub fn ids(&self) -> Vec<&ColumnId> {
        self.left
            .iter()
            .chain(&self.middle)
            .chain(&self.right)
            .map(|c| &c.id)
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
struct Region {
    ids: Vec<ColumnId>,
    /// Index of each column in the full visible order.
    order: Vec<usize>,
    sizes: SizeTree,
}

impl Region {
    fn push(&mut self, id: ColumnId, index: usize, size: u32, widths: &mut Vec<u32>) {
        self.ids.push(id);
        self.order.push(index);
        widths.push(size);
    }

    fn mounted(&self, range: impl Iterator<Item = usize>) -> Vec<MountedColumn> {
        range
            .filter_map(|i| {
                Some(MountedColumn {
                    id: self.ids.get(i)?.clone(),
                    item: VirtualItem {
                        index: *self.order.get(i)?,
                        start: self.sizes.start(i),
                        size: self.sizes.size(i)?,
                    },
                })
            })
            .collect()
    }

    fn all(&self) -> Vec<MountedColumn> {
        self.mounted(0..self.ids.len())
    }
}

/// Horizontal windowing state.
#[derive(Debug, Clone)]
pub struct ColumnWindow {
    left: Region,
    middle: Region,
    right: Region,
    overscan: usize,
    scroll_x: u64,
    viewport: Option<u32>,
}

impl ColumnWindow {
    /// Empty window.
    #[must_use]
    pub fn new(overscan: usize) -> Self {
        Self {
            left: Region::default(),
            middle: Region::default(),
            right: Region::default(),
            overscan,
            scroll_x: 0,
            viewport: None,
        }
    }

    /// Empty window with the configured overscan.
    #[must_use]
    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.column_overscan)
    }

    /// Replace the column set. Hidden columns are skipped.
    ///
    /// Columns keep their relative order inside each region.
    pub fn set_columns(&mut self, columns: &[ColumnDescriptor]) {
        let (mut left, mut middle, mut right) = (Region::default(), Region::default(), Region::default());
        let (mut lw, mut mw, mut rw) = (Vec::new(), Vec::new(), Vec::new());
        let visible = columns.iter().filter(|c| c.visible);
        let mut ordered: Vec<&ColumnDescriptor> = visible.collect();
        ordered.sort_by_key(|c| c.pin.rank());
        for (index, col) in ordered.into_iter().enumerate() {
            let (region, widths) = match col.pin {
                PinSide::Left => (&mut left, &mut lw),
                PinSide::None => (&mut middle, &mut mw),
                PinSide::Right => (&mut right, &mut rw),
            };
            region.push(col.id.clone(), index, col.size, widths);
        }
        left.sizes = SizeTree::from_sizes(&lw);
        middle.sizes = SizeTree::from_sizes(&mw);
        right.sizes = SizeTree::from_sizes(&rw);
        self.left = left;
        self.middle = middle;
        self.right = right;
        self.scroll_x = self.scroll_x.min(self.max_scroll());
    }

    /// Update one column's width. Returns `false` for an unknown id.
    pub fn set_width(&mut self, id: &str, width: u32) -> bool {
        for region in [&mut self.left, &mut self.middle, &mut self.right] {
            if let Some(i) = region.ids.iter().position(|c| c.as_str() == id) {
                return region.sizes.set(i, width);
            }
        }
        false
    }

    /// Total viewport width including pinned regions; `None` while unmounted.
    pub fn set_viewport(&mut self, width: Option<u32>) {
        self.viewport = width;
    }

    /// Horizontal offset into the scrollable middle region.
    pub fn set_scroll_x(&mut self, offset: u64) {
        self.scroll_x = offset.min(self.middle.sizes.total());
    }

    /// Current horizontal offset.
    #[must_use]
    pub fn scroll_x(&self) -> u64 {
        self.scroll_x
    }

    /// Width of the pinned-left region.
    #[must_use]
    pub fn left_width(&self) -> u64 {
        self.left.sizes.total()
    }

    /// Width of the pinned-right region.
    #[must_use]
    pub fn right_width(&self) -> u64 {
        self.right.sizes.total()
    }

    /// Width of all scrollable columns.
    #[must_use]
    pub fn middle_width(&self) -> u64 {
        self.middle.sizes.total()
    }

    /// Full content width.
    #[must_use]
    pub fn total_width(&self) -> u64 {
        self.left_width() + self.middle_width() + self.right_width()
    }

    /// Viewport width left over for the scrollable region.
    #[must_use]
    pub fn middle_viewport(&self) -> Option<u64> {
        let pinned = self.left_width() + self.right_width();
        self.viewport.map(|w| u64::from(w).saturating_sub(pinned))
    }

    fn max_scroll(&self) -> u64 {
        self.middle.sizes.total()
    }

    /// Inclusive range of mounted middle columns.
    #[must_use]
    pub fn middle_range(&self) -> Option<RangeInclusive<usize>> {
        let n = self.middle.ids.len();
        if n == 0 {
            return None;
        }
        let Some(viewport) = self.middle_viewport() else {
            treegrid_core::trace!("scroll container not mounted, column window deferred");
            return None;
        };
        let sizes = &self.middle.sizes;
        let offset = self.scroll_x.min(sizes.total());
        let first = sizes.index_at(offset).unwrap_or(0);
        let right_edge = offset + viewport.saturating_sub(1);
        let last = sizes.index_at(right_edge).unwrap_or(n - 1).max(first);
        Some(first.saturating_sub(self.overscan)..=last.saturating_add(self.overscan).min(n - 1))
    }

    /// Columns to mount plus middle paddings.
    #[must_use]
    pub fn window(&self) -> ColumnWindowOutput {
        let sizes = &self.middle.sizes;
        let (middle, padding_left, padding_right) = match self.middle_range() {
            Some(range) => {
                let (first, last) = (*range.start(), *range.end());
                (
                    self.middle.mounted(range),
                    sizes.start(first),
                    sizes.total() - sizes.end(last),
                )
            }
            None => (Vec::new(), 0, sizes.total()),
        };
        ColumnWindowOutput {
            left: self.left.all(),
            middle,
            right: self.right.all(),
            padding_left,
            padding_right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(id: &str, pin: PinSide, size: u32) -> ColumnDescriptor {
        ColumnDescriptor::new(ColumnId::new(id).unwrap())
            .pinned(pin)
            .with_size(size)
    }

    fn grid() -> ColumnWindow {
        let mut cols = vec![col("name", PinSide::Left, 200)];
        for i in 0..20 {
            cols.push(col(&format!("c{i}"), PinSide::None, 100));
        }
        cols.push(col("actions", PinSide::Right, 80));
        let mut w = ColumnWindow::new(1);
        w.set_columns(&cols);
        w.set_viewport(Some(580));
        w
    }

    #[test]
    fn pinned_regions_always_mounted() {
        let mut w = grid();
        w.set_scroll_x(1500);
        let out = w.window();
        assert_eq!(out.left.len(), 1);
        assert_eq!(out.right.len(), 1);
        assert_eq!(out.left[0].id.as_str(), "name");
        assert_eq!(out.right[0].item.index, 21);
    }

    #[test]
    fn middle_is_windowed_with_paddings() {
        let mut w = grid();
        // Middle viewport = 580 - 200 - 80 = 300.
        assert_eq!(w.middle_viewport(), Some(300));
        w.set_scroll_x(500);
        let out = w.window();
        // Visible c5..=c7, overscan 1 each side.
        let ids: Vec<&str> = out.middle.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c4", "c5", "c6", "c7", "c8"]);
        assert_eq!(out.padding_left, 400);
        assert_eq!(out.padding_right, 1100);
        let mounted: u64 = out.middle.iter().map(|c| u64::from(c.item.size)).sum();
        assert_eq!(out.padding_left + mounted + out.padding_right, w.middle_width());
    }

    #[test]
    fn pinned_columns_contribute_no_padding() {
        let mut w = ColumnWindow::new(0);
        w.set_columns(&[col("a", PinSide::Left, 50), col("b", PinSide::Right, 50)]);
        w.set_viewport(Some(100));
        let out = w.window();
        assert!(out.middle.is_empty());
        assert_eq!((out.padding_left, out.padding_right), (0, 0));
    }

    #[test]
    fn hidden_columns_are_skipped() {
        let mut w = ColumnWindow::new(0);
        w.set_columns(&[
            col("a", PinSide::None, 50),
            col("b", PinSide::None, 50).with_visible(false),
            col("c", PinSide::None, 50),
        ]);
        w.set_viewport(Some(1000));
        let ids: Vec<String> = w.window().ids().iter().map(|c| c.to_string()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn unpinned_input_order_is_regrouped() {
        let mut w = ColumnWindow::new(0);
        w.set_columns(&[
            col("x", PinSide::None, 50),
            col("r", PinSide::Right, 50),
            col("l", PinSide::Left, 50),
        ]);
        w.set_viewport(Some(1000));
        let out = w.window();
        let ids: Vec<&str> = out.ids().iter().map(|c| c.as_str()).collect();
        assert_eq!(ids, ["l", "x", "r"]);
    }

    #[test]
    fn unmounted_container_mounts_pinned_only() {
        let mut w = grid();
        w.set_viewport(None);
        let out = w.window();
        assert!(out.middle.is_empty());
        assert_eq!(out.padding_right, 2000);
        assert_eq!(out.left.len() + out.right.len(), 2);
    }

    #[test]
    fn set_width_updates_middle_total() {
        let mut w = grid();
        assert!(w.set_width("c0", 150));
        assert_eq!(w.middle_width(), 2050);
        assert!(!w.set_width("missing", 10));
        assert_eq!(w.total_width(), 2050 + 280);
    }
}
