//! Property-based invariant tests for the row and column window calculators.
//!
//! 1. The mounted row range is `[first - overscan, last + overscan]` clamped
//!    to `[0, len - 1]` for every offset in `[0, total]`.
//! 2. Mounted rows are contiguous and their starts chain.
//! 3. The total extent equals the sum of row sizes.
//! 4. Column paddings plus mounted middle widths equal the middle width.
//! 5. Pinned columns are mounted at every horizontal offset.

use proptest::prelude::*;
use treegrid_core::column::{ColumnDescriptor, PinSide};
use treegrid_core::ids::{ColumnId, RowId};
use treegrid_engine::column_window::ColumnWindow;
use treegrid_engine::row_window::RowWindow;

// ── Helpers ─────────────────────────────────────────────────────────────

fn row_ids(n: usize) -> Vec<RowId> {
    (0..n).map(|i| RowId::new(format!("r{i}")).unwrap()).collect()
}

fn build_window(sizes: &[u32], overscan: usize, viewport: u32) -> RowWindow {
    let mut w = RowWindow::new(30, overscan);
    w.set_rows(&row_ids(sizes.len()));
    for (i, &s) in sizes.iter().enumerate() {
        w.set_measured(i, s);
    }
    w.set_viewport(Some(viewport));
    w
}

/// Index of the row containing `offset` by linear scan.
fn covering(starts: &[u64], offset: u64) -> usize {
    (0..starts.len())
        .rev()
        .find(|&i| starts[i] <= offset)
        .unwrap_or(0)
}

fn window_case() -> impl Strategy<Value = (Vec<u32>, usize, u32, f64)> {
    (
        prop::collection::vec(1u32..=200, 1..300),
        0usize..10,
        1u32..=2000,
        0.0f64..=1.0,
    )
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3. Row window range and layout
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn row_range_is_clamped_overscan_of_visible((sizes, overscan, viewport, frac) in window_case()) {
        let mut w = build_window(&sizes, overscan, viewport);
        let total: u64 = sizes.iter().map(|&s| u64::from(s)).sum();
        prop_assert_eq!(w.total_size(), total);

        let offset = (total as f64 * frac) as u64;
        w.set_scroll_offset(offset);

        let mut starts = Vec::with_capacity(sizes.len());
        let mut acc = 0u64;
        for &s in &sizes {
            starts.push(acc);
            acc += u64::from(s);
        }
        let n = sizes.len();
        let first = covering(&starts, offset);
        let last = covering(&starts, offset + u64::from(viewport) - 1).max(first);
        let expected = first.saturating_sub(overscan)..=(last + overscan).min(n - 1);
        prop_assert_eq!(w.range(), Some(expected));
    }

    #[test]
    fn mounted_rows_are_contiguous((sizes, overscan, viewport, frac) in window_case()) {
        let mut w = build_window(&sizes, overscan, viewport);
        let offset = (w.total_size() as f64 * frac) as u64;
        w.set_scroll_offset(offset);
        let out = w.window();
        prop_assert!(!out.items.is_empty());
        for pair in out.items.windows(2) {
            prop_assert_eq!(pair[1].index, pair[0].index + 1);
            prop_assert_eq!(pair[1].start, pair[0].end());
        }
        for item in &out.items {
            prop_assert_eq!(item.size, sizes[item.index]);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4-5. Column window paddings
// ═════════════════════════════════════════════════════════════════════════

fn column_case() -> impl Strategy<Value = (Vec<(u32, u8)>, u32, f64, usize)> {
    (
        prop::collection::vec((20u32..=400, 0u8..3), 1..60),
        1u32..=3000,
        0.0f64..=1.0,
        0usize..4,
    )
}

proptest! {
    #[test]
    fn paddings_account_for_unmounted_middle((cols, viewport, frac, overscan) in column_case()) {
        let descriptors: Vec<ColumnDescriptor> = cols
            .iter()
            .enumerate()
            .map(|(i, &(size, pin))| {
                let pin = match pin {
                    0 => PinSide::Left,
                    1 => PinSide::None,
                    _ => PinSide::Right,
                };
                ColumnDescriptor::new(ColumnId::new(format!("c{i}")).unwrap())
                    .pinned(pin)
                    .with_size(size)
            })
            .collect();
        let mut w = ColumnWindow::new(overscan);
        w.set_columns(&descriptors);
        w.set_viewport(Some(viewport));
        w.set_scroll_x((w.middle_width() as f64 * frac) as u64);

        let out = w.window();
        let mounted: u64 = out.middle.iter().map(|c| u64::from(c.item.size)).sum();
        prop_assert_eq!(out.padding_left + mounted + out.padding_right, w.middle_width());

        let pinned = descriptors.iter().filter(|c| c.pin != PinSide::None).count();
        prop_assert_eq!(out.left.len() + out.right.len(), pinned);

        for pair in out.middle.windows(2) {
            prop_assert_eq!(pair[1].item.index, pair[0].item.index + 1);
        }
    }
}
