//! Property-based invariant tests for the selection model and reorder.
//!
//! 1. Cells whose row or column is absent from the grid are never selected.
//! 2. start + extend selects exactly the anchor/focus rectangle.
//! 3. A selected cell has edge `e` iff its neighbor across `e` is unselected
//!    or missing.
//! 4. Array-move preserves the multiset and the relative order of the rest.

use std::collections::HashSet;

use proptest::prelude::*;
use treegrid_core::ids::{CellId, ColumnId, RowId};
use treegrid_engine::reorder::array_move;
use treegrid_engine::selection::{BorderEdges, SelectionModel};

// ── Helpers ─────────────────────────────────────────────────────────────

fn rows(n: usize) -> Vec<RowId> {
    (0..n).map(|i| RowId::new(format!("r{i}")).unwrap()).collect()
}

fn cols(n: usize) -> Vec<ColumnId> {
    (0..n).map(|i| ColumnId::new(format!("c{i}")).unwrap()).collect()
}

fn cell(r: usize, c: usize) -> CellId {
    CellId::new(
        &RowId::new(format!("r{r}")).unwrap(),
        &ColumnId::new(format!("c{c}")).unwrap(),
    )
}

fn model(n_rows: usize, n_cols: usize) -> SelectionModel {
    let mut m = SelectionModel::new(ColumnId::new("__row_selection").unwrap());
    m.register_grid(&rows(n_rows), &cols(n_cols));
    m
}

fn grid_case() -> impl Strategy<Value = (usize, usize, Vec<(usize, usize)>)> {
    (1usize..12, 1usize..12).prop_flat_map(|(nr, nc)| {
        (
            Just(nr),
            Just(nc),
            prop::collection::vec((0..nr, 0..nc), 1..8),
        )
    })
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Absent ids are never selected
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn absent_cells_never_selected((nr, nc, clicks) in grid_case()) {
        let mut m = model(nr, nc);
        for &(r, c) in &clicks {
            m.select_cell(cell(r, c), true, false);
        }
        for r in 0..nr + 2 {
            for c in 0..nc + 2 {
                if r >= nr || c >= nc {
                    prop_assert!(!m.is_cell_selected(cell(r, c)));
                }
            }
        }
        // Shrinking the grid drops cells outside it.
        m.register_grid(&rows(nr / 2), &cols(nc));
        for &(r, c) in &clicks {
            if r >= nr / 2 {
                prop_assert!(!m.is_cell_selected(cell(r, c)));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Drag selects the rectangle
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn drag_selects_rectangle((nr, nc, points) in grid_case()) {
        let mut m = model(nr, nc);
        let (a, b) = (points[0], *points.last().unwrap());
        m.start_selection(cell(a.0, a.1), false);
        m.extend_selection(cell(b.0, b.1), false);

        let expected: HashSet<String> = (a.0.min(b.0)..=a.0.max(b.0))
            .flat_map(|r| (a.1.min(b.1)..=a.1.max(b.1)).map(move |c| cell(r, c).to_string()))
            .collect();
        let actual: HashSet<String> = m.selected_cells().iter().map(ToString::to_string).collect();
        prop_assert_eq!(actual, expected);
        prop_assert!(m.is_cell_focused(cell(b.0, b.1)));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Border edges match neighbors
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn border_edges_match_neighbors((nr, nc, clicks) in grid_case()) {
        let mut m = model(nr, nc);
        for (i, &(r, c)) in clicks.iter().enumerate() {
            m.select_cell(cell(r, c), i > 0, false);
        }
        let sel = |r: Option<usize>, c: Option<usize>| match (r, c) {
            (Some(r), Some(c)) if r < nr && c < nc => m.is_cell_selected(cell(r, c)),
            _ => false,
        };
        for r in 0..nr {
            for c in 0..nc {
                let edges = m.border_edges(cell(r, c));
                if !m.is_cell_selected(cell(r, c)) {
                    prop_assert!(edges.is_empty());
                    continue;
                }
                prop_assert_eq!(edges.contains(BorderEdges::TOP), !sel(r.checked_sub(1), Some(c)));
                prop_assert_eq!(edges.contains(BorderEdges::BOTTOM), !sel(Some(r + 1), Some(c)));
                prop_assert_eq!(edges.contains(BorderEdges::LEFT), !sel(Some(r), c.checked_sub(1)));
                prop_assert_eq!(edges.contains(BorderEdges::RIGHT), !sel(Some(r), Some(c + 1)));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Array move
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn array_move_preserves_rest(
        (items, from, to) in (1usize..50).prop_flat_map(|n| (Just((0..n).collect::<Vec<_>>()), 0..n, 0..n))
    ) {
        let moved = array_move(&items, from, to);
        prop_assert_eq!(moved.len(), items.len());
        prop_assert_eq!(moved[to], items[from]);
        let rest_before: Vec<usize> = items.iter().copied().filter(|&x| x != items[from]).collect();
        let rest_after: Vec<usize> = moved.iter().copied().filter(|&x| x != items[from]).collect();
        prop_assert_eq!(rest_before, rest_after);
    }
}
