#![forbid(unsafe_code)]

//! Visible row model: tree flattening with expansion, sorting, and filtering.
//!
//! Turns a [`RowArena`] plus an [`ExpandedSet`] into the ordered list of rows
//! the grid shows. A row is present iff every ancestor is expanded; roots are
//! always present. Sorting runs inside each sibling group, so the hierarchy is
//! never broken up, and loading rows always trail their non-loading siblings.
//!
//! # Example
//!
//! ```
//! use treegrid_core::ids::RowId;
//! use treegrid_core::row::{RowArena, RowNode};
//! use treegrid_engine::flatten::{ExpandedSet, Flattener};
//!
//! let id = |s: &str| RowId::new(s).unwrap();
//! let arena = RowArena::from_roots(vec![
//!     RowNode::new(id("A"), "folder").child(RowNode::new(id("B"), "task")),
//!     RowNode::new(id("C"), "task"),
//! ])
//! .unwrap();
//!
//! let mut expanded = ExpandedSet::new();
//! assert_eq!(Flattener::new(&arena, &expanded).flatten().id_strs(), ["A", "C"]);
//!
//! expanded.set(&id("A"), true);
//! assert_eq!(Flattener::new(&arena, &expanded).flatten().id_strs(), ["A", "B", "C"]);
//! ```

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use treegrid_core::ids::RowId;
use treegrid_core::row::{NodeIndex, RowArena, RowData};
use treegrid_core::sort::SortSpec;

/// Ids of expanded rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedSet {
    ids: HashSet<RowId>,
}

impl ExpandedSet {
    /// Nothing expanded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an externally persisted set of ids.
    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = RowId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Whether `id` is expanded.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of expanded ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is expanded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Set the flag for one row. Returns whether anything changed.
    pub fn set(&mut self, id: &RowId, expanded: bool) -> bool {
        if expanded {
            self.ids.insert(id.clone())
        } else {
            self.ids.remove(id.as_str())
        }
    }

    /// Flip the flag for one row. Returns the new state.
    pub fn toggle(&mut self, id: &RowId) -> bool {
        let now = !self.contains(id.as_str());
        self.set(id, now);
        now
    }

    /// Set the flag on `id` and every descendant reachable from it.
    ///
    /// Unknown ids are ignored. Returns whether anything changed.
    pub fn set_subtree(&mut self, arena: &RowArena, id: &RowId, expanded: bool) -> bool {
        let Some(root) = arena.index_of(id.as_str()) else {
            return false;
        };
        let mut changed = self.set(id, expanded);
        for node in arena.descendants(root) {
            if let Some(data) = arena.data(node) {
                changed |= self.set(&data.id, expanded);
            }
        }
        changed
    }

    /// Expand every row that has children.
    pub fn expand_all(&mut self, arena: &RowArena) -> bool {
        let mut changed = false;
        for &root in arena.roots() {
            for node in std::iter::once(root).chain(arena.descendants(root)) {
                if arena.has_children(node)
                    && let Some(data) = arena.data(node)
                {
                    changed |= self.set(&data.id, true);
                }
            }
        }
        changed
    }

    /// Collapse everything.
    pub fn collapse_all(&mut self) -> bool {
        let changed = !self.ids.is_empty();
        self.ids.clear();
        changed
    }

    /// Drop ids that no longer exist in `arena`. Returns the number removed.
    pub fn retain_known(&mut self, arena: &RowArena) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| arena.index_of(id.as_str()).is_some());
        before - self.ids.len()
    }

    /// Expanded ids in sorted order (stable for notifications and persistence).
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<RowId> {
        let mut ids: Vec<RowId> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }
}

/// One row of the flattened list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow {
    /// Row id.
    pub id: RowId,
    /// Arena node; `None` for synthetic placeholders.
    pub node: Option<NodeIndex>,
    /// Nesting depth (roots are 0).
    pub depth: usize,
    /// Placeholder whose data is still loading.
    pub is_loading: bool,
    /// Whether the row has children in the arena.
    pub has_children: bool,
    /// Whether the row is currently expanded.
    pub is_expanded: bool,
}

/// The ordered list of visible rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleRows {
    rows: Vec<FlatRow>,
    positions: HashMap<RowId, usize>,
}

impl VisibleRows {
    fn from_rows(rows: Vec<FlatRow>) -> Self {
        let positions = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
        Self { rows, positions }
    }

    /// Rows in display order.
    #[must_use]
    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    /// Row at a display index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FlatRow> {
        self.rows.get(index)
    }

    /// Display index of a row id.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Number of visible rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows are visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row ids in display order.
    #[must_use]
    pub fn ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|r| r.id.clone()).collect()
    }

    /// Row ids as string slices (handy for assertions and logs).
    #[must_use]
    pub fn id_strs(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.id.as_str()).collect()
    }
}

type Comparator<'a> = Box<dyn Fn(&RowData, &RowData) -> Ordering + 'a>;
type Filter<'a> = Box<dyn Fn(&RowData) -> bool + 'a>;

/// Builder that flattens a row arena into [`VisibleRows`].
pub struct Flattener<'a> {
    arena: &'a RowArena,
    expanded: &'a ExpandedSet,
    comparator: Option<Comparator<'a>>,
    filter: Option<Filter<'a>>,
    placeholders: usize,
}

impl<'a> Flattener<'a> {
    /// Flatten `arena` under the given expansion state.
    #[must_use]
    pub fn new(arena: &'a RowArena, expanded: &'a ExpandedSet) -> Self {
        Self {
            arena,
            expanded,
            comparator: None,
            filter: None,
            placeholders: 0,
        }
    }

    /// Sort each sibling group by a column's field values.
    #[must_use]
    pub fn with_sort(self, spec: Option<&'a SortSpec>) -> Self {
        match spec {
            Some(spec) => self.with_comparator(move |a, b| spec.compare(a, b)),
            None => self,
        }
    }

    /// Sort each sibling group with a caller comparator.
    #[must_use]
    pub fn with_comparator<F>(mut self, cmp: F) -> Self
    where
        F: Fn(&RowData, &RowData) -> Ordering + 'a,
    {
        self.comparator = Some(Box::new(cmp));
        self
    }

    /// Keep only rows accepted by `filter`. A rejected row hides its subtree.
    #[must_use]
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&RowData) -> bool + 'a,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Append `count` synthetic loading rows after the real roots.
    #[must_use]
    pub fn with_placeholders(mut self, count: usize) -> Self {
        self.placeholders = count;
        self
    }

    /// Produce the flat list.
    #[must_use]
    pub fn flatten(&self) -> VisibleRows {
        let mut rows = Vec::with_capacity(self.arena.len().min(4096) + self.placeholders);
        let mut stack: Vec<NodeIndex> = self.sibling_group(self.arena.roots());
        stack.reverse();

        while let Some(node) = stack.pop() {
            let Some(data) = self.arena.data(node) else {
                continue;
            };
            let has_children = self.arena.has_children(node);
            let is_expanded = self.expanded.contains(data.id.as_str());
            rows.push(FlatRow {
                id: data.id.clone(),
                node: Some(node),
                depth: self.arena.depth(node),
                is_loading: data.is_loading,
                has_children,
                is_expanded,
            });
            if has_children && is_expanded {
                let group = self.sibling_group(self.arena.children(node));
                stack.extend(group.into_iter().rev());
            }
        }

        let arena = self.arena;
        let placeholder_ids = (0..)
            .map(RowId::placeholder)
            .filter(|id| arena.index_of(id.as_str()).is_none())
            .take(self.placeholders);
        rows.extend(placeholder_ids.map(|id| FlatRow {
            id,
            node: None,
            depth: 0,
            is_loading: true,
            has_children: false,
            is_expanded: false,
        }));
        VisibleRows::from_rows(rows)
    }

    /// Filter and order one group of siblings.
    fn sibling_group(&self, siblings: &[NodeIndex]) -> Vec<NodeIndex> {
        let arena = self.arena;
        let mut group: Vec<(NodeIndex, &RowData)> = siblings
            .iter()
            .filter_map(|&i| arena.data(i).map(|d| (i, d)))
            .filter(|(_, d)| self.filter.as_ref().is_none_or(|f| f(d)))
            .collect();
        group.sort_by(|(_, a), (_, b)| {
            let loading = a.is_loading.cmp(&b.is_loading);
            match &self.comparator {
                Some(cmp) => loading.then_with(|| cmp(a, b)),
                None => loading,
            }
        });
        group.into_iter().map(|(i, _)| i).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treegrid_core::ids::ColumnId;
    use treegrid_core::row::RowNode;

    fn id(s: &str) -> RowId {
        RowId::new(s).unwrap()
    }

    fn name() -> ColumnId {
        ColumnId::new("name").unwrap()
    }

    fn node(s: &str) -> RowNode {
        RowNode::new(id(s), "task").field(name(), s)
    }

    fn sample() -> RowArena {
        RowArena::from_roots(vec![
            node("A").child(node("B").child(node("B1"))).child(node("Aa")),
            node("C"),
        ])
        .unwrap()
    }

    #[test]
    fn collapsed_tree_shows_roots_only() {
        let arena = sample();
        let rows = Flattener::new(&arena, &ExpandedSet::new()).flatten();
        assert_eq!(rows.id_strs(), ["A", "C"]);
        assert!(rows.rows().iter().all(|r| r.depth == 0));
    }

    #[test]
    fn child_requires_every_ancestor_expanded() {
        let arena = sample();
        // B expanded but A collapsed: B1 stays hidden.
        let expanded = ExpandedSet::from_ids([id("B")]);
        assert_eq!(Flattener::new(&arena, &expanded).flatten().id_strs(), ["A", "C"]);

        let expanded = ExpandedSet::from_ids([id("A"), id("B")]);
        let rows = Flattener::new(&arena, &expanded).flatten();
        assert_eq!(rows.id_strs(), ["A", "B", "B1", "Aa", "C"]);
        assert_eq!(rows.get(2).unwrap().depth, 2);
    }

    #[test]
    fn sort_is_applied_per_sibling_group() {
        let arena = sample();
        let expanded = ExpandedSet::from_ids([id("A"), id("B")]);
        let spec = SortSpec::desc(name());
        let rows = Flattener::new(&arena, &expanded).with_sort(Some(&spec)).flatten();
        // Roots: C > A; A's children: B > Aa.
        assert_eq!(rows.id_strs(), ["C", "A", "B", "B1", "Aa"]);
    }

    #[test]
    fn loading_rows_trail_their_siblings() {
        let arena = RowArena::from_roots(vec![
            node("z").loading(true),
            node("b"),
            node("a"),
        ])
        .unwrap();
        let spec = SortSpec::asc(name());
        let rows = Flattener::new(&arena, &ExpandedSet::new())
            .with_sort(Some(&spec))
            .flatten();
        assert_eq!(rows.id_strs(), ["a", "b", "z"]);

        // Even when the comparator would put it first.
        let rows = Flattener::new(&arena, &ExpandedSet::new())
            .with_comparator(|a, b| b.id.cmp(&a.id))
            .flatten();
        assert_eq!(rows.id_strs(), ["b", "a", "z"]);
    }

    #[test]
    fn filter_hides_whole_subtree() {
        let arena = sample();
        let expanded = ExpandedSet::from_ids([id("A"), id("B")]);
        let rows = Flattener::new(&arena, &expanded)
            .with_filter(|d| d.id.as_str() != "B")
            .flatten();
        assert_eq!(rows.id_strs(), ["A", "Aa", "C"]);
    }

    #[test]
    fn placeholders_follow_real_rows() {
        let arena = sample();
        let rows = Flattener::new(&arena, &ExpandedSet::new())
            .with_placeholders(2)
            .flatten();
        assert_eq!(rows.len(), 4);
        let last = rows.get(3).unwrap();
        assert!(last.is_loading);
        assert!(last.node.is_none());
        assert!(last.id.is_placeholder());
    }

    #[test]
    fn placeholders_skip_ids_taken_by_real_rows() {
        let arena = RowArena::from_roots(vec![
            RowNode::new(id("__placeholder_0"), "task"),
            RowNode::new(id("B"), "task"),
        ])
        .unwrap();
        let rows = Flattener::new(&arena, &ExpandedSet::new())
            .with_placeholders(2)
            .flatten();
        assert_eq!(
            rows.id_strs(),
            ["__placeholder_0", "B", "__placeholder_1", "__placeholder_2"]
        );
        assert_eq!(rows.position("__placeholder_0"), Some(0));
        assert!(!rows.get(0).unwrap().is_loading);
    }

    #[test]
    fn set_subtree_cascades_to_descendants() {
        let arena = sample();
        let mut expanded = ExpandedSet::new();
        assert!(expanded.set_subtree(&arena, &id("A"), true));
        for s in ["A", "B", "B1", "Aa"] {
            assert!(expanded.contains(s), "{s} should be expanded");
        }
        assert!(!expanded.contains("C"));
        assert!(expanded.set_subtree(&arena, &id("B"), false));
        assert!(!expanded.contains("B1"));
        assert!(expanded.contains("A"));
        assert!(!expanded.set_subtree(&arena, &id("ghost"), true));
    }

    #[test]
    fn expand_all_marks_only_parents() {
        let arena = sample();
        let mut expanded = ExpandedSet::new();
        assert!(expanded.expand_all(&arena));
        assert_eq!(expanded.sorted_ids(), vec![id("A"), id("B")]);
        assert!(!expanded.expand_all(&arena));
        assert!(expanded.collapse_all());
        assert!(expanded.is_empty());
    }

    #[test]
    fn retain_known_drops_stale_ids() {
        let arena = sample();
        let mut expanded = ExpandedSet::from_ids([id("A"), id("gone")]);
        assert_eq!(expanded.retain_known(&arena), 1);
        assert_eq!(expanded.len(), 1);
    }

    #[test]
    fn toggle_flips_state() {
        let mut expanded = ExpandedSet::new();
        assert!(expanded.toggle(&id("A")));
        assert!(!expanded.toggle(&id("A")));
        assert!(expanded.is_empty());
    }

    #[test]
    fn positions_index_display_order() {
        let arena = sample();
        let expanded = ExpandedSet::from_ids([id("A")]);
        let rows = Flattener::new(&arena, &expanded).flatten();
        assert_eq!(rows.position("Aa"), Some(2));
        assert_eq!(rows.position("B1"), None);
    }
}
