#![forbid(unsafe_code)]

//! Row tree input and the index-based arena the engine reads from.
//!
//! The data collaborator hands over a nested [`RowNode`] tree (rows with
//! `sub_rows`). [`RowArena::from_roots`] moves it into a flat arena where parent
//! and child links are [`NodeIndex`] values, depth is derived from the ancestor
//! chain, and row ids are checked for uniqueness.
//!
//! # Example
//!
//! ```
//! use treegrid_core::ids::RowId;
//! use treegrid_core::row::{RowArena, RowNode};
//!
//! let id = |s: &str| RowId::new(s).unwrap();
//! let arena = RowArena::from_roots(vec![
//!     RowNode::new(id("A"), "folder").child(RowNode::new(id("B"), "task")),
//!     RowNode::new(id("C"), "task"),
//! ])
//! .unwrap();
//!
//! let b = arena.index_of("B").unwrap();
//! assert_eq!(arena.depth(b), 1);
//! assert_eq!(arena.roots().len(), 2);
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::ids::{ColumnId, IdError, RowId};

/// A display value carried by a row, keyed by column id.
///
/// The engine never renders these; it only compares them when a sort
/// specification names the column.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// Free text.
    Text(String),
    /// Numeric value (dates are expected as epoch numbers).
    Number(f64),
    /// Boolean flag.
    Bool(bool),
    /// No value.
    #[default]
    Empty,
}

impl FieldValue {
    /// Natural ordering used by sort specifications.
    ///
    /// Numbers compare numerically, text case-insensitively, booleans
    /// `false < true`; empty values sort after everything else. Values of
    /// different kinds order as `Number < Text < Bool < Empty`.
    #[must_use]
    pub fn natural_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Text(_) => 1,
            Self::Bool(_) => 2,
            Self::Empty => 3,
        }
    }

    /// Whether this is [`FieldValue::Empty`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Per-row payload, without hierarchy links.
#[derive(Debug, Clone, PartialEq)]
pub struct RowData {
    /// Unique, stable identifier.
    pub id: RowId,
    /// Entity kind (folder, task, ...), opaque to the engine.
    pub kind: String,
    /// Display fields keyed by column.
    pub fields: BTreeMap<ColumnId, FieldValue>,
    /// Placeholder row whose data has not arrived yet.
    pub is_loading: bool,
}

impl RowData {
    /// Field value for a column; [`FieldValue::Empty`] when absent.
    #[must_use]
    pub fn field(&self, column: &str) -> &FieldValue {
        static EMPTY: FieldValue = FieldValue::Empty;
        self.fields.get(column).unwrap_or(&EMPTY)
    }
}

/// A node of the nested input tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RowNode {
    /// Row payload.
    pub data: RowData,
    /// Ordered children.
    pub sub_rows: Vec<RowNode>,
}

impl RowNode {
    /// Create a leaf row.
    #[must_use]
    pub fn new(id: RowId, kind: impl Into<String>) -> Self {
        Self {
            data: RowData {
                id,
                kind: kind.into(),
                fields: BTreeMap::new(),
                is_loading: false,
            },
            sub_rows: Vec::new(),
        }
    }

    /// Add a child row.
    #[must_use]
    pub fn child(mut self, node: RowNode) -> Self {
        self.sub_rows.push(node);
        self
    }

    /// Replace the children.
    #[must_use]
    pub fn with_children(mut self, nodes: Vec<RowNode>) -> Self {
        self.sub_rows = nodes;
        self
    }

    /// Set a display field.
    #[must_use]
    pub fn field(mut self, column: ColumnId, value: impl Into<FieldValue>) -> Self {
        self.data.fields.insert(column, value.into());
        self
    }

    /// Mark as a loading placeholder.
    #[must_use]
    pub fn loading(mut self, is_loading: bool) -> Self {
        self.data.is_loading = is_loading;
        self
    }
}

/// Index of a node inside a [`RowArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(u32);

impl NodeIndex {
    /// Position in the arena's node vector.
    #[inline]
    #[must_use]
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

/// Errors raised while building a [`RowArena`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowTreeError {
    /// Two rows share the same id.
    DuplicateRowId { id: RowId },
    /// A row id failed validation.
    Id(IdError),
    /// The tree holds more rows than a [`NodeIndex`] can address.
    TooManyRows { count: usize },
}

impl fmt::Display for RowTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateRowId { id } => write!(f, "duplicate row id {id:?}"),
            Self::Id(err) => write!(f, "invalid row id: {err}"),
            Self::TooManyRows { count } => write!(f, "row tree too large ({count} rows)"),
        }
    }
}

impl std::error::Error for RowTreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Id(err) = self {
            return Some(err);
        }
        None
    }
}

impl From<IdError> for RowTreeError {
    fn from(err: IdError) -> Self {
        Self::Id(err)
    }
}

#[derive(Debug, Clone)]
struct ArenaNode {
    data: RowData,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    depth: usize,
}

/// Flat storage of the row tree with integer parent/child links.
#[derive(Debug, Clone, Default)]
pub struct RowArena {
    nodes: Vec<ArenaNode>,
    roots: Vec<NodeIndex>,
    by_id: HashMap<RowId, NodeIndex>,
}

impl RowArena {
    /// Build the arena from nested root rows, preserving sibling order.
    pub fn from_roots(roots: Vec<RowNode>) -> Result<Self, RowTreeError> {
        let mut arena = Self::default();
        // Explicit stack keeps deep trees off the call stack.
        let mut stack: Vec<(RowNode, Option<NodeIndex>, usize)> = roots
            .into_iter()
            .rev()
            .map(|node| (node, None, 0))
            .collect();

        while let Some((node, parent, depth)) = stack.pop() {
            let count = arena.nodes.len();
            let raw = u32::try_from(count).map_err(|_| RowTreeError::TooManyRows { count })?;
            let index = NodeIndex(raw);
            let RowNode { data, sub_rows } = node;

            if arena.by_id.insert(data.id.clone(), index).is_some() {
                return Err(RowTreeError::DuplicateRowId { id: data.id });
            }
            match parent {
                Some(p) => arena.nodes[p.get()].children.push(index),
                None => arena.roots.push(index),
            }
            arena.nodes.push(ArenaNode {
                data,
                parent,
                children: Vec::with_capacity(sub_rows.len()),
                depth,
            });
            for child in sub_rows.into_iter().rev() {
                stack.push((child, Some(index), depth + 1));
            }
        }
        Ok(arena)
    }

    /// Number of rows in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root rows in input order.
    #[must_use]
    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    /// Look up a row by id.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.by_id.get(id).copied()
    }

    /// Row payload.
    #[must_use]
    pub fn data(&self, index: NodeIndex) -> Option<&RowData> {
        self.nodes.get(index.get()).map(|n| &n.data)
    }

    /// Children in input order; empty for unknown indices.
    #[must_use]
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        self.nodes
            .get(index.get())
            .map_or(&[][..], |n| n.children.as_slice())
    }

    /// Parent, or `None` for roots and unknown indices.
    #[must_use]
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.nodes.get(index.get()).and_then(|n| n.parent)
    }

    /// Depth derived from the ancestor chain (roots are 0).
    #[must_use]
    pub fn depth(&self, index: NodeIndex) -> usize {
        self.nodes.get(index.get()).map_or(0, |n| n.depth)
    }

    /// Whether the row has children.
    #[must_use]
    pub fn has_children(&self, index: NodeIndex) -> bool {
        !self.children(index).is_empty()
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        std::iter::successors(self.parent(index), move |&i| self.parent(i))
    }

    /// All descendants of `index` in pre-order, excluding `index` itself.
    pub fn descendants(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        let mut stack: Vec<NodeIndex> = self.children(index).iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(self.children(next).iter().rev().copied());
            Some(next)
        })
    }

    /// Every row id in pre-order.
    pub fn ids(&self) -> impl Iterator<Item = &RowId> + '_ {
        self.nodes.iter().map(|n| &n.data.id)
    }
}
