#![forbid(unsafe_code)]

//! Column descriptors, persisted column state, and the renderer registry.
//!
//! The column-builder collaborator owns the ordered list of
//! [`ColumnDescriptor`]s; the engine only reads it. A [`ColumnState`] snapshot
//! carries the user-adjustable parts (order, visibility, pinning, sizing) so a
//! settings-persistence collaborator can store and restore them.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use bitflags::bitflags;

use crate::ids::{ColumnId, IdError};

/// Which edge a column sticks to, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PinSide {
    /// Stuck to the leading edge.
    Left,
    /// Scrolls with the grid.
    #[default]
    None,
    /// Stuck to the trailing edge.
    Right,
}

impl PinSide {
    /// Grid-map ordering rank: left, then scrollable, then right.
    #[inline]
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::None => 1,
            Self::Right => 2,
        }
    }

    /// Whether the column is pinned to either edge.
    #[inline]
    #[must_use]
    pub const fn is_pinned(self) -> bool {
        !matches!(self, Self::None)
    }
}

bitflags! {
    /// User capabilities a column opts into.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColumnCaps: u8 {
        /// Header click changes the sort specification.
        const SORTABLE    = 0b0000_0001;
        /// Width can be dragged.
        const RESIZABLE   = 0b0000_0010;
        /// Can be hidden from the column menu.
        const HIDEABLE    = 0b0000_0100;
        /// Can be pinned or unpinned.
        const PINNABLE    = 0b0000_1000;
        /// Can be moved to another position.
        const REORDERABLE = 0b0001_0000;
    }
}

impl Default for ColumnCaps {
    fn default() -> Self {
        Self::all()
    }
}

/// Key resolving a column to its cell renderer through a [`RendererRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RendererKey(String);

impl RendererKey {
    /// Create a renderer key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RendererKey {
    fn default() -> Self {
        Self::new("text")
    }
}

/// Default width for columns built without an explicit size.
pub const DEFAULT_COLUMN_WIDTH: u32 = 150;
/// Smallest width a resize may produce.
pub const MIN_COLUMN_WIDTH: u32 = 20;

/// One leaf column of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// Column identifier.
    pub id: ColumnId,
    /// Pinned edge.
    pub pin: PinSide,
    /// Width in pixels.
    pub size: u32,
    /// Lower bound for resizing.
    pub min_size: u32,
    /// Upper bound for resizing.
    pub max_size: u32,
    /// Whether the column is shown.
    pub visible: bool,
    /// Capability flags.
    pub caps: ColumnCaps,
    /// Cell renderer lookup key.
    pub renderer: RendererKey,
}

impl ColumnDescriptor {
    /// Create a visible, unpinned column with default sizing.
    #[must_use]
    pub fn new(id: ColumnId) -> Self {
        Self {
            id,
            pin: PinSide::None,
            size: DEFAULT_COLUMN_WIDTH,
            min_size: MIN_COLUMN_WIDTH,
            max_size: u32::MAX,
            visible: true,
            caps: ColumnCaps::default(),
            renderer: RendererKey::default(),
        }
    }

    /// Set the pinned edge.
    #[must_use]
    pub fn pinned(mut self, pin: PinSide) -> Self {
        self.pin = pin;
        self
    }

    /// Set the width (clamped to the size bounds).
    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size.clamp(self.min_size, self.max_size);
        self
    }

    /// Set the resize bounds; the current width is re-clamped.
    #[must_use]
    pub fn with_size_bounds(mut self, min: u32, max: u32) -> Self {
        self.min_size = min.min(max);
        self.max_size = max.max(min);
        self.size = self.size.clamp(self.min_size, self.max_size);
        self
    }

    /// Set visibility.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set capability flags.
    #[must_use]
    pub fn with_caps(mut self, caps: ColumnCaps) -> Self {
        self.caps = caps;
        self
    }

    /// Set the renderer key.
    #[must_use]
    pub fn with_renderer(mut self, key: impl Into<String>) -> Self {
        self.renderer = RendererKey::new(key);
        self
    }

    /// Clamp a requested width to this column's bounds.
    #[must_use]
    pub fn clamp_size(&self, size: u32) -> u32 {
        size.clamp(self.min_size, self.max_size)
    }
}

/// Errors raised by column operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnError {
    /// Two descriptors share an id.
    DuplicateColumnId { id: ColumnId },
    /// The id does not name a known column.
    UnknownColumn { id: String },
    /// The column lacks the capability required by the operation.
    NotAllowed { id: ColumnId, capability: ColumnCaps },
    /// A column id failed validation.
    Id(IdError),
}

impl fmt::Display for ColumnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateColumnId { id } => write!(f, "duplicate column id {id:?}"),
            Self::UnknownColumn { id } => write!(f, "unknown column {id:?}"),
            Self::NotAllowed { id, capability } => {
                write!(f, "column {id:?} does not allow {capability:?}")
            }
            Self::Id(err) => write!(f, "invalid column id: {err}"),
        }
    }
}

impl std::error::Error for ColumnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Id(err) = self {
            return Some(err);
        }
        None
    }
}

impl From<IdError> for ColumnError {
    fn from(err: IdError) -> Self {
        Self::Id(err)
    }
}

/// Reject descriptor lists with repeated ids.
pub fn check_unique(columns: &[ColumnDescriptor]) -> Result<(), ColumnError> {
    let mut seen = HashSet::with_capacity(columns.len());
    for column in columns {
        if !seen.insert(column.id.as_str()) {
            return Err(ColumnError::DuplicateColumnId {
                id: column.id.clone(),
            });
        }
    }
    Ok(())
}

/// Pinned column ids per edge, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnPinning {
    /// Columns stuck to the leading edge.
    pub left: Vec<ColumnId>,
    /// Columns stuck to the trailing edge.
    pub right: Vec<ColumnId>,
}

impl ColumnPinning {
    fn side_of(&self, id: &ColumnId) -> Option<(PinSide, usize)> {
        if let Some(pos) = self.left.iter().position(|c| c == id) {
            return Some((PinSide::Left, pos));
        }
        self.right
            .iter()
            .position(|c| c == id)
            .map(|pos| (PinSide::Right, pos))
    }
}

/// User-adjustable column settings, as stored by a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ColumnState {
    /// Column order; unlisted columns keep their relative order after these.
    pub order: Vec<ColumnId>,
    /// Visibility overrides.
    pub visibility: BTreeMap<ColumnId, bool>,
    /// Pinned columns per edge.
    pub pinning: ColumnPinning,
    /// Width overrides in pixels.
    pub sizing: BTreeMap<ColumnId, u32>,
}

impl ColumnState {
    /// Snapshot the current settings of a descriptor list.
    #[must_use]
    pub fn capture(columns: &[ColumnDescriptor]) -> Self {
        let mut state = Self::default();
        for column in columns {
            state.order.push(column.id.clone());
            state.visibility.insert(column.id.clone(), column.visible);
            state.sizing.insert(column.id.clone(), column.size);
            match column.pin {
                PinSide::Left => state.pinning.left.push(column.id.clone()),
                PinSide::Right => state.pinning.right.push(column.id.clone()),
                PinSide::None => {}
            }
        }
        state
    }

    /// Apply the snapshot to a descriptor list in place.
    ///
    /// Ids the snapshot names but the list lacks are ignored, so a snapshot
    /// taken against an older column set applies cleanly. Sizes are clamped to
    /// each column's bounds.
    pub fn apply(&self, columns: &mut Vec<ColumnDescriptor>) {
        if !self.order.is_empty() {
            let rank: HashMap<&ColumnId, usize> =
                self.order.iter().enumerate().map(|(i, id)| (id, i)).collect();
            // Stable: unlisted columns keep their relative order, after listed ones.
            columns.sort_by_key(|c| rank.get(&c.id).copied().unwrap_or(usize::MAX));
        }

        let has_pinning = !self.pinning.left.is_empty() || !self.pinning.right.is_empty();
        for column in columns.iter_mut() {
            if let Some(&visible) = self.visibility.get(&column.id) {
                column.visible = visible;
            }
            if let Some(&size) = self.sizing.get(&column.id) {
                column.size = column.clamp_size(size);
            }
            if has_pinning {
                column.pin = self
                    .pinning
                    .side_of(&column.id)
                    .map_or(PinSide::None, |(side, _)| side);
            }
        }

        if has_pinning {
            // Pinned columns follow the order of their pinning list.
            columns.sort_by_key(|c| match self.pinning.side_of(&c.id) {
                Some((_, pos)) => pos,
                None => 0,
            });
            columns.sort_by_key(|c| c.pin.rank());
        }
    }
}

/// Lookup table from [`RendererKey`] to a caller-defined renderer.
///
/// Columns never carry renderer code directly; each descriptor names a key
/// and the host resolves it here, falling back to a default entry.
#[derive(Debug, Clone)]
pub struct RendererRegistry<R> {
    entries: HashMap<RendererKey, R>,
    fallback: R,
}

impl<R> RendererRegistry<R> {
    /// Create a registry with the renderer used for unknown keys.
    #[must_use]
    pub fn new(fallback: R) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
        }
    }

    /// Register (or replace) a renderer.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, renderer: R) -> Self {
        self.register(key, renderer);
        self
    }

    /// Register (or replace) a renderer, returning the previous one.
    pub fn register(&mut self, key: impl Into<String>, renderer: R) -> Option<R> {
        self.entries.insert(RendererKey::new(key), renderer)
    }

    /// Resolve a key; unknown keys yield the fallback.
    #[must_use]
    pub fn resolve(&self, key: &RendererKey) -> &R {
        self.entries.get(key).unwrap_or(&self.fallback)
    }

    /// Resolve the renderer for a column.
    #[must_use]
    pub fn for_column(&self, column: &ColumnDescriptor) -> &R {
        self.resolve(&column.renderer)
    }

    /// Whether a key has an explicit entry.
    #[must_use]
    pub fn contains(&self, key: &RendererKey) -> bool {
        self.entries.contains_key(key)
    }
}
