#![forbid(unsafe_code)]

//! Pinned column layout.
//!
//! Computes sticky offsets for pinned columns, the divider decoration on the
//! last pinned-left column, layered selection outlines, and the stacking layer
//! of each cell.
//!
//! Offsets follow `offset(k) = sum(width of pinned columns before k) - correction`
//! where `correction` is [`GridConfig::pinned_correction`] for ordinary columns
//! and `0` for the drag-handle and row-selection system columns. Pinned-right
//! offsets are measured from the trailing edge.

use std::collections::HashMap;
use std::fmt;

use treegrid_core::column::{ColumnDescriptor, PinSide};
use treegrid_core::config::GridConfig;
use treegrid_core::ids::ColumnId;

use crate::selection::BorderEdges;

/// Width of one selection outline edge (px).
pub const SELECTION_EDGE_WIDTH: f32 = 2.0;
/// Horizontal reach of the divider line on the last pinned-left column (px).
pub const DIVIDER_WIDTH: f32 = 1.0;
/// Horizontal reach of the offset divider shade (px).
pub const DIVIDER_SHADE_WIDTH: f32 = 4.0;

/// What an inset shadow draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowRole {
    /// Thin line separating the pinned region.
    Divider,
    /// Soft shade offset from the divider.
    DividerShade,
    /// One edge of a selection outline.
    Selection,
}

impl ShadowRole {
    /// Stable name, usable as a style token.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Divider => "divider",
            Self::DividerShade => "divider-shade",
            Self::Selection => "selection",
        }
    }
}

/// One inset shadow layer, offset along x/y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsetShadow {
    /// Horizontal offset; negative draws on the trailing edge.
    pub x: f32,
    /// Vertical offset; negative draws on the bottom edge.
    pub y: f32,
    /// What the layer represents.
    pub role: ShadowRole,
}

impl InsetShadow {
    const fn new(x: f32, y: f32, role: ShadowRole) -> Self {
        Self { x, y, role }
    }
}

impl fmt::Display for InsetShadow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inset {}px {}px 0 0 var(--{})", self.x, self.y, self.role.name())
    }
}

/// Stack of inset shadow layers, topmost first.
///
/// Layers compose; adding a selection edge never removes the base divider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoration {
    layers: Vec<InsetShadow>,
}

impl Decoration {
    /// Layers, topmost first.
    #[must_use]
    pub fn layers(&self) -> &[InsetShadow] {
        &self.layers
    }

    /// Whether there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of layers with the given role.
    #[must_use]
    pub fn count(&self, role: ShadowRole) -> usize {
        self.layers.iter().filter(|l| l.role == role).count()
    }

    /// Selection edge layers for `edges`, in top/right/bottom/left order.
    #[must_use]
    pub fn selection(edges: BorderEdges) -> Self {
        let w = SELECTION_EDGE_WIDTH;
        let all = [
            (BorderEdges::TOP, InsetShadow::new(0.0, w, ShadowRole::Selection)),
            (BorderEdges::RIGHT, InsetShadow::new(-w, 0.0, ShadowRole::Selection)),
            (BorderEdges::BOTTOM, InsetShadow::new(0.0, -w, ShadowRole::Selection)),
            (BorderEdges::LEFT, InsetShadow::new(w, 0.0, ShadowRole::Selection)),
        ];
        Self {
            layers: all
                .into_iter()
                .filter(|(edge, _)| edges.contains(*edge))
                .map(|(_, layer)| layer)
                .collect(),
        }
    }

    /// Divider pair drawn on the last pinned-left column.
    #[must_use]
    pub fn pinned_divider() -> Self {
        Self {
            layers: vec![
                InsetShadow::new(-DIVIDER_WIDTH, 0.0, ShadowRole::Divider),
                InsetShadow::new(-DIVIDER_SHADE_WIDTH, 0.0, ShadowRole::DividerShade),
            ],
        }
    }

    /// Put `self` above `base`.
    #[must_use]
    pub fn over(mut self, base: &Decoration) -> Self {
        self.layers.extend_from_slice(&base.layers);
        self
    }
}

impl fmt::Display for Decoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.layers.is_empty() {
            return f.write_str("none");
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{layer}")?;
        }
        Ok(())
    }
}

/// Stacking layer of a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ZLayer {
    /// Scrollable cells.
    #[default]
    Normal,
    /// Sticky pinned cells.
    Pinned,
    /// The focused cell of a selection, above everything else.
    SelectedFocused,
}

/// Layout of one pinned column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinnedColumn {
    /// Pinned edge.
    pub side: PinSide,
    /// Position among columns pinned to the same edge.
    pub ordinal: usize,
    /// Sticky offset from that edge.
    pub offset: f32,
    /// Correction subtracted from `offset`.
    pub correction: f32,
    /// The last pinned-left column (gets the divider).
    pub is_last_left: bool,
}

/// Sticky offsets for every pinned column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinnedLayout {
    columns: HashMap<ColumnId, PinnedColumn>,
    divider: Decoration,
}

impl PinnedLayout {
    /// Compute offsets for the visible columns in `columns`, in order.
    #[must_use]
    pub fn compute(columns: &[ColumnDescriptor], config: &GridConfig) -> Self {
        let visible: Vec<&ColumnDescriptor> = columns.iter().filter(|c| c.visible).collect();
        let left: Vec<&ColumnDescriptor> = visible
            .iter()
            .copied()
            .filter(|c| c.pin == PinSide::Left)
            .collect();
        let right: Vec<&ColumnDescriptor> = visible
            .iter()
            .rev()
            .copied()
            .filter(|c| c.pin == PinSide::Right)
            .collect();

        let mut out = HashMap::with_capacity(left.len() + right.len());
        for (side, group) in [(PinSide::Left, &left), (PinSide::Right, &right)] {
            let mut before = 0.0_f32;
            for (ordinal, col) in group.iter().enumerate() {
                let correction = if config.is_system_column(col.id.as_str()) {
                    0.0
                } else {
                    config.pinned_correction
                };
                out.insert(
                    col.id.clone(),
                    PinnedColumn {
                        side,
                        ordinal,
                        offset: before - correction,
                        correction,
                        is_last_left: side == PinSide::Left && ordinal + 1 == group.len(),
                    },
                );
                before += col.size as f32;
            }
        }
        Self {
            columns: out,
            divider: Decoration::pinned_divider(),
        }
    }

    /// Layout of a pinned column; `None` for unpinned or unknown ids.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PinnedColumn> {
        self.columns.get(id)
    }

    /// Sticky offset of a pinned column.
    #[must_use]
    pub fn offset(&self, id: &str) -> Option<f32> {
        self.get(id).map(|c| c.offset)
    }

    /// Whether `id` is pinned.
    #[must_use]
    pub fn is_pinned(&self, id: &str) -> bool {
        self.columns.contains_key(id)
    }

    /// Whether `id` is the last pinned-left column.
    #[must_use]
    pub fn is_last_left(&self, id: &str) -> bool {
        self.get(id).is_some_and(|c| c.is_last_left)
    }

    /// Decoration a cell carries when nothing is selected.
    #[must_use]
    pub fn base_decoration(&self, id: &str) -> Decoration {
        if self.is_last_left(id) {
            self.divider.clone()
        } else {
            Decoration::default()
        }
    }

    /// Selection edges layered over the base decoration.
    #[must_use]
    pub fn cell_decoration(&self, id: &str, edges: BorderEdges) -> Decoration {
        Decoration::selection(edges).over(&self.base_decoration(id))
    }

    /// Stacking layer for a cell in column `id`.
    #[must_use]
    pub fn z_layer(&self, id: &str, selected: bool, focused: bool) -> ZLayer {
        if selected && focused {
            ZLayer::SelectedFocused
        } else if self.is_pinned(id) {
            ZLayer::Pinned
        } else {
            ZLayer::Normal
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

    fn config() -> GridConfig {
        GridConfig::default().with_system_columns(
            ColumnId::new("drag").unwrap(),
            ColumnId::new("select").unwrap(),
        )
    }

    fn layout() -> PinnedLayout {
        PinnedLayout::compute(
            &[
                col("drag", PinSide::Left, 32),
                col("select", PinSide::Left, 40),
                col("name", PinSide::Left, 200),
                col("status", PinSide::None, 120),
                col("due", PinSide::Right, 100),
                col("actions", PinSide::Right, 60),
            ],
            &config(),
        )
    }

    #[test]
    fn system_columns_skip_correction() {
        let l = layout();
        assert_eq!(l.offset("drag"), Some(0.0));
        assert_eq!(l.offset("select"), Some(32.0));
        assert_eq!(l.offset("name"), Some(72.0 - 1.0));
    }

    #[test]
    fn right_pins_mirror_from_trailing_edge() {
        let l = layout();
        assert_eq!(l.offset("actions"), Some(-1.0));
        assert_eq!(l.offset("due"), Some(60.0 - 1.0));
        assert_eq!(l.get("due").unwrap().ordinal, 1);
        assert_eq!(l.offset("status"), None);
    }

    #[test]
    fn only_last_left_gets_divider() {
        let l = layout();
        assert!(l.is_last_left("name"));
        assert!(!l.is_last_left("select"));
        assert_eq!(l.base_decoration("name").count(ShadowRole::Divider), 1);
        assert_eq!(l.base_decoration("name").layers().len(), 2);
        assert!(l.base_decoration("status").is_empty());
    }

    #[test]
    fn selection_edges_layer_over_divider() {
        let l = layout();
        let deco = l.cell_decoration("name", BorderEdges::all());
        assert_eq!(deco.count(ShadowRole::Selection), 4);
        assert_eq!(deco.count(ShadowRole::Divider), 1);
        assert_eq!(deco.count(ShadowRole::DividerShade), 1);
        // Selection layers sit on top.
        assert_eq!(deco.layers()[0].role, ShadowRole::Selection);
        assert_eq!(deco.layers()[5].role, ShadowRole::DividerShade);
    }

    #[test]
    fn partial_edges_compose_independently() {
        let deco = Decoration::selection(BorderEdges::TOP | BorderEdges::LEFT);
        assert_eq!(deco.layers().len(), 2);
        assert_eq!(
            deco.to_string(),
            "inset 0px 2px 0 0 var(--selection), inset 2px 0px 0 0 var(--selection)"
        );
        assert_eq!(Decoration::default().to_string(), "none");
    }

    #[test]
    fn stacking_order() {
        let l = layout();
        assert!(ZLayer::Normal < ZLayer::Pinned);
        assert!(ZLayer::Pinned < ZLayer::SelectedFocused);
        assert_eq!(l.z_layer("status", false, false), ZLayer::Normal);
        assert_eq!(l.z_layer("name", true, false), ZLayer::Pinned);
        assert_eq!(l.z_layer("status", true, true), ZLayer::SelectedFocused);
        assert_eq!(l.z_layer("name", true, true), ZLayer::SelectedFocused);
    }

    #[test]
    fn hidden_pinned_columns_take_no_space() {
        let l = PinnedLayout::compute(
            &[
                col("a", PinSide::Left, 50).with_visible(false),
                col("b", PinSide::Left, 50),
            ],
            &config(),
        );
        assert_eq!(l.offset("a"), None);
        assert_eq!(l.offset("b"), Some(-1.0));
    }
}
