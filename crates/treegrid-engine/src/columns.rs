#![forbid(unsafe_code)]

//! Column set management.
//!
//! Owns the descriptor list and applies user adjustments (visibility,
//! pinning, order, width) with capability checks. Every effective change is
//! reported as a [`ColumnChange`] so the host can persist the new
//! [`ColumnState`].

use treegrid_core::column::{
    ColumnCaps, ColumnDescriptor, ColumnError, ColumnState, PinSide, check_unique,
};
use treegrid_core::ids::ColumnId;

use crate::grid_map::ordered_column_ids;

/// One effective column adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnChange {
    /// Column shown or hidden.
    Visibility { id: ColumnId, visible: bool },
    /// Column pinned to an edge or unpinned.
    Pinning { id: ColumnId, pin: PinSide },
    /// Column moved; carries the full new order.
    Order { order: Vec<ColumnId> },
    /// Column resized (after clamping).
    Sizing { id: ColumnId, size: u32 },
    /// A persisted snapshot was applied wholesale.
    Restored,
}

/// The grid's column descriptors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSet {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnSet {
    /// Wrap a descriptor list, rejecting repeated ids.
    pub fn new(columns: Vec<ColumnDescriptor>) -> Result<Self, ColumnError> {
        check_unique(&columns)?;
        Ok(Self { columns })
    }

    /// All descriptors in logical order (hidden ones included).
    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Number of descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Descriptor by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.id.as_str() == id)
    }

    /// Visible column ids in display order (pinned-left, middle, pinned-right).
    #[must_use]
    pub fn display_order(&self) -> Vec<ColumnId> {
        ordered_column_ids(&self.columns)
    }

    /// Snapshot for persistence.
    #[must_use]
    pub fn state(&self) -> ColumnState {
        ColumnState::capture(&self.columns)
    }

    /// Apply a persisted snapshot. Unknown ids in the snapshot are ignored.
    pub fn apply_state(&mut self, state: &ColumnState) -> Option<ColumnChange> {
        let before = self.columns.clone();
        state.apply(&mut self.columns);
        (self.columns != before).then_some(ColumnChange::Restored)
    }

    /// Show or hide a column. Hiding requires [`ColumnCaps::HIDEABLE`].
    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<Option<ColumnChange>, ColumnError> {
        let column = self.require(id, if visible { ColumnCaps::empty() } else { ColumnCaps::HIDEABLE })?;
        if column.visible == visible {
            return Ok(None);
        }
        column.visible = visible;
        Ok(Some(ColumnChange::Visibility {
            id: column.id.clone(),
            visible,
        }))
    }

    /// Pin a column to an edge, or unpin it with [`PinSide::None`].
    pub fn set_pin(&mut self, id: &str, pin: PinSide) -> Result<Option<ColumnChange>, ColumnError> {
        let column = self.require(id, ColumnCaps::PINNABLE)?;
        if column.pin == pin {
            return Ok(None);
        }
        column.pin = pin;
        Ok(Some(ColumnChange::Pinning {
            id: column.id.clone(),
            pin,
        }))
    }

    /// Resize a column; the width is clamped to its bounds.
    pub fn resize(&mut self, id: &str, size: u32) -> Result<Option<ColumnChange>, ColumnError> {
        let column = self.require(id, ColumnCaps::RESIZABLE)?;
        let size = column.clamp_size(size);
        if column.size == size {
            return Ok(None);
        }
        column.size = size;
        Ok(Some(ColumnChange::Sizing {
            id: column.id.clone(),
            size,
        }))
    }

    /// Move a column to `to` in the logical order (clamped to the end).
    pub fn move_column(&mut self, id: &str, to: usize) -> Result<Option<ColumnChange>, ColumnError> {
        self.require(id, ColumnCaps::REORDERABLE)?;
        let from = self
            .columns
            .iter()
            .position(|c| c.id.as_str() == id)
            .ok_or_else(|| ColumnError::UnknownColumn { id: id.to_owned() })?;
        let to = to.min(self.columns.len() - 1);
        if from == to {
            return Ok(None);
        }
        let column = self.columns.remove(from);
        self.columns.insert(to, column);
        Ok(Some(ColumnChange::Order {
            order: self.columns.iter().map(|c| c.id.clone()).collect(),
        }))
    }

    fn require(&mut self, id: &str, caps: ColumnCaps) -> Result<&mut ColumnDescriptor, ColumnError> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.id.as_str() == id)
            .ok_or_else(|| ColumnError::UnknownColumn { id: id.to_owned() })?;
        if !column.caps.contains(caps) {
            return Err(ColumnError::NotAllowed {
                id: column.id.clone(),
                capability: caps,
            });
        }
        Ok(column)
    }
}
