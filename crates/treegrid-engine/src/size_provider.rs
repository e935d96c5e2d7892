#![forbid(unsafe_code)]

//! Row size measurement seam.
//!
//! The windowing code never measures anything itself. It asks a
//! [`SizeProvider`] for an estimate before a row is rendered and for the real
//! size once the rendering surface hands back a handle to the mounted row.

use treegrid_core::config::GridConfig;

/// Source of row sizes for the row window.
pub trait SizeProvider {
    /// Whatever the rendering surface hands back for a mounted row.
    type Handle;

    /// Size to assume for a row that has not been measured yet.
    fn estimate(&self, hierarchy: bool) -> u32;

    /// Measure a mounted row.
    ///
    /// Returns `None` when the handle is not attached to a live container yet;
    /// callers treat that as "try again later".
    fn measure(&self, handle: &Self::Handle) -> Option<u32>;
}

/// Provider for surfaces where every mounted row reports its own height.
///
/// The handle is the height the surface laid the row out at; `0` means the row
/// is not laid out yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSizeProvider {
    flat: u32,
    hierarchy: u32,
}

impl FixedSizeProvider {
    /// Provider with explicit estimates for both display modes.
    #[must_use]
    pub const fn new(flat: u32, hierarchy: u32) -> Self {
        Self { flat, hierarchy }
    }

    /// Provider using the estimates in `config`.
    #[must_use]
    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.row_estimate, config.hierarchy_row_estimate)
    }
}

impl Default for FixedSizeProvider {
    fn default() -> Self {
        Self::from_config(&GridConfig::default())
    }
}

impl SizeProvider for FixedSizeProvider {
    type Handle = u32;

    fn estimate(&self, hierarchy: bool) -> u32 {
        if hierarchy { self.hierarchy } else { self.flat }
    }

    fn measure(&self, handle: &u32) -> Option<u32> {
        (*handle > 0).then_some(*handle)
    }
}
