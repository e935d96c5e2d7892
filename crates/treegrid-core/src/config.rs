#![forbid(unsafe_code)]

//! Engine configuration with environment overrides.
//!
//! Defaults suit the project tree table; every knob can be overridden by a
//! builder method or a `TREEGRID_*` environment variable. Decisions are
//! deterministic given the environment lookup, so tests pass a closure
//! instead of touching the process environment.

use std::fmt::Write as _;

use crate::ids::ColumnId;

/// Environment variable overriding the row overscan count.
const ENV_ROW_OVERSCAN: &str = "TREEGRID_ROW_OVERSCAN";
/// Environment variable overriding the column overscan count.
const ENV_COLUMN_OVERSCAN: &str = "TREEGRID_COLUMN_OVERSCAN";
/// Environment variable overriding the flat-mode row height estimate (px).
const ENV_ROW_ESTIMATE: &str = "TREEGRID_ROW_ESTIMATE";
/// Environment variable overriding the hierarchy-mode row height estimate (px).
const ENV_HIERARCHY_ROW_ESTIMATE: &str = "TREEGRID_HIERARCHY_ROW_ESTIMATE";
/// Environment variable overriding the pinned-column pixel correction.
const ENV_PINNED_CORRECTION: &str = "TREEGRID_PINNED_CORRECTION";
/// Environment variable naming the drag-handle system column.
const ENV_DRAG_HANDLE_COLUMN: &str = "TREEGRID_DRAG_HANDLE_COLUMN";
/// Environment variable naming the row-selection system column.
const ENV_ROW_SELECTION_COLUMN: &str = "TREEGRID_ROW_SELECTION_COLUMN";
/// Environment variable overriding the number of loading placeholder rows.
const ENV_LOADING_PLACEHOLDERS: &str = "TREEGRID_LOADING_PLACEHOLDERS";

/// Default rows rendered beyond each viewport edge.
pub const DEFAULT_ROW_OVERSCAN: usize = 5;
/// Default columns rendered beyond each viewport edge.
pub const DEFAULT_COLUMN_OVERSCAN: usize = 3;
/// Default flat-mode row height estimate (px).
pub const DEFAULT_ROW_ESTIMATE: u32 = 36;
/// Default hierarchy-mode row height estimate (px).
pub const DEFAULT_HIERARCHY_ROW_ESTIMATE: u32 = 44;
/// Pixel correction subtracted from pinned offsets of non-system columns.
///
/// Hides the one-pixel seam between adjacent sticky cells on the web target.
/// Not verified for other densities or rendering surfaces.
pub const DEFAULT_PINNED_CORRECTION: f32 = 1.0;
/// Default id of the leading drag-handle column.
pub const DEFAULT_DRAG_HANDLE_COLUMN: &str = "__drag_handle";
/// Default id of the row-selection column.
pub const DEFAULT_ROW_SELECTION_COLUMN: &str = "__row_selection";
/// Default number of synthetic rows shown while data is loading.
pub const DEFAULT_LOADING_PLACEHOLDERS: usize = 3;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    /// Rows mounted beyond each edge of the viewport.
    pub row_overscan: usize,
    /// Scrollable columns mounted beyond each edge of the viewport.
    pub column_overscan: usize,
    /// Row height estimate in flat display mode (px).
    pub row_estimate: u32,
    /// Row height estimate in hierarchy display mode (px).
    pub hierarchy_row_estimate: u32,
    /// Pixel correction applied to non-system pinned columns.
    pub pinned_correction: f32,
    /// Leading drag-handle system column.
    pub drag_handle_column: ColumnId,
    /// Row-selection system column.
    pub row_selection_column: ColumnId,
    /// Synthetic placeholder rows appended while loading.
    pub loading_placeholders: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            row_overscan: DEFAULT_ROW_OVERSCAN,
            column_overscan: DEFAULT_COLUMN_OVERSCAN,
            row_estimate: DEFAULT_ROW_ESTIMATE,
            hierarchy_row_estimate: DEFAULT_HIERARCHY_ROW_ESTIMATE,
            pinned_correction: DEFAULT_PINNED_CORRECTION,
            drag_handle_column: ColumnId::from_trusted(DEFAULT_DRAG_HANDLE_COLUMN),
            row_selection_column: ColumnId::from_trusted(DEFAULT_ROW_SELECTION_COLUMN),
            loading_placeholders: DEFAULT_LOADING_PLACEHOLDERS,
        }
    }
}

impl GridConfig {
    /// Read overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read overrides through a custom environment lookup (for tests).
    ///
    /// Unparseable values are ignored and the default is kept.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = env_parse(&get_env, ENV_ROW_OVERSCAN) {
            config.row_overscan = v;
        }
        if let Some(v) = env_parse(&get_env, ENV_COLUMN_OVERSCAN) {
            config.column_overscan = v;
        }
        if let Some(v) = env_parse::<u32, _>(&get_env, ENV_ROW_ESTIMATE).filter(|&v| v > 0) {
            config.row_estimate = v;
        }
        if let Some(v) =
            env_parse::<u32, _>(&get_env, ENV_HIERARCHY_ROW_ESTIMATE).filter(|&v| v > 0)
        {
            config.hierarchy_row_estimate = v;
        }
        if let Some(v) =
            env_parse::<f32, _>(&get_env, ENV_PINNED_CORRECTION).filter(|v| v.is_finite())
        {
            config.pinned_correction = v;
        }
        if let Some(id) = env_column(&get_env, ENV_DRAG_HANDLE_COLUMN) {
            config.drag_handle_column = id;
        }
        if let Some(id) = env_column(&get_env, ENV_ROW_SELECTION_COLUMN) {
            config.row_selection_column = id;
        }
        if let Some(v) = env_parse(&get_env, ENV_LOADING_PLACEHOLDERS) {
            config.loading_placeholders = v;
        }
        config
    }

    /// Set the row overscan.
    #[must_use]
    pub fn with_row_overscan(mut self, rows: usize) -> Self {
        self.row_overscan = rows;
        self
    }

    /// Set the column overscan.
    #[must_use]
    pub fn with_column_overscan(mut self, columns: usize) -> Self {
        self.column_overscan = columns;
        self
    }

    /// Set both row height estimates (flat, hierarchy).
    #[must_use]
    pub fn with_row_estimates(mut self, flat: u32, hierarchy: u32) -> Self {
        self.row_estimate = flat.max(1);
        self.hierarchy_row_estimate = hierarchy.max(1);
        self
    }

    /// Set the pinned-column pixel correction.
    ///
    /// Non-finite values are ignored and the current correction is kept.
    #[must_use]
    pub fn with_pinned_correction(mut self, px: f32) -> Self {
        if px.is_finite() {
            self.pinned_correction = px;
        }
        self
    }

    /// Set the system column ids (drag handle, row selection).
    #[must_use]
    pub fn with_system_columns(mut self, drag_handle: ColumnId, row_selection: ColumnId) -> Self {
        self.drag_handle_column = drag_handle;
        self.row_selection_column = row_selection;
        self
    }

    /// Set the number of loading placeholder rows.
    #[must_use]
    pub fn with_loading_placeholders(mut self, rows: usize) -> Self {
        self.loading_placeholders = rows;
        self
    }

    /// Row height estimate for the given display mode.
    #[must_use]
    pub fn row_estimate_for(&self, hierarchy: bool) -> u32 {
        if hierarchy {
            self.hierarchy_row_estimate
        } else {
            self.row_estimate
        }
    }

    /// Whether `id` names one of the two system columns.
    #[must_use]
    pub fn is_system_column(&self, id: &str) -> bool {
        id == self.drag_handle_column.as_str() || id == self.row_selection_column.as_str()
    }

    /// Serialize the configuration to JSON (for diagnostics logs).
    #[must_use]
    pub fn to_json(&self) -> String {
        format!(
            concat!(
                r#"{{"row_overscan":{},"column_overscan":{},"row_estimate":{},"#,
                r#""hierarchy_row_estimate":{},"pinned_correction":{},"#,
                r#""drag_handle_column":"{}","row_selection_column":"{}","#,
                r#""loading_placeholders":{}}}"#
            ),
            self.row_overscan,
            self.column_overscan,
            self.row_estimate,
            self.hierarchy_row_estimate,
            json_number(self.pinned_correction),
            escape_json(self.drag_handle_column.as_str()),
            escape_json(self.row_selection_column.as_str()),
            self.loading_placeholders
        )
    }
}

fn json_number(value: f32) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        "null".to_string()
    }
}

fn escape_json(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if c < ' ' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

fn env_parse<T, F>(get_env: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    get_env(key)?.trim().parse().ok()
}

fn env_column<F>(get_env: &F, key: &str) -> Option<ColumnId>
where
    F: Fn(&str) -> Option<String>,
{
    ColumnId::new(get_env(key)?.trim()).ok()
}
