#![forbid(unsafe_code)]

//! Row, column, and cell identifiers.
//!
//! A [`CellId`] is the reversible string encoding of a `(row id, column id)`
//! pair joined by [`CELL_ID_SEPARATOR`]. Neither component may contain the
//! separator, so every well-formed cell id splits back into exactly one pair.
//!
//! # Example
//!
//! ```
//! use treegrid_core::ids::{CellId, ColumnId, RowId};
//!
//! let row = RowId::new("task-7").unwrap();
//! let col = ColumnId::new("status").unwrap();
//! let cell = CellId::new(&row, &col);
//!
//! assert_eq!(cell.as_str(), "task-7|status");
//! let parsed: CellId = "task-7|status".parse().unwrap();
//! assert_eq!(parsed.row_id(), row);
//! assert_eq!(parsed.column_id(), col);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Reserved character joining the two halves of a [`CellId`].
pub const CELL_ID_SEPARATOR: char = '|';

/// Reasons an identifier can be rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The identifier was the empty string.
    Empty,
    /// The identifier contains the reserved cell-id separator.
    ContainsSeparator { id: String },
    /// A cell id did not split into exactly one `(row, column)` pair.
    MalformedCellId { raw: String },
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "identifier is empty"),
            Self::ContainsSeparator { id } => {
                write!(
                    f,
                    "identifier {id:?} contains reserved separator {CELL_ID_SEPARATOR:?}"
                )
            }
            Self::MalformedCellId { raw } => write!(f, "malformed cell id {raw:?}"),
        }
    }
}

impl std::error::Error for IdError {}

fn validate(id: &str) -> Result<(), IdError> {
    if id.is_empty() {
        return Err(IdError::Empty);
    }
    if id.contains(CELL_ID_SEPARATOR) {
        return Err(IdError::ContainsSeparator { id: id.to_owned() });
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap an identifier.
            pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
                let id = id.into();
                validate(&id)?;
                Ok(Self(id))
            }

            /// Wrap a literal known to be valid.
            pub(crate) fn from_trusted(id: &str) -> Self {
                debug_assert!(validate(id).is_ok(), "invalid built-in id {id:?}");
                Self(id.to_owned())
            }

            /// Borrow the identifier text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Stable identifier of a tree row.
    RowId
}

string_id! {
    /// Identifier of a column descriptor.
    ColumnId
}

impl RowId {
    /// Identifier of the `n`th synthetic loading placeholder row.
    #[must_use]
    pub fn placeholder(n: usize) -> Self {
        Self::from_trusted(&format!("__placeholder_{n}"))
    }

    /// Whether this id names a synthetic placeholder row.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with("__placeholder_")
    }
}

/// Composite key of a `(row, column)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    raw: String,
    /// Byte offset of the separator inside `raw`.
    split: usize,
}

impl CellId {
    /// Encode a cell id. Infallible because both components are validated ids.
    #[must_use]
    pub fn new(row: &RowId, column: &ColumnId) -> Self {
        let mut raw = String::with_capacity(row.0.len() + column.0.len() + 1);
        raw.push_str(&row.0);
        raw.push(CELL_ID_SEPARATOR);
        raw.push_str(&column.0);
        Self {
            split: row.0.len(),
            raw,
        }
    }

    /// Parse a cell id back into its components.
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let malformed = || IdError::MalformedCellId {
            raw: raw.to_owned(),
        };
        let (row, column) = raw.split_once(CELL_ID_SEPARATOR).ok_or_else(malformed)?;
        if row.is_empty() || column.is_empty() || column.contains(CELL_ID_SEPARATOR) {
            return Err(malformed());
        }
        Ok(Self {
            raw: raw.to_owned(),
            split: row.len(),
        })
    }

    /// The encoded key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Row component as a borrowed string.
    #[must_use]
    pub fn row_str(&self) -> &str {
        &self.raw[..self.split]
    }

    /// Column component as a borrowed string.
    #[must_use]
    pub fn column_str(&self) -> &str {
        &self.raw[self.split + CELL_ID_SEPARATOR.len_utf8()..]
    }

    /// Row component.
    #[must_use]
    pub fn row_id(&self) -> RowId {
        RowId(self.row_str().to_owned())
    }

    /// Column component.
    #[must_use]
    pub fn column_id(&self) -> ColumnId {
        ColumnId(self.column_str().to_owned())
    }

    /// Both components.
    #[must_use]
    pub fn parts(&self) -> (RowId, ColumnId) {
        (self.row_id(), self.column_id())
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for CellId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CellId {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}
