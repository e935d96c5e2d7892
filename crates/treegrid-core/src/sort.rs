#![forbid(unsafe_code)]

//! Sort specification over row display fields.

use std::cmp::Ordering;

use crate::ids::ColumnId;
use crate::row::RowData;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

/// Single-column sort applied within each sibling group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortSpec {
    /// Column whose field values are compared.
    pub column: ColumnId,
    /// Direction.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Ascending sort on `column`.
    #[must_use]
    pub fn asc(column: ColumnId) -> Self {
        Self {
            column,
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on `column`.
    #[must_use]
    pub fn desc(column: ColumnId) -> Self {
        Self {
            column,
            direction: SortDirection::Desc,
        }
    }

    /// Compare two rows. Empty values stay last in both directions.
    #[must_use]
    pub fn compare(&self, a: &RowData, b: &RowData) -> Ordering {
        let (fa, fb) = (a.field(self.column.as_str()), b.field(self.column.as_str()));
        match (fa.is_empty(), fb.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match self.direction {
                SortDirection::Asc => fa.natural_cmp(fb),
                SortDirection::Desc => fb.natural_cmp(fa),
            },
        }
    }

    /// Header-click cycle for `column`: none → asc → desc → none.
    ///
    /// Clicking a different column starts over at ascending.
    #[must_use]
    pub fn cycle(current: Option<&SortSpec>, column: &ColumnId) -> Option<SortSpec> {
        match current {
            Some(spec) if &spec.column == column => match spec.direction {
                SortDirection::Asc => Some(Self::desc(column.clone())),
                SortDirection::Desc => None,
            },
            _ => Some(Self::asc(column.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::RowId;
    use crate::row::RowNode;

    fn row(id: &str, name: Option<&str>) -> RowData {
        let node = RowNode::new(RowId::new(id).unwrap(), "task");
        match name {
            Some(n) => node.field(ColumnId::new("name").unwrap(), n).data,
            None => node.data,
        }
    }

    #[test]
    fn empty_values_sort_last_in_both_directions() {
        let name = ColumnId::new("name").unwrap();
        let (a, empty) = (row("a", Some("x")), row("b", None));
        assert_eq!(SortSpec::asc(name.clone()).compare(&a, &empty), Ordering::Less);
        assert_eq!(SortSpec::desc(name).compare(&a, &empty), Ordering::Less);
    }

    #[test]
    fn descending_reverses_values() {
        let name = ColumnId::new("name").unwrap();
        let (a, b) = (row("a", Some("alpha")), row("b", Some("beta")));
        assert_eq!(SortSpec::asc(name.clone()).compare(&a, &b), Ordering::Less);
        assert_eq!(SortSpec::desc(name).compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn header_click_cycle() {
        let name = ColumnId::new("name").unwrap();
        let status = ColumnId::new("status").unwrap();
        let first = SortSpec::cycle(None, &name).unwrap();
        assert_eq!(first.direction, SortDirection::Asc);
        let second = SortSpec::cycle(Some(&first), &name).unwrap();
        assert_eq!(second.direction, SortDirection::Desc);
        assert_eq!(SortSpec::cycle(Some(&second), &name), None);
        let other = SortSpec::cycle(Some(&second), &status).unwrap();
        assert_eq!(other, SortSpec::asc(status));
    }
}
