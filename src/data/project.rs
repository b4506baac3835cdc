use std::collections::BTreeSet;

use super::model::Table;
use crate::error::{Result, SweeperError};

/// Keep exactly the columns named in `selected`, in that order.
///
/// Every name must exist in `table`; one unknown name fails the whole call.
/// Selecting nothing keeps the row count and drops every column.
pub fn project<S: AsRef<str>>(table: &Table, selected: &[S]) -> Result<Table> {
    let mut seen = BTreeSet::new();
    let mut columns = Vec::with_capacity(selected.len());

    for name in selected {
        let name = name.as_ref();
        let column = table
            .column(name)
            .ok_or_else(|| SweeperError::UnknownColumn(name.to_string()))?;
        if !seen.insert(name) {
            return Err(SweeperError::DuplicateColumn(name.to_string()));
        }
        columns.push(column.clone());
    }

    Table::with_rows(table.row_count(), columns)
}
