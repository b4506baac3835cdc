use std::collections::{BTreeMap, HashSet};

use super::model::{Table, Value};

/// What a mean-fill pass did, column by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillReport {
    /// Column name → number of cells that received the column mean.
    pub filled: BTreeMap<String, usize>,
    /// Numeric columns left untouched because every value was missing.
    pub undefined_mean: Vec<String>,
}

impl FillReport {
    pub fn total_filled(&self) -> usize {
        self.filled.values().sum()
    }
}

/// Drop rows that repeat an earlier row value-for-value. The first
/// occurrence wins and surviving rows keep their order.
pub fn remove_duplicates(table: &Table) -> Table {
    let mut seen: HashSet<Vec<&Value>> = HashSet::with_capacity(table.row_count());
    let keep: Vec<usize> = (0..table.row_count())
        .filter(|&row| seen.insert(table.row(row)))
        .collect();
    table.take_rows(&keep)
}

/// Replace missing cells of every numeric column with that column's mean.
///
/// The mean is taken over the values present before this call. Columns with
/// no values at all are reported in [`FillReport::undefined_mean`] and left
/// as they are; text and boolean columns are never touched.
pub fn fill_missing_numeric(table: &Table) -> (Table, FillReport) {
    let mut out = table.clone();
    let mut report = FillReport::default();

    for column in out.columns_mut() {
        if !column.kind().is_numeric() {
            continue;
        }
        let missing = column.missing_count();
        if missing == 0 {
            continue;
        }

        let present: Vec<f64> = column.values().iter().filter_map(Value::as_f64).collect();
        if present.is_empty() {
            log::warn!("Column '{}' has no values; mean is undefined", column.name());
            report.undefined_mean.push(column.name().to_string());
            continue;
        }
        let mean = present.iter().sum::<f64>() / present.len() as f64;

        for v in column.values_mut().iter_mut() {
            match v {
                Value::Missing => *v = Value::Float(mean),
                Value::Integer(i) => *v = Value::Float(*i as f64),
                _ => {}
            }
        }
        report.filled.insert(column.name().to_string(), missing);
    }

    (out, report)
}
