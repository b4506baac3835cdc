use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Result, SweeperError};

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the scalar kinds a spreadsheet
/// or a CSV file can carry.
///
/// `Missing` is its own variant: it is never equal to `0`, `""` or `false`.
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Missing,
}

// -- Manual Eq/Ord/Hash so rows can be put in hash sets for de-duplication --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn rank(v: &Value) -> u8 {
            match v {
                Missing => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        match (self, other) {
            (Missing, Missing) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Missing => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{}", format_float(*v)),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Missing => write!(f, "<missing>"),
        }
    }
}

impl Value {
    /// Numeric view of the value, used for means and charts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Render the value as a delimited-text field. `Missing` becomes an
    /// empty field.
    pub fn to_field(&self) -> String {
        match self {
            Value::Missing => String::new(),
            other => other.to_string(),
        }
    }
}

/// Integral floats keep a float spelling (`2.0`, `1e16`) so they read back
/// as floats.
pub fn format_float(v: f64) -> String {
    if !v.is_finite() || v.fract() != 0.0 {
        format!("{v}")
    } else if v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v:e}")
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// The kind of a column, derived from the values it currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
    Boolean,
    /// No non-missing values at all.
    Empty,
}

impl ColumnKind {
    /// An all-missing column counts as numeric, as a float column of NaNs would.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Numeric | ColumnKind::Empty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Recomputed on every call; nothing about a column's kind is cached.
    pub fn kind(&self) -> ColumnKind {
        let mut present = self.values.iter().filter(|v| !v.is_missing()).peekable();
        if present.peek().is_none() {
            return ColumnKind::Empty;
        }
        let mut numeric = true;
        let mut boolean = true;
        for v in present {
            numeric &= v.is_numeric();
            boolean &= matches!(v, Value::Bool(_));
        }
        if numeric {
            ColumnKind::Numeric
        } else if boolean {
            ColumnKind::Boolean
        } else {
            ColumnKind::Text
        }
    }

    /// Widen integers to floats when a numeric column also holds floats or
    /// gaps, so every numeric column has a single representation.
    pub fn normalise_numeric(&mut self) {
        if self.kind() != ColumnKind::Numeric {
            return;
        }
        let has_float = self.values.iter().any(|v| matches!(v, Value::Float(_)));
        let has_missing = self.values.iter().any(Value::is_missing);
        if !(has_float || has_missing) {
            return;
        }
        for v in &mut self.values {
            if let Value::Integer(i) = *v {
                *v = Value::Float(i as f64);
            }
        }
    }

    pub(crate) fn values_mut(&mut self) -> &mut Vec<Value> {
        &mut self.values
    }

    /// A copy of this column holding only the rows at `indices`.
    pub(crate) fn take(&self, indices: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            values: indices.iter().map(|&i| self.values[i].clone()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – ordered named columns with a uniform row count
// ---------------------------------------------------------------------------

/// An in-memory table. Columns keep source order and unique names; every
/// column has exactly `row_count` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table from columns, checking row counts and name uniqueness.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, Column::len);
        Self::with_rows(row_count, columns)
    }

    /// Like [`Table::new`], but keeps `row_count` even when there are no
    /// columns (e.g. after selecting nothing).
    pub fn with_rows(row_count: usize, columns: Vec<Column>) -> Result<Self> {
        if columns.iter().any(|c| c.len() != row_count) {
            return Err(SweeperError::RaggedColumns);
        }
        let mut seen = BTreeSet::new();
        for c in &columns {
            if !seen.insert(c.name()) {
                return Err(SweeperError::DuplicateColumn(c.name().to_string()));
            }
        }
        Ok(Self { columns, row_count })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Borrowed view of one row, in column order.
    pub fn row(&self, index: usize) -> Vec<&Value> {
        self.columns.iter().map(|c| &c.values[index]).collect()
    }

    /// The first `n` rows (fewer if the table is shorter).
    pub fn head(&self, n: usize) -> Table {
        let indices: Vec<usize> = (0..n.min(self.row_count)).collect();
        self.take_rows(&indices)
    }

    /// Keep only the rows at `indices`, in that order.
    pub(crate) fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            row_count: indices.len(),
        }
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[Option<i64>]) -> Vec<Value> {
        values
            .iter()
            .map(|v| v.map_or(Value::Missing, Value::Integer))
            .collect()
    }

    #[test]
    fn missing_is_distinct_from_falsy_values() {
        assert_ne!(Value::Missing, Value::Integer(0));
        assert_ne!(Value::Missing, Value::Text(String::new()));
        assert_ne!(Value::Missing, Value::Bool(false));
        assert_eq!(Value::Missing, Value::Missing);
    }

    #[test]
    fn kind_is_derived_from_current_values() {
        assert_eq!(Column::new("a", ints(&[Some(1), None])).kind(), ColumnKind::Numeric);
        assert_eq!(Column::new("a", ints(&[None, None])).kind(), ColumnKind::Empty);
        let mixed = Column::new("a", vec![Value::Integer(1), Value::Text("x".into())]);
        assert_eq!(mixed.kind(), ColumnKind::Text);
        let flags = Column::new("a", vec![Value::Bool(true), Value::Missing]);
        assert_eq!(flags.kind(), ColumnKind::Boolean);
        assert!(!flags.kind().is_numeric());
    }

    #[test]
    fn normalise_widens_integers_next_to_gaps() {
        let mut col = Column::new("a", ints(&[Some(2), None]));
        col.normalise_numeric();
        assert_eq!(col.values(), &[Value::Float(2.0), Value::Missing]);

        let mut whole = Column::new("b", ints(&[Some(2), Some(3)]));
        whole.normalise_numeric();
        assert_eq!(whole.values(), &[Value::Integer(2), Value::Integer(3)]);
    }

    #[test]
    fn table_rejects_ragged_and_duplicate_columns() {
        let ragged = Table::new(vec![
            Column::new("a", ints(&[Some(1)])),
            Column::new("b", ints(&[Some(1), Some(2)])),
        ]);
        assert!(matches!(ragged, Err(SweeperError::RaggedColumns)));

        let dup = Table::new(vec![
            Column::new("a", ints(&[Some(1)])),
            Column::new("a", ints(&[Some(2)])),
        ]);
        assert!(matches!(dup, Err(SweeperError::DuplicateColumn(name)) if name == "a"));
    }

    #[test]
    fn head_truncates_rows() {
        let table = Table::new(vec![Column::new("a", ints(&[Some(1), Some(2), Some(3)]))]).unwrap();
        assert_eq!(table.head(2).row_count(), 2);
        assert_eq!(table.head(10).row_count(), 3);
    }

    #[test]
    fn floats_render_with_a_decimal() {
        assert_eq!(Value::Float(2.0).to_field(), "2.0");
        assert_eq!(Value::Float(2.5).to_field(), "2.5");
        assert_eq!(Value::Missing.to_field(), "");
        assert_eq!(Value::Bool(true).to_field(), "True");
    }

    #[test]
    fn huge_integral_floats_keep_a_float_spelling() {
        assert_eq!(Value::Float(1e16).to_field(), "1e16");
        assert_eq!(Value::Float(-2.5e20).to_field(), "-2.5e20");
        assert_eq!("1e16".parse::<f64>().unwrap(), 1e16);
        assert!("1e16".parse::<i64>().is_err());
    }
}
