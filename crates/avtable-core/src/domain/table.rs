use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Typed scalar held by a table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Best-effort typing of a raw string: integer, then float, then text.
    ///
    /// Blank input is [`Cell::Missing`]; non-finite floats stay text.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Missing;
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return Self::Integer(value);
        }
        match parse_finite(trimmed) {
            Some(value) => Self::Float(value),
            None => Self::Text(raw.to_owned()),
        }
    }

    /// Float if the string parses as a finite number, otherwise the original text.
    pub fn float_or_text(raw: &str) -> Self {
        match parse_finite(raw.trim()) {
            Some(value) => Self::Float(value),
            None => Self::Text(raw.to_owned()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Ordering used for row sorting: numbers, then text, then missing.
    pub fn natural_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Missing, _) => Ordering::Greater,
            (_, Self::Missing) => Ordering::Less,
            (Self::Text(_), _) => Ordering::Greater,
            (_, Self::Text(_)) => Ordering::Less,
            (a, b) => {
                let left = a.as_f64().unwrap_or_default();
                let right = b.as_f64().unwrap_or_default();
                left.total_cmp(&right)
            }
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Integer(value) => Value::from(*value),
            Self::Float(value) => Value::from(*value),
            Self::Text(value) => Value::from(value.as_str()),
            Self::Missing => Value::Null,
        }
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Uniform tabular output: ordered columns and rows with one cell per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTable")]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Wire form of [`Table`]; rows are fitted to the columns on conversion.
#[derive(Deserialize)]
struct RawTable {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Cell>>,
}

impl From<RawTable> for Table {
    fn from(raw: RawTable) -> Self {
        Self::from_parts(raw.columns, raw.rows)
    }
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from raw parts, padding or truncating rows to the column count.
    pub fn from_parts(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Cell>>) {
        (self.columns, self.rows)
    }

    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Missing);
        self.rows.push(row);
    }

    /// Appends a row given as named cells, adding unseen columns at the end.
    pub fn push_record<I, S>(&mut self, record: I)
    where
        I: IntoIterator<Item = (S, Cell)>,
        S: AsRef<str>,
    {
        let mut row = vec![Cell::Missing; self.columns.len()];
        for (name, cell) in record {
            let index = match self.column_index(name.as_ref()) {
                Some(index) => index,
                None => {
                    self.columns.push(name.as_ref().to_owned());
                    for existing in &mut self.rows {
                        existing.push(Cell::Missing);
                    }
                    row.push(Cell::Missing);
                    self.columns.len() - 1
                }
            };
            row[index] = cell;
        }
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Cell> + 'a> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }

    pub fn get(&self, row: usize, name: &str) -> Option<&Cell> {
        let index = self.column_index(name)?;
        self.rows.get(row).map(|cells| &cells[index])
    }

    /// Rows as JSON objects keyed by column name, in column order.
    pub fn to_json_records(&self) -> Value {
        let records = self
            .rows
            .iter()
            .map(|row| {
                let object = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, cell)| (column.clone(), cell.to_json()))
                    .collect::<Map<String, Value>>();
                Value::Object(object)
            })
            .collect();
        Value::Array(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_prefers_integer_then_float_then_text() {
        assert_eq!(Cell::infer("42"), Cell::Integer(42));
        assert_eq!(Cell::infer("1.0850"), Cell::Float(1.085));
        assert_eq!(Cell::infer("EUR"), Cell::text("EUR"));
        assert_eq!(Cell::infer(""), Cell::Missing);
        assert_eq!(Cell::infer("NaN"), Cell::text("NaN"));
    }

    #[test]
    fn push_record_backfills_new_columns() {
        let mut table = Table::new(vec![String::from("timestamp")]);
        table.push_record([("timestamp", Cell::text("2024-01-02")), ("RSI", Cell::Float(55.0))]);
        table.push_record([("timestamp", Cell::text("2024-01-01")), ("SMA", Cell::Float(10.0))]);

        assert_eq!(table.columns(), ["timestamp", "RSI", "SMA"]);
        assert_eq!(table.get(0, "SMA"), Some(&Cell::Missing));
        assert_eq!(table.get(1, "RSI"), Some(&Cell::Missing));
        assert_eq!(table.get(1, "SMA"), Some(&Cell::Float(10.0)));
    }

    #[test]
    fn natural_order_puts_missing_last() {
        let mut cells = vec![
            Cell::Missing,
            Cell::text("b"),
            Cell::Float(2.5),
            Cell::Integer(1),
            Cell::text("a"),
        ];
        cells.sort_by(Cell::natural_cmp);
        assert_eq!(
            cells,
            vec![
                Cell::Integer(1),
                Cell::Float(2.5),
                Cell::text("a"),
                Cell::text("b"),
                Cell::Missing,
            ]
        );
    }

    #[test]
    fn deserialized_rows_are_fitted_to_the_columns() {
        let table: Table = serde_json::from_str(
            r#"{"columns":["close","timestamp"],"rows":[[1.0],[2.0,"2020-01-01","extra"]]}"#,
        )
        .expect("valid table json");

        assert_eq!(table.get(0, "timestamp"), Some(&Cell::Missing));
        assert_eq!(table.rows()[1].len(), 2);

        let sorted = crate::canonicalize::canonicalize(table);
        assert_eq!(sorted.get(0, "timestamp"), Some(&Cell::text("2020-01-01")));
        assert_eq!(sorted.get(1, "close"), Some(&Cell::Float(1.0)));
    }

    #[test]
    fn json_records_follow_column_order() {
        let table = Table::from_parts(
            vec![String::from("sector"), String::from("change")],
            vec![vec![Cell::text("Energy"), Cell::Float(0.5)]],
        );

        assert_eq!(
            table.to_json_records(),
            serde_json::json!([{"sector": "Energy", "change": 0.5}])
        );
    }
}
