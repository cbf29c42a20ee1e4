//! Shape normalization.
//!
//! One function per [`ResponseShape`], each producing a [`Table`]. Column
//! names are left as the upstream spells them; [`crate::canonicalize`] runs
//! afterwards.
//!
//! | Shape | Output |
//! |-------|--------|
//! | `TimeSeriesCsv` | CSV rows; first column renamed `timestamp`; per-column typing |
//! | `SectorJson` | `rank_group`, `sector`, `change` (fraction, not percent) |
//! | `TechnicalIndicatorJson` | `timestamp` plus one float column per indicator field |
//! | `OverviewJson` | one row, one text column per key |
//! | `ForexJson` | one row, one inferred column per leaf |
//! | `ApiErrorJson` | no table; [`AvError::Api`] |

use serde_json::{Map, Value};

use crate::classify::{ResponseShape, META_DATA_KEY};
use crate::domain::{Cell, Table};
use crate::error::{AvError, PayloadError};
use crate::query::Query;

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const RANK_GROUP_COLUMN: &str = "rank_group";
pub const SECTOR_COLUMN: &str = "sector";
pub const CHANGE_COLUMN: &str = "change";

/// Normalizes a classified response, attaching the redacted call context on failure.
pub fn normalize(shape: ResponseShape, query: &Query) -> Result<Table, AvError> {
    normalize_shape(&shape).map_err(|error| error.with_context(query.context()))
}

pub fn normalize_shape(shape: &ResponseShape) -> Result<Table, PayloadError> {
    match shape {
        ResponseShape::TimeSeriesCsv(body) => normalize_time_series_csv(body),
        ResponseShape::SectorJson(payload) => normalize_sector(payload),
        ResponseShape::TechnicalIndicatorJson(payload) => normalize_technical_indicator(payload),
        ResponseShape::OverviewJson(payload) => normalize_overview(payload),
        ResponseShape::ForexJson(payload) => normalize_forex(payload),
        ResponseShape::ApiErrorJson(payload) => Err(PayloadError::Api(api_error_message(payload))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    fn of<'a>(values: impl Iterator<Item = &'a str>) -> Self {
        let mut kind = Self::Integer;
        for value in values.map(str::trim).filter(|value| !value.is_empty()) {
            if kind == Self::Integer && value.parse::<i64>().is_err() {
                kind = Self::Float;
            }
            if kind == Self::Float && !value.parse::<f64>().is_ok_and(f64::is_finite) {
                return Self::Text;
            }
        }
        kind
    }

    fn cell(self, raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Missing;
        }
        match self {
            Self::Integer => trimmed.parse().map_or_else(|_| Cell::text(raw), Cell::Integer),
            Self::Float => trimmed.parse().map_or_else(|_| Cell::text(raw), Cell::Float),
            Self::Text => Cell::text(raw),
        }
    }
}

/// Parses a CSV body with a header row.
///
/// The first column becomes `timestamp`. Each column is typed as a whole:
/// integer if every non-empty value is an integer, float if every value is a
/// finite number, text otherwise. Empty fields are [`Cell::Missing`].
pub fn normalize_time_series_csv(body: &str) -> Result<Table, PayloadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut columns = reader
        .headers()
        .map_err(|error| PayloadError::malformed(format!("invalid CSV header: {error}")))?
        .iter()
        .map(str::to_owned)
        .collect::<Vec<_>>();
    if let Some(first) = columns.first_mut() {
        *first = String::from(TIMESTAMP_COLUMN);
    }

    let records = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| PayloadError::malformed(format!("invalid CSV row: {error}")))?;

    let kinds = (0..columns.len())
        .map(|index| ColumnKind::of(records.iter().filter_map(|record| record.get(index))))
        .collect::<Vec<_>>();

    let rows = records
        .iter()
        .map(|record| {
            record
                .iter()
                .zip(&kinds)
                .map(|(raw, kind)| kind.cell(raw))
                .collect::<Vec<_>>()
        })
        .collect();

    Ok(Table::from_parts(columns, rows))
}

/// Pivots rank groups into `(rank_group, sector, change)` rows.
///
/// `"1.23%"` becomes `0.0123`; values that do not parse are kept as text.
pub fn normalize_sector(payload: &Map<String, Value>) -> Result<Table, PayloadError> {
    let mut table = Table::new(vec![
        String::from(RANK_GROUP_COLUMN),
        String::from(SECTOR_COLUMN),
        String::from(CHANGE_COLUMN),
    ]);

    for (group, sectors) in payload.iter().filter(|(key, _)| *key != META_DATA_KEY) {
        let Value::Object(sectors) = sectors else {
            return Err(PayloadError::malformed(format!(
                "rank group '{group}' is not an object"
            )));
        };
        for (sector, change) in sectors {
            table.push_row(vec![
                Cell::text(group.as_str()),
                Cell::text(sector.as_str()),
                percent_cell(change),
            ]);
        }
    }

    Ok(table)
}

/// Turns the timestamp-keyed section that follows `"Meta Data"` into rows.
pub fn normalize_technical_indicator(
    payload: &Map<String, Value>,
) -> Result<Table, PayloadError> {
    let Some((section, series)) = payload.iter().nth(1) else {
        return Err(PayloadError::malformed(
            "indicator payload has no data section after \"Meta Data\"",
        ));
    };
    let Value::Object(series) = series else {
        return Err(PayloadError::malformed(format!(
            "indicator section '{section}' is not an object"
        )));
    };

    let mut table = Table::new(vec![String::from(TIMESTAMP_COLUMN)]);
    for (timestamp, values) in series {
        let Value::Object(values) = values else {
            return Err(PayloadError::malformed(format!(
                "indicator entry '{timestamp}' is not an object"
            )));
        };
        let record = std::iter::once((TIMESTAMP_COLUMN, Cell::text(timestamp.as_str())))
            .chain(values.iter().map(|(name, value)| (name.as_str(), float_or_text(value))));
        table.push_record(record);
    }

    Ok(table)
}

/// One row, one column per key, every value kept as text.
///
/// An empty object yields one row with no columns.
pub fn normalize_overview(payload: &Map<String, Value>) -> Result<Table, PayloadError> {
    let mut table = Table::default();
    table.push_record(payload.iter().map(|(key, value)| {
        let cell = match value {
            Value::Null => Cell::Missing,
            Value::String(text) => Cell::text(text.as_str()),
            other => Cell::Text(other.to_string()),
        };
        (key.as_str(), cell)
    }));
    Ok(table)
}

/// Flattens nested objects into one row with independently typed columns.
///
/// Columns are named by leaf key; a leaf key seen more than once is
/// qualified with its dotted path.
pub fn normalize_forex(payload: &Map<String, Value>) -> Result<Table, PayloadError> {
    let leaves = leaves(payload);
    let mut table = Table::default();
    table.push_record(leaves.iter().map(|leaf| {
        let duplicated = leaves.iter().filter(|other| other.key == leaf.key).count() > 1;
        let name = if duplicated { leaf.path.as_str() } else { leaf.key };
        (name, inferred(leaf.value))
    }));
    Ok(table)
}

/// Human-readable rendering of an upstream error payload.
pub fn api_error_message(payload: &Map<String, Value>) -> String {
    if payload.is_empty() {
        return String::from("upstream returned an empty JSON object");
    }
    leaves(payload)
        .iter()
        .map(|leaf| match leaf.value {
            Value::String(text) => format!("{}: {text}", leaf.path),
            other => format!("{}: {other}", leaf.path),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

struct Leaf<'a> {
    path: String,
    key: &'a str,
    value: &'a Value,
}

fn leaves(payload: &Map<String, Value>) -> Vec<Leaf<'_>> {
    let mut out = Vec::new();
    collect_leaves(None, payload, &mut out);
    out
}

fn collect_leaves<'a>(
    prefix: Option<&str>,
    object: &'a Map<String, Value>,
    out: &mut Vec<Leaf<'a>>,
) {
    for (key, value) in object {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => collect_leaves(Some(&path), nested, out),
            _ => out.push(Leaf {
                path,
                key: key.as_str(),
                value,
            }),
        }
    }
}

fn percent_cell(value: &Value) -> Cell {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
            match number.parse::<f64>() {
                Ok(parsed) if parsed.is_finite() => Cell::Float(parsed / 100.0),
                _ => Cell::text(text.as_str()),
            }
        }
        Value::Number(number) => number
            .as_f64()
            .map_or_else(|| Cell::Text(number.to_string()), |parsed| Cell::Float(parsed / 100.0)),
        Value::Null => Cell::Missing,
        other => Cell::Text(other.to_string()),
    }
}

fn float_or_text(value: &Value) -> Cell {
    match value {
        Value::String(text) => Cell::float_or_text(text),
        Value::Number(number) => number
            .as_f64()
            .map_or_else(|| Cell::Text(number.to_string()), Cell::Float),
        Value::Null => Cell::Missing,
        other => Cell::Text(other.to_string()),
    }
}

fn inferred(value: &Value) -> Cell {
    match value {
        Value::String(text) => Cell::infer(text),
        Value::Number(number) => match (number.as_i64(), number.as_f64()) {
            (Some(integer), _) => Cell::Integer(integer),
            (None, Some(float)) => Cell::Float(float),
            (None, None) => Cell::Text(number.to_string()),
        },
        Value::Null => Cell::Missing,
        other => Cell::Text(other.to_string()),
    }
}
