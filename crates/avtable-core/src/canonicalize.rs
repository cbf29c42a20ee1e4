use std::collections::HashSet;

use crate::domain::Table;
use crate::normalize::TIMESTAMP_COLUMN;

const EMPTY_COLUMN_NAME: &str = "column";

/// Canonical spelling of an upstream column name.
///
/// `"4. close"` becomes `"close"` and `"Meta Data"` becomes `"meta_data"`.
pub fn canonical_column_name(name: &str) -> String {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    let stripped = match name[digits..].strip_prefix(". ") {
        Some(rest) if digits > 0 => rest,
        _ => name,
    };

    let canonical = stripped
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ch.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect::<String>();

    if canonical.is_empty() {
        String::from(EMPTY_COLUMN_NAME)
    } else {
        canonical
    }
}

/// Rewrites column names and sorts rows by `timestamp` when present.
///
/// Names that collide after rewriting get `_2`, `_3`, ... suffixes. The sort
/// is stable and ascending; without a `timestamp` column rows keep their
/// order. Applying this twice gives the same table as applying it once.
pub fn canonicalize(table: Table) -> Table {
    let (columns, mut rows) = table.into_parts();

    let base = columns
        .iter()
        .map(|column| canonical_column_name(column))
        .collect::<Vec<_>>();
    let reserved = base.iter().cloned().collect::<HashSet<_>>();

    let mut taken = HashSet::with_capacity(base.len());
    let mut names = Vec::with_capacity(base.len());
    for name in base {
        let unique = if taken.contains(&name) {
            (2..)
                .map(|suffix| format!("{name}_{suffix}"))
                .find(|candidate| !taken.contains(candidate) && !reserved.contains(candidate))
                .unwrap_or_default()
        } else {
            name
        };
        taken.insert(unique.clone());
        names.push(unique);
    }

    if let Some(index) = names.iter().position(|name| name == TIMESTAMP_COLUMN) {
        rows.sort_by(|left, right| left[index].natural_cmp(&right[index]));
    }

    Table::from_parts(names, rows)
}
