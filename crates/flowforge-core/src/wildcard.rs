//! Wildcard resolution over rule tables.
//!
//! Rule tables use two markers:
//!
//! - `*` means "every member of the column's set". Rows carrying it are
//!   expanded into one row per member by [`split_asterisk_values`].
//! - `@` means "the aggregate across all members". It is never expanded;
//!   constraint builders sum over the members instead.
//!
//! Explicit rows take precedence over rows produced by expansion, and every
//! operation here returns new rows without touching the caller's.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::trace;

use crate::error::{ConfigError, Result};
use crate::schema::{TableSchema, TABLES};
use crate::sets::NetworkSets;
use crate::table::{cell_key, row_key, Cell, InputTables, Row, Table};
use crate::ALL;

fn effective_key<'a>(column: &'a str, key: &[&'a str]) -> Vec<&'a str> {
    let mut cols: Vec<&str> = key.to_vec();
    if !cols.contains(&column) {
        cols.push(column);
    }
    cols
}

/// Expands rows whose `column` holds `*` into one row per member of
/// `full_set`.
///
/// An expanded row is dropped when an explicit row already has the same
/// `key` (the expanded column is always part of the key). Re-applying the
/// function to its own output returns the output unchanged.
///
/// # Example
///
/// ```
/// use flowforge_core::{row, split_asterisk_values};
///
/// let rows = vec![
///     row! { "Node" => "*", "Cost" => 1.0 },
///     row! { "Node" => "B", "Cost" => 5.0 },
/// ];
/// let set = vec!["A".to_string(), "B".to_string()];
/// let out = split_asterisk_values(&rows, "Node", &set, &["Node"]);
/// assert_eq!(out.len(), 2);
/// assert_eq!(out[1]["Cost"].as_number(), Some(5.0));
/// ```
pub fn split_asterisk_values(
    rows: &[Row],
    column: &str,
    full_set: &[String],
    key: &[&str],
) -> Vec<Row> {
    let key = effective_key(column, key);
    let explicit: HashSet<String> = rows
        .iter()
        .filter(|r| !r.get(column).is_some_and(|c| c.is_marker(ALL)))
        .map(|r| row_key(r, &key))
        .collect();

    let mut out = Vec::with_capacity(rows.len());
    for r in rows {
        if !r.get(column).is_some_and(|c| c.is_marker(ALL)) {
            out.push(r.clone());
            continue;
        }
        for member in full_set {
            let mut expanded = r.clone();
            expanded.insert(column.to_string(), Cell::text(member.clone()));
            if !explicit.contains(&row_key(&expanded, &key)) {
                out.push(expanded);
            }
        }
    }
    out
}

fn cartesian(targets: &[(&str, &[String])]) -> Vec<Vec<String>> {
    targets.iter().fold(vec![Vec::new()], |acc, (_, members)| {
        acc.iter()
            .flat_map(|prefix| {
                members.iter().map(move |m| {
                    let mut next = prefix.clone();
                    next.push(m.clone());
                    next
                })
            })
            .collect()
    })
}

fn fill_defaults(row: &mut Row, defaults: &Row) {
    for (column, value) in defaults {
        let slot = row.entry(column.clone()).or_default();
        if slot.is_empty() {
            *slot = value.clone();
        }
    }
}

/// Left-joins `rows` onto the Cartesian product of `targets`.
///
/// Every product element without a matching row gets a new row built from
/// the element and `defaults`. Existing rows are kept, with only their empty
/// cells filled from `defaults`; exact duplicates collapse. Rows whose key
/// lies outside the product are kept after the product rows.
///
/// Two distinct rows on the same element are a
/// [`ConfigError::ConflictingRows`] for `table`.
pub fn fill_missing_values(
    table: &str,
    rows: &[Row],
    targets: &[(&str, &[String])],
    defaults: &Row,
) -> Result<Vec<Row>> {
    let columns: Vec<&str> = targets.iter().map(|(c, _)| *c).collect();
    let mut by_key: HashMap<Vec<String>, &Row> = HashMap::new();
    for r in rows {
        let k: Vec<String> = columns.iter().map(|c| cell_key(r, c)).collect();
        match by_key.get(&k) {
            Some(existing) if *existing == r => {}
            Some(_) => {
                return Err(ConfigError::ConflictingRows {
                    table: table.to_string(),
                    key: k.join(","),
                })
            }
            None => {
                by_key.insert(k, r);
            }
        }
    }

    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for element in cartesian(targets) {
        match by_key.get(&element) {
            Some(existing) => {
                let mut filled = (*existing).clone();
                fill_defaults(&mut filled, defaults);
                out.push(filled);
            }
            None => {
                let mut fresh = defaults.clone();
                for (column, value) in columns.iter().zip(&element) {
                    fresh.insert(column.to_string(), Cell::text(value.clone()));
                }
                out.push(fresh);
            }
        }
        seen.insert(element);
    }

    for r in rows {
        let k: Vec<String> = columns.iter().map(|c| cell_key(r, c)).collect();
        if seen.insert(k) {
            let mut filled = r.clone();
            fill_defaults(&mut filled, defaults);
            out.push(filled);
        }
    }
    Ok(out)
}

/// Collapses identical rows and rejects rows that share a key but differ.
pub fn dedupe_rows(table: &str, rows: Vec<Row>, key: &[&str]) -> Result<Vec<Row>> {
    let mut by_key: BTreeMap<String, usize> = BTreeMap::new();
    let mut out: Vec<Row> = Vec::with_capacity(rows.len());
    for r in rows {
        let k = row_key(&r, key);
        match by_key.get(&k) {
            Some(&i) if out[i] == r => {}
            Some(_) => {
                return Err(ConfigError::ConflictingRows {
                    table: table.to_string(),
                    key: k,
                })
            }
            None => {
                by_key.insert(k, out.len());
                out.push(r);
            }
        }
    }
    Ok(out)
}

/// Splits run-level tables into one table set per scenario.
///
/// `*` in a Scenario column applies the row to every scenario unless a row
/// naming the scenario explicitly shares its key. Rows without a Scenario
/// value apply everywhere. A Scenario value that names no declared
/// scenario is an error.
pub fn split_by_scenario(
    tables: &InputTables,
    scenarios: &[String],
) -> Result<BTreeMap<String, InputTables>> {
    let mut out: BTreeMap<String, InputTables> = scenarios
        .iter()
        .map(|s| (s.clone(), InputTables::new()))
        .collect();

    for (name, table) in tables.iter() {
        if !table.has_column(SCENARIO_COLUMN) {
            for split in out.values_mut() {
                split.insert(name.clone(), table.clone());
            }
            continue;
        }
        for r in table.rows() {
            let Some(cell) = r.get(SCENARIO_COLUMN) else { continue };
            if cell.is_empty() || cell.is_marker(ALL) {
                continue;
            }
            let value = cell.key();
            if !scenarios.contains(&value) {
                return Err(ConfigError::UnknownMember {
                    table: name.clone(),
                    set: "scenario",
                    value,
                });
            }
        }
        let key = crate::schema::schema(name)
            .map(|s| s.key.to_vec())
            .unwrap_or_default();
        let expanded = split_asterisk_values(table.rows(), SCENARIO_COLUMN, scenarios, &key);
        for (scenario, split) in out.iter_mut() {
            let rows: Table = expanded
                .iter()
                .filter(|r| {
                    r.get(SCENARIO_COLUMN)
                        .map_or(true, |c| c.is_empty() || c.key() == *scenario)
                })
                .cloned()
                .collect();
            split.insert(name.clone(), rows);
        }
    }
    Ok(out)
}

pub(crate) const SCENARIO_COLUMN: &str = "Scenario";

fn expand_table(schema: &TableSchema, rows: &[Row], sets: &NetworkSets) -> Vec<Row> {
    let mut rows = rows.to_vec();
    for (column, kind) in schema.expand {
        let members = sets.members(*kind);
        rows = split_asterisk_values(&rows, column, &members, schema.key);
    }
    rows
}

/// Applies schema-driven `*` expansion to every known table of a scenario.
///
/// Products are additionally filled over `PRODUCTS x MEASURES` with a zero
/// measure value, so every product has a value for every measure.
pub fn expand_wildcards(tables: &InputTables, sets: &NetworkSets) -> Result<InputTables> {
    let mut out = InputTables::new();
    for (name, table) in tables.iter() {
        let expanded = match TABLES.iter().find(|s| s.name == name.as_str()) {
            Some(schema) => expand_table(schema, table.rows(), sets),
            None => table.rows().to_vec(),
        };
        trace!(
            event = "wildcards_expanded",
            table = name.as_str(),
            before = table.len(),
            after = expanded.len()
        );
        out.insert(name.clone(), Table::from_rows(expanded));
    }

    let products: Vec<String> = sets.products.iter().cloned().collect();
    let measures: Vec<String> = sets.measures.iter().cloned().collect();
    let filled = fill_missing_values(
        crate::schema::PRODUCTS.name,
        tables.rows(crate::schema::PRODUCTS.name),
        &[("Product", products.as_slice()), ("Measure", measures.as_slice())],
        &crate::row! { "Value" => 0.0 },
    )?;
    out.insert(crate::schema::PRODUCTS.name, Table::from_rows(filled));
    Ok(out)
}
