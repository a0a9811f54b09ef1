//! Classification: route annotated Discovered rows to per-category report tabs.
//!
//! Each platform supplies a registry of [`Category`] entries. A category owns
//! its destination tab, that tab's column layout and a pure mapping from a
//! Discovered record to one output row.

pub mod derive;
pub mod instagram;
pub mod youtube;

use log::{info, warn};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::report::RunReport;
use crate::sheets::{replace_tables_staged, SheetGateway};
use crate::table::{Record, Table};

/// Accepted spellings of the annotation column header.
pub const ASSIGNMENT_COLUMNS: &[&str] = &["assignment type", "assigned type"];

/// Build one output row from a record and its 0-based position in the destination.
pub type MapFn = fn(&Record, usize) -> Vec<String>;

pub type AcceptFn = fn(&Record) -> bool;

#[derive(Clone, Copy)]
pub struct Category {
    pub token: &'static str,
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub map: MapFn,
    pub accepts: AcceptFn,
}

impl std::fmt::Debug for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Category")
            .field("token", &self.token)
            .field("table", &self.table)
            .finish()
    }
}

pub fn accept_all(_: &Record) -> bool {
    true
}

pub fn normalize_token(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Position in `registry` of the category whose token matches `raw`.
pub fn resolve(registry: &[Category], raw: &str) -> Option<usize> {
    let token = normalize_token(raw);
    registry.iter().position(|c| c.token == token)
}

/// Outcome of partitioning records over a registry.
#[derive(Debug, Default)]
pub struct Classified {
    /// Destination tab and its rows, in registry order. Empty categories are absent.
    pub outputs: Vec<(String, Table)>,
    /// Unrecognised tokens (normalized) and how many rows carried each.
    pub unmapped: BTreeMap<String, usize>,
    /// Rows whose category refused them.
    pub ineligible: usize,
}

impl Classified {
    pub fn unmapped_rows(&self) -> usize {
        self.unmapped.values().sum()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.outputs.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }
}

pub fn classify(records: &[Record], assignment_col: &str, registry: &[Category]) -> Classified {
    let mut buckets: Vec<Vec<&Record>> = vec![Vec::new(); registry.len()];
    let mut classified = Classified::default();

    for record in records {
        let token = normalize_token(record.get(assignment_col));
        if token.is_empty() {
            continue;
        }
        match resolve(registry, &token) {
            Some(i) if (registry[i].accepts)(record) => buckets[i].push(record),
            Some(_) => classified.ineligible += 1,
            None => *classified.unmapped.entry(token).or_insert(0) += 1,
        }
    }

    for (category, rows) in registry.iter().zip(buckets) {
        if rows.is_empty() {
            continue;
        }
        let mut table = Table::with_columns(category.columns);
        for (idx, record) in rows.into_iter().enumerate() {
            table.push_row((category.map)(record, idx));
        }
        classified.outputs.push((category.table.to_string(), table));
    }
    classified
}

/// Write every non-empty destination and describe the outcome in `report`.
pub fn write_outputs(
    sheets: &dyn SheetGateway,
    classified: &Classified,
    report: &mut RunReport,
) -> Result<()> {
    if classified.unmapped_rows() > 0 {
        let tokens: Vec<&str> = classified.unmapped.keys().map(String::as_str).collect();
        warn!("Unrecognised categories: {:?}", classified.unmapped);
        report.warn(format!(
            "{} rows skipped with unrecognised category: {}",
            classified.unmapped_rows(),
            tokens.join(", ")
        ));
    }
    if classified.ineligible > 0 {
        report.warn(format!(
            "{} rows skipped as not eligible for their category",
            classified.ineligible
        ));
    }
    if classified.outputs.is_empty() {
        report.info("No annotated rows to write");
        return Ok(());
    }

    replace_tables_staged(sheets, &classified.outputs)?;
    for (name, table) in &classified.outputs {
        info!("{} rows written to '{}'", table.len(), name);
        report.success(format!("{} rows written to {}", table.len(), name));
    }
    Ok(())
}
