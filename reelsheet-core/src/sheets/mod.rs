//! Spreadsheet access.
//!
//! Every pipeline talks to the spreadsheet through [`SheetGateway`], which
//! treats each tab as a [`Table`]. `google` holds the Sheets REST backend;
//! [`MemoryWorkbook`] and [`DryRunSheets`] keep everything in process.

pub mod google;

use log::{info, warn};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::table::Table;

pub use google::{GoogleSheets, ServiceAccountKey};

/// Suffix of the temporary tab a destination is written to before it is swapped in.
pub const STAGING_SUFFIX: &str = " (staging)";

pub trait SheetGateway {
    /// Header row plus data rows of a tab.
    fn read_table(&self, tab: &str) -> Result<Table>;

    /// Drop the tab if it exists, recreate it and write `table` into it.
    fn replace_table(&self, tab: &str, table: &Table) -> Result<()>;

    /// Remove a tab. Removing a missing tab is not an error.
    fn delete_table(&self, tab: &str) -> Result<()>;

    fn rename_table(&self, from: &str, to: &str) -> Result<()>;

    fn table_names(&self) -> Result<Vec<String>>;

    /// Replace each of `tabs` with its staging tab.
    fn swap_staged(&self, tabs: &[String]) -> Result<()> {
        for tab in tabs {
            self.delete_table(tab)?;
            self.rename_table(&staging_name(tab), tab)?;
        }
        Ok(())
    }
}

pub fn staging_name(tab: &str) -> String {
    format!("{}{}", tab, STAGING_SUFFIX)
}

/// Replace several tabs so that no destination is left half-written.
///
/// All tables are first written to staging tabs. If any staging write fails,
/// the staging tabs are removed and no destination is touched. Only then is each
/// destination dropped and its staging tab renamed into place, in one
/// [`SheetGateway::swap_staged`] call.
pub fn replace_tables_staged(sheets: &dyn SheetGateway, outputs: &[(String, Table)]) -> Result<()> {
    let mut staged: Vec<String> = Vec::with_capacity(outputs.len());

    for (tab, table) in outputs {
        let staging = staging_name(tab);
        if let Err(e) = sheets.replace_table(&staging, table) {
            staged.push(staging);
            for s in &staged {
                if let Err(cleanup) = sheets.delete_table(s) {
                    warn!("Failed to remove staging tab '{}': {}", s, cleanup);
                }
            }
            return Err(e);
        }
        staged.push(staging);
    }

    let tabs: Vec<String> = outputs.iter().map(|(tab, _)| tab.clone()).collect();
    sheets.swap_staged(&tabs)?;
    for tab in &tabs {
        info!("Swapped staging tab into '{}'", tab);
    }
    Ok(())
}

/// A spreadsheet held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryWorkbook {
    tabs: RefCell<BTreeMap<String, Table>>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, tab: &str, table: Table) -> Self {
        self.tabs.borrow_mut().insert(tab.to_string(), table);
        self
    }

    pub fn table(&self, tab: &str) -> Option<Table> {
        self.tabs.borrow().get(tab).cloned()
    }

    pub fn contains(&self, tab: &str) -> bool {
        self.tabs.borrow().contains_key(tab)
    }

    /// Owned copy of every tab, in name order.
    pub fn snapshot(&self) -> BTreeMap<String, Table> {
        self.tabs.borrow().clone()
    }
}

impl SheetGateway for MemoryWorkbook {
    fn read_table(&self, tab: &str) -> Result<Table> {
        self.table(tab)
            .ok_or_else(|| Error::Sheet(format!("tab '{}' not found", tab)))
    }

    fn replace_table(&self, tab: &str, table: &Table) -> Result<()> {
        self.tabs.borrow_mut().insert(tab.to_string(), table.clone());
        Ok(())
    }

    fn delete_table(&self, tab: &str) -> Result<()> {
        self.tabs.borrow_mut().remove(tab);
        Ok(())
    }

    fn rename_table(&self, from: &str, to: &str) -> Result<()> {
        let mut tabs = self.tabs.borrow_mut();
        if tabs.contains_key(to) {
            return Err(Error::Sheet(format!("tab '{}' already exists", to)));
        }
        let table = tabs
            .remove(from)
            .ok_or_else(|| Error::Sheet(format!("tab '{}' not found", from)))?;
        tabs.insert(to.to_string(), table);
        Ok(())
    }

    fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.tabs.borrow().keys().cloned().collect())
    }
}

/// Reads through to a real spreadsheet, keeps every write in memory.
pub struct DryRunSheets<'a> {
    inner: &'a dyn SheetGateway,
    overlay: MemoryWorkbook,
    deleted: RefCell<BTreeSet<String>>,
}

impl<'a> DryRunSheets<'a> {
    pub fn new(inner: &'a dyn SheetGateway) -> Self {
        Self {
            inner,
            overlay: MemoryWorkbook::new(),
            deleted: RefCell::new(BTreeSet::new()),
        }
    }

    /// Tabs that would have been written, with their final contents.
    pub fn pending_writes(&self) -> BTreeMap<String, Table> {
        self.overlay.snapshot()
    }
}

impl SheetGateway for DryRunSheets<'_> {
    fn read_table(&self, tab: &str) -> Result<Table> {
        if let Some(table) = self.overlay.table(tab) {
            return Ok(table);
        }
        if self.deleted.borrow().contains(tab) {
            return Err(Error::Sheet(format!("tab '{}' not found", tab)));
        }
        self.inner.read_table(tab)
    }

    fn replace_table(&self, tab: &str, table: &Table) -> Result<()> {
        self.deleted.borrow_mut().remove(tab);
        self.overlay.replace_table(tab, table)
    }

    fn delete_table(&self, tab: &str) -> Result<()> {
        self.overlay.delete_table(tab)?;
        self.deleted.borrow_mut().insert(tab.to_string());
        Ok(())
    }

    fn rename_table(&self, from: &str, to: &str) -> Result<()> {
        let table = self.read_table(from)?;
        self.replace_table(to, &table)?;
        self.delete_table(from)
    }

    fn table_names(&self) -> Result<Vec<String>> {
        let deleted = self.deleted.borrow();
        let mut names: BTreeSet<String> = self
            .inner
            .table_names()?
            .into_iter()
            .filter(|n| !deleted.contains(n))
            .collect();
        names.extend(self.overlay.snapshot().into_keys());
        Ok(names.into_iter().collect())
    }
}
