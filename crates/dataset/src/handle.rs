use crate::error::Result;
use crate::loader::{load_table, LoadOptions};
use crate::table::TraitTable;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Load-once handle to the trait table.
///
/// The first successful [`DatasetHandle::get`] reads the file; later calls hand
/// out the same `Arc`. A failed load is not cached, so the next call retries.
#[derive(Debug)]
pub struct DatasetHandle {
    options: LoadOptions,
    table: OnceCell<Arc<TraitTable>>,
}

impl DatasetHandle {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            table: OnceCell::new(),
        }
    }

    /// Handle over a table that is already in memory.
    pub fn from_table(table: TraitTable) -> Self {
        Self {
            options: LoadOptions::default(),
            table: OnceCell::with_value(Arc::new(table)),
        }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }

    pub fn get(&self) -> Result<Arc<TraitTable>> {
        if let Some(table) = self.table.get() {
            log::debug!("Trait table cache hit ({} rows)", table.len());
            return Ok(Arc::clone(table));
        }
        self.table
            .get_or_try_init(|| load_table(&self.options).map(Arc::new))
            .map(Arc::clone)
    }
}
