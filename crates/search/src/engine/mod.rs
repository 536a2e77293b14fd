//! Page behaviors over a loaded table.
//!
//! Every operation is a pure function of the table, the taxonomy and the
//! caller's selections, so one table can serve any number of independent
//! sessions without coordination.

mod compare;
mod find;
mod view;

pub use compare::{CompareOutput, CompareRow};
pub use find::{FindOutput, FindRequest, FindRow, TraitFilter};
pub use view::{GroupSection, SpeciesProfile, TraitValue, ViewOutput};

use crate::error::{Result, SearchError};
use crate::taxonomy::{TraitGroup, TraitTaxonomy};
use crate::tokenizer::tokenize;
use flora_dataset::TraitTable;
use flora_protocol::Advisory;
use std::collections::BTreeSet;

/// Result of a page: either a table to render or an advisory in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome<T> {
    Ready(T),
    Advisory(Advisory),
}

impl<T> QueryOutcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, QueryOutcome::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            QueryOutcome::Ready(value) => Some(value),
            QueryOutcome::Advisory(_) => None,
        }
    }

    pub fn advisory(&self) -> Option<&Advisory> {
        match self {
            QueryOutcome::Ready(_) => None,
            QueryOutcome::Advisory(advisory) => Some(advisory),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryOutcome<U> {
        match self {
            QueryOutcome::Ready(value) => QueryOutcome::Ready(f(value)),
            QueryOutcome::Advisory(advisory) => QueryOutcome::Advisory(advisory),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    table: &'a TraitTable,
    taxonomy: &'a TraitTaxonomy,
}

impl<'a> QueryEngine<'a> {
    pub fn new(table: &'a TraitTable, taxonomy: &'a TraitTaxonomy) -> Self {
        Self { table, taxonomy }
    }

    /// Engine over the built-in taxonomy.
    pub fn with_builtin_taxonomy(table: &'a TraitTable) -> Self {
        Self::new(table, TraitTaxonomy::builtin())
    }

    pub fn table(&self) -> &'a TraitTable {
        self.table
    }

    pub fn taxonomy(&self) -> &'a TraitTaxonomy {
        self.taxonomy
    }

    pub fn species_list(&self) -> &'a [String] {
        self.table.species_list()
    }

    pub fn groups(&self) -> &'a [TraitGroup] {
        self.taxonomy.groups()
    }

    /// Traits of `groups` that exist as table columns, group by group.
    pub fn filterable_traits(&self, groups: &[String]) -> Result<Vec<String>> {
        let mut seen = BTreeSet::new();
        let mut traits = Vec::new();
        for name in groups {
            let group = self
                .taxonomy
                .group(name)
                .ok_or_else(|| SearchError::UnknownGroup(name.clone()))?;
            for trait_name in &group.traits {
                if self.table.has_column(trait_name) && seen.insert(trait_name.as_str()) {
                    traits.push(trait_name.clone());
                }
            }
        }
        Ok(traits)
    }

    /// Sorted union of the tokens found in a trait column.
    pub fn available_values(&self, trait_name: &str) -> Result<Vec<String>> {
        Ok(self.value_set(trait_name)?.into_iter().collect())
    }

    fn value_set(&self, trait_name: &str) -> Result<BTreeSet<String>> {
        if !self.taxonomy.contains_trait(trait_name) || !self.table.has_column(trait_name) {
            return Err(SearchError::TraitNotSelectable {
                trait_name: trait_name.to_string(),
            });
        }
        Ok(self
            .table
            .column_values(trait_name)
            .flat_map(|value| tokenize(Some(value)))
            .collect())
    }

    fn require_species(&self, selected: &[String]) -> Result<Vec<&'a str>> {
        let mut seen = BTreeSet::new();
        let mut species = Vec::with_capacity(selected.len());
        for name in selected {
            let Ok(position) = self.table.species_list().binary_search(name) else {
                return Err(SearchError::UnknownSpecies(name.clone()));
            };
            let canonical = self.table.species_list()[position].as_str();
            if seen.insert(canonical) {
                species.push(canonical);
            }
        }
        Ok(species)
    }
}
