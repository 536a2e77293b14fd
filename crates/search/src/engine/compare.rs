use super::{QueryEngine, QueryOutcome};
use crate::error::Result;
use flora_protocol::Advisory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareRow {
    pub species: String,
    pub values: Vec<Option<String>>,
}

/// Full rows of the selected species keyed by species name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareOutput {
    pub species_column: String,
    pub columns: Vec<String>,
    pub rows: Vec<CompareRow>,
}

impl QueryEngine<'_> {
    /// Every row of the selected species with every column, in table order.
    ///
    /// Columns outside the taxonomy are included verbatim. Duplicate species
    /// rows are all kept.
    pub fn compare_species(&self, selected: &[String]) -> Result<QueryOutcome<CompareOutput>> {
        if selected.is_empty() {
            return Ok(QueryOutcome::Advisory(Advisory::no_species_selected()));
        }
        let wanted: BTreeSet<&str> = self.require_species(selected)?.into_iter().collect();

        let species_position = self
            .table
            .column_index(self.table.species_column())
            .unwrap_or_default();

        let rows: Vec<CompareRow> = self
            .table
            .rows()
            .filter_map(|row| {
                let species = row.species().filter(|name| wanted.contains(name))?;
                let values = row
                    .cells()
                    .iter()
                    .enumerate()
                    .filter(|(position, _)| *position != species_position)
                    .map(|(_, cell)| cell.clone())
                    .collect();
                Some(CompareRow {
                    species: species.to_string(),
                    values,
                })
            })
            .collect();

        log::debug!(
            "compare: {} species selected, {} rows",
            wanted.len(),
            rows.len()
        );

        Ok(QueryOutcome::Ready(CompareOutput {
            species_column: self.table.species_column().to_string(),
            columns: self.table.trait_columns().map(str::to_string).collect(),
            rows,
        }))
    }
}
