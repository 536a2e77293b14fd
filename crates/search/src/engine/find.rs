use super::{QueryEngine, QueryOutcome};
use crate::error::{Result, SearchError};
use crate::tokenizer::{tokenize, tokenize_all};
use flora_protocol::Advisory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Values chosen for one trait. Any shared token is a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitFilter {
    #[serde(rename = "trait")]
    pub trait_name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

impl TraitFilter {
    pub fn new(
        trait_name: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            trait_name: trait_name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Group selection followed by per-trait value selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindRequest {
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub filters: Vec<TraitFilter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindRow {
    pub species: Option<String>,
    pub values: Vec<Option<String>>,
}

/// Matching rows projected onto the species key and the filtered traits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindOutput {
    pub species_column: String,
    pub columns: Vec<String>,
    pub rows: Vec<FindRow>,
}

struct ActiveFilter<'r> {
    trait_name: &'r str,
    tokens: BTreeSet<String>,
}

impl QueryEngine<'_> {
    /// Rows matching every active trait filter, in table order.
    ///
    /// A trait's filter is active once it has at least one value. Missing
    /// cells never match.
    pub fn find_by_traits(&self, request: &FindRequest) -> Result<QueryOutcome<FindOutput>> {
        let selectable = self.filterable_traits(&request.groups)?;

        let mut active: Vec<ActiveFilter<'_>> = Vec::new();
        for filter in &request.filters {
            if !selectable.iter().any(|name| name == &filter.trait_name) {
                return Err(SearchError::TraitNotSelectable {
                    trait_name: filter.trait_name.clone(),
                });
            }
            if filter.values.is_empty() {
                continue;
            }

            let available = self.value_set(&filter.trait_name)?;
            for value in &filter.values {
                let tokens = tokenize(Some(value.as_str()));
                if tokens.is_empty() || !tokens.is_subset(&available) {
                    return Err(SearchError::UnknownValue {
                        trait_name: filter.trait_name.clone(),
                        value: value.clone(),
                    });
                }
            }

            let tokens = tokenize_all(filter.values.iter().map(String::as_str));
            match active
                .iter_mut()
                .find(|existing| existing.trait_name == filter.trait_name)
            {
                Some(existing) => existing.tokens.extend(tokens),
                None => active.push(ActiveFilter {
                    trait_name: &filter.trait_name,
                    tokens,
                }),
            }
        }

        if active.is_empty() {
            return Ok(QueryOutcome::Advisory(Advisory::no_filter_selected()));
        }

        let rows: Vec<FindRow> = self
            .table
            .rows()
            .filter(|row| {
                active.iter().all(|filter| {
                    !tokenize(row.value(filter.trait_name)).is_disjoint(&filter.tokens)
                })
            })
            .map(|row| FindRow {
                species: row.species().map(str::to_string),
                values: active
                    .iter()
                    .map(|filter| row.value(filter.trait_name).map(str::to_string))
                    .collect(),
            })
            .collect();

        log::debug!(
            "find: {} active filters matched {} of {} rows",
            active.len(),
            rows.len(),
            self.table.len()
        );

        if rows.is_empty() {
            return Ok(QueryOutcome::Advisory(Advisory::no_matches()));
        }

        Ok(QueryOutcome::Ready(FindOutput {
            species_column: self.table.species_column().to_string(),
            columns: active
                .iter()
                .map(|filter| filter.trait_name.to_string())
                .collect(),
            rows,
        }))
    }
}
