use super::{QueryEngine, QueryOutcome};
use crate::error::{Result, SearchError};
use flora_protocol::Advisory;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitValue {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub value: String,
}

/// Populated traits of one group for one species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSection {
    pub group: String,
    pub traits: Vec<TraitValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    pub species: String,
    pub groups: Vec<GroupSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOutput {
    pub species: Vec<SpeciesProfile>,
}

impl QueryEngine<'_> {
    /// Grouped trait values per selected species, in selection order.
    ///
    /// Only the first row of a species is shown. Groups with nothing recorded
    /// for the species are left out.
    pub fn view_traits(&self, selected: &[String]) -> Result<QueryOutcome<ViewOutput>> {
        if selected.is_empty() {
            return Ok(QueryOutcome::Advisory(Advisory::no_species_selected()));
        }

        let mut profiles = Vec::new();
        for species in self.require_species(selected)? {
            let row = self
                .table
                .first_row_for_species(species)
                .ok_or_else(|| SearchError::UnknownSpecies(species.to_string()))?;

            let groups = self
                .taxonomy
                .groups()
                .iter()
                .filter_map(|group| {
                    let traits: Vec<TraitValue> = group
                        .traits
                        .iter()
                        .filter_map(|trait_name| {
                            row.value(trait_name).map(|value| TraitValue {
                                trait_name: trait_name.clone(),
                                value: value.to_string(),
                            })
                        })
                        .collect();
                    (!traits.is_empty()).then(|| GroupSection {
                        group: group.name.clone(),
                        traits,
                    })
                })
                .collect::<Vec<_>>();

            log::debug!("view {species}: {} populated groups", groups.len());
            profiles.push(SpeciesProfile {
                species: species.to_string(),
                groups,
            });
        }

        Ok(QueryOutcome::Ready(ViewOutput { species: profiles }))
    }
}
