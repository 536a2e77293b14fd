use crate::error::{Result, SearchError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const BUILTIN_TAXONOMY: &str = include_str!("../../../taxonomy/default.json");

static BUILTIN: Lazy<TraitTaxonomy> = Lazy::new(|| {
    TraitTaxonomy::from_json(BUILTIN_TAXONOMY).expect("embedded taxonomy is valid")
});

/// Named cluster of related trait columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraitGroup {
    pub name: String,
    pub traits: Vec<String>,
}

/// Ordered mapping from group name to its trait columns.
///
/// This is the only source of truth for which columns are grouped and
/// filterable; columns it does not list only show up in comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitTaxonomy {
    groups: Vec<TraitGroup>,
    owner: HashMap<String, usize>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTaxonomy {
    #[serde(default)]
    schema_version: Option<u32>,
    groups: Vec<TraitGroup>,
}

impl TraitTaxonomy {
    /// The fourteen groups shipped with the viewer.
    pub fn builtin() -> &'static TraitTaxonomy {
        &BUILTIN
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let raw: RawTaxonomy =
            serde_json::from_str(raw).map_err(|err| SearchError::Taxonomy(err.to_string()))?;
        if let Some(version) = raw.schema_version {
            if version != 1 {
                return Err(SearchError::Taxonomy(format!(
                    "schema_version {version} is not supported (expected 1)"
                )));
            }
        }
        Self::new(raw.groups)
    }

    pub fn new(groups: Vec<TraitGroup>) -> Result<Self> {
        let mut owner = HashMap::new();
        let mut seen_groups = HashMap::new();
        for (position, group) in groups.iter().enumerate() {
            if group.name.trim().is_empty() {
                return Err(SearchError::Taxonomy(format!(
                    "group #{position} has an empty name"
                )));
            }
            if seen_groups.insert(group.name.as_str(), position).is_some() {
                return Err(SearchError::Taxonomy(format!(
                    "group `{}` is listed twice",
                    group.name
                )));
            }
            for trait_name in &group.traits {
                if trait_name.trim().is_empty() {
                    return Err(SearchError::Taxonomy(format!(
                        "group `{}` has an empty trait name",
                        group.name
                    )));
                }
                if let Some(previous) = owner.insert(trait_name.clone(), position) {
                    return Err(SearchError::Taxonomy(format!(
                        "trait `{trait_name}` belongs to both `{}` and `{}`",
                        groups[previous].name, group.name
                    )));
                }
            }
        }
        Ok(Self { groups, owner })
    }

    pub fn groups(&self) -> &[TraitGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&TraitGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.groups.iter().map(|group| group.name.as_str())
    }

    /// Group that lists `trait_name`, if any.
    pub fn group_of(&self, trait_name: &str) -> Option<&TraitGroup> {
        self.owner
            .get(trait_name)
            .map(|position| &self.groups[*position])
    }

    pub fn contains_trait(&self, trait_name: &str) -> bool {
        self.owner.contains_key(trait_name)
    }

    /// Names of the groups listing any of `traits`, first-seen order.
    /// Traits outside the taxonomy are skipped.
    pub fn groups_owning<'t>(&self, traits: impl IntoIterator<Item = &'t str>) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for trait_name in traits {
            if let Some(group) = self.group_of(trait_name) {
                if !names.iter().any(|name| name == &group.name) {
                    names.push(group.name.clone());
                }
            }
        }
        names
    }
}
