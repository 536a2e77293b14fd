use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

/// Selections that can never come from the option lists the shell offers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    #[error("Unknown trait group: {0}")]
    UnknownGroup(String),

    #[error("Trait `{trait_name}` is not offered by the selected groups")]
    TraitNotSelectable { trait_name: String },

    #[error("Value `{value}` does not occur in trait `{trait_name}`")]
    UnknownValue { trait_name: String, value: String },

    #[error("Invalid taxonomy: {0}")]
    Taxonomy(String),
}

impl SearchError {
    pub const fn code(&self) -> &'static str {
        match self {
            SearchError::UnknownSpecies(_) => "unknown_species",
            SearchError::UnknownGroup(_) => "unknown_group",
            SearchError::TraitNotSelectable { .. } => "trait_not_selectable",
            SearchError::UnknownValue { .. } => "unknown_value",
            SearchError::Taxonomy(_) => "invalid_taxonomy",
        }
    }
}
