use anyhow::Error;
use flora_dataset::DatasetError;
use flora_protocol::{Advisory, ErrorEnvelope, COMMAND_API_VERSION};
use flora_search::{CompareOutput, FindOutput, FindRequest, SearchError, ViewOutput};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub action: CommandAction,
    #[serde(default = "empty_payload")]
    pub payload: Value,
}

fn empty_payload() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    View,
    Find,
    Compare,
    Species,
    Groups,
    Values,
}

impl CommandAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            CommandAction::View => "view",
            CommandAction::Find => "find",
            CommandAction::Compare => "compare",
            CommandAction::Species => "species",
            CommandAction::Groups => "groups",
            CommandAction::Values => "values",
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeciesSelectionPayload {
    #[serde(default)]
    pub species: Vec<String>,
}

pub type FindPayload = FindRequest;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValuesPayload {
    #[serde(rename = "trait")]
    pub trait_name: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupsPayload {
    /// Restrict the trait list of each group to these groups' members.
    #[serde(default)]
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesListOutput {
    pub species: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupEntry {
    pub name: String,
    /// Member traits that exist as table columns
    pub traits: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupsOutput {
    pub groups: Vec<GroupEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuesOutput {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub values: Vec<String>,
}

/// Typed page payload before it is flattened into JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PageData {
    View(ViewOutput),
    Find(FindOutput),
    Compare(CompareOutput),
    Species(SpeciesListOutput),
    Groups(GroupsOutput),
    Values(ValuesOutput),
}

impl PageData {
    /// Number of table rows the page renders.
    pub fn row_count(&self) -> usize {
        match self {
            PageData::View(out) => out.species.len(),
            PageData::Find(out) => out.rows.len(),
            PageData::Compare(out) => out.rows.len(),
            PageData::Species(out) => out.species.len(),
            PageData::Groups(out) => out.groups.len(),
            PageData::Values(out) => out.values.len(),
        }
    }
}

/// Successful result of a service call: a page or an advisory in its place.
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    Page(PageData),
    Advisory(Advisory),
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResponseMeta {
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl Default for ResponseMeta {
    fn default() -> Self {
        Self {
            version: COMMAND_API_VERSION,
            action: None,
            rows: None,
            duration_ms: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub status: CommandStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<Advisory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub meta: ResponseMeta,
}

impl CommandResponse {
    pub fn is_error(&self) -> bool {
        matches!(self.status, CommandStatus::Error)
    }

    pub fn from_outcome(outcome: &CommandOutcome, mut meta: ResponseMeta) -> anyhow::Result<Self> {
        Ok(match outcome {
            CommandOutcome::Page(page) => {
                meta.rows = Some(page.row_count());
                Self {
                    status: CommandStatus::Ok,
                    advisory: None,
                    error: None,
                    data: serde_json::to_value(page)?,
                    meta,
                }
            }
            CommandOutcome::Advisory(advisory) => Self {
                status: CommandStatus::Ok,
                advisory: Some(advisory.clone()),
                error: None,
                data: Value::Null,
                meta,
            },
        })
    }

    pub fn error(error: ErrorEnvelope, meta: ResponseMeta) -> Self {
        Self {
            status: CommandStatus::Error,
            advisory: None,
            error: Some(error),
            data: Value::Null,
            meta,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::error(
            ErrorEnvelope::new("invalid_request", message).with_hint(
                "Send {\"action\": \"view|find|compare|species|groups|values\", \"payload\": {...}}.",
            ),
            ResponseMeta::default(),
        )
    }
}

/// Map a service failure onto a stable code and a hint.
pub fn classify_error(err: &Error) -> ErrorEnvelope {
    let message = format!("{err:#}");

    if let Some(dataset) = err.downcast_ref::<DatasetError>() {
        return ErrorEnvelope::new(dataset.code(), message).with_hint(
            "Point --data (or FLORA_DATA) at a readable delimited file whose header has the species column.",
        );
    }

    if let Some(search) = err.downcast_ref::<SearchError>() {
        let hint = match search {
            SearchError::UnknownSpecies(_) => "Run `flora species` to list valid names.",
            SearchError::UnknownGroup(_) => "Run `flora groups` to list valid group names.",
            SearchError::TraitNotSelectable { .. } => {
                "Run `flora groups --traits` to see which traits each group offers."
            }
            SearchError::UnknownValue { .. } => {
                "Run `flora values <TRAIT>` to list the values a trait can take."
            }
            SearchError::Taxonomy(_) => "The trait taxonomy failed validation.",
        };
        return ErrorEnvelope::new(search.code(), message).with_hint(hint);
    }

    if err.downcast_ref::<serde_json::Error>().is_some() {
        return ErrorEnvelope::new("invalid_request", message)
            .with_hint("Check the payload fields for this action.");
    }

    ErrorEnvelope::new("internal", message)
}
