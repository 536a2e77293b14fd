use super::domain::{
    CommandAction, CommandOutcome, FindPayload, GroupEntry, GroupsOutput, GroupsPayload, PageData,
    SpeciesListOutput, SpeciesSelectionPayload, ValuesOutput, ValuesPayload,
};
use anyhow::{Context, Result};
use flora_dataset::DatasetHandle;
use flora_search::{QueryEngine, QueryOutcome};
use serde::de::DeserializeOwned;
use serde_json::Value;

fn parse_payload<T: DeserializeOwned>(action: CommandAction, payload: Value) -> Result<T> {
    serde_json::from_value(payload)
        .with_context(|| format!("Invalid payload for `{}`", action.as_str()))
}

fn page<T>(outcome: QueryOutcome<T>, wrap: impl FnOnce(T) -> PageData) -> CommandOutcome {
    match outcome {
        QueryOutcome::Ready(value) => CommandOutcome::Page(wrap(value)),
        QueryOutcome::Advisory(advisory) => CommandOutcome::Advisory(advisory),
    }
}

/// Dispatch one action. The table is loaded on first use and shared afterwards.
pub fn run_action(
    action: CommandAction,
    payload: Value,
    dataset: &DatasetHandle,
) -> Result<CommandOutcome> {
    let table = dataset.get()?;
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    match action {
        CommandAction::View => {
            let payload: SpeciesSelectionPayload = parse_payload(action, payload)?;
            Ok(page(engine.view_traits(&payload.species)?, PageData::View))
        }
        CommandAction::Find => {
            let payload: FindPayload = parse_payload(action, payload)?;
            Ok(page(engine.find_by_traits(&payload)?, PageData::Find))
        }
        CommandAction::Compare => {
            let payload: SpeciesSelectionPayload = parse_payload(action, payload)?;
            Ok(page(engine.compare_species(&payload.species)?, PageData::Compare))
        }
        CommandAction::Species => Ok(CommandOutcome::Page(PageData::Species(
            SpeciesListOutput {
                species: engine.species_list().to_vec(),
            },
        ))),
        CommandAction::Groups => {
            let payload: GroupsPayload = parse_payload(action, payload)?;
            let names: Vec<String> = if payload.groups.is_empty() {
                engine.groups().iter().map(|g| g.name.clone()).collect()
            } else {
                payload.groups
            };
            let mut groups = Vec::with_capacity(names.len());
            for name in names {
                let traits = engine.filterable_traits(std::slice::from_ref(&name))?;
                groups.push(GroupEntry { name, traits });
            }
            Ok(CommandOutcome::Page(PageData::Groups(GroupsOutput { groups })))
        }
        CommandAction::Values => {
            let payload: ValuesPayload = parse_payload(action, payload)?;
            let values = engine.available_values(&payload.trait_name)?;
            Ok(CommandOutcome::Page(PageData::Values(ValuesOutput {
                trait_name: payload.trait_name,
                values,
            })))
        }
    }
}

