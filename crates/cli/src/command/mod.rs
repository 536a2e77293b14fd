pub mod domain;
mod services;

pub use domain::{
    classify_error, CommandAction, CommandOutcome, CommandRequest, CommandResponse, CommandStatus,
    FindPayload, GroupEntry, GroupsOutput, GroupsPayload, PageData, ResponseMeta,
    SpeciesListOutput, SpeciesSelectionPayload, ValuesOutput, ValuesPayload,
};
pub use services::run_action;

use anyhow::Result;
use flora_dataset::DatasetHandle;
use std::time::Instant;

/// Run one Command API request against the shared table.
///
/// Never fails: errors become an `error` response.
pub fn execute(request: CommandRequest, dataset: &DatasetHandle) -> CommandResponse {
    let started = Instant::now();
    let action = request.action;
    let outcome = run_action(action, request.payload, dataset);
    respond(action, &outcome, started)
}

/// Wrap an already computed outcome in the Command API envelope.
pub fn respond(
    action: CommandAction,
    outcome: &Result<CommandOutcome>,
    started: Instant,
) -> CommandResponse {
    let meta = ResponseMeta {
        action: Some(action.as_str().to_string()),
        duration_ms: Some(started.elapsed().as_millis() as u64),
        ..Default::default()
    };

    let response = match outcome {
        Ok(outcome) => CommandResponse::from_outcome(outcome, meta.clone()),
        Err(err) => {
            log::warn!("{} failed: {err:#}", action.as_str());
            return CommandResponse::error(classify_error(err), meta);
        }
    };
    response.unwrap_or_else(|err| CommandResponse::error(classify_error(&err), meta))
}
