use super::{write_atomic, SessionPaths};
use crate::fixtures::Dataset;
use crate::util::now_epoch_ms;
use crate::wizard::{
    LaunchFailure, LaunchResult, WizardAction, WizardState, WIZARD_SCHEMA_VERSION,
};
use anyhow::{Context, Result};
use std::io::ErrorKind;

/// Load the persisted wizard state.
///
/// Missing, unparsable, or schema-mismatched files start a fresh session.
/// Any other read failure is an error.
/// A state naming competitors the dataset does not know is refused.
pub fn load_wizard_state(paths: &SessionPaths, dataset: &Dataset) -> Result<WizardState> {
    let path = paths.wizard_path();
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(WizardState::default()),
        Err(err) => {
            return Err(err).with_context(|| format!("read wizard state {}", path.display()))
        }
    };
    let parsed: WizardState = match serde_json::from_slice(&bytes) {
        Ok(state) => state,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "discarding unreadable wizard state");
            return Ok(WizardState::default());
        }
    };
    if parsed.schema_version != WIZARD_SCHEMA_VERSION {
        tracing::warn!(
            schema_version = parsed.schema_version,
            "discarding wizard state with unsupported schema"
        );
        return Ok(WizardState::default());
    }
    parsed
        .validate_against(dataset)
        .with_context(|| format!("validate {}", path.display()))?;
    recover_interrupted_launch(parsed, dataset)
}

// A persisted `launching` phase means the process died mid-dispatch.
fn recover_interrupted_launch(mut state: WizardState, dataset: &Dataset) -> Result<WizardState> {
    let Some(request_id) = state.pending_request_id().map(str::to_string) else {
        return Ok(state);
    };
    tracing::warn!(request_id = %request_id, "recovering interrupted launch");
    let failure = LaunchFailure {
        request_id,
        message: "launch interrupted before the webhook answered".to_string(),
        at_epoch_ms: now_epoch_ms()?,
    };
    state.apply(
        WizardAction::LaunchSettled(LaunchResult::Failed(failure)),
        dataset,
    )?;
    Ok(state)
}

pub fn write_wizard_state(paths: &SessionPaths, state: &WizardState) -> Result<()> {
    let mut serializable = state.clone();
    serializable.schema_version = WIZARD_SCHEMA_VERSION;
    let text = serde_json::to_string_pretty(&serializable).context("serialize wizard state")?;
    write_atomic(&paths.wizard_path(), text.as_bytes())?;
    tracing::debug!(step = state.step.number(), "wizard state saved");
    Ok(())
}
