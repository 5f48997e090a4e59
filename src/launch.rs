//! Launch controller: wizard state, dispatch, history, and progress.
//!
//! The controller owns the order of effects for one launch:
//!
//! 1. move the wizard into `launching`
//! 2. build the payload and dispatch it
//! 3. append the attempt to the launch history
//! 4. on acceptance, play the progress timeline, then reset the wizard
//! 5. on failure, return the wizard to step 4 with the failure recorded
use crate::dispatch::{request_id_for, DispatchError, DispatchPayload, DispatchReceipt, Dispatcher};
use crate::fixtures::Dataset;
use crate::progress::{ProgressSimulation, ProgressTick};
use crate::session::{append_launch, LaunchOutcome, LaunchRecord, SessionPaths};
use crate::util::now_epoch_ms;
use crate::wizard::{LaunchFailure, LaunchResult, WizardAction, WizardState};
use anyhow::{Context, Result};

pub struct LaunchContext<'a> {
    pub dataset: &'a Dataset,
    pub paths: &'a SessionPaths,
    pub company_id: &'a str,
    pub progress: &'a ProgressSimulation,
}

#[derive(Debug)]
pub enum LaunchReport {
    Accepted {
        payload: DispatchPayload,
        receipt: DispatchReceipt,
    },
    Failed {
        request_id: String,
        error: DispatchError,
    },
}

/// Build the payload the current selection would dispatch, without launching.
pub fn preview_payload(state: &WizardState, company_id: &str) -> Result<DispatchPayload> {
    state.check_launch().context("launch rejected")?;
    let requested_at = now_epoch_ms()?;
    let request_id = request_id_for(&state.selection, requested_at);
    DispatchPayload::from_selection(&state.selection, company_id, &request_id, requested_at)
        .context("build dispatch payload")
}

/// Run one launch against `dispatcher`. The caller persists `state`.
pub fn launch<F>(
    state: &mut WizardState,
    ctx: &LaunchContext<'_>,
    dispatcher: &dyn Dispatcher,
    on_tick: F,
) -> Result<LaunchReport>
where
    F: FnMut(&ProgressTick),
{
    let requested_at = now_epoch_ms()?;
    let request_id = request_id_for(&state.selection, requested_at);
    state.apply(
        WizardAction::Launch {
            request_id: request_id.clone(),
        },
        ctx.dataset,
    )?;

    let result = DispatchPayload::from_selection(
        &state.selection,
        ctx.company_id,
        &request_id,
        requested_at,
    )
    .and_then(|payload| {
        let receipt = dispatcher.dispatch(&payload)?;
        Ok((payload, receipt))
    });

    match result {
        Ok((payload, receipt)) => {
            append_launch(
                ctx.paths,
                &LaunchRecord {
                    request_id: request_id.clone(),
                    analysis_type: payload.analysis_type,
                    competitor_ids: payload.competitor_ids.clone(),
                    sources: payload.sources.clone(),
                    requested_at_epoch_ms: requested_at,
                    outcome: LaunchOutcome::Accepted,
                    http_status: Some(receipt.status),
                    attempts: receipt.attempts,
                    detail: receipt.body.clone(),
                },
            )?;
            ctx.progress.run(on_tick);
            state.apply(WizardAction::LaunchSettled(LaunchResult::Accepted), ctx.dataset)?;
            Ok(LaunchReport::Accepted { payload, receipt })
        }
        Err(error) => {
            tracing::warn!(request_id = %request_id, error = %error, "launch failed");
            if let Some(analysis_type) = state.selection.analysis_type {
                append_launch(
                    ctx.paths,
                    &LaunchRecord {
                        request_id: request_id.clone(),
                        analysis_type,
                        competitor_ids: state.selection.competitor_ids.iter().cloned().collect(),
                        sources: state.selection.enabled_sources(),
                        requested_at_epoch_ms: requested_at,
                        outcome: LaunchOutcome::Failed,
                        http_status: error.http_status(),
                        attempts: error.attempts(),
                        detail: Some(error.to_string()),
                    },
                )?;
            }
            let failure = LaunchFailure {
                request_id: request_id.clone(),
                message: error.to_string(),
                at_epoch_ms: now_epoch_ms()?,
            };
            state.apply(
                WizardAction::LaunchSettled(LaunchResult::Failed(failure)),
                ctx.dataset,
            )?;
            Ok(LaunchReport::Failed { request_id, error })
        }
    }
}
