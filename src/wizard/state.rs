use super::{LaunchFailure, LaunchPhase, LaunchResult, Step, WizardAction, WizardSelection};
use crate::fixtures::Dataset;
use serde::{Deserialize, Serialize};

pub const WIZARD_SCHEMA_VERSION: u32 = 1;

/// Rejected wizard actions. The state is left untouched on every variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("{action} is not available on {step}")]
    WrongStep { action: &'static str, step: Step },

    #[error("choose an analysis type before continuing")]
    MissingAnalysisType,

    #[error("select at least one competitor before continuing")]
    NoCompetitorsSelected,

    #[error("unknown competitor {0:?}")]
    UnknownCompetitor(String),

    #[error("already on the first step")]
    AtFirstStep,

    #[error("already on the last step; launch instead")]
    AtLastStep,

    #[error("a launch is in progress ({request_id})")]
    LaunchInProgress { request_id: String },

    #[error("no launch is in progress")]
    NotLaunching,
}

/// What an accepted action did, for user feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Updated,
    Moved { from: Step, to: Step },
    LaunchStarted,
    LaunchFailed,
    Reset,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct WizardState {
    pub schema_version: u32,
    pub step: Step,
    #[serde(default)]
    pub selection: WizardSelection,
    #[serde(default)]
    pub phase: LaunchPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<LaunchFailure>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            schema_version: WIZARD_SCHEMA_VERSION,
            step: Step::TypeSelect,
            selection: WizardSelection::default(),
            phase: LaunchPhase::Idle,
            last_failure: None,
        }
    }
}

impl WizardState {
    /// Apply one action. On error nothing changes.
    pub fn apply(&mut self, action: WizardAction, dataset: &Dataset) -> Result<Outcome, WizardError> {
        if let Some(request_id) = self.pending_request_id().map(str::to_string) {
            return match action {
                WizardAction::LaunchSettled(result) => Ok(self.settle(result)),
                _ => Err(WizardError::LaunchInProgress { request_id }),
            };
        }

        let name = action.name();
        match action {
            WizardAction::SelectType(kind) => {
                self.require_step(Step::TypeSelect, name)?;
                self.selection.analysis_type = Some(kind);
                Ok(Outcome::Updated)
            }
            WizardAction::ToggleCompetitor(id) => {
                self.require_step(Step::CompetitorSelect, name)?;
                if !dataset.is_known_competitor(&id) {
                    return Err(WizardError::UnknownCompetitor(id));
                }
                if !self.selection.competitor_ids.remove(&id) {
                    self.selection.competitor_ids.insert(id);
                }
                Ok(Outcome::Updated)
            }
            WizardAction::SelectAllCompetitors => {
                self.require_step(Step::CompetitorSelect, name)?;
                self.selection.competitor_ids = dataset.competitor_ids();
                Ok(Outcome::Updated)
            }
            WizardAction::ClearCompetitors => {
                self.require_step(Step::CompetitorSelect, name)?;
                self.selection.competitor_ids.clear();
                Ok(Outcome::Updated)
            }
            WizardAction::ToggleSource(source) => {
                self.require_step(Step::SourceConfig, name)?;
                let enabled = self.selection.is_source_enabled(source);
                self.selection.enabled_sources.insert(source, !enabled);
                Ok(Outcome::Updated)
            }
            WizardAction::Continue => {
                self.check_continue()?;
                let from = self.step;
                let to = from.next().ok_or(WizardError::AtLastStep)?;
                self.step = to;
                Ok(Outcome::Moved { from, to })
            }
            WizardAction::Back => {
                let from = self.step;
                let to = from.prev().ok_or(WizardError::AtFirstStep)?;
                self.step = to;
                Ok(Outcome::Moved { from, to })
            }
            WizardAction::Launch { request_id } => {
                self.require_step(Step::ReviewLaunch, name)?;
                self.last_failure = None;
                self.phase = LaunchPhase::Launching { request_id };
                Ok(Outcome::LaunchStarted)
            }
            WizardAction::LaunchSettled(_) => Err(WizardError::NotLaunching),
            WizardAction::Cancel => {
                *self = WizardState::default();
                Ok(Outcome::Reset)
            }
        }
    }

    /// Whether "continue" is enabled on the current step.
    pub fn can_continue(&self) -> bool {
        !self.is_launching() && self.step.next().is_some() && self.check_continue().is_ok()
    }

    /// Whether a launch may start from this state.
    pub fn check_launch(&self) -> Result<(), WizardError> {
        if let Some(request_id) = self.pending_request_id() {
            return Err(WizardError::LaunchInProgress {
                request_id: request_id.to_string(),
            });
        }
        self.require_step(Step::ReviewLaunch, "launch")
    }

    pub fn can_go_back(&self) -> bool {
        !self.is_launching() && self.step.prev().is_some()
    }

    pub fn is_launching(&self) -> bool {
        matches!(self.phase, LaunchPhase::Launching { .. })
    }

    pub fn pending_request_id(&self) -> Option<&str> {
        match &self.phase {
            LaunchPhase::Launching { request_id } => Some(request_id),
            LaunchPhase::Idle => None,
        }
    }

    /// Check a loaded state against the known competitors.
    pub fn validate_against(&self, dataset: &Dataset) -> Result<(), WizardError> {
        match self
            .selection
            .competitor_ids
            .iter()
            .find(|id| !dataset.is_known_competitor(id))
        {
            Some(unknown) => Err(WizardError::UnknownCompetitor(unknown.clone())),
            None => Ok(()),
        }
    }

    fn settle(&mut self, result: LaunchResult) -> Outcome {
        match result {
            LaunchResult::Accepted => {
                *self = WizardState::default();
                Outcome::Reset
            }
            LaunchResult::Failed(failure) => {
                self.phase = LaunchPhase::Idle;
                self.last_failure = Some(failure);
                Outcome::LaunchFailed
            }
        }
    }

    fn check_continue(&self) -> Result<(), WizardError> {
        match self.step {
            Step::TypeSelect if self.selection.analysis_type.is_none() => {
                Err(WizardError::MissingAnalysisType)
            }
            Step::CompetitorSelect if self.selection.competitor_ids.is_empty() => {
                Err(WizardError::NoCompetitorsSelected)
            }
            _ => Ok(()),
        }
    }

    fn require_step(&self, step: Step, action: &'static str) -> Result<(), WizardError> {
        if self.step == step {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                action,
                step: self.step,
            })
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
