//! Four-step analysis launch wizard.
//!
//! The wizard is a plain serializable state object. Every change goes through
//! [`WizardState::apply`] with one [`WizardAction`], so the flow can be driven
//! and tested without any rendering. Steps are ordered:
//!
//! ```text
//! 1 type_select -> 2 competitor_select -> 3 source_config -> 4 review_launch
//! ```
//!
//! Continue advances one step when the current step's precondition holds,
//! back returns one step, and launch on step 4 hands the selection to the
//! dispatch client. Settling an accepted launch resets to a fresh step 1.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

mod state;

pub use state::{Outcome, WizardState, WIZARD_SCHEMA_VERSION};

/// Ordered wizard steps.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    TypeSelect,
    CompetitorSelect,
    SourceConfig,
    ReviewLaunch,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::TypeSelect,
        Step::CompetitorSelect,
        Step::SourceConfig,
        Step::ReviewLaunch,
    ];

    /// One-based position shown to the user.
    pub fn number(&self) -> u8 {
        match self {
            Step::TypeSelect => 1,
            Step::CompetitorSelect => 2,
            Step::SourceConfig => 3,
            Step::ReviewLaunch => 4,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::TypeSelect => "Choose analysis type",
            Step::CompetitorSelect => "Select competitors",
            Step::SourceConfig => "Configure sources",
            Step::ReviewLaunch => "Review and launch",
        }
    }

    pub fn next(&self) -> Option<Step> {
        match self {
            Step::TypeSelect => Some(Step::CompetitorSelect),
            Step::CompetitorSelect => Some(Step::SourceConfig),
            Step::SourceConfig => Some(Step::ReviewLaunch),
            Step::ReviewLaunch => None,
        }
    }

    pub fn prev(&self) -> Option<Step> {
        match self {
            Step::TypeSelect => None,
            Step::CompetitorSelect => Some(Step::TypeSelect),
            Step::SourceConfig => Some(Step::CompetitorSelect),
            Step::ReviewLaunch => Some(Step::SourceConfig),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.title())
    }
}

/// Depth of analysis requested from the workflow.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    Quick,
    Standard,
    Deep,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 3] =
        [AnalysisType::Quick, AnalysisType::Standard, AnalysisType::Deep];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Quick => "quick",
            AnalysisType::Standard => "standard",
            AnalysisType::Deep => "deep",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisType::Quick => "Quick scan",
            AnalysisType::Standard => "Standard analysis",
            AnalysisType::Deep => "Deep dive",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AnalysisType::Quick => "Headline changes and recent news only",
            AnalysisType::Standard => "Positioning, pricing, and product updates",
            AnalysisType::Deep => "Full strategic review including hiring and patents",
        }
    }

    /// Display-only estimate; the workflow decides the real duration.
    pub fn estimated_minutes(&self) -> u32 {
        match self {
            AnalysisType::Quick => 5,
            AnalysisType::Standard => 15,
            AnalysisType::Deep => 45,
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AnalysisType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        AnalysisType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw.trim())
            .ok_or_else(|| format!("unknown analysis type {raw:?} (expected quick, standard, or deep)"))
    }
}

/// Intelligence sources the workflow can collect from, in catalog order.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Website,
    News,
    SocialMedia,
    Reviews,
    JobPostings,
    Patents,
}

impl Source {
    pub const ALL: [Source; 6] = [
        Source::Website,
        Source::News,
        Source::SocialMedia,
        Source::Reviews,
        Source::JobPostings,
        Source::Patents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Website => "website",
            Source::News => "news",
            Source::SocialMedia => "social_media",
            Source::Reviews => "reviews",
            Source::JobPostings => "job_postings",
            Source::Patents => "patents",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Source::Website => "Company websites",
            Source::News => "News coverage",
            Source::SocialMedia => "Social media",
            Source::Reviews => "Customer reviews",
            Source::JobPostings => "Job postings",
            Source::Patents => "Patent filings",
        }
    }

    pub fn enabled_by_default(&self) -> bool {
        !matches!(self, Source::JobPostings | Source::Patents)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().replace('-', "_");
        Source::ALL
            .into_iter()
            .find(|source| source.as_str() == wanted)
            .ok_or_else(|| {
                let names = Source::ALL.map(|source| source.as_str()).join(", ");
                format!("unknown source {raw:?} (expected one of: {names})")
            })
    }
}

fn default_sources() -> BTreeMap<Source, bool> {
    Source::ALL
        .into_iter()
        .map(|source| (source, source.enabled_by_default()))
        .collect()
}

/// Choices accumulated across the wizard steps.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct WizardSelection {
    #[serde(default)]
    pub analysis_type: Option<AnalysisType>,
    #[serde(default)]
    pub competitor_ids: BTreeSet<String>,
    #[serde(default = "default_sources")]
    pub enabled_sources: BTreeMap<Source, bool>,
}

impl Default for WizardSelection {
    fn default() -> Self {
        Self {
            analysis_type: None,
            competitor_ids: BTreeSet::new(),
            enabled_sources: default_sources(),
        }
    }
}

impl WizardSelection {
    pub fn is_source_enabled(&self, source: Source) -> bool {
        self.enabled_sources.get(&source).copied().unwrap_or(false)
    }

    /// Enabled sources in catalog order.
    pub fn enabled_sources(&self) -> Vec<Source> {
        Source::ALL
            .into_iter()
            .filter(|source| self.is_source_enabled(*source))
            .collect()
    }
}

/// Record of the most recent launch that did not go through.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LaunchFailure {
    pub request_id: String,
    pub message: String,
    pub at_epoch_ms: u128,
}

/// Whether a dispatch is currently outstanding.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LaunchPhase {
    #[default]
    Idle,
    Launching { request_id: String },
}

/// How an outstanding dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchResult {
    Accepted,
    Failed(LaunchFailure),
}

/// Every way the wizard state can change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardAction {
    SelectType(AnalysisType),
    ToggleCompetitor(String),
    SelectAllCompetitors,
    ClearCompetitors,
    ToggleSource(Source),
    Continue,
    Back,
    Launch { request_id: String },
    LaunchSettled(LaunchResult),
    Cancel,
}

impl WizardAction {
    pub fn name(&self) -> &'static str {
        match self {
            WizardAction::SelectType(_) => "select type",
            WizardAction::ToggleCompetitor(_) => "toggle competitor",
            WizardAction::SelectAllCompetitors => "select all competitors",
            WizardAction::ClearCompetitors => "clear competitors",
            WizardAction::ToggleSource(_) => "toggle source",
            WizardAction::Continue => "continue",
            WizardAction::Back => "back",
            WizardAction::Launch { .. } => "launch",
            WizardAction::LaunchSettled(_) => "settle launch",
            WizardAction::Cancel => "cancel",
        }
    }
}
