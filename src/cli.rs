//! CLI argument parsing for the dashboard views and launch wizard.
//!
//! Each wizard subcommand maps onto exactly one wizard action so the CLI adds
//! no policy of its own.
use crate::wizard::{AnalysisType, Source};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Session directory used when `--session` is not given.
pub const DEFAULT_SESSION_DIR: &str = ".intel";

#[derive(Parser, Debug)]
#[command(
    name = "ilaunch",
    version,
    about = "Competitive-intelligence dashboard and analysis launcher",
    after_help = "Examples:\n  ilaunch init --webhook-url https://n8n.example.com/webhook/analysis\n  ilaunch overview\n  ilaunch wizard type standard\n  ilaunch wizard next\n  ilaunch wizard toggle-competitor globex\n  ilaunch wizard next\n  ilaunch wizard toggle-source patents\n  ilaunch wizard next\n  ilaunch wizard launch --dry-run\n  ilaunch wizard launch",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Init(InitArgs),
    Overview(ViewArgs),
    Competitors(ViewArgs),
    Analyses(ViewArgs),
    Wizard(WizardArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Session directory holding wizard state, config, and launch history
    #[arg(long, value_name = "DIR", default_value = DEFAULT_SESSION_DIR, global = true)]
    pub session: PathBuf,
}

/// Init command inputs for creating a session config.
#[derive(Parser, Debug)]
#[command(about = "Create a session directory with a default config.json")]
pub struct InitArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Webhook URL stored in config.json
    #[arg(long, value_name = "URL")]
    pub webhook_url: Option<String>,

    /// Overwrite an existing config.json
    #[arg(long)]
    pub force: bool,
}

/// Read-only dashboard views.
#[derive(Parser, Debug)]
pub struct ViewArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Drive the four-step analysis launch wizard")]
pub struct WizardArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    #[command(subcommand)]
    pub action: WizardCommand,
}

#[derive(Subcommand, Debug)]
pub enum WizardCommand {
    /// Show the current step and its choices
    Show {
        /// Emit the raw wizard state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Choose the analysis type (step 1)
    Type {
        #[arg(value_name = "TYPE")]
        kind: AnalysisType,
    },
    /// Add or remove a competitor (step 2)
    ToggleCompetitor {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Select every competitor (step 2)
    SelectAll,
    /// Deselect every competitor (step 2)
    Clear,
    /// Enable or disable a source (step 3)
    ToggleSource {
        #[arg(value_name = "SOURCE")]
        source: Source,
    },
    /// Continue to the next step
    Next,
    /// Return to the previous step
    Back,
    /// Discard the current selection and start over
    Cancel,
    /// Dispatch the selection to the workflow webhook (step 4)
    Launch(LaunchArgs),
}

#[derive(Parser, Debug)]
pub struct LaunchArgs {
    /// Webhook URL, overriding INTEL_WEBHOOK_URL and config.json
    #[arg(long, value_name = "URL")]
    pub webhook_url: Option<String>,

    /// Print the payload without dispatching it
    #[arg(long)]
    pub dry_run: bool,
}
