//! Append-only launch history.
//!
//! Every dispatch attempt, accepted or not, is appended as one JSON line so
//! the analyses view can show real launches next to the sample cards.
use super::SessionPaths;
use crate::wizard::{AnalysisType, Source};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LaunchOutcome {
    Accepted,
    Failed,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LaunchRecord {
    pub request_id: String,
    pub analysis_type: AnalysisType,
    pub competitor_ids: Vec<String>,
    pub sources: Vec<Source>,
    pub requested_at_epoch_ms: u128,
    pub outcome: LaunchOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    pub attempts: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Append a launch record as JSONL.
pub fn append_launch(paths: &SessionPaths, record: &LaunchRecord) -> Result<()> {
    let path = paths.launches_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create session dir")?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;
    let line = serde_json::to_string(record).context("serialize launch record")?;
    file.write_all(line.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Load launch records, oldest first. Blank lines are skipped.
pub fn load_launches(paths: &SessionPaths) -> Result<Vec<LaunchRecord>> {
    let path = paths.launches_path();
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: LaunchRecord = serde_json::from_str(line)
            .with_context(|| format!("parse {} line {}", path.display(), idx + 1))?;
        records.push(record);
    }
    Ok(records)
}
