//! Embedded sample dataset for the dashboard views and the launch wizard.
//!
//! The dataset stands in for a real backend: it is compiled into the binary,
//! parsed once per process, and never mutated.
use crate::wizard::AnalysisType;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub const DATASET_JSON: &str = include_str!("../fixtures/dataset.json");

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Dataset {
    pub company: CompanyFixture,
    pub industries: Vec<IndustryFixture>,
    pub competitors: Vec<CompetitorFixture>,
    #[serde(default)]
    pub analyses: Vec<AnalysisFixture>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompanyFixture {
    pub id: String,
    pub name: String,
    pub industry_id: String,
    pub website: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IndustryFixture {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompetitorFixture {
    pub id: String,
    pub name: String,
    pub website: String,
    pub threat_level: ThreatLevel,
    /// Percent of the tracked market, 0..=100.
    pub market_share: f64,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
}

impl ThreatLevel {
    pub const ALL: [ThreatLevel; 3] = [ThreatLevel::High, ThreatLevel::Medium, ThreatLevel::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Low => "low",
            ThreatLevel::Medium => "medium",
            ThreatLevel::High => "high",
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisFixture {
    pub id: String,
    pub title: String,
    pub analysis_type: AnalysisType,
    pub competitor_ids: Vec<String>,
    pub status: AnalysisStatus,
    pub created_at: String,
    #[serde(default)]
    pub insights_count: u32,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Completed,
    Running,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Running => "running",
            AnalysisStatus::Failed => "failed",
        }
    }
}

impl Dataset {
    /// Parse and validate the embedded dataset.
    pub fn load() -> Result<Self> {
        Self::from_json(DATASET_JSON)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(raw).context("parse fixture dataset")?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn competitor(&self, id: &str) -> Option<&CompetitorFixture> {
        self.competitors.iter().find(|competitor| competitor.id == id)
    }

    pub fn is_known_competitor(&self, id: &str) -> bool {
        self.competitor(id).is_some()
    }

    pub fn competitor_ids(&self) -> BTreeSet<String> {
        self.competitors
            .iter()
            .map(|competitor| competitor.id.clone())
            .collect()
    }

    pub fn industry(&self, id: &str) -> Option<&IndustryFixture> {
        self.industries.iter().find(|industry| industry.id == id)
    }

    pub fn count_by_threat(&self, level: ThreatLevel) -> usize {
        self.competitors
            .iter()
            .filter(|competitor| competitor.threat_level == level)
            .count()
    }

    pub fn tracked_market_share(&self) -> f64 {
        self.competitors
            .iter()
            .map(|competitor| competitor.market_share)
            .sum()
    }

    fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for competitor in &self.competitors {
            if competitor.id.trim().is_empty() {
                return Err(anyhow!("competitor id must be non-empty"));
            }
            if !seen.insert(competitor.id.as_str()) {
                return Err(anyhow!("duplicate competitor id {:?}", competitor.id));
            }
            if !(0.0..=100.0).contains(&competitor.market_share) {
                return Err(anyhow!(
                    "competitor {} market_share out of range: {}",
                    competitor.id,
                    competitor.market_share
                ));
            }
        }
        let mut industries = BTreeSet::new();
        for industry in &self.industries {
            if !industries.insert(industry.id.as_str()) {
                return Err(anyhow!("duplicate industry id {:?}", industry.id));
            }
        }
        if !industries.contains(self.company.industry_id.as_str()) {
            return Err(anyhow!(
                "company {} references unknown industry {:?}",
                self.company.id,
                self.company.industry_id
            ));
        }
        let mut analyses = BTreeSet::new();
        for analysis in &self.analyses {
            if !analyses.insert(analysis.id.as_str()) {
                return Err(anyhow!("duplicate analysis id {:?}", analysis.id));
            }
            if let Some(unknown) = analysis
                .competitor_ids
                .iter()
                .find(|id| !seen.contains(id.as_str()))
            {
                return Err(anyhow!(
                    "analysis {} references unknown competitor {:?}",
                    analysis.id,
                    unknown
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_dataset_is_valid() {
        let dataset = Dataset::load().expect("load dataset");
        assert_eq!(dataset.company.id, "acme");
        assert_eq!(dataset.competitors.len(), 5);
        assert!(dataset.is_known_competitor("globex"));
        assert!(!dataset.is_known_competitor("nope"));
        assert_eq!(dataset.count_by_threat(ThreatLevel::High), 2);
        assert!(dataset
            .analyses
            .iter()
            .any(|analysis| analysis.status == AnalysisStatus::Failed));
    }

    #[test]
    fn rejects_analysis_with_unknown_competitor() {
        let mut value: serde_json::Value =
            serde_json::from_str(DATASET_JSON).expect("parse dataset");
        value["analyses"][0]["competitor_ids"] = serde_json::json!(["ghost"]);
        let err = Dataset::from_json(&value.to_string()).expect_err("should fail");
        assert!(err.to_string().contains("ghost"), "{err}");
    }

    #[test]
    fn rejects_duplicate_competitor_ids() {
        let mut value: serde_json::Value =
            serde_json::from_str(DATASET_JSON).expect("parse dataset");
        let first = value["competitors"][0].clone();
        value["competitors"]
            .as_array_mut()
            .expect("competitors array")
            .push(first);
        let err = Dataset::from_json(&value.to_string()).expect_err("should fail");
        assert!(err.to_string().contains("duplicate competitor"), "{err}");
    }

    #[test]
    fn rejects_market_share_out_of_range() {
        let mut value: serde_json::Value =
            serde_json::from_str(DATASET_JSON).expect("parse dataset");
        value["competitors"][1]["market_share"] = serde_json::json!(140.0);
        assert!(Dataset::from_json(&value.to_string()).is_err());
    }
}
