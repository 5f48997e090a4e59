//! Plain-text views of the dataset, launch history, and wizard.
//!
//! Views only format; every decision (what is selectable, whether continue is
//! enabled) comes from the wizard state.
use crate::fixtures::{AnalysisStatus, CompetitorFixture, Dataset, ThreatLevel};
use crate::session::{LaunchOutcome, LaunchRecord};
use crate::wizard::{AnalysisType, Source, Step, WizardState};
use chrono::{DateTime, Utc};

const RULE_WIDTH: usize = 60;

/// One row in the analyses grid, from either the dataset or the history.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisCard {
    pub id: String,
    pub title: String,
    pub analysis_type: AnalysisType,
    pub competitors: Vec<String>,
    pub status: &'static str,
    pub created: String,
    pub detail: Option<String>,
}

/// Recorded launches first (newest first), then the sample analyses.
pub fn analysis_cards(dataset: &Dataset, launches: &[LaunchRecord]) -> Vec<AnalysisCard> {
    let mut cards: Vec<AnalysisCard> = launches
        .iter()
        .rev()
        .map(|record| AnalysisCard {
            id: record.request_id.clone(),
            title: format!(
                "{} of {} competitor(s)",
                record.analysis_type.label(),
                record.competitor_ids.len()
            ),
            analysis_type: record.analysis_type,
            competitors: competitor_names(dataset, &record.competitor_ids),
            status: match record.outcome {
                LaunchOutcome::Accepted => "dispatched",
                LaunchOutcome::Failed => "failed",
            },
            created: format_epoch_date(record.requested_at_epoch_ms),
            detail: match record.outcome {
                LaunchOutcome::Accepted => None,
                LaunchOutcome::Failed => record.detail.clone(),
            },
        })
        .collect();
    cards.extend(dataset.analyses.iter().map(|analysis| AnalysisCard {
        id: analysis.id.clone(),
        title: analysis.title.clone(),
        analysis_type: analysis.analysis_type,
        competitors: competitor_names(dataset, &analysis.competitor_ids),
        status: analysis.status.as_str(),
        created: analysis.created_at.clone(),
        detail: match analysis.status {
            AnalysisStatus::Failed => analysis.error.clone(),
            AnalysisStatus::Completed => Some(format!("{} insights", analysis.insights_count)),
            AnalysisStatus::Running => None,
        },
    }));
    cards
}

pub fn render_overview(dataset: &Dataset, launches: &[LaunchRecord]) -> String {
    let mut out = String::new();
    let company = &dataset.company;
    push_header(&mut out, &company.name);
    push_line(&mut out, &company.description);
    push_line(&mut out, &format!("Website: {}", company.website));
    if let Some(industry) = dataset.industry(&company.industry_id) {
        push_line(&mut out, &format!("Industry: {}", industry.name));
    }
    out.push('\n');

    push_line(
        &mut out,
        &format!(
            "Competitors tracked: {} ({:.1}% of market)",
            dataset.competitors.len(),
            dataset.tracked_market_share()
        ),
    );
    for level in ThreatLevel::ALL {
        push_line(
            &mut out,
            &format!("  {:<6} threat: {}", level, dataset.count_by_threat(level)),
        );
    }
    out.push('\n');

    push_line(&mut out, "Recent analyses:");
    let cards = analysis_cards(dataset, launches);
    if cards.is_empty() {
        push_line(&mut out, "  None.");
    }
    for card in cards.iter().take(3) {
        push_line(
            &mut out,
            &format!("  [{}] {} ({})", card.status, card.title, card.created),
        );
    }
    out
}

pub fn render_competitors(dataset: &Dataset) -> String {
    let mut out = String::new();
    for competitor in &dataset.competitors {
        render_competitor_card(&mut out, competitor);
    }
    out
}

fn render_competitor_card(out: &mut String, competitor: &CompetitorFixture) {
    push_header(out, &format!("{} [{}]", competitor.name, competitor.id));
    push_line(out, &competitor.website);
    push_line(
        out,
        &format!(
            "Threat: {}  Market share: {:.1}%",
            competitor.threat_level, competitor.market_share
        ),
    );
    push_line(out, &competitor.description);
    out.push('\n');
}

pub fn render_analyses(dataset: &Dataset, launches: &[LaunchRecord]) -> String {
    let mut out = String::new();
    let cards = analysis_cards(dataset, launches);
    if cards.is_empty() {
        push_line(&mut out, "No analyses.");
        return out;
    }
    for card in cards {
        push_header(&mut out, &format!("{} [{}]", card.title, card.id));
        push_line(
            &mut out,
            &format!(
                "Status: {}  Type: {}  Created: {}",
                card.status, card.analysis_type, card.created
            ),
        );
        push_line(&mut out, &format!("Competitors: {}", card.competitors.join(", ")));
        if let Some(detail) = &card.detail {
            let label = if card.status == "failed" {
                "Error"
            } else {
                "Result"
            };
            push_line(&mut out, &format!("{label}: {detail}"));
        }
        out.push('\n');
    }
    out
}

pub fn render_wizard(state: &WizardState, dataset: &Dataset) -> String {
    let mut out = String::new();
    push_header(
        &mut out,
        &format!(
            "Step {} of {}: {}",
            state.step.number(),
            Step::ALL.len(),
            state.step.title()
        ),
    );
    let selection = &state.selection;
    match state.step {
        Step::TypeSelect => {
            for kind in AnalysisType::ALL {
                let mark = checkbox(selection.analysis_type == Some(kind));
                push_line(
                    &mut out,
                    &format!(
                        "{mark} {:<9} {} (~{} min): {}",
                        kind.as_str(),
                        kind.label(),
                        kind.estimated_minutes(),
                        kind.description()
                    ),
                );
            }
        }
        Step::CompetitorSelect => {
            for competitor in &dataset.competitors {
                let mark = checkbox(selection.competitor_ids.contains(&competitor.id));
                push_line(
                    &mut out,
                    &format!(
                        "{mark} {:<10} {} ({} threat)",
                        competitor.id, competitor.name, competitor.threat_level
                    ),
                );
            }
        }
        Step::SourceConfig => {
            for source in Source::ALL {
                let mark = checkbox(selection.is_source_enabled(source));
                push_line(
                    &mut out,
                    &format!("{mark} {:<12} {}", source.as_str(), source.label()),
                );
            }
        }
        Step::ReviewLaunch => {
            let kind = selection
                .analysis_type
                .map(|kind| kind.label())
                .unwrap_or("<none>");
            push_line(&mut out, &format!("Analysis:    {kind}"));
            let ids: Vec<String> = selection.competitor_ids.iter().cloned().collect();
            push_line(
                &mut out,
                &format!("Competitors: {}", competitor_names(dataset, &ids).join(", ")),
            );
            let sources: Vec<&str> = selection
                .enabled_sources()
                .iter()
                .map(|source| source.label())
                .collect();
            let sources = if sources.is_empty() {
                "<none>".to_string()
            } else {
                sources.join(", ")
            };
            push_line(&mut out, &format!("Sources:     {sources}"));
        }
    }
    out.push('\n');

    if let Some(request_id) = state.pending_request_id() {
        push_line(&mut out, &format!("Launch in progress: {request_id}"));
    }
    if let Some(failure) = &state.last_failure {
        push_line(
            &mut out,
            &format!("Last launch failed ({}): {}", failure.request_id, failure.message),
        );
    }
    let next = match state.step {
        Step::ReviewLaunch => "launch".to_string(),
        _ if state.can_continue() => "next".to_string(),
        _ => "next (disabled)".to_string(),
    };
    let back = if state.can_go_back() {
        "back"
    } else {
        "back (disabled)"
    };
    push_line(&mut out, &format!("Actions: {back} | {next} | cancel"));
    out
}

fn competitor_names(dataset: &Dataset, ids: &[String]) -> Vec<String> {
    ids.iter()
        .map(|id| {
            dataset
                .competitor(id)
                .map(|competitor| competitor.name.clone())
                .unwrap_or_else(|| id.clone())
        })
        .collect()
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

fn push_header(out: &mut String, title: &str) {
    push_line(out, title);
    push_line(out, &"-".repeat(title.chars().count().min(RULE_WIDTH)));
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

/// Format epoch milliseconds as a UTC `YYYY-MM-DD` date.
pub fn format_epoch_date(epoch_ms: u128) -> String {
    i64::try_from(epoch_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|timestamp| timestamp.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
