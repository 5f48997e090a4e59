use super::{Outcome, WizardError, WizardState};
use crate::fixtures::Dataset;
use crate::wizard::{
    AnalysisType, LaunchFailure, LaunchPhase, LaunchResult, Source, Step, WizardAction,
};

fn dataset() -> Dataset {
    Dataset::load().expect("load dataset")
}

fn state_on_review(dataset: &Dataset) -> WizardState {
    let mut state = WizardState::default();
    state
        .apply(WizardAction::SelectType(AnalysisType::Standard), dataset)
        .expect("select type");
    state.apply(WizardAction::Continue, dataset).expect("to step 2");
    state
        .apply(WizardAction::ToggleCompetitor("northwind".to_string()), dataset)
        .expect("toggle northwind");
    state
        .apply(WizardAction::ToggleCompetitor("globex".to_string()), dataset)
        .expect("toggle globex");
    state.apply(WizardAction::Continue, dataset).expect("to step 3");
    state.apply(WizardAction::Continue, dataset).expect("to step 4");
    state
}

#[test]
fn fresh_state_starts_on_type_select_with_default_sources() {
    let state = WizardState::default();
    assert_eq!(state.step, Step::TypeSelect);
    assert!(state.selection.analysis_type.is_none());
    assert!(state.selection.competitor_ids.is_empty());
    assert_eq!(
        state.selection.enabled_sources(),
        vec![
            Source::Website,
            Source::News,
            Source::SocialMedia,
            Source::Reviews
        ]
    );
    assert!(!state.can_go_back());
}

#[test]
fn continue_from_type_select_requires_analysis_type() {
    let dataset = dataset();
    let mut state = WizardState::default();
    assert!(!state.can_continue());
    let err = state
        .apply(WizardAction::Continue, &dataset)
        .expect_err("continue without type");
    assert_eq!(err, WizardError::MissingAnalysisType);
    assert_eq!(state.step, Step::TypeSelect);

    state
        .apply(WizardAction::SelectType(AnalysisType::Quick), &dataset)
        .expect("select type");
    assert!(state.can_continue());
}

#[test]
fn continue_from_competitor_select_requires_a_competitor() {
    let dataset = dataset();
    let mut state = WizardState::default();
    state
        .apply(WizardAction::SelectType(AnalysisType::Deep), &dataset)
        .expect("select type");
    state.apply(WizardAction::Continue, &dataset).expect("continue");
    assert!(!state.can_continue());
    assert_eq!(
        state.apply(WizardAction::Continue, &dataset),
        Err(WizardError::NoCompetitorsSelected)
    );

    state
        .apply(WizardAction::ToggleCompetitor("initech".to_string()), &dataset)
        .expect("toggle");
    assert!(state.can_continue());
    state
        .apply(WizardAction::ToggleCompetitor("initech".to_string()), &dataset)
        .expect("toggle off");
    assert!(!state.can_continue());
}

#[test]
fn transitions_never_skip_a_step() {
    let dataset = dataset();
    let mut state = WizardState::default();
    let script = [
        WizardAction::SelectType(AnalysisType::Standard),
        WizardAction::Continue,
        WizardAction::Back,
        WizardAction::Continue,
        WizardAction::SelectAllCompetitors,
        WizardAction::Continue,
        WizardAction::Continue,
        WizardAction::Continue,
        WizardAction::Back,
        WizardAction::Back,
        WizardAction::Back,
        WizardAction::Back,
    ];
    for action in script {
        let before = state.step.number();
        let _ = state.apply(action, &dataset);
        let after = state.step.number();
        assert!(
            before.abs_diff(after) <= 1,
            "step jumped from {before} to {after}"
        );
    }
    assert_eq!(state.step, Step::TypeSelect);
}

#[test]
fn back_is_unconditional_but_stops_at_first_step() {
    let dataset = dataset();
    let mut state = state_on_review(&dataset);
    state
        .apply(WizardAction::Back, &dataset)
        .expect("back to sources");
    state
        .apply(WizardAction::Back, &dataset)
        .expect("back to competitors");
    state
        .apply(WizardAction::ClearCompetitors, &dataset)
        .expect("clear");
    let outcome = state
        .apply(WizardAction::Back, &dataset)
        .expect("back with empty selection");
    assert_eq!(
        outcome,
        Outcome::Moved {
            from: Step::CompetitorSelect,
            to: Step::TypeSelect
        }
    );
    assert_eq!(
        state.apply(WizardAction::Back, &dataset),
        Err(WizardError::AtFirstStep)
    );
}

#[test]
fn continue_on_review_is_rejected() {
    let dataset = dataset();
    let mut state = state_on_review(&dataset);
    assert!(!state.can_continue());
    assert_eq!(
        state.apply(WizardAction::Continue, &dataset),
        Err(WizardError::AtLastStep)
    );
}

#[test]
fn actions_are_bound_to_their_step() {
    let dataset = dataset();
    let mut state = WizardState::default();
    let before = state.clone();
    let err = state
        .apply(WizardAction::ToggleSource(Source::News), &dataset)
        .expect_err("source toggle on step 1");
    assert!(matches!(
        err,
        WizardError::WrongStep {
            step: Step::TypeSelect,
            ..
        }
    ));
    assert_eq!(state, before);
}

#[test]
fn unknown_competitor_is_rejected() {
    let dataset = dataset();
    let mut state = WizardState::default();
    state
        .apply(WizardAction::SelectType(AnalysisType::Quick), &dataset)
        .expect("select");
    state.apply(WizardAction::Continue, &dataset).expect("continue");
    assert_eq!(
        state.apply(WizardAction::ToggleCompetitor("ghost".to_string()), &dataset),
        Err(WizardError::UnknownCompetitor("ghost".to_string()))
    );
    assert!(state.selection.competitor_ids.is_empty());
}

#[test]
fn double_source_toggle_restores_original_state() {
    let dataset = dataset();
    let mut state = state_on_review(&dataset);
    state.apply(WizardAction::Back, &dataset).expect("back");
    for source in Source::ALL {
        let before = state.selection.clone();
        state
            .apply(WizardAction::ToggleSource(source), &dataset)
            .expect("toggle once");
        assert_ne!(state.selection, before);
        state
            .apply(WizardAction::ToggleSource(source), &dataset)
            .expect("toggle twice");
        assert_eq!(state.selection, before);
    }
}

#[test]
fn only_one_analysis_type_is_active() {
    let dataset = dataset();
    let mut state = WizardState::default();
    state
        .apply(WizardAction::SelectType(AnalysisType::Quick), &dataset)
        .expect("quick");
    state
        .apply(WizardAction::SelectType(AnalysisType::Deep), &dataset)
        .expect("deep");
    assert_eq!(state.selection.analysis_type, Some(AnalysisType::Deep));
}

#[test]
fn accepted_launch_resets_to_a_fresh_session() {
    let dataset = dataset();
    let mut state = state_on_review(&dataset);
    let outcome = state
        .apply(
            WizardAction::Launch {
                request_id: "req-1".to_string(),
            },
            &dataset,
        )
        .expect("launch");
    assert_eq!(outcome, Outcome::LaunchStarted);
    assert_eq!(state.pending_request_id(), Some("req-1"));
    assert!(state.is_launching());
    assert_eq!(
        state.apply(WizardAction::Back, &dataset),
        Err(WizardError::LaunchInProgress {
            request_id: "req-1".to_string()
        })
    );

    let outcome = state
        .apply(WizardAction::LaunchSettled(LaunchResult::Accepted), &dataset)
        .expect("settle");
    assert_eq!(outcome, Outcome::Reset);
    assert_eq!(state, WizardState::default());
}

#[test]
fn failed_launch_stays_on_review_and_records_failure() {
    let dataset = dataset();
    let mut state = state_on_review(&dataset);
    let selection = state.selection.clone();
    state
        .apply(
            WizardAction::Launch {
                request_id: "req-2".to_string(),
            },
            &dataset,
        )
        .expect("launch");
    let failure = LaunchFailure {
        request_id: "req-2".to_string(),
        message: "webhook returned 503".to_string(),
        at_epoch_ms: 1,
    };
    let outcome = state
        .apply(
            WizardAction::LaunchSettled(LaunchResult::Failed(failure.clone())),
            &dataset,
        )
        .expect("settle");
    assert_eq!(outcome, Outcome::LaunchFailed);
    assert_eq!(state.step, Step::ReviewLaunch);
    assert_eq!(state.phase, LaunchPhase::Idle);
    assert_eq!(state.selection, selection);
    assert_eq!(state.last_failure, Some(failure));

    state
        .apply(
            WizardAction::Launch {
                request_id: "req-3".to_string(),
            },
            &dataset,
        )
        .expect("retry launch");
    assert!(state.last_failure.is_none());
}

#[test]
fn check_launch_requires_review_step_and_idle_phase() {
    let dataset = dataset();
    let state = WizardState::default();
    assert!(matches!(
        state.check_launch(),
        Err(WizardError::WrongStep {
            action: "launch",
            step: Step::TypeSelect
        })
    ));

    let mut state = state_on_review(&dataset);
    assert_eq!(state.check_launch(), Ok(()));
    state
        .apply(
            WizardAction::Launch {
                request_id: "req-9".to_string(),
            },
            &dataset,
        )
        .expect("launch");
    assert_eq!(
        state.check_launch(),
        Err(WizardError::LaunchInProgress {
            request_id: "req-9".to_string()
        })
    );
}

#[test]
fn settle_without_launch_is_rejected() {
    let dataset = dataset();
    let mut state = WizardState::default();
    assert_eq!(
        state.apply(WizardAction::LaunchSettled(LaunchResult::Accepted), &dataset),
        Err(WizardError::NotLaunching)
    );
}

#[test]
fn cancel_discards_selection() {
    let dataset = dataset();
    let mut state = state_on_review(&dataset);
    assert_eq!(
        state.apply(WizardAction::Cancel, &dataset),
        Ok(Outcome::Reset)
    );
    assert_eq!(state, WizardState::default());
}

#[test]
fn persisted_state_with_unknown_competitor_fails_validation() {
    let dataset = dataset();
    let mut state = WizardState::default();
    state.selection.competitor_ids.insert("ghost".to_string());
    assert_eq!(
        state.validate_against(&dataset),
        Err(WizardError::UnknownCompetitor("ghost".to_string()))
    );
}

#[test]
fn state_round_trips_through_json() {
    let dataset = dataset();
    let state = state_on_review(&dataset);
    let text = serde_json::to_string(&state).expect("serialize");
    assert!(text.contains("\"review_launch\""), "{text}");
    let parsed: WizardState = serde_json::from_str(&text).expect("parse");
    assert_eq!(parsed, state);
}
