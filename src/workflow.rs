use crate::cli::{InitArgs, LaunchArgs, ViewArgs, WizardArgs, WizardCommand};
use crate::dispatch::{RetryPolicy, WebhookDispatcher};
use crate::fixtures::Dataset;
use crate::launch::{self, LaunchContext, LaunchReport};
use crate::progress::ProgressSimulation;
use crate::render;
use crate::session::{self, LaunchConfig, SessionPaths};
use crate::util::display_path;
use crate::wizard::{Outcome, WizardAction, WizardState};
use anyhow::{anyhow, Context, Result};
use std::io::Write;
use std::time::Duration;

pub fn run_init(args: InitArgs) -> Result<()> {
    let paths = session::ensure_session_root(&args.session.session)?;
    let config_path = paths.config_path();
    if config_path.is_file() && !args.force {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            config_path.display()
        ));
    }
    let config = LaunchConfig {
        webhook_url: args.webhook_url,
        ..session::default_config()
    };
    session::validate_config(&config)?;
    session::write_config(&paths, &config)?;
    let cwd = std::env::current_dir().ok();
    println!("wrote {}", display_path(&config_path, cwd.as_deref()));
    Ok(())
}

pub fn run_overview(args: ViewArgs) -> Result<()> {
    let dataset = Dataset::load()?;
    let paths = SessionPaths::new(args.session.session);
    let launches = session::load_launches(&paths)?;
    if args.json {
        let recent: Vec<_> = render::analysis_cards(&dataset, &launches)
            .into_iter()
            .take(3)
            .map(|card| {
                serde_json::json!({
                    "id": card.id,
                    "title": card.title,
                    "status": card.status,
                    "created": card.created,
                })
            })
            .collect();
        let summary = serde_json::json!({
            "company": dataset.company,
            "industries": dataset.industries,
            "competitor_count": dataset.competitors.len(),
            "tracked_market_share": dataset.tracked_market_share(),
            "recent_analyses": recent,
        });
        print_json(&summary)?;
        return Ok(());
    }
    print!("{}", render::render_overview(&dataset, &launches));
    Ok(())
}

pub fn run_competitors(args: ViewArgs) -> Result<()> {
    let dataset = Dataset::load()?;
    if args.json {
        return print_json(&dataset.competitors);
    }
    print!("{}", render::render_competitors(&dataset));
    Ok(())
}

pub fn run_analyses(args: ViewArgs) -> Result<()> {
    let dataset = Dataset::load()?;
    let paths = SessionPaths::new(args.session.session);
    let launches = session::load_launches(&paths)?;
    if args.json {
        let cards: Vec<_> = render::analysis_cards(&dataset, &launches)
            .into_iter()
            .map(|card| {
                serde_json::json!({
                    "id": card.id,
                    "title": card.title,
                    "analysis_type": card.analysis_type,
                    "competitors": card.competitors,
                    "status": card.status,
                    "created": card.created,
                    "detail": card.detail,
                })
            })
            .collect();
        return print_json(&cards);
    }
    print!("{}", render::render_analyses(&dataset, &launches));
    Ok(())
}

pub fn run_wizard(args: WizardArgs) -> Result<()> {
    let dataset = Dataset::load()?;
    let paths = session::ensure_session_root(&args.session.session)?;
    let mut state = session::load_wizard_state(&paths, &dataset)?;

    let action = match args.action {
        WizardCommand::Show { json } => {
            if json {
                return print_json(&state);
            }
            print!("{}", render::render_wizard(&state, &dataset));
            return Ok(());
        }
        WizardCommand::Launch(launch_args) => {
            return run_launch(&paths, &dataset, state, launch_args);
        }
        WizardCommand::Type { kind } => WizardAction::SelectType(kind),
        WizardCommand::ToggleCompetitor { id } => WizardAction::ToggleCompetitor(id),
        WizardCommand::SelectAll => WizardAction::SelectAllCompetitors,
        WizardCommand::Clear => WizardAction::ClearCompetitors,
        WizardCommand::ToggleSource { source } => WizardAction::ToggleSource(source),
        WizardCommand::Next => WizardAction::Continue,
        WizardCommand::Back => WizardAction::Back,
        WizardCommand::Cancel => WizardAction::Cancel,
    };

    let name = action.name();
    let outcome = state
        .apply(action, &dataset)
        .with_context(|| format!("{name} rejected"))?;
    session::write_wizard_state(&paths, &state)?;
    match outcome {
        Outcome::Moved { from, to } => println!("moved from {from} to {to}"),
        Outcome::Reset => println!("wizard reset"),
        _ => {}
    }
    print!("{}", render::render_wizard(&state, &dataset));
    Ok(())
}

fn run_launch(
    paths: &SessionPaths,
    dataset: &Dataset,
    mut state: WizardState,
    args: LaunchArgs,
) -> Result<()> {
    let config = session::load_config_optional(paths)?;
    let company_id = config
        .company_id
        .clone()
        .unwrap_or_else(|| dataset.company.id.clone());

    if args.dry_run {
        let payload = launch::preview_payload(&state, &company_id)?;
        return print_json(&payload);
    }

    let env_url = std::env::var(session::WEBHOOK_URL_ENV).ok();
    let url = session::resolve_webhook_url(args.webhook_url.as_deref(), env_url.as_deref(), &config)?;
    let dispatcher = WebhookDispatcher::over_http(url, retry_policy(&config));
    let progress = ProgressSimulation::new(Duration::from_millis(config.progress_ms));
    let ctx = LaunchContext {
        dataset,
        paths,
        company_id: &company_id,
        progress: &progress,
    };

    let report = launch::launch(&mut state, &ctx, &dispatcher, |tick| {
        println!("[{:>3}%] {}", tick.percent, tick.stage);
        std::io::stdout().flush().ok();
    })
    .context("launch rejected")?;
    session::write_wizard_state(paths, &state)?;

    match report {
        LaunchReport::Accepted { payload, receipt } => {
            println!(
                "launched {} ({} analysis of {} competitor(s)); webhook answered {} after {} attempt(s) in {} ms",
                payload.request_id,
                payload.analysis_type,
                payload.competitor_ids.len(),
                receipt.status,
                receipt.attempts,
                receipt.elapsed_ms
            );
            println!("wizard reset to step 1");
            Ok(())
        }
        LaunchReport::Failed { request_id, error } => {
            if let Some(body) = error.response_body() {
                eprintln!("webhook response: {body}");
            }
            Err(anyhow::Error::new(error).context(format!("launch {request_id} failed")))
        }
    }
}

fn retry_policy(config: &LaunchConfig) -> RetryPolicy {
    RetryPolicy {
        max_retries: config.max_retries,
        delay: Duration::from_millis(config.retry_delay_ms),
        timeout_ms: config.timeout_ms,
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialize JSON output")?;
    println!("{text}");
    Ok(())
}
