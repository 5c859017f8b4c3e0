//! Check command - evaluate mergeability of one merge request

use crate::cli::context::CommandContext;
use crate::cli::style::{CHECK, CROSS, DASH, PENDING, Stylize, WARN, check, cross, spinner_style};
use anstream::println;
use indicatif::ProgressBar;
use mr_mergeability::checks::{CheckStatus, EvaluateOptions};
use mr_mergeability::config::Config;
use mr_mergeability::error::Result;
use mr_mergeability::runner::{CheckOutcome, MergeabilityDecision, MergeabilityStatus, ResultSource};
use std::path::Path;
use std::time::Duration;

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Print the decision as JSON
    pub json: bool,
    /// Per-request evaluation options
    pub evaluate: EvaluateOptions,
}

/// Run the check command, returning the aggregated status
pub async fn run_check(
    config_path: Option<&Path>,
    project: &str,
    iid: u64,
    options: &CheckOptions,
) -> Result<MergeabilityStatus> {
    let ctx = CommandContext::new(config_path, project).await?;

    let spinner = ProgressBar::new_spinner();
    if options.json {
        spinner.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    spinner.set_style(spinner_style());
    spinner.set_message(format!("Fetching !{}...", iid.accent()));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let fetched = async {
        let mr = ctx.platform.get_merge_request(iid).await?;
        let settings = ctx.platform.get_project_settings().await?;
        Ok::<_, mr_mergeability::error::Error>((mr, settings))
    }
    .await;
    let (mr, settings) = match fetched {
        Ok(v) => v,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };

    spinner.set_message(format!(
        "Running {} check(s) on !{}...",
        ctx.runner.checks().len(),
        iid
    ));
    let decision = ctx
        .runner
        .evaluate(ctx.platform.as_ref(), &mr, &settings, &options.evaluate)
        .await;
    spinner.finish_and_clear();

    if options.json {
        println!("{}", serde_json::to_string_pretty(&decision.report())?);
    } else {
        println!(
            "{} {}",
            format!("!{}", mr.iid).emphasis(),
            mr.title.muted()
        );
        print_decision(&decision);
    }

    Ok(decision.status)
}

/// List the configured checks in evaluation order
pub fn run_list_checks(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let checks = config.check_list()?;
    for (i, kind) in checks.kinds().iter().enumerate() {
        println!(
            "{:>2}. {} {}",
            i + 1,
            kind.name().emphasis(),
            format!("({})", kind.identifier()).muted()
        );
    }
    Ok(())
}

fn status_marker(status: CheckStatus) -> String {
    match status {
        CheckStatus::Success => check(),
        CheckStatus::Failed => cross(),
        CheckStatus::Checking => PENDING.accent(),
        CheckStatus::Warning => WARN.warn(),
        CheckStatus::Inactive => DASH.muted(),
    }
}

fn print_outcome(outcome: &CheckOutcome) {
    let result = &outcome.result;
    let mut line = format!(
        "  {} {:<12} {}",
        status_marker(result.status()),
        outcome.kind.name(),
        result.status().muted()
    );
    if let Some(reason) = result.reason() {
        line.push_str(&format!(" {}", reason.warn()));
    }
    if outcome.source == ResultSource::Cached {
        line.push_str(&format!(" {}", "(cached)".muted()));
    }
    println!("{line}");
}

fn print_decision(decision: &MergeabilityDecision) {
    for outcome in &decision.outcomes {
        print_outcome(outcome);
    }
    println!();

    match decision.status {
        MergeabilityStatus::Mergeable => {
            println!("{} {}", CHECK.success(), "Mergeable".success());
        }
        MergeabilityStatus::Blocked => {
            let blocking: Vec<_> = decision.failures().map(|o| o.kind.name()).collect();
            println!(
                "{} {} {}",
                CROSS.error(),
                "Blocked by".error(),
                blocking.join(", ").emphasis()
            );
        }
        MergeabilityStatus::Pending => {
            let pending: Vec<_> = decision.pending().map(|o| o.kind.name()).collect();
            println!(
                "{} {} {}",
                PENDING.accent(),
                "Waiting on".accent(),
                pending.join(", ").emphasis()
            );
        }
    }
    println!(
        "{}",
        format!(
            "{} executed, {} cached",
            decision.executed_count(),
            decision.cached_count()
        )
        .muted()
    );
}
