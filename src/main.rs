//! mrcheck - evaluate GitLab merge request mergeability

mod cli;

use clap::{Parser, Subcommand};
use mr_mergeability::checks::EvaluateOptions;
use mr_mergeability::runner::MergeabilityStatus;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mrcheck", version, about = "Check whether a GitLab merge request can be merged")]
struct Cli {
    /// Config file (default: <config dir>/mr-mergeability/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every configured check for a merge request
    ///
    /// Exit status: 0 mergeable, 1 blocked, 2 pending, 3 error.
    Check {
        /// Project path, e.g. group/project
        project: String,

        /// Merge request IID
        iid: u64,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,

        /// Ignore cached results
        #[arg(long)]
        recheck: bool,

        /// Skip the pipeline check
        #[arg(long)]
        skip_ci: bool,

        /// Skip the unresolved discussions check
        #[arg(long)]
        skip_discussions: bool,

        /// Skip the approvals check
        #[arg(long)]
        skip_approvals: bool,

        /// Skip the draft check
        #[arg(long)]
        skip_draft: bool,

        /// Skip the rebase check
        #[arg(long)]
        skip_rebase: bool,

        /// Stop at the first failed check
        #[arg(long)]
        stop_on_failure: bool,
    },

    /// List the configured checks in evaluation order
    Checks,
}

/// Exit status for config, auth and fetch errors
const EXIT_ERROR: u8 = 3;

const fn exit_code(status: MergeabilityStatus) -> u8 {
    match status {
        MergeabilityStatus::Mergeable => 0,
        MergeabilityStatus::Blocked => 1,
        MergeabilityStatus::Pending => 2,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("mr_mergeability=debug,mrcheck=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            anstream::eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Check {
            project,
            iid,
            json,
            recheck,
            skip_ci,
            skip_discussions,
            skip_approvals,
            skip_draft,
            skip_rebase,
            stop_on_failure,
        } => {
            let options = cli::CheckOptions {
                json,
                evaluate: EvaluateOptions {
                    recheck,
                    execute_all: !stop_on_failure,
                    skip_ci_check: skip_ci,
                    skip_discussions_check: skip_discussions,
                    skip_approvals_check: skip_approvals,
                    skip_draft_check: skip_draft,
                    skip_rebase_check: skip_rebase,
                },
            };
            let status = cli::run_check(config, &project, iid, &options).await?;
            Ok(ExitCode::from(exit_code(status)))
        }
        Commands::Checks => {
            cli::run_list_checks(config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
