//! Evaluation - effectful orchestration of one mergeability pass
//!
//! For each declared check, in order:
//! - `skip` holds: synthesize `Inactive` (never cached, never executed)
//! - cached result present: reuse it as-is, whatever its status
//! - otherwise: execute, write back, use the fresh result

use crate::checks::{CheckContext, CheckKind, CheckList, EvaluateOptions};
use crate::platform::MergeRequestPlatform;
use crate::runner::decision::{CheckOutcome, MergeabilityDecision, ResultSource, decide};
use crate::store::ResultsStore;
use crate::types::{MergeRequest, ProjectSettings};
use tracing::debug;

/// Runs a declared, ordered list of checks and aggregates the outcome
///
/// The runner holds no per-evaluation state and may be shared freely.
#[derive(Debug, Clone)]
pub struct MergeabilityCheckRunner {
    checks: CheckList,
    store: ResultsStore,
}

impl MergeabilityCheckRunner {
    /// Create a runner over `checks`, caching through `store`
    pub const fn new(checks: CheckList, store: ResultsStore) -> Self {
        Self { checks, store }
    }

    /// Checks this runner evaluates, in order
    pub const fn checks(&self) -> &CheckList {
        &self.checks
    }

    /// Store the results are cached in
    pub const fn store(&self) -> &ResultsStore {
        &self.store
    }

    /// Evaluate every declared check against `merge_request` (EFFECTFUL)
    ///
    /// Checks run sequentially in declared order. This never fails: check
    /// errors become `Failed` results and cache errors become misses.
    pub async fn evaluate(
        &self,
        platform: &dyn MergeRequestPlatform,
        merge_request: &MergeRequest,
        settings: &ProjectSettings,
        options: &EvaluateOptions,
    ) -> MergeabilityDecision {
        let ctx = CheckContext {
            merge_request,
            settings,
            options,
            platform,
        };

        debug!(
            project_id = merge_request.project_id,
            mr_iid = merge_request.iid,
            checks = self.checks.len(),
            recheck = options.recheck,
            "evaluating mergeability"
        );

        let mut outcomes = Vec::with_capacity(self.checks.len());
        for &kind in self.checks.kinds() {
            let outcome = self.run_check(kind, &ctx).await;
            let stop = !options.execute_all && outcome.result.is_failed();
            outcomes.push(outcome);
            if stop {
                debug!(check = %kind, "stopping after first failed check");
                break;
            }
        }

        let decision = decide(outcomes);
        debug!(
            mr_iid = merge_request.iid,
            status = %decision.status,
            executed = decision.executed_count(),
            cached = decision.cached_count(),
            "mergeability evaluated"
        );
        decision
    }

    async fn run_check(&self, kind: CheckKind, ctx: &CheckContext<'_>) -> CheckOutcome {
        let check = kind.check();

        if check.skip(ctx) {
            debug!(check = %kind, "check not applicable");
            return CheckOutcome {
                kind,
                result: kind.inactive(),
                source: ResultSource::Skipped,
            };
        }

        let key = check.cache_key(ctx);

        if !ctx.options.recheck {
            if let Some(result) = self.store.read(&key).await {
                debug!(check = %kind, status = %result.status(), "using cached result");
                return CheckOutcome {
                    kind,
                    result,
                    source: ResultSource::Cached,
                };
            }
        }

        let result = check.execute(ctx).await;
        debug!(check = %kind, status = %result.status(), "check executed");
        self.store.write(&key, &result).await;

        CheckOutcome {
            kind,
            result,
            source: ResultSource::Executed,
        }
    }
}
