//! Mergeability runner
//!
//! Two-phase pattern:
//! 1. Evaluate - run each declared check against one merge request,
//!    consulting and filling the results store (effectful)
//! 2. Decide - fold the per-check outcomes into one verdict (pure, testable)

mod decision;
mod evaluate;

pub use decision::{
    CheckOutcome, CheckReport, MergeabilityDecision, MergeabilityReport, MergeabilityStatus,
    ResultSource, decide,
};
pub use evaluate::MergeabilityCheckRunner;
