/*!
 * Scheduler Traits
 * Seam between the scheduler facade and the per-policy loops
 */

use super::types::{RunOutcome, RunReport, SchedulingPolicy};
use crate::core::SimResult;
use crate::sim::SimContext;

/// One scheduling run under a fixed policy
///
/// Implementations record every dispatch in `report` and return how the
/// run ended. Resources are only mutated through dispatch steps and
/// unblocker passes.
pub trait PolicyRunner {
    fn policy(&self) -> SchedulingPolicy;

    fn run(&self, ctx: &mut SimContext, report: &mut RunReport) -> SimResult<RunOutcome>;
}
