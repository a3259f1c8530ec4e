//! Hooks for watching what a reconciliation pass decides.

use tracing::debug;
use tracing::info;

use crate::domain::PodSnapshot;
use crate::domain::SkipCause;

use super::reconciler::PassSummary;

/// Receives the decisions made during a pass.
///
/// Every method defaults to doing nothing.
pub trait PassObserver: Send + Sync {
    fn pod_skipped(&self, _pod: &PodSnapshot, _cause: &SkipCause) {}

    /// Called before the delete is issued, or instead of it in dry-run mode.
    /// `container` is the first container whose state matched an accepted reason.
    fn pod_deleting(&self, _pod: &PodSnapshot, _container: &str, _reason: &str, _dry_run: bool) {}

    fn pod_already_gone(&self, _pod: &PodSnapshot) {}

    fn pass_completed(&self, _summary: &PassSummary) {}
}

/// Default observer, emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PassObserver for TracingObserver {
    fn pod_skipped(&self, pod: &PodSnapshot, cause: &SkipCause) {
        match cause {
            SkipCause::PhaseExcluded(phase) => debug!(
                pod = %pod.key(),
                cause = %cause,
                phase = %phase,
                "skipping pod"
            ),
            SkipCause::TooYoung { created } => debug!(
                pod = %pod.key(),
                cause = %cause,
                created = ?created,
                "skipping pod"
            ),
            SkipCause::ReasonNotMatched { reasons } => debug!(
                pod = %pod.key(),
                cause = %cause,
                reasons = ?reasons,
                "skipping pod"
            ),
        }
    }

    fn pod_deleting(&self, pod: &PodSnapshot, container: &str, reason: &str, dry_run: bool) {
        info!(
            pod = %pod.key(),
            container,
            reason,
            dry_run,
            "deleting pod"
        );
    }

    fn pod_already_gone(&self, pod: &PodSnapshot) {
        debug!(pod = %pod.key(), "pod already gone");
    }

    fn pass_completed(&self, summary: &PassSummary) {
        info!(
            listed = summary.listed,
            evaluated = summary.evaluated,
            deleted = summary.deleted,
            dry_run_matches = summary.dry_run_matches,
            already_gone = summary.already_gone,
            cancelled = summary.cancelled,
            "reconciliation pass completed"
        );
    }
}
