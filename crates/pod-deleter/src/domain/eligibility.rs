//! Decides whether a single pod should be deleted.
//!
//! Checks run in a fixed order and stop at the first one that rules the pod out:
//! phase, then age, then the container state reasons.

use chrono::DateTime;
use chrono::Utc;

use super::pod::PodPhase;
use super::pod::PodSnapshot;
use super::policy::Policy;

/// Why a pod was left alone.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SkipCause {
    #[display("PodPhase({_0})")]
    PhaseExcluded(PodPhase),
    #[display("CreationTimestamp")]
    TooYoung { created: Option<DateTime<Utc>> },
    /// Reasons seen on each container, in container order.
    #[display("Reason")]
    ReasonNotMatched { reasons: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipCause),
    Delete { container: String, reason: String },
}

impl Decision {
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }
}

/// Evaluates `pod` against `policy` as of `now`. Pure, no side effects.
pub fn evaluate(pod: &PodSnapshot, policy: &Policy, now: DateTime<Utc>) -> Decision {
    match pod.phase {
        PodPhase::Running | PodPhase::Failed => {}
        PodPhase::Pending | PodPhase::Succeeded | PodPhase::Unknown => {
            return Decision::Skip(SkipCause::PhaseExcluded(pod.phase));
        }
    }

    if !old_enough(pod.created, policy, now) {
        return Decision::Skip(SkipCause::TooYoung {
            created: pod.created,
        });
    }

    let mut reasons = Vec::with_capacity(pod.containers.len());
    for container in &pod.containers {
        let reason = container.state.reason();
        if policy.reasons.contains(reason) {
            return Decision::Delete {
                container: container.name.clone(),
                reason: reason.to_string(),
            };
        }
        reasons.push(reason.to_string());
    }

    Decision::Skip(SkipCause::ReasonNotMatched { reasons })
}

fn old_enough(created: Option<DateTime<Utc>>, policy: &Policy, now: DateTime<Utc>) -> bool {
    let Some(created) = created else {
        return false;
    };
    // a creation time in the future gives a negative age, which never converts
    match (now - created).to_std() {
        Ok(age) => age >= policy.grace,
        Err(_) => false,
    }
}
