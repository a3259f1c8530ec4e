use error_stack::Report;
use error_stack::ResultExt;
use tokio_util::sync::CancellationToken;

use super::error::ControllerError;
use super::Controller;
use crate::domain::evaluate;
use crate::domain::Decision;
use crate::domain::PodClientError;
use crate::domain::PodDeleter;
use crate::domain::PodLister;

/// What a single pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub listed: usize,
    pub evaluated: usize,
    pub deleted: usize,
    /// Eligible pods that were only reported because of dry-run.
    pub dry_run_matches: usize,
    /// Delete calls answered with not-found.
    pub already_gone: usize,
    /// The pass stopped early because cancellation was requested.
    pub cancelled: bool,
}

impl<L: PodLister, D: PodDeleter> Controller<L, D> {
    /// Lists pods once and deletes the ones that are eligible.
    ///
    /// `cancellation` is checked before each pod. Once it fires the pass stops and
    /// returns successfully; pods already deleted stay deleted.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::ListFailed`] if listing fails, nothing is deleted
    /// - [`ControllerError::DeleteFailed`] on the first delete failure other than
    ///   not-found, remaining pods are left untouched
    #[tracing::instrument(skip_all, fields(namespace = %self.policy.namespace, selector = %self.policy.selector, dry_run = self.policy.dry_run))]
    pub async fn once(
        &self,
        cancellation: &CancellationToken,
    ) -> Result<PassSummary, Report<ControllerError>> {
        let pods = self
            .lister
            .list_pods(&self.policy.namespace, &self.policy.selector)
            .await
            .change_context(ControllerError::ListFailed)?;

        let now = self.clock.now();
        let mut summary = PassSummary {
            listed: pods.len(),
            ..Default::default()
        };

        for pod in &pods {
            if cancellation.is_cancelled() {
                tracing::info!(remaining = pods.len() - summary.evaluated, "pass cancelled");
                summary.cancelled = true;
                break;
            }
            summary.evaluated += 1;

            let (container, reason) = match evaluate(pod, &self.policy, now) {
                Decision::Skip(cause) => {
                    self.observer.pod_skipped(pod, &cause);
                    continue;
                }
                Decision::Delete { container, reason } => (container, reason),
            };

            self.observer.pod_deleting(pod, &container, &reason, self.policy.dry_run);
            if self.policy.dry_run {
                summary.dry_run_matches += 1;
                continue;
            }

            match self.deleter.delete_pod(&pod.namespace, &pod.name).await {
                Ok(()) => summary.deleted += 1,
                Err(report) if matches!(report.current_context(), PodClientError::NotFound) => {
                    // pod may have exited or been removed in the meantime
                    self.observer.pod_already_gone(pod);
                    summary.already_gone += 1;
                }
                Err(report) => {
                    return Err(report.change_context(ControllerError::DeleteFailed {
                        namespace: pod.namespace.clone(),
                        name: pod.name.clone(),
                    }));
                }
            }
        }

        self.observer.pass_completed(&summary);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::DateTime;
    use chrono::Utc;
    use similar_asserts::assert_eq;
    use test_log::test;

    use super::*;
    use crate::controller::ControllerBuilder;
    use crate::controller::PassObserver;
    use crate::domain::mock::FixedClock;
    use crate::domain::mock::InMemoryCluster;
    use crate::domain::ContainerState;
    use crate::domain::PodPhase;
    use crate::domain::PodSnapshot;
    use crate::domain::SkipCause;

    const MINUTE: Duration = Duration::from_secs(60);
    const HOUR: Duration = Duration::from_secs(3600);

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn make_pod(age: Duration, name: &str, phase: PodPhase, state: ContainerState) -> PodSnapshot {
        let created = now() - chrono::Duration::from_std(age).unwrap();
        PodSnapshot::new("default", name, created, phase).with_container("app", state)
    }

    fn crash(age: Duration, name: &str) -> PodSnapshot {
        make_pod(
            age,
            name,
            PodPhase::Running,
            ContainerState::Terminated {
                reason: "CrashLoopBackOff".to_string(),
            },
        )
    }

    fn builder(cluster: &InMemoryCluster) -> ControllerBuilder<InMemoryCluster, InMemoryCluster> {
        ControllerBuilder::new(cluster.clone(), cluster.clone())
            .with_grace(5 * MINUTE)
            .with_clock(FixedClock(now()))
    }

    async fn run_once(cluster: &InMemoryCluster) -> PassSummary {
        builder(cluster)
            .build()
            .expect("should build")
            .once(&CancellationToken::new())
            .await
            .expect("pass should succeed")
    }

    #[derive(Default, Clone)]
    struct RecordingObserver {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl PassObserver for RecordingObserver {
        fn pod_skipped(&self, pod: &PodSnapshot, cause: &SkipCause) {
            self.events
                .lock()
                .unwrap()
                .push(format!("skip {} {cause}", pod.name));
        }

        fn pod_deleting(&self, pod: &PodSnapshot, container: &str, reason: &str, dry_run: bool) {
            self.events
                .lock()
                .unwrap()
                .push(format!("delete {} {container} {reason} dry_run={dry_run}", pod.name));
        }
    }

    #[test(tokio::test)]
    async fn empty_cluster() {
        let cluster = InMemoryCluster::default();

        let summary = run_once(&cluster).await;

        assert_eq!(summary, PassSummary::default());
        assert!(cluster.delete_calls().is_empty());
    }

    #[test(tokio::test)]
    async fn delete_none() {
        let cluster = InMemoryCluster::new([make_pod(
            HOUR,
            "pod0",
            PodPhase::Running,
            ContainerState::Terminated {
                reason: String::new(),
            },
        )]);

        run_once(&cluster).await;

        assert_eq!(cluster.pod_names(), vec!["pod0"]);
        assert!(cluster.delete_calls().is_empty());
    }

    #[test(tokio::test)]
    async fn delete_all() {
        let cluster = InMemoryCluster::new([crash(HOUR, "pod0"), crash(3 * HOUR, "pod1")]);

        let summary = run_once(&cluster).await;

        assert_eq!(summary.deleted, 2);
        assert!(cluster.pods().is_empty());
    }

    #[test(tokio::test)]
    async fn delete_one() {
        let cluster = InMemoryCluster::new([crash(MINUTE, "pod0"), crash(3 * HOUR, "pod1")]);

        let summary = run_once(&cluster).await;

        assert_eq!(summary.deleted, 1);
        assert_eq!(cluster.pod_names(), vec!["pod0"]);
        assert_eq!(cluster.delete_calls(), vec!["default/pod1"]);
    }

    #[test(tokio::test)]
    async fn excluded_phases_are_kept() {
        let cluster = InMemoryCluster::new(
            [PodPhase::Pending, PodPhase::Succeeded, PodPhase::Unknown]
                .into_iter()
                .enumerate()
                .map(|(i, phase)| {
                    make_pod(
                        24 * HOUR,
                        &format!("pod{i}"),
                        phase,
                        ContainerState::Waiting {
                            reason: "CrashLoopBackOff".to_string(),
                        },
                    )
                }),
        );

        let summary = run_once(&cluster).await;

        assert_eq!(summary.evaluated, 3);
        assert_eq!(summary.deleted, 0);
        assert_eq!(cluster.pods().len(), 3);
    }

    #[test(tokio::test)]
    async fn failed_pods_with_error_reason_are_deleted() {
        let cluster = InMemoryCluster::new([make_pod(
            HOUR,
            "pod0",
            PodPhase::Failed,
            ContainerState::Terminated {
                reason: "Error".to_string(),
            },
        )]);

        run_once(&cluster).await;

        assert!(cluster.pods().is_empty());
    }

    #[test(tokio::test)]
    async fn each_pod_is_deleted_once() {
        let pod = crash(HOUR, "pod0")
            .with_container(
                "sidecar",
                ContainerState::Waiting {
                    reason: "Error".to_string(),
                },
            )
            .with_container(
                "other",
                ContainerState::Terminated {
                    reason: "CrashLoopBackOff".to_string(),
                },
            );
        let cluster = InMemoryCluster::new([pod]);
        let observer = RecordingObserver::default();

        builder(&cluster)
            .with_observer(observer.clone())
            .build()
            .expect("should build")
            .once(&CancellationToken::new())
            .await
            .expect("pass should succeed");

        assert_eq!(cluster.delete_calls(), vec!["default/pod0"]);
        assert_eq!(
            *observer.events.lock().unwrap(),
            vec!["delete pod0 app CrashLoopBackOff dry_run=false".to_string()]
        );
    }

    #[test(tokio::test)]
    async fn list_uses_policy_filters() {
        let cluster = InMemoryCluster::default();
        builder(&cluster)
            .with_namespace("jobs")
            .with_selector("app=worker")
            .build()
            .expect("should build")
            .once(&CancellationToken::new())
            .await
            .expect("pass should succeed");

        assert_eq!(
            cluster.list_calls(),
            vec![("jobs".to_string(), "app=worker".to_string())]
        );
    }

    #[test(tokio::test)]
    async fn dry_run_never_deletes() {
        let cluster = InMemoryCluster::new([crash(HOUR, "pod0"), crash(MINUTE, "pod1")]);
        let observer = RecordingObserver::default();

        let summary = builder(&cluster)
            .with_dry_run(true)
            .with_observer(observer.clone())
            .build()
            .expect("should build")
            .once(&CancellationToken::new())
            .await
            .expect("pass should succeed");

        assert_eq!(summary.dry_run_matches, 1);
        assert_eq!(summary.deleted, 0);
        assert!(cluster.delete_calls().is_empty());
        assert_eq!(cluster.pods().len(), 2);
        assert_eq!(
            *observer.events.lock().unwrap(),
            vec![
                "delete pod0 app CrashLoopBackOff dry_run=true".to_string(),
                "skip pod1 CreationTimestamp".to_string(),
            ]
        );
    }

    #[test(tokio::test)]
    async fn not_found_does_not_abort() {
        let cluster = InMemoryCluster::new([crash(HOUR, "pod0"), crash(HOUR, "pod1")]);
        cluster.vanish_before_delete("default/pod0");

        let summary = run_once(&cluster).await;

        assert_eq!(summary.already_gone, 1);
        assert_eq!(summary.deleted, 1);
        assert_eq!(cluster.delete_calls(), vec!["default/pod0", "default/pod1"]);
    }

    #[test(tokio::test)]
    async fn delete_failure_aborts_pass() {
        let cluster = InMemoryCluster::new([
            crash(HOUR, "pod0"),
            crash(HOUR, "pod1"),
            crash(HOUR, "pod2"),
        ]);
        cluster.fail_delete("default/pod1", "forbidden");

        let report = builder(&cluster)
            .build()
            .expect("should build")
            .once(&CancellationToken::new())
            .await
            .expect_err("pass should fail");

        match report.current_context() {
            ControllerError::DeleteFailed { namespace, name } => {
                assert_eq!(namespace, "default");
                assert_eq!(name, "pod1");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(format!("{report:?}").contains("forbidden"));
        assert_eq!(cluster.delete_calls(), vec!["default/pod0", "default/pod1"]);
        assert_eq!(cluster.pod_names(), vec!["pod1", "pod2"]);
    }

    #[test(tokio::test)]
    async fn list_failure_deletes_nothing() {
        let cluster = InMemoryCluster::new([crash(HOUR, "pod0")]);
        cluster.fail_list("connection refused");

        let report = builder(&cluster)
            .build()
            .expect("should build")
            .once(&CancellationToken::new())
            .await
            .expect_err("pass should fail");

        assert!(matches!(report.current_context(), ControllerError::ListFailed));
        assert!(cluster.delete_calls().is_empty());
    }

    #[test(tokio::test)]
    async fn cancellation_stops_pass_without_error() {
        let cluster = InMemoryCluster::new([
            crash(HOUR, "pod0"),
            crash(HOUR, "pod1"),
            crash(HOUR, "pod2"),
        ]);
        let token = CancellationToken::new();
        let hook_token = token.clone();
        cluster.on_delete(move |_, name| {
            if name == "pod0" {
                hook_token.cancel();
            }
        });

        let summary = builder(&cluster)
            .build()
            .expect("should build")
            .once(&token)
            .await
            .expect("cancelled pass is not an error");

        assert!(summary.cancelled);
        assert_eq!(summary.evaluated, 1);
        assert_eq!(cluster.pod_names(), vec!["pod1", "pod2"]);
    }

    #[test(tokio::test)]
    async fn cancelled_before_start_touches_nothing() {
        let cluster = InMemoryCluster::new([crash(HOUR, "pod0")]);
        let token = CancellationToken::new();
        token.cancel();

        let summary = builder(&cluster)
            .build()
            .expect("should build")
            .once(&token)
            .await
            .expect("cancelled pass is not an error");

        assert!(summary.cancelled);
        assert_eq!(summary.evaluated, 0);
        assert_eq!(cluster.pods().len(), 1);
    }
}
