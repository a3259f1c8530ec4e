use std::sync::Arc;
use std::time::Duration;

use error_stack::Report;
use tokio::time::Instant;

use super::error::ControllerError;
use super::observer::PassObserver;
use super::observer::TracingObserver;
use super::Controller;
use crate::domain::AcceptedReasons;
use crate::domain::PodDeleter;
use crate::domain::PodLister;
use crate::domain::Policy;
use crate::domain::SystemClock;
use crate::domain::TimeSource;

/// How often the loop runs a pass when no interval is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Collects the optional settings of a [`Controller`].
///
/// Anything left unset keeps its default: all namespaces, no selector,
/// a one hour grace period, a five minute interval, the default reasons,
/// real deletions and tracing output.
pub struct ControllerBuilder<L, D> {
    lister: L,
    deleter: D,
    policy: Policy,
    interval: Duration,
    observer: Arc<dyn PassObserver>,
    clock: Arc<dyn TimeSource>,
}

impl<L: PodLister, D: PodDeleter> ControllerBuilder<L, D> {
    pub fn new(lister: L, deleter: D) -> Self {
        Self {
            lister,
            deleter,
            policy: Policy::default(),
            interval: DEFAULT_INTERVAL,
            observer: Arc::new(TracingObserver),
            clock: Arc::new(SystemClock),
        }
    }

    /// Only consider pods in this namespace. Empty means all namespaces.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.policy.namespace = namespace.into();
        self
    }

    /// Only consider pods matching this label selector.
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.policy.selector = selector.into();
        self
    }

    /// Pods created less than `grace` ago are never deleted.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.policy.grace = grace;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Replaces the default reasons. Exact matches only.
    pub fn with_reasons<I, S>(mut self, reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy.reasons = AcceptedReasons::new(reasons);
        self
    }

    /// When set, eligible pods are reported but not deleted.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.policy.dry_run = dry_run;
        self
    }

    pub fn with_observer(mut self, observer: impl PassObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    pub fn with_clock(mut self, clock: impl TimeSource + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn build(self) -> Result<Controller<L, D>, Report<ControllerError>> {
        if self.interval.is_zero() {
            return Err(Report::new(ControllerError::InvalidOption {
                message: "interval must be greater than zero".to_string(),
            }));
        }
        if Instant::now().checked_add(self.interval).is_none() {
            return Err(Report::new(ControllerError::InvalidOption {
                message: format!("interval {:?} is too large", self.interval),
            }));
        }

        Ok(Controller::from_parts(
            self.lister,
            self.deleter,
            self.policy,
            self.interval,
            self.observer,
            self.clock,
        ))
    }
}
