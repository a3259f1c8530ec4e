//! Deletes pods stuck in failure states.
//!
//! The main components are:
//! - [`Controller::once`]: a single list-evaluate-delete pass
//! - [`Controller::run_loop`]: repeats passes on a fixed interval until stopped
//! - [`ControllerBuilder`]: optional settings, fixed once the controller is built

mod builder;
mod error;
mod observer;
mod reconciler;
mod scheduler;

use std::sync::atomic::AtomicU8;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

pub use builder::ControllerBuilder;
pub use builder::DEFAULT_INTERVAL;
pub use error::ControllerError;
pub use observer::PassObserver;
pub use observer::TracingObserver;
pub use reconciler::PassSummary;
pub use scheduler::LoopState;
pub use scheduler::StopHandle;

use crate::domain::PodDeleter;
use crate::domain::PodLister;
use crate::domain::Policy;
use crate::domain::TimeSource;

/// Holds the cluster port, the policy and the stop signal.
///
/// Created once and kept for the life of the process.
pub struct Controller<L, D> {
    lister: L,
    deleter: D,
    policy: Policy,
    interval: Duration,
    observer: Arc<dyn PassObserver>,
    clock: Arc<dyn TimeSource>,
    stop: CancellationToken,
    state: AtomicU8,
}

impl<L: PodLister, D: PodDeleter> Controller<L, D> {
    pub fn builder(lister: L, deleter: D) -> ControllerBuilder<L, D> {
        ControllerBuilder::new(lister, deleter)
    }

    fn from_parts(
        lister: L,
        deleter: D,
        policy: Policy,
        interval: Duration,
        observer: Arc<dyn PassObserver>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            lister,
            deleter,
            policy,
            interval,
            observer,
            clock,
            stop: CancellationToken::new(),
            state: AtomicU8::new(LoopState::Idle as u8),
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
