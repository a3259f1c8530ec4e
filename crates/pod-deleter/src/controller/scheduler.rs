use std::sync::atomic::Ordering;

use error_stack::Report;
use error_stack::ResultExt;
use tokio::select;
use tokio::time::interval_at;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::error::ControllerError;
use super::Controller;
use crate::domain::PodDeleter;
use crate::domain::PodLister;

/// Lifecycle of [`Controller::run_loop`]. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoopState {
    Idle = 0,
    Running = 1,
    Stopped = 2,
}

impl LoopState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// Requests the loop to stop. Cheap to clone and safe to use from any task or thread.
#[derive(Debug, Clone)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    /// Never blocks. Repeated calls, or calls after the loop ended, do nothing.
    pub fn stop(&self) {
        self.token.cancel();
    }
}

impl<L: PodLister, D: PodDeleter> Controller<L, D> {
    /// Runs a pass right away and then one per interval until [`Controller::stop`] is called.
    ///
    /// Stopping cancels the pass in flight, which winds down at its next pod, and the
    /// loop returns `Ok(())`. Calling this on a stopped controller returns at once.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::PassFailed`] if any pass fails, including the first one;
    ///   there is no retry
    /// - [`ControllerError::AlreadyRunning`] if another `run_loop` is active
    pub async fn run_loop(&self) -> Result<(), Report<ControllerError>> {
        if let Err(current) = self.state.compare_exchange(
            LoopState::Idle as u8,
            LoopState::Running as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            return match LoopState::from_u8(current) {
                LoopState::Running => Err(Report::new(ControllerError::AlreadyRunning)),
                _ => Ok(()),
            };
        }

        let result = self.drive().await;
        self.state.store(LoopState::Stopped as u8, Ordering::Release);
        result
    }

    async fn drive(&self) -> Result<(), Report<ControllerError>> {
        if self.stop.is_cancelled() {
            info!("stop requested before the loop started");
            return Ok(());
        }

        info!(interval = ?self.interval, "starting controller loop");
        // child of the stop token, so stopping also cancels the pass in flight
        let pass_token = self.stop.child_token();

        self.once(&pass_token)
            .await
            .change_context(ControllerError::PassFailed)?;

        let start = Instant::now().checked_add(self.interval).ok_or_else(|| {
            Report::new(ControllerError::InvalidOption {
                message: format!("interval {:?} is too large", self.interval),
            })
        })?;
        let mut ticker = interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            select! {
                biased;
                _ = self.stop.cancelled() => {
                    info!("controller loop stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    self.once(&pass_token)
                        .await
                        .change_context(ControllerError::PassFailed)?;
                }
            }
        }
    }

    /// Asks a running loop to stop. See [`StopHandle::stop`].
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// A handle that can stop the loop from elsewhere, e.g. a signal handler task.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            token: self.stop.clone(),
        }
    }

    pub fn loop_state(&self) -> LoopState {
        LoopState::from_u8(self.state.load(Ordering::Acquire))
    }
}
