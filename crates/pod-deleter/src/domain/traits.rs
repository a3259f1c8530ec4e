//! Ports between the reconciler and the outside world

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use error_stack::Report;

use super::error::PodClientError;
use super::pod::PodSnapshot;

/// Lists pods. An empty `namespace` or `selector` means no filter.
#[async_trait]
pub trait PodLister: Send + Sync {
    async fn list_pods(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<PodSnapshot>, Report<PodClientError>>;
}

/// Deletes a single pod.
///
/// Must report [`PodClientError::NotFound`] as the current context when the pod is already gone.
#[async_trait]
pub trait PodDeleter: Send + Sync {
    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), Report<PodClientError>>;
}

/// Trait for getting current time
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
