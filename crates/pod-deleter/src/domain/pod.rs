//! Read-only pod snapshots taken at list time.

use chrono::DateTime;
use chrono::Utc;
use k8s_openapi::api::core::v1::ContainerStatus;
use k8s_openapi::api::core::v1::Pod;

/// Lifecycle phase reported by the pod status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    /// Maps the API phase string. Anything unrecognised, or a missing phase, is `Unknown`.
    pub fn from_api(phase: Option<&str>) -> Self {
        match phase {
            Some("Pending") => Self::Pending,
            Some("Running") => Self::Running,
            Some("Succeeded") => Self::Succeeded,
            Some("Failed") => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// State of a single container. Only one is active at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Waiting { reason: String },
    Terminated { reason: String },
}

impl ContainerState {
    /// Reason attached to the state, empty when there is none.
    pub fn reason(&self) -> &str {
        match self {
            Self::Running => "",
            Self::Waiting { reason } | Self::Terminated { reason } => reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSnapshot {
    pub name: String,
    pub state: ContainerState,
}

impl From<&ContainerStatus> for ContainerSnapshot {
    fn from(status: &ContainerStatus) -> Self {
        let state = status.state.as_ref();
        // terminated wins over waiting, an unset state is the API's default of waiting
        let state = if let Some(terminated) = state.and_then(|s| s.terminated.as_ref()) {
            ContainerState::Terminated {
                reason: terminated.reason.clone().unwrap_or_default(),
            }
        } else if let Some(waiting) = state.and_then(|s| s.waiting.as_ref()) {
            ContainerState::Waiting {
                reason: waiting.reason.clone().unwrap_or_default(),
            }
        } else if state.and_then(|s| s.running.as_ref()).is_some() {
            ContainerState::Running
        } else {
            ContainerState::Waiting {
                reason: String::new(),
            }
        };

        Self {
            name: status.name.clone(),
            state,
        }
    }
}

/// Immutable view of a pod as returned by one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodSnapshot {
    pub namespace: String,
    pub name: String,
    /// `None` only when the API object carried no creation timestamp.
    pub created: Option<DateTime<Utc>>,
    pub phase: PodPhase,
    pub containers: Vec<ContainerSnapshot>,
}

impl PodSnapshot {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        created: DateTime<Utc>,
        phase: PodPhase,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            created: Some(created),
            phase,
            containers: Vec::new(),
        }
    }

    pub fn with_container(mut self, name: impl Into<String>, state: ContainerState) -> Self {
        self.containers.push(ContainerSnapshot {
            name: name.into(),
            state,
        });
        self
    }

    /// `namespace/name`, used in log fields.
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl From<&Pod> for PodSnapshot {
    fn from(pod: &Pod) -> Self {
        let metadata = &pod.metadata;
        let status = pod.status.as_ref();

        Self {
            namespace: metadata.namespace.clone().unwrap_or_default(),
            name: metadata.name.clone().unwrap_or_default(),
            created: metadata.creation_timestamp.as_ref().map(|t| t.0),
            phase: PodPhase::from_api(status.and_then(|s| s.phase.as_deref())),
            containers: status
                .and_then(|s| s.container_statuses.as_ref())
                .map(|statuses| statuses.iter().map(ContainerSnapshot::from).collect())
                .unwrap_or_default(),
        }
    }
}
