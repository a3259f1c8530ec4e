//! In-memory test adapters for the cluster access port
//!
//! Used by unit tests and by the integration tests under `tests/`.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use error_stack::Report;

use super::error::PodClientError;
use super::pod::PodSnapshot;
use super::traits::PodDeleter;
use super::traits::PodLister;
use super::traits::TimeSource;

type DeleteHook = Arc<dyn Fn(&str, &str) + Send + Sync>;

#[derive(Default)]
struct ClusterState {
    pods: Vec<PodSnapshot>,
    list_calls: Vec<(String, String)>,
    delete_calls: Vec<String>,
    list_error: Option<String>,
    delete_errors: HashMap<String, String>,
    missing: Vec<String>,
    on_delete: Option<DeleteHook>,
}

/// A fake cluster holding pods in memory.
///
/// Deleting removes the pod from the list. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryCluster {
    state: Arc<Mutex<ClusterState>>,
}

impl InMemoryCluster {
    pub fn new(pods: impl IntoIterator<Item = PodSnapshot>) -> Self {
        let cluster = Self::default();
        cluster.state.lock().unwrap().pods = pods.into_iter().collect();
        cluster
    }

    pub fn add_pod(&self, pod: PodSnapshot) {
        self.state.lock().unwrap().pods.push(pod);
    }

    /// Pods still present, in listing order
    pub fn pods(&self) -> Vec<PodSnapshot> {
        self.state.lock().unwrap().pods.clone()
    }

    pub fn pod_names(&self) -> Vec<String> {
        self.pods().into_iter().map(|p| p.name).collect()
    }

    /// `namespace/name` of every delete call, including failed ones
    pub fn delete_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().delete_calls.clone()
    }

    /// `(namespace, selector)` of every list call
    pub fn list_calls(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().list_calls.clone()
    }

    /// Make every list call fail until cleared.
    pub fn fail_list(&self, message: impl Into<String>) {
        self.state.lock().unwrap().list_error = Some(message.into());
    }

    /// Make deleting `namespace/name` fail with an API error.
    pub fn fail_delete(&self, key: impl Into<String>, message: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .delete_errors
            .insert(key.into(), message.into());
    }

    /// Keep `namespace/name` listed but answer deletes with not-found,
    /// as if the pod went away between list and delete.
    pub fn vanish_before_delete(&self, key: impl Into<String>) {
        self.state.lock().unwrap().missing.push(key.into());
    }

    /// Run `hook` with `(namespace, name)` on every delete call.
    pub fn on_delete(&self, hook: impl Fn(&str, &str) + Send + Sync + 'static) {
        self.state.lock().unwrap().on_delete = Some(Arc::new(hook));
    }
}

#[async_trait]
impl PodLister for InMemoryCluster {
    async fn list_pods(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<PodSnapshot>, Report<PodClientError>> {
        let mut state = self.state.lock().unwrap();
        state
            .list_calls
            .push((namespace.to_string(), selector.to_string()));

        if let Some(message) = &state.list_error {
            return Err(Report::new(PodClientError::ListFailed {
                message: message.clone(),
            }));
        }

        Ok(state
            .pods
            .iter()
            .filter(|p| namespace.is_empty() || p.namespace == namespace)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PodDeleter for InMemoryCluster {
    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), Report<PodClientError>> {
        let hook = {
            let mut state = self.state.lock().unwrap();
            state.delete_calls.push(format!("{namespace}/{name}"));
            state.on_delete.clone()
        };
        if let Some(hook) = hook {
            hook(namespace, name);
        }

        let mut state = self.state.lock().unwrap();
        let key = format!("{namespace}/{name}");
        if let Some(message) = state.delete_errors.get(&key) {
            return Err(Report::new(PodClientError::DeleteFailed {
                message: message.clone(),
            }));
        }
        if state.missing.contains(&key) {
            return Err(Report::new(PodClientError::NotFound));
        }

        let before = state.pods.len();
        state
            .pods
            .retain(|p| !(p.namespace == namespace && p.name == name));
        if state.pods.len() == before {
            return Err(Report::new(PodClientError::NotFound));
        }
        Ok(())
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl TimeSource for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
