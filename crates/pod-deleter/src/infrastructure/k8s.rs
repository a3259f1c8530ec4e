//! Cluster access port backed by the Kubernetes API.

use async_trait::async_trait;
use error_stack::Report;
use k8s_openapi::api::core::v1::Pod;
use kube::api::DeleteParams;
use kube::api::ListParams;
use kube::Api;
use kube::Client;

use crate::domain::PodClientError;
use crate::domain::PodDeleter;
use crate::domain::PodLister;
use crate::domain::PodSnapshot;

/// Lists and deletes pods through a [`kube::Client`].
#[derive(Clone)]
pub struct KubePodClient {
    client: Client,
}

impl KubePodClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<Pod> {
        if namespace.is_empty() {
            Api::all(self.client.clone())
        } else {
            Api::namespaced(self.client.clone(), namespace)
        }
    }
}

fn list_params(selector: &str) -> ListParams {
    let params = ListParams::default();
    if selector.is_empty() {
        params
    } else {
        params.labels(selector)
    }
}

fn is_not_found(error: &kube::Error) -> bool {
    matches!(error, kube::Error::Api(response) if response.code == 404)
}

#[async_trait]
impl PodLister for KubePodClient {
    async fn list_pods(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<PodSnapshot>, Report<PodClientError>> {
        let pods = self
            .api(namespace)
            .list(&list_params(selector))
            .await
            .map_err(|e| {
                Report::new(PodClientError::ListFailed {
                    message: format!("namespace={namespace:?} selector={selector:?}"),
                })
                .attach_printable(format!("Kubernetes API error: {e}"))
            })?;

        Ok(pods.items.iter().map(PodSnapshot::from).collect())
    }
}

#[async_trait]
impl PodDeleter for KubePodClient {
    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), Report<PodClientError>> {
        match self
            .api(namespace)
            .delete(name, &DeleteParams::default())
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_not_found(&e) => Err(Report::new(PodClientError::NotFound)),
            Err(e) => Err(Report::new(PodClientError::DeleteFailed {
                message: format!("{namespace}/{name}"),
            })
            .attach_printable(format!("Kubernetes API error: {e}"))),
        }
    }
}
