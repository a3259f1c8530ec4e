use std::path::PathBuf;

use error_stack::Report;
use error_stack::ResultExt;
use kube::config::KubeConfigOptions;
use kube::config::Kubeconfig;
use kube::Client;
use kube::Config;

use crate::domain::PodClientError;

/// Builds a client from `kubeconfig`, or from the in-cluster environment
/// (falling back to `~/.kube/config`) when no path is given.
///
/// `context` selects a kubeconfig context and is only used together with a path.
pub async fn init_kube_client(
    kubeconfig: Option<PathBuf>,
    context: Option<String>,
) -> Result<Client, Report<PodClientError>> {
    let client = match kubeconfig {
        Some(kubeconfig_path) => {
            let kubeconfig = Kubeconfig::read_from(&kubeconfig_path).change_context(
                PodClientError::ConnectionFailed {
                    message: format!(
                        "pod-deleter could not read kubeconfig {}",
                        kubeconfig_path.display()
                    ),
                },
            )?;

            let options = KubeConfigOptions {
                context,
                ..Default::default()
            };
            let config = Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .change_context(PodClientError::ConnectionFailed {
                    message: format!(
                        "pod-deleter could not resolve context {} in kubeconfig {}",
                        options.context.as_deref().unwrap_or("<current>"),
                        kubeconfig_path.display()
                    ),
                })?;

            Client::try_from(config).change_context(PodClientError::ConnectionFailed {
                message: format!(
                    "pod-deleter could not connect using kubeconfig {}",
                    kubeconfig_path.display()
                ),
            })?
        }
        None => {
            if context.is_some() {
                tracing::warn!("--context is ignored without --kubeconfig");
            }
            Client::try_default().await.change_context(PodClientError::ConnectionFailed {
                message: "pod-deleter could not connect using the in-cluster or default config"
                    .to_string(),
            })?
        }
    };
    Ok(client)
}
