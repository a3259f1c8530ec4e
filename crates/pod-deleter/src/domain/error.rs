use core::error::Error;

/// Errors surfaced by the cluster access port.
#[derive(Debug, derive_more::Display)]
pub enum PodClientError {
    /// The pod no longer exists. Deleting a pod that is already gone is not a failure.
    #[display("Pod not found")]
    NotFound,
    #[display("Failed to connect to Kubernetes API: {message}")]
    ConnectionFailed { message: String },
    #[display("Failed to list pods: {message}")]
    ListFailed { message: String },
    #[display("Failed to delete pod: {message}")]
    DeleteFailed { message: String },
}

impl Error for PodClientError {}
