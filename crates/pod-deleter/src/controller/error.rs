use core::error::Error;

/// Errors returned by the controller.
#[derive(Debug, derive_more::Display)]
pub enum ControllerError {
    #[display("Failed to list pods")]
    ListFailed,
    #[display("Failed to delete pod {namespace}/{name}")]
    DeleteFailed { namespace: String, name: String },
    #[display("Invalid controller option: {message}")]
    InvalidOption { message: String },
    #[display("Controller loop is already running")]
    AlreadyRunning,
    #[display("Reconciliation pass failed")]
    PassFailed,
}

impl Error for ControllerError {}
