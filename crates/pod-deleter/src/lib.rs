//! Deletes Kubernetes pods that are stuck in failure states such as
//! `CrashLoopBackOff`, so their owning controller recreates them.

pub mod config;
pub mod controller;
pub mod domain;
pub mod infrastructure;

pub use controller::Controller;
pub use controller::ControllerBuilder;
pub use controller::ControllerError;
pub use controller::StopHandle;
