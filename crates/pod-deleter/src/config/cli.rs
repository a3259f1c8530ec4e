use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use utils::version;

use crate::controller::ControllerBuilder;
use crate::domain::policy::DEFAULT_REASONS;
use crate::domain::PodDeleter;
use crate::domain::PodLister;

/// Delete pods in certain states
#[derive(Parser, Debug, Clone)]
#[command(name = "pod-deleter", about, long_about, version = &**version::VERSION)]
pub struct Cli {
    #[arg(
        long,
        env = "KUBECONFIG",
        value_hint = clap::ValueHint::FilePath,
        help = "Kubernetes client config. If not specified, an in-cluster client is tried"
    )]
    pub kubeconfig: Option<PathBuf>,

    #[arg(
        long,
        help = "Kubernetes client context. Only used if kubeconfig is specified. Defaults to the current context of the file"
    )]
    pub context: Option<String>,

    #[arg(
        long,
        default_value = "",
        help = "Only consider pods in this namespace. Default is all namespaces"
    )]
    pub namespace: String,

    #[arg(
        long,
        default_value = "",
        help = "Only consider pods that match this label selector. Default is all pods"
    )]
    pub selector: String,

    #[arg(long, help = "Run the controller loop once and exit")]
    pub once: bool,

    #[arg(long, help = "Run the controller but do not delete pods")]
    pub dry_run: bool,

    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = DEFAULT_REASONS.map(String::from),
        help = "Reasons to delete a pod, exact match only. May be repeated or comma separated"
    )]
    pub reasons: Vec<String>,

    #[arg(
        long = "grace-period",
        default_value = "1h",
        value_parser = humantime::parse_duration,
        help = "Pods that were created less than this time ago are not considered for deletion"
    )]
    pub grace: Duration,

    #[arg(
        long,
        default_value = "5m",
        value_parser = humantime::parse_duration,
        help = "How often to run the controller loop"
    )]
    pub interval: Duration,

    #[arg(
        long,
        env = "LOG_LEVEL",
        default_value_t = LevelFilter::INFO,
        help = "Log level, overridden per target by RUST_LOG"
    )]
    pub log_level: LevelFilter,
}

impl Cli {
    /// Applies the parsed flags to a controller builder.
    pub fn configure<L: PodLister, D: PodDeleter>(
        &self,
        builder: ControllerBuilder<L, D>,
    ) -> ControllerBuilder<L, D> {
        builder
            .with_namespace(self.namespace.clone())
            .with_selector(self.selector.clone())
            .with_grace(self.grace)
            .with_interval(self.interval)
            .with_reasons(self.reasons.iter().cloned())
            .with_dry_run(self.dry_run)
    }
}
