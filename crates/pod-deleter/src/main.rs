use anyhow::Result;
use clap::Parser;
use error_stack::Report;
use pod_deleter::config::Cli;
use pod_deleter::controller::StopHandle;
use pod_deleter::infrastructure::init_kube_client;
use pod_deleter::infrastructure::KubePodClient;
use pod_deleter::ControllerBuilder;
use tokio_util::sync::CancellationToken;
use utils::version;

/// Sets up global panic hooks.
fn setup_global_hooks() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        tracing::error!("Thread panicked: {}", panic_info);
    }));
}

fn into_anyhow<C>(report: Report<C>) -> anyhow::Error {
    anyhow::anyhow!("{report:?}")
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_global_hooks();

    let cli = Cli::parse();
    utils::logging::init(cli.log_level);

    tracing::info!("Starting pod-deleter {}", &**version::VERSION);

    let client = init_kube_client(cli.kubeconfig.clone(), cli.context.clone())
        .await
        .map_err(into_anyhow)?;
    let pods = KubePodClient::new(client);

    let controller = cli
        .configure(ControllerBuilder::new(pods.clone(), pods))
        .build()
        .map_err(into_anyhow)?;

    tracing::info!(
        namespace = %controller.policy().namespace,
        selector = %controller.policy().selector,
        grace = ?controller.policy().grace,
        interval = ?controller.interval(),
        reasons = ?controller.policy().reasons.sorted(),
        dry_run = controller.policy().dry_run,
        "controller configured"
    );

    if cli.once {
        let summary = controller
            .once(&CancellationToken::new())
            .await
            .map_err(into_anyhow)?;
        tracing::info!(deleted = summary.deleted, "single pass completed");
        return Ok(());
    }

    spawn_signal_handler(controller.stop_handle())?;

    controller.run_loop().await.map_err(into_anyhow)?;

    tracing::info!("pod-deleter stopped");
    Ok(())
}

/// Stops the controller loop on SIGTERM or SIGINT.
#[cfg(unix)]
fn spawn_signal_handler(stop: StopHandle) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, initiating graceful shutdown");
            }
        }
        stop.stop();
    });
    Ok(())
}

/// Stops the controller loop on Ctrl+C.
#[cfg(not(unix))]
fn spawn_signal_handler(stop: StopHandle) -> Result<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                stop.stop();
            }
            Err(e) => tracing::error!("Failed to listen for Ctrl+C: {e}"),
        }
    });
    Ok(())
}
