pub mod capture;
pub mod models;
pub mod server;
pub mod settings;
mod utils;

use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc};

use capture::{CaptureSupervisor, ConsoleNotifier, FfmpegScreenGrabber, TokioLauncher};
use settings::CaptureSettings;

const CONFIG_ENV: &str = "CAPTURE_SUPERVISOR_CONFIG";

fn config_path() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("capture-settings.json"))
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let path = config_path();
    let settings = CaptureSettings::load(&path)?;
    log::info!(
        "capture-supervisor starting (settings: {}, backend: {:?})",
        path.display(),
        settings.backend()
    );

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(async move {
        let launcher = Arc::new(TokioLauncher);
        let grabber = Arc::new(FfmpegScreenGrabber::new(
            Arc::clone(&launcher),
            settings.ffmpeg_path.clone(),
            settings.backend(),
        ));
        let mut supervisor =
            CaptureSupervisor::new(settings, launcher, grabber, Arc::new(ConsoleNotifier));

        supervisor.start().await?;
        if let Some(addr) = supervisor.server_addr() {
            log::info!("Artifacts served at http://{addr}/ (Ctrl-C to stop)");
        }

        let interrupted = tokio::signal::ctrl_c().await;
        supervisor.stop().await;
        interrupted.context("failed to listen for Ctrl-C")
    })
}
