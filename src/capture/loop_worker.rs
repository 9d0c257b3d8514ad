use std::{io, path::PathBuf, sync::Arc, time::Duration};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::models::{ArtifactKind, ArtifactNamer};

use super::{CaptureBackend, CaptureCommand, Notifier, ProcessLauncher, ScreenGrabber};

// Set to false to silence per-tick capture logs
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Everything the camera and microphone paths need to build their commands.
#[derive(Debug, Clone)]
pub struct DeviceCommands {
    pub program: PathBuf,
    pub backend: CaptureBackend,
    pub camera: String,
    pub microphone: String,
}

impl DeviceCommands {
    pub fn snapshot(&self, output: PathBuf) -> CaptureCommand {
        CaptureCommand {
            kind: ArtifactKind::Snapshot,
            program: self.program.clone(),
            args: CaptureBackend::still_args(self.backend.camera_input(&self.camera), &output),
            output,
        }
    }

    pub fn recording(&self, output: PathBuf) -> CaptureCommand {
        CaptureCommand {
            kind: ArtifactKind::Recording,
            program: self.program.clone(),
            args: CaptureBackend::recording_args(
                self.backend.microphone_input(&self.microphone),
                &output,
            ),
            output,
        }
    }
}

/// Ticks every `period`, first tick one full period after the call, until
/// `cancel` fires. Each tick runs `on_tick` without waiting for earlier ticks.
async fn every<F>(period: Duration, cancel: CancellationToken, mut on_tick: F)
where
    F: FnMut(),
{
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => on_tick(),
        }
    }
}

pub async fn snapshot_loop<L: ProcessLauncher>(
    launcher: Arc<L>,
    devices: Arc<DeviceCommands>,
    mut namer: ArtifactNamer,
    period: Duration,
    cancel: CancellationToken,
) {
    every(period, cancel, || {
        let command = devices.snapshot(namer.next_path());
        tokio::spawn(snapshot_tick(Arc::clone(&launcher), command));
    })
    .await;
    log_debug!("snapshot timer stopped");
}

/// One camera grab. A nonzero exit usually means the camera is busy and is
/// dropped without logging.
pub async fn snapshot_tick<L: ProcessLauncher>(launcher: Arc<L>, command: CaptureCommand) {
    match launcher.run(command.clone()).await {
        Ok(Some(0)) => log_info!("Saved camera snapshot: {}", command.output.display()),
        Ok(_) => {}
        Err(err) => log_error!("camera capture could not start: {err}"),
    }
}

pub async fn screenshot_loop<G: ScreenGrabber>(
    grabber: Arc<G>,
    mut namer: ArtifactNamer,
    period: Duration,
    cancel: CancellationToken,
) {
    every(period, cancel, || {
        let output = namer.next_path();
        tokio::spawn(screenshot_tick(Arc::clone(&grabber), output));
    })
    .await;
    log_debug!("screenshot timer stopped");
}

pub async fn screenshot_tick<G: ScreenGrabber>(grabber: Arc<G>, output: PathBuf) {
    match grabber.grab(output.clone()).await {
        Ok(()) => log_info!("Saved screenshot: {}", output.display()),
        Err(err) => log_error!("screen capture failed: {err:#}"),
    }
}

/// Keeps one microphone recording running for as long as `cancel` is not
/// fired. Every exit is followed by a fresh recording into a new file; there
/// is no restart limit.
pub async fn audio_supervisor<L: ProcessLauncher, N: Notifier>(
    launcher: Arc<L>,
    devices: Arc<DeviceCommands>,
    notifier: Arc<N>,
    mut namer: ArtifactNamer,
    restart_delay: Duration,
    cancel: CancellationToken,
) {
    let mut restarts: u64 = 0;

    while !cancel.is_cancelled() {
        let command = devices.recording(namer.next_path());
        let output = command.output.clone();

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            outcome = launcher.run(command) => outcome,
        };

        match outcome {
            Ok(Some(0)) => log_info!("Audio saved: {}", output.display()),
            Ok(Some(code)) => log_warn!("audio recorder exited with code {code}"),
            Ok(None) => log_warn!("audio recorder terminated by signal"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                notifier.error(&format!(
                    "Audio recorder not found ({}); audio capture disabled",
                    devices.program.display()
                ));
                break;
            }
            Err(err) => log_error!("audio recorder could not start: {err}"),
        }

        if cancel.is_cancelled() {
            break;
        }

        restarts += 1;
        log_debug!("restarting audio recorder (restart #{restarts})");

        if !restart_delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(restart_delay) => {}
            }
        }
    }

    log_debug!("audio supervisor stopped after {restarts} restarts");
}
