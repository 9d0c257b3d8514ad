use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::{net::SocketAddr, sync::Arc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    models::{ArtifactDirs, ArtifactKind, ArtifactNamer},
    server::ArtifactServer,
    settings::CaptureSettings,
};

use super::{
    loop_worker::{audio_supervisor, screenshot_loop, snapshot_loop, DeviceCommands},
    CaptureSession, Notifier, ProcessLauncher, ScreenGrabber, SessionStatus,
};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub const STARTED_NOTICE: &str = "Continuous capture started: camera, screen and audio";
pub const STOPPED_NOTICE: &str = "All captures stopped";

/// Owns one capture session: the snapshot and screenshot timers, the audio
/// supervisor and the artifact server.
pub struct CaptureSupervisor<L, G, N> {
    settings: CaptureSettings,
    launcher: Arc<L>,
    grabber: Arc<G>,
    notifier: Arc<N>,
    session: CaptureSession,
}

impl<L, G, N> CaptureSupervisor<L, G, N>
where
    L: ProcessLauncher,
    G: ScreenGrabber,
    N: Notifier,
{
    pub fn new(settings: CaptureSettings, launcher: Arc<L>, grabber: Arc<G>, notifier: Arc<N>) -> Self {
        Self {
            settings,
            launcher,
            grabber,
            notifier,
            session: CaptureSession::new(),
        }
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    pub fn dirs(&self) -> ArtifactDirs {
        ArtifactDirs::new(&self.settings.media_dir)
    }

    pub fn server_addr(&self) -> Option<SocketAddr> {
        self.session.server.as_ref().map(ArtifactServer::local_addr)
    }

    pub async fn start(&mut self) -> Result<()> {
        if self.session.status != SessionStatus::Stopped {
            bail!("capture already active");
        }

        let session_id = Uuid::new_v4().to_string();
        let cancel = CancellationToken::new();
        self.session.begin(session_id.clone(), cancel.clone());

        if let Err(err) = self.launch(&cancel).await {
            // Roll back whatever did start; no stop notice for a session that never ran.
            self.teardown().await;
            return Err(err);
        }

        self.session.mark_running(Utc::now());
        log_info!("capture session {session_id} running");
        self.notifier.info(STARTED_NOTICE);
        Ok(())
    }

    async fn launch(&mut self, cancel: &CancellationToken) -> Result<()> {
        let dirs = self.dirs();
        dirs.ensure().with_context(|| {
            format!("failed to create media directories under {}", dirs.root.display())
        })?;

        let server = ArtifactServer::bind(self.settings.port, &dirs, cancel.child_token()).await?;
        self.session.server = Some(server);

        let backend = self.settings.backend();
        let devices = Arc::new(DeviceCommands {
            program: self.settings.ffmpeg_path.clone(),
            backend,
            camera: self
                .settings
                .camera_device
                .clone()
                .unwrap_or_else(|| backend.default_camera().to_string()),
            microphone: self
                .settings
                .microphone_device
                .clone()
                .unwrap_or_else(|| backend.default_microphone().to_string()),
        });

        self.session.image_timer = Some(tokio::spawn(snapshot_loop(
            Arc::clone(&self.launcher),
            Arc::clone(&devices),
            ArtifactNamer::new(ArtifactKind::Snapshot, dirs.dir(ArtifactKind::Snapshot)),
            self.settings.snapshot_interval(),
            cancel.clone(),
        )));

        self.session.screenshot_timer = Some(tokio::spawn(screenshot_loop(
            Arc::clone(&self.grabber),
            ArtifactNamer::new(ArtifactKind::Screenshot, dirs.dir(ArtifactKind::Screenshot)),
            self.settings.screenshot_interval(),
            cancel.clone(),
        )));

        self.session.audio_task = Some(tokio::spawn(audio_supervisor(
            Arc::clone(&self.launcher),
            devices,
            Arc::clone(&self.notifier),
            ArtifactNamer::new(ArtifactKind::Recording, dirs.dir(ArtifactKind::Recording)),
            self.settings.audio_restart_delay(),
            cancel.clone(),
        )));

        Ok(())
    }

    /// Cancels everything the session holds. Safe on a stopped or half-started
    /// session and safe to call repeatedly.
    pub async fn stop(&mut self) {
        let was_running = self.session.status == SessionStatus::Running;
        self.teardown().await;

        if was_running {
            self.notifier.info(STOPPED_NOTICE);
            log_info!("All capture processes stopped.");
        }
    }

    async fn teardown(&mut self) {
        let handles = self.session.clear();

        if let Some(token) = handles.cancel {
            token.cancel();
        }

        for task in handles.tasks {
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    log_warn!("capture task ended abnormally: {err}");
                }
            }
        }

        if let Some(server) = handles.server {
            server.shutdown().await;
        }
    }
}
