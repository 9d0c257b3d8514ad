use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::server::ArtifactServer;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    #[default]
    Stopped,
    Starting,
    Running,
}

/// Handles owned by one capture session. Each slot holds at most one live task.
#[derive(Default)]
pub struct CaptureSession {
    pub id: Option<String>,
    pub status: SessionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub(crate) cancel: Option<CancellationToken>,
    pub(crate) image_timer: Option<JoinHandle<()>>,
    pub(crate) screenshot_timer: Option<JoinHandle<()>>,
    pub(crate) audio_task: Option<JoinHandle<()>>,
    pub(crate) server: Option<ArtifactServer>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|token| !token.is_cancelled())
            .unwrap_or(false)
    }

    /// Number of timers, tasks and servers still held by the session.
    pub fn live_handles(&self) -> usize {
        [
            self.image_timer.is_some(),
            self.screenshot_timer.is_some(),
            self.audio_task.is_some(),
            self.server.is_some(),
        ]
        .into_iter()
        .filter(|live| *live)
        .count()
    }

    pub fn begin(&mut self, id: String, token: CancellationToken) {
        *self = Self {
            id: Some(id),
            status: SessionStatus::Starting,
            cancel: Some(token),
            ..Self::default()
        };
    }

    pub fn mark_running(&mut self, at: DateTime<Utc>) {
        self.status = SessionStatus::Running;
        self.started_at = Some(at);
    }

    /// Takes every handle out of the session and resets it to `Stopped`.
    pub(crate) fn clear(&mut self) -> SessionHandles {
        let handles = SessionHandles {
            cancel: self.cancel.take(),
            tasks: [
                self.image_timer.take(),
                self.screenshot_timer.take(),
                self.audio_task.take(),
            ]
            .into_iter()
            .flatten()
            .collect(),
            server: self.server.take(),
        };
        *self = Self::default();
        handles
    }
}

pub(crate) struct SessionHandles {
    pub cancel: Option<CancellationToken>,
    pub tasks: Vec<JoinHandle<()>>,
    pub server: Option<ArtifactServer>,
}
