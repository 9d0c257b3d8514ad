use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::capture::CaptureBackend;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SNAPSHOT_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_SCREENSHOT_INTERVAL_MS: u64 = 15_000;
pub const DEFAULT_AUDIO_RESTART_DELAY_MS: u64 = 1_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureSettings {
    pub media_dir: PathBuf,
    /// Loopback port of the artifact server. `0` lets the OS pick one.
    pub port: u16,
    pub snapshot_interval_ms: u64,
    pub screenshot_interval_ms: u64,
    pub audio_restart_delay_ms: u64,
    pub ffmpeg_path: PathBuf,
    /// Overrides the backend detected for the current OS.
    pub backend: Option<CaptureBackend>,
    pub camera_device: Option<String>,
    pub microphone_device: Option<String>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            media_dir: PathBuf::from("media"),
            port: DEFAULT_PORT,
            snapshot_interval_ms: DEFAULT_SNAPSHOT_INTERVAL_MS,
            screenshot_interval_ms: DEFAULT_SCREENSHOT_INTERVAL_MS,
            audio_restart_delay_ms: DEFAULT_AUDIO_RESTART_DELAY_MS,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            backend: None,
            camera_device: None,
            microphone_device: None,
        }
    }
}

impl CaptureSettings {
    /// Loads settings from `path`. A missing file yields defaults; a corrupt one
    /// is reported and replaced by defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        match serde_json::from_str(&contents) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                warn!(
                    "Ignoring unreadable settings at {} ({err}); using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }

    pub fn backend(&self) -> CaptureBackend {
        self.backend.unwrap_or_else(CaptureBackend::detect)
    }

    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_millis(self.snapshot_interval_ms.max(1))
    }

    pub fn screenshot_interval(&self) -> Duration {
        Duration::from_millis(self.screenshot_interval_ms.max(1))
    }

    pub fn audio_restart_delay(&self) -> Duration {
        Duration::from_millis(self.audio_restart_delay_ms)
    }
}
