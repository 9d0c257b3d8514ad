//! Shared fakes for supervisor integration tests.

use std::{
    future::Future,
    io,
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use anyhow::{bail, Result};
use capture_supervisor_lib::{
    capture::{CaptureCommand, CaptureSupervisor, Notifier, ProcessLauncher, ScreenGrabber},
    models::ArtifactKind,
    settings::CaptureSettings,
};

/// Scripted stand-in for ffmpeg.
pub struct FakeLauncher {
    pub calls: Mutex<Vec<CaptureCommand>>,
    pub live_recordings: Arc<AtomicUsize>,
    pub snapshot_exit: Option<i32>,
    /// How long each recording runs before exiting; `None` runs until dropped.
    pub recording_runtime: Option<Duration>,
    pub recording_exit: Option<i32>,
    pub binary_missing: bool,
}

impl Default for FakeLauncher {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            live_recordings: Arc::new(AtomicUsize::new(0)),
            snapshot_exit: Some(0),
            recording_runtime: None,
            recording_exit: Some(0),
            binary_missing: false,
        }
    }
}

impl FakeLauncher {
    pub fn count(&self, kind: ArtifactKind) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|command| command.kind == kind)
            .count()
    }

    pub fn outputs(&self, kind: ArtifactKind) -> Vec<PathBuf> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|command| command.kind == kind)
            .map(|command| command.output.clone())
            .collect()
    }

    pub fn live_recordings(&self) -> usize {
        self.live_recordings.load(Ordering::SeqCst)
    }
}

/// Decrements the live counter when the fake child goes away, killed or not.
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ProcessLauncher for FakeLauncher {
    fn run(
        &self,
        command: CaptureCommand,
    ) -> impl Future<Output = io::Result<Option<i32>>> + Send {
        let kind = command.kind;
        self.calls.lock().unwrap().push(command);

        let missing = self.binary_missing;
        let snapshot_exit = self.snapshot_exit;
        let runtime = self.recording_runtime;
        let recording_exit = self.recording_exit;
        let live = Arc::clone(&self.live_recordings);

        async move {
            if missing {
                return Err(io::Error::new(io::ErrorKind::NotFound, "ffmpeg"));
            }
            match kind {
                ArtifactKind::Recording => {
                    live.fetch_add(1, Ordering::SeqCst);
                    let _guard = LiveGuard(live);
                    match runtime {
                        Some(runtime) => tokio::time::sleep(runtime).await,
                        None => std::future::pending::<()>().await,
                    }
                    Ok(recording_exit)
                }
                _ => Ok(snapshot_exit),
            }
        }
    }
}

#[derive(Default)]
pub struct FakeGrabber {
    grabs: AtomicUsize,
    pub fail: bool,
}

impl FakeGrabber {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn grabs(&self) -> usize {
        self.grabs.load(Ordering::SeqCst)
    }
}

impl ScreenGrabber for FakeGrabber {
    fn grab(&self, output: PathBuf) -> impl Future<Output = Result<()>> + Send {
        self.grabs.fetch_add(1, Ordering::SeqCst);
        let fail = self.fail;
        async move {
            if fail {
                bail!("no display");
            }
            std::fs::write(&output, b"jpg")?;
            Ok(())
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub infos: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

pub const SNAPSHOT_PERIOD: Duration = Duration::from_secs(10);
pub const SCREENSHOT_PERIOD: Duration = Duration::from_secs(15);

pub fn test_settings(media_dir: PathBuf) -> CaptureSettings {
    CaptureSettings {
        media_dir,
        port: 0,
        snapshot_interval_ms: SNAPSHOT_PERIOD.as_millis() as u64,
        screenshot_interval_ms: SCREENSHOT_PERIOD.as_millis() as u64,
        audio_restart_delay_ms: 0,
        ..CaptureSettings::default()
    }
}

pub struct Harness {
    pub supervisor: CaptureSupervisor<FakeLauncher, FakeGrabber, RecordingNotifier>,
    pub launcher: Arc<FakeLauncher>,
    pub grabber: Arc<FakeGrabber>,
    pub notifier: Arc<RecordingNotifier>,
    pub media_dir: PathBuf,
    _tmp: tempfile::TempDir,
}

#[allow(dead_code)]
pub fn harness(launcher: FakeLauncher, grabber: FakeGrabber) -> Harness {
    harness_with(launcher, grabber, |_| {})
}

#[allow(dead_code)]
pub fn harness_with(
    launcher: FakeLauncher,
    grabber: FakeGrabber,
    tweak: impl FnOnce(&mut CaptureSettings),
) -> Harness {
    let tmp = tempfile::tempdir().expect("tempdir");
    let media_dir = tmp.path().join("media");
    let mut settings = test_settings(media_dir.clone());
    tweak(&mut settings);

    let launcher = Arc::new(launcher);
    let grabber = Arc::new(grabber);
    let notifier = Arc::new(RecordingNotifier::default());
    let supervisor = CaptureSupervisor::new(
        settings,
        Arc::clone(&launcher),
        Arc::clone(&grabber),
        Arc::clone(&notifier),
    );

    Harness {
        supervisor,
        launcher,
        grabber,
        notifier,
        media_dir,
        _tmp: tmp,
    }
}

#[allow(dead_code)]
/// Sleeps on the paused test clock; spawned ticks run before time moves past them.
pub async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Lets freshly spawned capture tasks take their first step.
#[allow(dead_code)]
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Just past `n` whole periods.
#[allow(dead_code)]
pub fn periods(period: Duration, n: u32) -> Duration {
    period * n + Duration::from_millis(5)
}
