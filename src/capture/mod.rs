pub mod backend;
pub mod controller;
pub mod launcher;
pub mod loop_worker;
pub mod notifier;
pub mod state;

pub use backend::CaptureBackend;
pub use controller::{CaptureSupervisor, STARTED_NOTICE, STOPPED_NOTICE};
pub use launcher::{CaptureCommand, FfmpegScreenGrabber, ProcessLauncher, ScreenGrabber, TokioLauncher};
pub use notifier::{ConsoleNotifier, Notifier};
pub use state::{CaptureSession, SessionStatus};
