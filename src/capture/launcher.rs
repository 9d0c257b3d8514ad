use anyhow::{bail, Context, Result};
use std::{future::Future, io, path::PathBuf, process::Stdio, sync::Arc};
use tokio::process::Command;

use crate::models::ArtifactKind;

use super::CaptureBackend;

/// One external capture command and the artifact it is expected to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureCommand {
    pub kind: ArtifactKind,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub output: PathBuf,
}

/// Runs capture subprocesses.
///
/// `run` resolves with the exit code once the child exits (`None` when it was
/// killed by a signal). Dropping the future must terminate the child; the
/// audio supervisor relies on this to stop a recording.
pub trait ProcessLauncher: Send + Sync + 'static {
    fn run(&self, command: CaptureCommand)
        -> impl Future<Output = io::Result<Option<i32>>> + Send;
}

/// Writes a single screenshot to a path.
pub trait ScreenGrabber: Send + Sync + 'static {
    fn grab(&self, output: PathBuf) -> impl Future<Output = Result<()>> + Send;
}

/// Launcher backed by `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioLauncher;

impl ProcessLauncher for TokioLauncher {
    fn run(
        &self,
        command: CaptureCommand,
    ) -> impl Future<Output = io::Result<Option<i32>>> + Send {
        async move {
            let mut child = Command::new(&command.program)
                .args(&command.args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                // ffmpeg is chatty on stderr; an unread pipe would eventually block it.
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .spawn()?;

            let status = child.wait().await?;
            Ok(status.code())
        }
    }
}

/// Screen grabber that runs a one-frame ffmpeg capture of the desktop.
pub struct FfmpegScreenGrabber<L> {
    launcher: Arc<L>,
    program: PathBuf,
    backend: CaptureBackend,
}

impl<L: ProcessLauncher> FfmpegScreenGrabber<L> {
    pub fn new(launcher: Arc<L>, program: PathBuf, backend: CaptureBackend) -> Self {
        Self {
            launcher,
            program,
            backend,
        }
    }

    pub fn command(&self, output: PathBuf) -> CaptureCommand {
        CaptureCommand {
            kind: ArtifactKind::Screenshot,
            program: self.program.clone(),
            args: CaptureBackend::still_args(self.backend.screen_input(), &output),
            output,
        }
    }
}

impl<L: ProcessLauncher> ScreenGrabber for FfmpegScreenGrabber<L> {
    fn grab(&self, output: PathBuf) -> impl Future<Output = Result<()>> + Send {
        let command = self.command(output);
        let launcher = Arc::clone(&self.launcher);
        async move {
            let code = launcher
                .run(command.clone())
                .await
                .with_context(|| format!("failed to launch {}", command.program.display()))?;
            match code {
                Some(0) => Ok(()),
                Some(code) => bail!("screen capture exited with code {code}"),
                None => bail!("screen capture terminated by signal"),
            }
        }
    }
}
