use serde::{Deserialize, Serialize};
use std::path::Path;

/// Platform capture backend. Each variant knows the ffmpeg input syntax for
/// the camera, the microphone and the screen on its platform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CaptureBackend {
    /// Windows DirectShow devices.
    DirectShow,
    /// macOS AVFoundation devices.
    AvFoundation,
    /// Video4Linux camera, PulseAudio microphone, X11 screen.
    Generic,
}

impl CaptureBackend {
    pub fn detect() -> Self {
        if cfg!(target_os = "windows") {
            CaptureBackend::DirectShow
        } else if cfg!(target_os = "macos") {
            CaptureBackend::AvFoundation
        } else {
            CaptureBackend::Generic
        }
    }

    pub fn default_camera(&self) -> &'static str {
        match self {
            CaptureBackend::DirectShow => "Integrated Webcam",
            CaptureBackend::AvFoundation => "0",
            CaptureBackend::Generic => "/dev/video0",
        }
    }

    pub fn default_microphone(&self) -> &'static str {
        match self {
            CaptureBackend::DirectShow => "Microphone Array",
            CaptureBackend::AvFoundation => "0",
            CaptureBackend::Generic => "default",
        }
    }

    pub fn camera_input(&self, device: &str) -> Vec<String> {
        match self {
            CaptureBackend::DirectShow => args(["-f", "dshow", "-i", format!("video={device}").as_str()]),
            CaptureBackend::AvFoundation => {
                args(["-f", "avfoundation", "-framerate", "30", "-i", device])
            }
            CaptureBackend::Generic => args(["-f", "v4l2", "-i", device]),
        }
    }

    pub fn microphone_input(&self, device: &str) -> Vec<String> {
        match self {
            CaptureBackend::DirectShow => args(["-f", "dshow", "-i", format!("audio={device}").as_str()]),
            CaptureBackend::AvFoundation => args(["-f", "avfoundation", "-i", format!(":{device}").as_str()]),
            CaptureBackend::Generic => args(["-f", "pulse", "-i", device]),
        }
    }

    pub fn screen_input(&self) -> Vec<String> {
        match self {
            CaptureBackend::DirectShow => args(["-f", "gdigrab", "-i", "desktop"]),
            CaptureBackend::AvFoundation => args(["-f", "avfoundation", "-i", "Capture screen 0"]),
            CaptureBackend::Generic => {
                let display = std::env::var("DISPLAY").unwrap_or_else(|_| ":0".into());
                args(["-f", "x11grab", "-i", display.as_str()])
            }
        }
    }

    /// Single-frame grab from `input` at high JPEG quality.
    pub fn still_args(input: Vec<String>, output: &Path) -> Vec<String> {
        let mut out = input;
        out.extend(args(["-vframes", "1", "-q:v", "2", "-y"]));
        out.push(output.display().to_string());
        out
    }

    /// Mono 16 kHz recording from `input` until the process is terminated.
    pub fn recording_args(input: Vec<String>, output: &Path) -> Vec<String> {
        let mut out = input;
        out.extend(args(["-ac", "1", "-ar", "16000", "-y"]));
        out.push(output.display().to_string());
        out
    }
}

fn args<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_backend_selects_its_own_microphone_syntax() {
        assert_eq!(
            CaptureBackend::DirectShow.microphone_input("Mic"),
            vec!["-f", "dshow", "-i", "audio=Mic"]
        );
        assert_eq!(
            CaptureBackend::AvFoundation.microphone_input("0"),
            vec!["-f", "avfoundation", "-i", ":0"]
        );
        assert_eq!(
            CaptureBackend::Generic.microphone_input("default"),
            vec!["-f", "pulse", "-i", "default"]
        );
    }

    #[test]
    fn still_args_capture_exactly_one_frame() {
        let args = CaptureBackend::still_args(
            CaptureBackend::DirectShow.camera_input("Cam"),
            Path::new("snap_1.jpg"),
        );
        assert_eq!(
            args,
            vec!["-f", "dshow", "-i", "video=Cam", "-vframes", "1", "-q:v", "2", "-y", "snap_1.jpg"]
        );
    }

    #[test]
    fn recording_args_are_mono_16khz() {
        let args = CaptureBackend::recording_args(
            CaptureBackend::Generic.microphone_input("default"),
            Path::new("audio_1.wav"),
        );
        assert_eq!(args[4..], ["-ac", "1", "-ar", "16000", "-y", "audio_1.wav"]);
    }

    #[test]
    fn backend_names_round_trip_through_config_strings() {
        let parsed: CaptureBackend = serde_json::from_str("\"directShow\"").unwrap();
        assert_eq!(parsed, CaptureBackend::DirectShow);
    }
}
