use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactKind {
    Snapshot,
    Screenshot,
    Recording,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Snapshot,
        ArtifactKind::Screenshot,
        ArtifactKind::Recording,
    ];

    /// Directory name under the media root, also the URL prefix on the artifact server.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ArtifactKind::Snapshot => "snapshots",
            ArtifactKind::Screenshot => "screenshots",
            ArtifactKind::Recording => "recordings",
        }
    }

    pub fn file_prefix(&self) -> &'static str {
        match self {
            ArtifactKind::Snapshot => "snap",
            ArtifactKind::Screenshot => "screen",
            ArtifactKind::Recording => "audio",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Snapshot | ArtifactKind::Screenshot => "jpg",
            ArtifactKind::Recording => "wav",
        }
    }
}

/// The three artifact directories of one media root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDirs {
    pub root: PathBuf,
}

impl ArtifactDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn dir(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Creates the root and all artifact directories. Existing directories are left alone.
    pub fn ensure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        for kind in ArtifactKind::ALL {
            std::fs::create_dir_all(self.dir(kind))?;
        }
        Ok(())
    }
}

/// Generates write-once artifact paths for a single producer.
///
/// Names carry the capture time in unix milliseconds. Two names requested
/// within the same millisecond get an increasing `_<n>` suffix so a fast
/// producer never overwrites its previous file.
#[derive(Debug)]
pub struct ArtifactNamer {
    kind: ArtifactKind,
    dir: PathBuf,
    last_millis: Option<i64>,
    same_millis_count: u32,
}

impl ArtifactNamer {
    pub fn new(kind: ArtifactKind, dir: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            dir: dir.into(),
            last_millis: None,
            same_millis_count: 0,
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn next_path(&mut self) -> PathBuf {
        self.path_at(Utc::now())
    }

    pub fn path_at(&mut self, at: DateTime<Utc>) -> PathBuf {
        let millis = at.timestamp_millis();

        // Clock steps backwards are treated like a repeat of the last millisecond.
        let millis = match self.last_millis {
            Some(last) if millis <= last => {
                self.same_millis_count += 1;
                last
            }
            _ => {
                self.same_millis_count = 0;
                millis
            }
        };
        self.last_millis = Some(millis);

        let file_name = if self.same_millis_count == 0 {
            format!(
                "{}_{}.{}",
                self.kind.file_prefix(),
                millis,
                self.kind.extension()
            )
        } else {
            format!(
                "{}_{}_{}.{}",
                self.kind.file_prefix(),
                millis,
                self.same_millis_count,
                self.kind.extension()
            )
        };

        self.dir.join(file_name)
    }
}
