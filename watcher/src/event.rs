//! Change events produced by directory watching.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A detected filesystem change.
///
/// Immutable after construction; the watcher hands ownership to the
/// acknowledgment controller on dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// The kind of change.
    pub kind: ChangeKind,

    /// Short identifier of the affected entry (its file name).
    pub name: String,

    /// Full path of the affected entry.
    pub path: PathBuf,

    /// When the change was detected. Set once, never mutated.
    pub detected_at: DateTime<Utc>,

    /// What kind of entry was affected, captured at detection time.
    pub entry: EntryKind,
}

impl ChangeEvent {
    /// Create a new change event detected now.
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            kind,
            name,
            entry: EntryKind::from_path(&path),
            path,
            detected_at: Utc::now(),
        }
    }

    /// Human-readable message for the acknowledgment collaborator,
    /// e.g. `Folder releases Created!`.
    pub fn message(&self) -> String {
        format!("{} {} {}!", self.entry.label(), self.name, self.kind)
    }
}

/// Kind of change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Entry was created.
    Created,

    /// Entry was deleted.
    Deleted,

    /// Entry was renamed.
    Renamed,
}

impl ChangeKind {
    /// Map a raw notify event kind onto a change kind.
    ///
    /// Only structural changes are watched; modifications, metadata and
    /// access events yield `None`. A rename's `From` half is suppressed
    /// as well: the `To` half carries the surviving name.
    pub fn from_notify(kind: &notify::EventKind) -> Option<Self> {
        use notify::EventKind;
        use notify::event::ModifyKind;
        use notify::event::RenameMode;

        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Remove(_) => Some(Self::Deleted),
            EventKind::Modify(ModifyKind::Name(mode)) => match mode {
                RenameMode::From => None,
                _ => Some(Self::Renamed),
            },
            _ => None,
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "Created",
            Self::Deleted => "Deleted",
            Self::Renamed => "Renamed",
        };
        f.write_str(s)
    }
}

/// What kind of entry a change affected.
///
/// Deleted entries can no longer be inspected, so `Unknown` covers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Folder,

    /// The entry could not be inspected.
    Unknown,
}

impl EntryKind {
    /// Inspect a path at detection time.
    pub fn from_path(path: &Path) -> Self {
        if path.is_dir() {
            Self::Folder
        } else if path.is_file() {
            Self::File
        } else {
            Self::Unknown
        }
    }

    /// Label used in operator-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Folder => "Folder",
            Self::Unknown => "Entry",
        }
    }
}
