use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

/// Raw flag bitmask as delivered by a backend.
///
/// fanotify masks are 64 bits wide, FSEvents flags 32; both fit here.
pub type EventMask = u64;

/// What kind of filesystem object an event concerns, as classified by the
/// backend that delivered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Unknown,
}

/// Record terminator written after every emitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Terminator {
    #[default]
    Newline,
    Nul,
}

impl Terminator {
    pub fn from_nul_flag(nul: bool) -> Self {
        if nul { Terminator::Nul } else { Terminator::Newline }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Terminator::Newline => b'\n',
            Terminator::Nul => b'\0',
        }
    }
}

/// Which notification mechanism feeds the watch loop.
///
/// - `Fanotify`: Linux file-handle queue (needs CAP_SYS_ADMIN).
/// - `Fsevents`: macOS path-based event stream.
/// - `Notify`: portable path-based fallback built on the `notify` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Fanotify,
    Fsevents,
    Notify,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Fanotify => "fanotify",
            BackendKind::Fsevents => "fsevents",
            BackendKind::Notify => "notify",
        }
    }

    /// Whether this backend can subscribe on the current platform.
    pub fn is_available(self) -> bool {
        match self {
            BackendKind::Fanotify => cfg!(target_os = "linux"),
            BackendKind::Fsevents => cfg!(target_os = "macos"),
            BackendKind::Notify => true,
        }
    }
}

impl Default for BackendKind {
    fn default() -> Self {
        if cfg!(target_os = "linux") {
            BackendKind::Fanotify
        } else if cfg!(target_os = "macos") {
            BackendKind::Fsevents
        } else {
            BackendKind::Notify
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fanotify" => Ok(BackendKind::Fanotify),
            "fsevents" => Ok(BackendKind::Fsevents),
            "notify" => Ok(BackendKind::Notify),
            other => Err(format!(
                "invalid backend: {other} (expected \"fanotify\", \"fsevents\" or \"notify\")"
            )),
        }
    }
}
