// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::config::validate::{validate_debounce, validate_root};
use crate::errors::Result;
use crate::events::DefaultMasks;
use crate::events::MaskTarget;
use crate::types::{BackendKind, EventMask, Terminator};

/// Default stale-notice debounce window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Optional configuration file, as read from TOML.
///
/// ```toml
/// [watch]
/// backend = "fanotify"
/// file_events = ["FAN_CREATE", "FAN_CLOSE_WRITE"]
/// dir_events = ["FAN_CREATE"]
/// generic = false
/// null_terminator = false
/// debounce_ms = 50
/// ```
///
/// Every key is optional; unknown keys are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub watch: WatchSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    #[serde(default)]
    pub backend: Option<BackendKind>,

    /// Event names for files. Unknown names are ignored like on the CLI.
    #[serde(default)]
    pub file_events: Option<Vec<String>>,

    #[serde(default)]
    pub dir_events: Option<Vec<String>>,

    #[serde(default)]
    pub generic: bool,

    #[serde(default)]
    pub null_terminator: bool,

    #[serde(default)]
    pub debounce_ms: Option<u64>,
}

/// Everything needed to build a [`WatchConfig`] once masks are parsed.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub root: PathBuf,
    pub file_mask: EventMask,
    pub dir_mask: EventMask,
    pub generic: bool,
    pub terminator: Terminator,
    pub debounce: Duration,
}

/// Immutable watch configuration, constructed once at startup.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    root: PathBuf,
    file_mask: EventMask,
    dir_mask: EventMask,
    generic: bool,
    terminator: Terminator,
    debounce: Duration,
}

impl WatchConfig {
    /// Validate `options` and freeze them.
    ///
    /// The root is canonicalized and must be a directory. If both masks are
    /// empty they are replaced by the backend defaults for the chosen mode.
    pub fn new(options: WatchOptions, defaults: &DefaultMasks) -> Result<Self> {
        let root = validate_root(&options.root)?;
        validate_debounce(options.debounce)?;

        let (file_mask, dir_mask) = if options.file_mask == 0 && options.dir_mask == 0 {
            (
                defaults.get(options.generic, MaskTarget::Files),
                defaults.get(options.generic, MaskTarget::Dirs),
            )
        } else {
            (options.file_mask, options.dir_mask)
        };

        Ok(Self {
            root,
            file_mask,
            dir_mask,
            generic: options.generic,
            terminator: options.terminator,
            debounce: options.debounce,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file_mask(&self) -> EventMask {
        self.file_mask
    }

    pub fn dir_mask(&self) -> EventMask {
        self.dir_mask
    }

    pub fn generic(&self) -> bool {
        self.generic
    }

    pub fn terminator(&self) -> Terminator {
        self.terminator
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}
