#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use ogwatch::backend;
use ogwatch::config::{WatchConfig, WatchOptions, DEFAULT_DEBOUNCE};
use ogwatch::types::{BackendKind, EventMask, Terminator};

/// Builder for `WatchConfig` to simplify test setup.
///
/// Masks default to empty, so `build` falls back to the backend defaults
/// unless a mask is set.
pub struct WatchConfigBuilder {
    kind: BackendKind,
    options: WatchOptions,
}

impl WatchConfigBuilder {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            kind: BackendKind::Notify,
            options: WatchOptions {
                root: root.as_ref().to_path_buf(),
                file_mask: 0,
                dir_mask: 0,
                generic: false,
                terminator: Terminator::Newline,
                debounce: DEFAULT_DEBOUNCE,
            },
        }
    }

    pub fn backend(mut self, kind: BackendKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn file_mask(mut self, mask: EventMask) -> Self {
        self.options.file_mask = mask;
        self
    }

    pub fn dir_mask(mut self, mask: EventMask) -> Self {
        self.options.dir_mask = mask;
        self
    }

    pub fn generic(mut self, generic: bool) -> Self {
        self.options.generic = generic;
        self
    }

    pub fn nul_terminated(mut self) -> Self {
        self.options.terminator = Terminator::Nul;
        self
    }

    pub fn debounce(mut self, window: Duration) -> Self {
        self.options.debounce = window;
        self
    }

    pub fn build(self) -> WatchConfig {
        let defaults = backend::for_kind(self.kind).default_masks();
        WatchConfig::new(self.options, &defaults).expect("Failed to build valid watch config from builder")
    }
}
