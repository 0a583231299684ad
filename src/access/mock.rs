// src/access/mock.rs

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::AccessFilter;
use crate::errors::Result;

/// Deny-list filter for tests. Everything is visible unless denied.
///
/// Clones share the same list, so a test can keep one handle and deny
/// paths after the pipeline took ownership of another.
#[derive(Debug, Clone, Default)]
pub struct MockAccessFilter {
    denied: Arc<Mutex<HashSet<PathBuf>>>,
    probes: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockAccessFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide `path` and everything below it.
    pub fn deny(&self, path: impl AsRef<Path>) {
        self.denied
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.as_ref().to_path_buf());
    }

    /// Every path probed so far, in order.
    pub fn probed(&self) -> Vec<PathBuf> {
        self.probes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AccessFilter for MockAccessFilter {
    fn caller_can_see(&self, path: &Path) -> Result<bool> {
        self.probes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_path_buf());

        let denied = self.denied.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(!denied.iter().any(|d| path.starts_with(d)))
    }
}
