// src/config/validate.rs

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{OgwatchError, Result};
use crate::types::BackendKind;

/// Upper bound for the stale-notice debounce window.
pub const MAX_DEBOUNCE: Duration = Duration::from_secs(10);

/// Canonicalize the watch root and make sure it is a directory.
///
/// Kernel-resolved paths are always canonical, so the root-prefix guard
/// only works against a canonical root.
pub fn validate_root(root: &Path) -> Result<PathBuf> {
    let canonical = root.canonicalize().map_err(|source| OgwatchError::Os {
        op: "open watch root",
        source: io::Error::new(source.kind(), format!("{}: {source}", root.display())),
    })?;

    if !canonical.is_dir() {
        return Err(OgwatchError::Config(format!(
            "watch root {} is not a directory",
            root.display()
        )));
    }

    Ok(canonical)
}

pub fn validate_debounce(window: Duration) -> Result<()> {
    if window.is_zero() || window > MAX_DEBOUNCE {
        return Err(OgwatchError::Config(format!(
            "debounce_ms must be between 1 and {} (got {})",
            MAX_DEBOUNCE.as_millis(),
            window.as_millis()
        )));
    }
    Ok(())
}

pub fn validate_backend(kind: BackendKind) -> Result<()> {
    if !kind.is_available() {
        return Err(OgwatchError::Config(format!(
            "backend {kind} is not available on this platform"
        )));
    }
    Ok(())
}
