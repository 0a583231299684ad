// src/access/mod.rs

//! Access Filter: re-check visibility under the invoking user's identity.
//!
//! The watcher may run with an elevated effective uid (setuid install) so
//! that it can subscribe at all. Before a path is printed it is probed with
//! `lstat` as the *real* uid; paths that caller could not stat are hidden.
//!
//! The probe happens after resolution and before the line is written, so a
//! permission change in between is not caught.

use std::fs;
use std::io;
use std::path::Path;

use tracing::trace;

use crate::errors::{OgwatchError, Result};

pub mod mock;

/// Decides whether the invoking user may learn about `path`.
pub trait AccessFilter {
    /// `Ok(false)` hides the event. `Err` is fatal.
    fn caller_can_see(&self, path: &Path) -> Result<bool>;
}

impl<A: AccessFilter + ?Sized> AccessFilter for &A {
    fn caller_can_see(&self, path: &Path) -> Result<bool> {
        (**self).caller_can_see(path)
    }
}

/// Real and effective user identities, captured once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivilegeContext {
    pub real_uid: libc::uid_t,
    pub effective_uid: libc::uid_t,
}

impl PrivilegeContext {
    pub fn capture() -> Self {
        // SAFETY: getuid/geteuid cannot fail.
        let (real_uid, effective_uid) = unsafe { (libc::getuid(), libc::geteuid()) };
        Self {
            real_uid,
            effective_uid,
        }
    }

    pub fn is_elevated(&self) -> bool {
        self.real_uid != self.effective_uid
    }
}

/// Effective uid switched to the real uid for the guard's lifetime.
///
/// Call [`IdentityGuard::restore`] to get the restore error back; a guard
/// dropped without it still restores, and aborts if that fails since the
/// process would otherwise keep running with the wrong identity.
#[derive(Debug)]
pub struct IdentityGuard {
    effective_uid: libc::uid_t,
    restored: bool,
}

impl IdentityGuard {
    pub fn assume_real(ctx: &PrivilegeContext) -> Result<Self> {
        set_effective_uid(ctx.real_uid, "Failed to drop privileges")?;
        Ok(Self {
            effective_uid: ctx.effective_uid,
            restored: false,
        })
    }

    pub fn restore(mut self) -> Result<()> {
        self.restored = true;
        set_effective_uid(self.effective_uid, "Failed to restore privileges")
    }
}

impl Drop for IdentityGuard {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(err) = set_effective_uid(self.effective_uid, "Failed to restore privileges") {
            eprintln!("ogwatch: {err}");
            std::process::abort();
        }
    }
}

fn set_effective_uid(uid: libc::uid_t, op: &'static str) -> Result<()> {
    // SAFETY: seteuid only reads its integer argument.
    if unsafe { libc::seteuid(uid) } == -1 {
        return Err(OgwatchError::Privilege {
            op,
            source: io::Error::last_os_error(),
        });
    }
    Ok(())
}

/// One non-following metadata probe.
fn probe(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => Ok(false),
        // Gone, or a parent stopped being a directory: a race, not a leak.
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(err) if err.raw_os_error() == Some(libc::ENOTDIR) => Ok(true),
        Err(err) => Err(OgwatchError::os("lstat", err)),
    }
}

/// The production filter: `lstat` as the real uid.
#[derive(Debug, Clone, Copy)]
pub struct UidSwitchingFilter {
    ctx: PrivilegeContext,
}

impl UidSwitchingFilter {
    pub fn new(ctx: PrivilegeContext) -> Self {
        Self { ctx }
    }

    pub fn from_process() -> Self {
        Self::new(PrivilegeContext::capture())
    }

    pub fn context(&self) -> PrivilegeContext {
        self.ctx
    }
}

impl AccessFilter for UidSwitchingFilter {
    fn caller_can_see(&self, path: &Path) -> Result<bool> {
        let visible = if self.ctx.is_elevated() {
            let guard = IdentityGuard::assume_real(&self.ctx)?;
            let visible = probe(path);
            guard.restore()?;
            visible?
        } else {
            probe(path)?
        };

        if !visible {
            trace!(path = %path.display(), uid = self.ctx.real_uid, "hidden from caller");
        }
        Ok(visible)
    }
}
