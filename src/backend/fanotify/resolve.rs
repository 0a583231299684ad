// src/backend/fanotify/resolve.rs

//! Handle/Path resolver: opaque file handle to absolute path.
//!
//! The handle is opened relative to the watch-root descriptor, the kernel's
//! `/proc/self/fd/N` link tells us where that descriptor currently points,
//! and the descriptor is closed again before returning.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::os::unix::ffi::OsStringExt;

use crate::backend::{FileHandleRef, ResolvedEvent, Resolution};
use crate::errors::{OgwatchError, Result};
use crate::types::{EntryKind, EventMask};

/// Build the `struct file_handle` the kernel expects.
fn encode_handle(handle: &FileHandleRef) -> Vec<u8> {
    let mut raw = Vec::with_capacity(8 + handle.handle.len());
    raw.extend_from_slice(&(handle.handle.len() as u32).to_ne_bytes());
    raw.extend_from_slice(&handle.handle_type.to_ne_bytes());
    raw.extend_from_slice(&handle.handle);
    raw
}

/// Open `handle` relative to `mount_root`. `Ok(None)` means `ESTALE`.
fn open_handle(mount_root: &File, handle: &FileHandleRef) -> Result<Option<OwnedFd>> {
    let mut raw = encode_handle(handle);

    // O_PATH: the descriptor only answers the path query, and opening it
    // must not generate open events of its own.
    // SAFETY: `raw` is a complete `struct file_handle` that outlives the call.
    let fd = unsafe {
        libc::syscall(
            libc::SYS_open_by_handle_at,
            mount_root.as_raw_fd(),
            raw.as_mut_ptr(),
            libc::O_PATH | libc::O_CLOEXEC,
        )
    };

    if fd < 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESTALE) {
            return Ok(None);
        }
        return Err(OgwatchError::os("open_by_handle_at", err));
    }

    // SAFETY: the syscall returned a fresh descriptor we now own.
    Ok(Some(unsafe { OwnedFd::from_raw_fd(fd as i32) }))
}

/// Resolve one handle-bearing event.
pub fn resolve_handle(
    mount_root: &File,
    handle: &FileHandleRef,
    flags: EventMask,
    kind: EntryKind,
) -> Result<Resolution> {
    let Some(fd) = open_handle(mount_root, handle)? else {
        return Ok(Resolution::Stale);
    };

    let link = format!("/proc/self/fd/{}", fd.as_raw_fd());
    let base = fs::read_link(&link).map_err(|e| OgwatchError::os("readlink", e))?;
    drop(fd);

    let mut resolved = ResolvedEvent::new(base, flags, kind);
    if let Some(name) = handle.name.as_deref() {
        if !name.is_empty() && name != b"." {
            resolved = resolved.with_child(OsString::from_vec(name.to_vec()));
        }
    }

    Ok(Resolution::Resolved(resolved))
}
