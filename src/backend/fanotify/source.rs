// src/backend/fanotify/source.rs

use std::ffi::CString;
use std::fs::File;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::unix::AsyncFd;
use tracing::{debug, info, warn};

use super::records::{parse_events, EventInfo, EventRecord};
use super::resolve::resolve_handle;
use super::{mark_masks, FAN_ONDIR, FAN_Q_OVERFLOW};
use crate::backend::{resolve_path_ref, EventSource, RawEvent, RawRef, Resolution, SourceFuture};
use crate::config::WatchConfig;
use crate::errors::{OgwatchError, Result};
use crate::types::{EntryKind, EventMask};

// fanotify_init / fanotify_mark flags from <linux/fanotify.h>.
const FAN_CLOEXEC: libc::c_uint = 0x0000_0001;
const FAN_NONBLOCK: libc::c_uint = 0x0000_0002;
const FAN_CLASS_NOTIF: libc::c_uint = 0x0000_0000;
const FAN_UNLIMITED_QUEUE: libc::c_uint = 0x0000_0010;
const FAN_REPORT_DFID_NAME: libc::c_uint = 0x0000_0c00;
const FAN_MARK_ADD: libc::c_uint = 0x0000_0001;
const FAN_MARK_FILESYSTEM: libc::c_uint = 0x0000_0100;

const READ_BUF_SIZE: usize = 8192;

/// A subscribed fanotify group plus the watch-root descriptor handles are
/// resolved against.
pub struct FanotifySource {
    queue: AsyncFd<OwnedFd>,
    mount_root: File,
    root: PathBuf,
    buf: Vec<u8>,
}

impl std::fmt::Debug for FanotifySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanotifySource")
            .field("fd", &self.queue.get_ref().as_raw_fd())
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl FanotifySource {
    /// Open the root, create the group and add the filesystem marks.
    pub fn subscribe(config: &WatchConfig) -> Result<Self> {
        let root = config.root().to_path_buf();
        let mount_root = File::open(&root).map_err(|e| OgwatchError::os("open watch root", e))?;

        // SAFETY: plain syscall, no pointers involved.
        let fd = unsafe {
            libc::fanotify_init(
                FAN_CLASS_NOTIF
                    | FAN_REPORT_DFID_NAME
                    | FAN_UNLIMITED_QUEUE
                    | FAN_NONBLOCK
                    | FAN_CLOEXEC,
                0,
            )
        };
        if fd == -1 {
            return Err(OgwatchError::last_os("fanotify_init"));
        }
        // SAFETY: fanotify_init returned a fresh descriptor we now own.
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };

        let (file_mark, dir_mark) = mark_masks(config);
        for mask in [file_mark, dir_mark].into_iter().flatten() {
            add_mark(fd.as_raw_fd(), mask, &root)?;
        }

        let queue = AsyncFd::new(fd).map_err(|e| OgwatchError::os("register fanotify descriptor", e))?;

        info!(
            root = %root.display(),
            file_mark = ?file_mark.map(|m| format!("{m:#x}")),
            dir_mark = ?dir_mark.map(|m| format!("{m:#x}")),
            "fanotify group subscribed"
        );

        Ok(Self {
            queue,
            mount_root,
            root,
            buf: vec![0; READ_BUF_SIZE],
        })
    }

    fn decode(&self, len: usize) -> Result<Vec<RawEvent>> {
        let records = parse_events(&self.buf[..len]).map_err(|e| OgwatchError::Protocol(e.to_string()))?;
        Ok(records.into_iter().filter_map(into_raw_event).collect())
    }
}

fn add_mark(fd: RawFd, mask: EventMask, root: &Path) -> Result<()> {
    let path = CString::new(root.as_os_str().as_bytes())
        .map_err(|_| OgwatchError::Config(format!("watch root {} contains a NUL byte", root.display())))?;

    // SAFETY: `path` is a valid NUL-terminated string for the call's duration.
    let ret = unsafe {
        libc::fanotify_mark(
            fd,
            FAN_MARK_ADD | FAN_MARK_FILESYSTEM,
            mask,
            libc::AT_FDCWD,
            path.as_ptr(),
        )
    };
    if ret == -1 {
        return Err(OgwatchError::last_os("fanotify_mark"));
    }
    Ok(())
}

fn into_raw_event(record: EventRecord) -> Option<RawEvent> {
    if record.fd >= 0 {
        // Not requested with FID reporting; never leak it.
        // SAFETY: the kernel installed this descriptor for us.
        drop(unsafe { OwnedFd::from_raw_fd(record.fd) });
    }

    let kind = if record.mask & FAN_ONDIR != 0 {
        EntryKind::Directory
    } else {
        EntryKind::File
    };

    match record.info {
        EventInfo::Handle(handle) => Some(RawEvent {
            reference: RawRef::Handle(handle),
            flags: record.mask,
            kind,
        }),
        EventInfo::None if record.mask & FAN_Q_OVERFLOW != 0 => Some(RawEvent::overflow(record.mask)),
        EventInfo::None => {
            warn!("skipping event without info record (mask {:#x})", record.mask);
            None
        }
        EventInfo::Unsupported(info_type) => {
            warn!("skipping info type {info_type}");
            None
        }
    }
}

fn read_queue(fd: RawFd, buf: &mut [u8]) -> io::Result<usize> {
    // SAFETY: `buf` is valid for writes of `buf.len()` bytes.
    let len = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
    if len < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(len as usize)
    }
}

fn pending_bytes(fd: RawFd) -> Result<usize> {
    let mut pending: libc::c_int = 0;
    // SAFETY: FIONREAD writes one int through the pointer.
    if unsafe { libc::ioctl(fd, libc::FIONREAD, &mut pending) } == -1 {
        return Err(OgwatchError::last_os("ioctl(FIONREAD)"));
    }
    Ok(pending.max(0) as usize)
}

impl EventSource for FanotifySource {
    fn next_batch(&mut self) -> SourceFuture<'_, Option<Vec<RawEvent>>> {
        Box::pin(async move {
            loop {
                let len = {
                    let Self { queue, buf, .. } = &mut *self;
                    let mut guard = queue
                        .readable()
                        .await
                        .map_err(|e| OgwatchError::os("poll", e))?;
                    match guard.try_io(|inner| read_queue(inner.get_ref().as_raw_fd(), buf)) {
                        Ok(Ok(len)) => len,
                        Ok(Err(e)) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Ok(Err(e)) => return Err(OgwatchError::os("read", e)),
                        Err(_would_block) => continue,
                    }
                };

                if len == 0 {
                    return Ok(None);
                }

                let batch = self.decode(len)?;
                debug!(bytes = len, events = batch.len(), "read fanotify batch");
                return Ok(Some(batch));
            }
        })
    }

    fn wait_ready(&mut self, timeout: Duration) -> SourceFuture<'_, bool> {
        Box::pin(async move {
            let queue = &self.queue;
            // Readiness is cached after a read that drained the queue, so
            // confirm with FIONREAD. Nothing is consumed either way.
            let ready = async {
                loop {
                    let mut guard = queue
                        .readable()
                        .await
                        .map_err(|e| OgwatchError::os("poll", e))?;
                    if pending_bytes(guard.get_inner().as_raw_fd())? > 0 {
                        return Ok(true);
                    }
                    guard.clear_ready();
                }
            };
            match tokio::time::timeout(timeout, ready).await {
                Ok(res) => res,
                Err(_elapsed) => Ok(false),
            }
        })
    }

    fn resolve(&self, event: RawEvent) -> Result<Resolution> {
        if let RawRef::Handle(handle) = &event.reference {
            return resolve_handle(&self.mount_root, handle, event.flags, event.kind);
        }
        resolve_path_ref(&self.root, event)
    }
}
