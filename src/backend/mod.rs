// src/backend/mod.rs

//! Notification backends behind one capability interface.
//!
//! A [`Backend`] knows its event registry, its default masks and how to
//! subscribe; the [`EventSource`] it returns yields [`RawEvent`]s and
//! resolves each one to a path. The watch loop and the classifier only
//! ever talk to these two traits.
//!
//! - `fanotify`: Linux kernel queue reporting opaque file handles.
//! - `fsevents`: macOS path-based event stream.
//! - `portable`: path events from the `notify` crate, for everything else.

pub mod channel;
pub mod fanotify;
pub mod fsevents;
pub mod portable;

use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use crate::config::WatchConfig;
use crate::errors::{OgwatchError, Result};
use crate::events::{DefaultMasks, EventMapping, FlagSemantics};
use crate::types::{BackendKind, EntryKind, EventMask};

/// Boxed future returned by [`EventSource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Opaque kernel file handle, as carried by a file-handle backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandleRef {
    pub handle_type: i32,
    pub handle: Vec<u8>,
    /// Directory entry name, when the handle identifies the parent directory.
    pub name: Option<Vec<u8>>,
}

/// What a raw event points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRef {
    Handle(FileHandleRef),
    Path(PathBuf),
    /// The backend lost events; no specific object is referenced.
    Overflow,
}

/// A single change notification exactly as the backend delivered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub reference: RawRef,
    pub flags: EventMask,
    pub kind: EntryKind,
}

impl RawEvent {
    pub fn path(path: impl Into<PathBuf>, flags: EventMask, kind: EntryKind) -> Self {
        Self {
            reference: RawRef::Path(path.into()),
            flags,
            kind,
        }
    }

    pub fn overflow(flags: EventMask) -> Self {
        Self {
            reference: RawRef::Overflow,
            flags,
            kind: EntryKind::Unknown,
        }
    }
}

/// An event whose target has been turned into a real path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEvent {
    /// Fully resolved path, or the parent directory when `child` is set.
    pub base: PathBuf,
    pub child: Option<OsString>,
    pub flags: EventMask,
    pub kind: EntryKind,
}

impl ResolvedEvent {
    pub fn new(base: impl Into<PathBuf>, flags: EventMask, kind: EntryKind) -> Self {
        Self {
            base: base.into(),
            child: None,
            flags,
            kind,
        }
    }

    pub fn with_child(mut self, child: impl Into<OsString>) -> Self {
        self.child = Some(child.into());
        self
    }

    /// The path the event is reported under.
    pub fn path(&self) -> PathBuf {
        match &self.child {
            Some(name) => self.base.join(name),
            None => self.base.clone(),
        }
    }
}

/// Outcome of resolving a raw event. Fatal failures are `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedEvent),
    /// The reference no longer names a live object.
    Stale,
}

/// Resolve a path or overflow reference against `root`.
pub fn resolve_path_ref(root: &Path, event: RawEvent) -> Result<Resolution> {
    match event.reference {
        RawRef::Path(path) => Ok(Resolution::Resolved(ResolvedEvent::new(path, event.flags, event.kind))),
        RawRef::Overflow => Ok(Resolution::Resolved(ResolvedEvent::new(root, event.flags, event.kind))),
        RawRef::Handle(_) => Err(OgwatchError::Protocol(
            "file handle delivered by a path-based source".to_string(),
        )),
    }
}

/// A live subscription producing raw events.
pub trait EventSource: Send {
    /// Wait for the next batch of raw events. `None` means the source ended.
    fn next_batch(&mut self) -> SourceFuture<'_, Option<Vec<RawEvent>>>;

    /// Wait at most `timeout` for a raw event to become ready, without
    /// consuming it. Returns whether one did.
    fn wait_ready(&mut self, timeout: Duration) -> SourceFuture<'_, bool>;

    /// Turn a raw event into a path.
    fn resolve(&self, event: RawEvent) -> Result<Resolution>;
}

impl<S: EventSource + ?Sized> EventSource for Box<S> {
    fn next_batch(&mut self) -> SourceFuture<'_, Option<Vec<RawEvent>>> {
        (**self).next_batch()
    }

    fn wait_ready(&mut self, timeout: Duration) -> SourceFuture<'_, bool> {
        (**self).wait_ready(timeout)
    }

    fn resolve(&self, event: RawEvent) -> Result<Resolution> {
        (**self).resolve(event)
    }
}

/// Capability interface each notification mechanism implements.
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn mapping(&self) -> &'static EventMapping;

    fn semantics(&self) -> &'static FlagSemantics;

    fn default_masks(&self) -> DefaultMasks;

    /// Register for notifications on `config.root()`.
    fn subscribe(&self, config: &WatchConfig) -> Result<Box<dyn EventSource>>;
}

/// The backend implementation for `kind`.
///
/// Backends unavailable on this platform still answer registry queries;
/// only `subscribe` fails.
pub fn for_kind(kind: BackendKind) -> Box<dyn Backend> {
    match kind {
        BackendKind::Fanotify => Box::new(fanotify::FanotifyBackend),
        BackendKind::Fsevents => Box::new(fsevents::FseventsBackend),
        BackendKind::Notify => Box::new(portable::NotifyBackend),
    }
}

pub fn mapping_for(kind: BackendKind) -> &'static EventMapping {
    match kind {
        BackendKind::Fanotify => &fanotify::MAPPING,
        BackendKind::Fsevents => &fsevents::MAPPING,
        BackendKind::Notify => &portable::MAPPING,
    }
}
