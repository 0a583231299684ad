use std::collections::{HashMap, VecDeque};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ogwatch::backend::{
    EventSource, FileHandleRef, RawEvent, RawRef, ResolvedEvent, Resolution, SourceFuture,
};
use ogwatch::errors::Result;
use ogwatch::types::{EntryKind, EventMask};
use tracing::debug;

/// Deterministic `EventSource` replaying scripted batches.
///
/// Handle references resolve through the handles registered with
/// [`ScriptedSource::handle`]; any other handle is stale. Once the script
/// is exhausted the source closes, unless [`ScriptedSource::hold_open`]
/// was called, in which case `next_batch` never completes.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    root: PathBuf,
    batches: VecDeque<Vec<RawEvent>>,
    handles: HashMap<Vec<u8>, PathBuf>,
    hold_open: bool,
}

impl ScriptedSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn batch(mut self, events: Vec<RawEvent>) -> Self {
        self.batches.push_back(events);
        self
    }

    /// Make `handle` resolve to the directory `path`.
    pub fn handle(mut self, handle: &[u8], path: impl Into<PathBuf>) -> Self {
        self.handles.insert(handle.to_vec(), path.into());
        self
    }

    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }
}

/// A handle-bearing raw event naming `name` inside the directory `handle`.
pub fn handle_event(handle: &[u8], name: &str, flags: EventMask, kind: EntryKind) -> RawEvent {
    RawEvent {
        reference: RawRef::Handle(FileHandleRef {
            handle_type: 1,
            handle: handle.to_vec(),
            name: Some(name.as_bytes().to_vec()),
        }),
        flags,
        kind,
    }
}

/// A handle nobody registered: resolves as stale.
pub fn stale_event(flags: EventMask) -> RawEvent {
    handle_event(b"gone", "x", flags, EntryKind::File)
}

impl EventSource for ScriptedSource {
    fn next_batch(&mut self) -> SourceFuture<'_, Option<Vec<RawEvent>>> {
        Box::pin(async move {
            match self.batches.pop_front() {
                Some(batch) => {
                    debug!(events = batch.len(), "replaying scripted batch");
                    Ok(Some(batch))
                }
                None if self.hold_open => std::future::pending().await,
                None => Ok(None),
            }
        })
    }

    fn wait_ready(&mut self, timeout: Duration) -> SourceFuture<'_, bool> {
        Box::pin(async move {
            if !self.batches.is_empty() {
                return Ok(true);
            }
            tokio::time::sleep(timeout).await;
            Ok(false)
        })
    }

    fn resolve(&self, event: RawEvent) -> Result<Resolution> {
        let resolved = match event.reference {
            RawRef::Path(path) => ResolvedEvent::new(path, event.flags, event.kind),
            RawRef::Overflow => ResolvedEvent::new(&self.root, event.flags, event.kind),
            RawRef::Handle(handle) => {
                let Some(dir) = self.handles.get(&handle.handle) else {
                    debug!(handle = ?handle.handle, "unregistered handle, reporting stale");
                    return Ok(Resolution::Stale);
                };
                let resolved = ResolvedEvent::new(dir, event.flags, event.kind);
                match handle.name {
                    Some(name) if !name.is_empty() => {
                        resolved.with_child(OsString::from(String::from_utf8_lossy(&name).into_owned()))
                    }
                    _ => resolved,
                }
            }
        };
        Ok(Resolution::Resolved(resolved))
    }
}
