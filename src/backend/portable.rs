// src/backend/portable.rs

//! Portable path-based backend built on `notify`.
//!
//! `notify` hands out typed [`EventKind`]s rather than raw flags, so this
//! backend defines its own small bit registry and translates every notify
//! event into it. It needs no privileges, which makes it the fallback when
//! fanotify is not permitted.

use std::path::Path;

use notify::event::{AccessKind, AccessMode, CreateKind, ModifyKind, RemoveKind};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::backend::channel::ChannelSource;
use crate::backend::{Backend, EventSource, RawEvent};
use crate::config::WatchConfig;
use crate::errors::Result;
use crate::events::{DefaultMasks, EventEntry, EventMapping, FlagSemantics};
use crate::types::{BackendKind, EntryKind, EventMask};

pub const CREATE: EventMask = 0x0001;
pub const REMOVE: EventMask = 0x0002;
pub const MODIFY: EventMask = 0x0004;
pub const METADATA: EventMask = 0x0008;
pub const RENAME: EventMask = 0x0010;
pub const ACCESS: EventMask = 0x0020;
pub const CLOSE_WRITE: EventMask = 0x0040;
pub const OTHER: EventMask = 0x0080;
pub const RESCAN: EventMask = 0x0100;
pub const IS_FILE: EventMask = 0x1000;
pub const IS_DIR: EventMask = 0x2000;
pub const IS_SYMLINK: EventMask = 0x4000;

static ENTRIES: [EventEntry; 12] = [
    EventEntry::new("Create", CREATE),
    EventEntry::new("Remove", REMOVE),
    EventEntry::new("Modify", MODIFY),
    EventEntry::new("Metadata", METADATA),
    EventEntry::new("Rename", RENAME),
    EventEntry::new("Access", ACCESS),
    EventEntry::new("CloseWrite", CLOSE_WRITE),
    EventEntry::new("Other", OTHER),
    EventEntry::new("Rescan", RESCAN),
    EventEntry::new("IsFile", IS_FILE),
    EventEntry::new("IsDir", IS_DIR),
    EventEntry::new("IsSymlink", IS_SYMLINK),
];

pub static MAPPING: EventMapping = EventMapping::new(&ENTRIES);

pub static SEMANTICS: FlagSemantics = FlagSemantics {
    kind_bits: IS_FILE | IS_DIR | IS_SYMLINK,
    explicit_dir_bits: 0,
    rename_bits: RENAME,
    overflow_bits: RESCAN,
    dir_qualifier: "|IsDir",
    symlink_qualifier: "|IsSymlink",
    unknown_qualifier: "|???",
    stale_notice: "STALE",
};

const DEFAULT_FILE_EVENTS: EventMask = CREATE | REMOVE | RENAME | MODIFY;
const DEFAULT_DIR_EVENTS: EventMask = CREATE | REMOVE | RENAME;

#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyBackend;

impl Backend for NotifyBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Notify
    }

    fn mapping(&self) -> &'static EventMapping {
        &MAPPING
    }

    fn semantics(&self) -> &'static FlagSemantics {
        &SEMANTICS
    }

    fn default_masks(&self) -> DefaultMasks {
        DefaultMasks {
            verbose_files: DEFAULT_FILE_EVENTS,
            verbose_dirs: DEFAULT_DIR_EVENTS,
            generic_files: DEFAULT_FILE_EVENTS,
            generic_dirs: DEFAULT_DIR_EVENTS,
        }
    }

    fn subscribe(&self, config: &WatchConfig) -> Result<Box<dyn EventSource>> {
        let root = config.root().to_path_buf();
        let (event_tx, event_rx) = mpsc::unbounded_channel::<RawEvent>();

        // Called synchronously on notify's own thread.
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for raw in translate(&event) {
                        if event_tx.send(raw).is_err() {
                            return;
                        }
                    }
                }
                Err(err) => warn!("file watch error: {err}"),
            },
            Config::default(),
        )?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        info!("notify watcher started on {:?}", root);

        Ok(Box::new(ChannelSource::new(root, event_rx, Box::new(watcher))))
    }
}

/// Translate one notify event into one raw event per affected path.
pub fn translate(event: &Event) -> Vec<RawEvent> {
    let mut flags = kind_bits(&event.kind);
    if event.need_rescan() {
        flags |= RESCAN;
    }

    if event.paths.is_empty() {
        return if flags & RESCAN != 0 {
            vec![RawEvent::overflow(flags)]
        } else {
            Vec::new()
        };
    }

    event
        .paths
        .iter()
        .map(|path| {
            let kind = entry_kind(&event.kind, path);
            RawEvent::path(path.clone(), flags | kind_flag(kind), kind)
        })
        .collect()
}

fn kind_bits(kind: &EventKind) -> EventMask {
    match kind {
        EventKind::Create(_) => CREATE,
        EventKind::Remove(_) => REMOVE,
        EventKind::Modify(ModifyKind::Name(_)) => RENAME,
        EventKind::Modify(ModifyKind::Metadata(_)) => METADATA,
        EventKind::Modify(ModifyKind::Other) => OTHER,
        EventKind::Modify(_) => MODIFY,
        EventKind::Access(AccessKind::Close(AccessMode::Write)) => CLOSE_WRITE,
        EventKind::Access(_) => ACCESS,
        EventKind::Any | EventKind::Other => OTHER,
    }
}

/// Use the kind notify reported; otherwise look at what is on disk now.
fn entry_kind(kind: &EventKind, path: &Path) -> EntryKind {
    match kind {
        EventKind::Create(CreateKind::File) | EventKind::Remove(RemoveKind::File) => EntryKind::File,
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => {
            EntryKind::Directory
        }
        _ => probe_kind(path),
    }
}

fn probe_kind(path: &Path) -> EntryKind {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => EntryKind::Symlink,
        Ok(meta) if meta.is_dir() => EntryKind::Directory,
        Ok(_) => EntryKind::File,
        Err(_) => EntryKind::Unknown,
    }
}

fn kind_flag(kind: EntryKind) -> EventMask {
    match kind {
        EntryKind::File => IS_FILE,
        EntryKind::Directory => IS_DIR,
        EntryKind::Symlink => IS_SYMLINK,
        EntryKind::Unknown => 0,
    }
}
