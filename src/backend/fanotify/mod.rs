// src/backend/fanotify/mod.rs

//! Linux fanotify backend.
//!
//! The group is created with `FAN_REPORT_DFID_NAME`: every event names the
//! parent directory by an opaque file handle plus the entry name. Handles
//! are turned back into paths with `open_by_handle_at` relative to a
//! descriptor on the watch root (see [`resolve`]).
//!
//! Registry, defaults and the record decoder are plain data and build on
//! every platform; only subscribing needs Linux.

pub mod records;
#[cfg(target_os = "linux")]
pub mod resolve;
#[cfg(target_os = "linux")]
mod source;

use crate::backend::{Backend, EventSource};
use crate::config::WatchConfig;
use crate::errors::Result;
use crate::events::{DefaultMasks, EventEntry, EventMapping, FlagSemantics};
use crate::types::{BackendKind, EventMask};

// Event bits from <linux/fanotify.h>.
pub const FAN_ACCESS: EventMask = 0x0000_0001;
pub const FAN_MODIFY: EventMask = 0x0000_0002;
pub const FAN_ATTRIB: EventMask = 0x0000_0004;
pub const FAN_CLOSE_WRITE: EventMask = 0x0000_0008;
pub const FAN_CLOSE_NOWRITE: EventMask = 0x0000_0010;
pub const FAN_OPEN: EventMask = 0x0000_0020;
pub const FAN_MOVED_FROM: EventMask = 0x0000_0040;
pub const FAN_MOVED_TO: EventMask = 0x0000_0080;
pub const FAN_CREATE: EventMask = 0x0000_0100;
pub const FAN_DELETE: EventMask = 0x0000_0200;
pub const FAN_DELETE_SELF: EventMask = 0x0000_0400;
pub const FAN_MOVE_SELF: EventMask = 0x0000_0800;
pub const FAN_Q_OVERFLOW: EventMask = 0x0000_4000;
pub const FAN_EVENT_ON_CHILD: EventMask = 0x0800_0000;
pub const FAN_ONDIR: EventMask = 0x4000_0000;

static ENTRIES: [EventEntry; 13] = [
    EventEntry::new("FAN_CREATE", FAN_CREATE),
    EventEntry::new("FAN_MOVED_TO", FAN_MOVED_TO),
    EventEntry::new("FAN_OPEN", FAN_OPEN),
    EventEntry::new("FAN_ACCESS", FAN_ACCESS),
    EventEntry::new("FAN_MODIFY", FAN_MODIFY),
    EventEntry::new("FAN_CLOSE_WRITE", FAN_CLOSE_WRITE),
    EventEntry::new("FAN_CLOSE_NOWRITE", FAN_CLOSE_NOWRITE),
    EventEntry::new("FAN_MOVED_FROM", FAN_MOVED_FROM),
    EventEntry::new("FAN_DELETE", FAN_DELETE),
    EventEntry::new("FAN_ATTRIB", FAN_ATTRIB),
    EventEntry::new("FAN_DELETE_SELF", FAN_DELETE_SELF),
    EventEntry::new("FAN_MOVE_SELF", FAN_MOVE_SELF),
    EventEntry::new("FAN_Q_OVERFLOW", FAN_Q_OVERFLOW),
];

pub static MAPPING: EventMapping = EventMapping::new(&ENTRIES);

pub static SEMANTICS: FlagSemantics = FlagSemantics {
    kind_bits: FAN_ONDIR,
    explicit_dir_bits: FAN_ONDIR,
    // fanotify reports each side of a rename once.
    rename_bits: 0,
    overflow_bits: FAN_Q_OVERFLOW,
    dir_qualifier: "|FAN_ONDIR",
    symlink_qualifier: "",
    unknown_qualifier: "|???",
    stale_notice: "ESTALE",
};

pub const DEFAULT_FILE_EVENTS: EventMask =
    FAN_CREATE | FAN_DELETE | FAN_MOVED_FROM | FAN_MOVED_TO | FAN_CLOSE_WRITE;
pub const DEFAULT_DIR_EVENTS: EventMask = FAN_CREATE | FAN_DELETE | FAN_MOVED_FROM | FAN_MOVED_TO;
pub const GENERIC_FILE_EVENTS: EventMask =
    FAN_DELETE | FAN_MOVED_FROM | FAN_MOVED_TO | FAN_CLOSE_WRITE;
pub const GENERIC_DIR_EVENTS: EventMask = FAN_CREATE | FAN_DELETE | FAN_MOVED_FROM | FAN_MOVED_TO;

/// Masks handed to `fanotify_mark`: the file mark and the directory mark.
///
/// Overflow is reported unconditionally and is not a valid mark bit, so
/// it is stripped. A mask left without any event bit yields no mark.
pub fn mark_masks(config: &WatchConfig) -> (Option<EventMask>, Option<EventMask>) {
    let strip = |mask: EventMask| mask & !(FAN_Q_OVERFLOW | FAN_ONDIR | FAN_EVENT_ON_CHILD);
    let files = strip(config.file_mask());
    let dirs = strip(config.dir_mask());
    (
        (files != 0).then_some(files | FAN_EVENT_ON_CHILD),
        (dirs != 0).then_some(dirs | FAN_ONDIR),
    )
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FanotifyBackend;

impl Backend for FanotifyBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Fanotify
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
            generic_files: GENERIC_FILE_EVENTS,
            generic_dirs: GENERIC_DIR_EVENTS,
        }
    }

    #[cfg(target_os = "linux")]
    fn subscribe(&self, config: &WatchConfig) -> Result<Box<dyn EventSource>> {
        Ok(Box::new(source::FanotifySource::subscribe(config)?))
    }

    #[cfg(not(target_os = "linux"))]
    fn subscribe(&self, _config: &WatchConfig) -> Result<Box<dyn EventSource>> {
        Err(crate::errors::OgwatchError::Config(
            "backend fanotify is not available on this platform".to_string(),
        ))
    }
}
