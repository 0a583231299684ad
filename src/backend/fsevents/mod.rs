// src/backend/fsevents/mod.rs

//! macOS FSEvents backend.
//!
//! FSEvents reports paths directly together with a flag word that already
//! says whether the item is a file, a directory or a symlink. The registry
//! below covers the whole flag word in the order Apple documents it.

#[cfg(target_os = "macos")]
mod source;

use crate::backend::{Backend, EventSource};
use crate::config::WatchConfig;
use crate::errors::Result;
use crate::events::{DefaultMasks, EventEntry, EventMapping, FlagSemantics};
use crate::types::{BackendKind, EntryKind, EventMask};

// kFSEventStreamEventFlag* from <CoreServices/FSEvents.h>.
pub const NONE: EventMask = 0x0000_0000;
pub const MUST_SCAN_SUB_DIRS: EventMask = 0x0000_0001;
pub const USER_DROPPED: EventMask = 0x0000_0002;
pub const KERNEL_DROPPED: EventMask = 0x0000_0004;
pub const EVENT_IDS_WRAPPED: EventMask = 0x0000_0008;
pub const HISTORY_DONE: EventMask = 0x0000_0010;
pub const ROOT_CHANGED: EventMask = 0x0000_0020;
pub const MOUNT: EventMask = 0x0000_0040;
pub const UNMOUNT: EventMask = 0x0000_0080;
pub const ITEM_CREATED: EventMask = 0x0000_0100;
pub const ITEM_REMOVED: EventMask = 0x0000_0200;
pub const ITEM_INODE_META_MOD: EventMask = 0x0000_0400;
pub const ITEM_RENAMED: EventMask = 0x0000_0800;
pub const ITEM_MODIFIED: EventMask = 0x0000_1000;
pub const ITEM_FINDER_INFO_MOD: EventMask = 0x0000_2000;
pub const ITEM_CHANGE_OWNER: EventMask = 0x0000_4000;
pub const ITEM_XATTR_MOD: EventMask = 0x0000_8000;
pub const ITEM_IS_FILE: EventMask = 0x0001_0000;
pub const ITEM_IS_DIR: EventMask = 0x0002_0000;
pub const ITEM_IS_SYMLINK: EventMask = 0x0004_0000;

static ENTRIES: [EventEntry; 20] = [
    EventEntry::new("None", NONE),
    EventEntry::new("MustScanSubDirs", MUST_SCAN_SUB_DIRS),
    EventEntry::new("UserDropped", USER_DROPPED),
    EventEntry::new("KernelDropped", KERNEL_DROPPED),
    EventEntry::new("EventIdsWrapped", EVENT_IDS_WRAPPED),
    EventEntry::new("HistoryDone", HISTORY_DONE),
    EventEntry::new("RootChanged", ROOT_CHANGED),
    EventEntry::new("Mount", MOUNT),
    EventEntry::new("Unmount", UNMOUNT),
    EventEntry::new("ItemCreated", ITEM_CREATED),
    EventEntry::new("ItemRemoved", ITEM_REMOVED),
    EventEntry::new("ItemInodeMetaMod", ITEM_INODE_META_MOD),
    EventEntry::new("ItemRenamed", ITEM_RENAMED),
    EventEntry::new("ItemModified", ITEM_MODIFIED),
    EventEntry::new("ItemFinderInfoMod", ITEM_FINDER_INFO_MOD),
    EventEntry::new("ItemChangeOwner", ITEM_CHANGE_OWNER),
    EventEntry::new("ItemXattrMod", ITEM_XATTR_MOD),
    EventEntry::new("ItemIsFile", ITEM_IS_FILE),
    EventEntry::new("ItemIsDir", ITEM_IS_DIR),
    EventEntry::new("ItemIsSymlink", ITEM_IS_SYMLINK),
];

pub static MAPPING: EventMapping = EventMapping::new(&ENTRIES);

pub static SEMANTICS: FlagSemantics = FlagSemantics {
    kind_bits: ITEM_IS_FILE | ITEM_IS_DIR | ITEM_IS_SYMLINK,
    explicit_dir_bits: 0,
    // The stream coalesces and re-reports renames; collapse the repeats.
    rename_bits: ITEM_RENAMED,
    overflow_bits: USER_DROPPED | KERNEL_DROPPED,
    dir_qualifier: "|ItemIsDir",
    symlink_qualifier: "|ItemIsSymlink",
    unknown_qualifier: "|???",
    stale_notice: "ESTALE",
};

pub const DEFAULT_FILE_EVENTS: EventMask = ITEM_MODIFIED | ITEM_CREATED | ITEM_REMOVED | ITEM_RENAMED;
pub const DEFAULT_DIR_EVENTS: EventMask = ITEM_CREATED | ITEM_REMOVED | MOUNT | UNMOUNT | ITEM_RENAMED;

/// Object kind carried in an FSEvents flag word.
pub fn kind_from_flags(flags: EventMask) -> EntryKind {
    if flags & ITEM_IS_DIR != 0 {
        EntryKind::Directory
    } else if flags & ITEM_IS_SYMLINK != 0 {
        EntryKind::Symlink
    } else if flags & ITEM_IS_FILE != 0 {
        EntryKind::File
    } else {
        EntryKind::Unknown
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FseventsBackend;

impl Backend for FseventsBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Fsevents
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

    #[cfg(target_os = "macos")]
    fn subscribe(&self, config: &WatchConfig) -> Result<Box<dyn EventSource>> {
        source::subscribe(config)
    }

    #[cfg(not(target_os = "macos"))]
    fn subscribe(&self, _config: &WatchConfig) -> Result<Box<dyn EventSource>> {
        Err(crate::errors::OgwatchError::Config(
            "backend fsevents is not available on this platform".to_string(),
        ))
    }
}
