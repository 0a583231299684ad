// src/events/registry.rs

//! Static per-backend event tables.
//!
//! An [`EventMapping`] is an ordered list of `(name, bits)` pairs. The order
//! is significant: when one raw event carries several recognised bits, the
//! names are emitted in table order.

use crate::types::{EntryKind, EventMask};

/// One symbolic event name and the raw bit(s) it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventEntry {
    pub name: &'static str,
    pub bits: EventMask,
}

impl EventEntry {
    pub const fn new(name: &'static str, bits: EventMask) -> Self {
        Self { name, bits }
    }
}

/// Immutable registry of the event names a backend understands.
#[derive(Debug)]
pub struct EventMapping {
    entries: &'static [EventEntry],
}

impl EventMapping {
    pub const fn new(entries: &'static [EventEntry]) -> Self {
        Self { entries }
    }

    /// Exact, case-sensitive name lookup.
    pub fn lookup(&self, name: &str) -> Option<EventMask> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.bits)
    }

    /// Entries whose bits intersect `flags`, in table order.
    ///
    /// Entries with a zero bit value never match.
    pub fn matching(&self, flags: EventMask) -> impl Iterator<Item = &'static EventEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.bits & flags != 0)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|entry| entry.name)
    }
}

/// Backend constants the classifier needs to interpret a raw mask without
/// knowing which backend produced it.
#[derive(Debug, Clone, Copy)]
pub struct FlagSemantics {
    /// Bits that only say what kind of object the event is about. They are
    /// never named and never count as "the event" for filtering.
    pub kind_bits: EventMask,
    /// OR-ed into a directory mask the caller supplied explicitly.
    pub explicit_dir_bits: EventMask,
    /// Two consecutive events with identical flags and path that contain
    /// one of these bits are collapsed into one.
    pub rename_bits: EventMask,
    /// The backend's queue overflowed; individual events were lost.
    pub overflow_bits: EventMask,
    pub dir_qualifier: &'static str,
    pub symlink_qualifier: &'static str,
    pub unknown_qualifier: &'static str,
    /// Line written (verbose mode only) when stale references were seen.
    pub stale_notice: &'static str,
}

impl FlagSemantics {
    pub fn qualifier(&self, kind: EntryKind) -> &'static str {
        match kind {
            EntryKind::File => "",
            EntryKind::Directory => self.dir_qualifier,
            EntryKind::Symlink => self.symlink_qualifier,
            EntryKind::Unknown => self.unknown_qualifier,
        }
    }

    pub fn is_overflow(&self, flags: EventMask) -> bool {
        flags & self.overflow_bits != 0
    }

    pub fn is_rename(&self, flags: EventMask) -> bool {
        flags & self.rename_bits != 0
    }
}
