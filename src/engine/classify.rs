// src/engine/classify.rs

//! Event Classifier / Formatter.
//!
//! Turns a resolved, access-checked event into output lines. Everything
//! backend specific comes in through the injected [`EventMapping`] and
//! [`FlagSemantics`].

use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use crate::backend::ResolvedEvent;
use crate::config::WatchConfig;
use crate::events::{EventMapping, FlagSemantics};
use crate::types::{EntryKind, EventMask, Terminator};

/// One record on standard output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    /// Verbose mode: `<name><qualifier> <path>`.
    Named {
        name: &'static str,
        qualifier: &'static str,
        path: PathBuf,
    },
    /// Generic mode: the bare path.
    Path(PathBuf),
    /// A fixed notice such as the stale-reference marker.
    Notice(&'static str),
}

impl OutputLine {
    pub fn to_bytes(&self, terminator: Terminator) -> Vec<u8> {
        let mut bytes = Vec::new();
        match self {
            OutputLine::Named {
                name,
                qualifier,
                path,
            } => {
                bytes.extend_from_slice(name.as_bytes());
                bytes.extend_from_slice(qualifier.as_bytes());
                bytes.push(b' ');
                bytes.extend_from_slice(path.as_os_str().as_bytes());
            }
            OutputLine::Path(path) => bytes.extend_from_slice(path.as_os_str().as_bytes()),
            OutputLine::Notice(text) => bytes.extend_from_slice(text.as_bytes()),
        }
        bytes.push(terminator.as_byte());
        bytes
    }

    /// Write the record and flush: consumers read the stream live.
    pub fn write<W: Write>(&self, out: &mut W, terminator: Terminator) -> io::Result<()> {
        out.write_all(&self.to_bytes(terminator))?;
        out.flush()
    }
}

#[derive(Debug)]
pub struct Classifier {
    mapping: &'static EventMapping,
    semantics: &'static FlagSemantics,
    root: PathBuf,
    file_mask: EventMask,
    dir_mask: EventMask,
    generic: bool,
    last: Option<(EventMask, PathBuf)>,
}

impl Classifier {
    pub fn new(
        config: &WatchConfig,
        mapping: &'static EventMapping,
        semantics: &'static FlagSemantics,
    ) -> Self {
        Self {
            mapping,
            semantics,
            root: config.root().to_path_buf(),
            file_mask: config.file_mask(),
            dir_mask: config.dir_mask(),
            generic: config.generic(),
            last: None,
        }
    }

    /// The mask an event of `kind` is filtered against.
    pub fn want_mask(&self, kind: EntryKind) -> EventMask {
        match kind {
            EntryKind::Directory => self.dir_mask,
            EntryKind::File | EntryKind::Symlink => self.file_mask,
            EntryKind::Unknown => EventMask::MAX,
        }
    }

    /// Overflow is wanted whatever kind the backend attached to it.
    fn event_want(&self, event: &ResolvedEvent) -> EventMask {
        self.want_mask(event.kind) | self.semantics.overflow_bits
    }

    /// Whether any of the event's bits, kind bits aside, was asked for.
    pub fn wants(&self, event: &ResolvedEvent) -> bool {
        event.flags & !self.semantics.kind_bits & self.event_want(event) != 0
    }

    /// Same-path rename repeated with identical flags. Every call becomes
    /// the "previous event" for the next one.
    pub fn is_duplicate(&mut self, flags: EventMask, path: &Path) -> bool {
        let duplicate = self.semantics.is_rename(flags)
            && self
                .last
                .as_ref()
                .is_some_and(|(last_flags, last_path)| *last_flags == flags && last_path == path);
        self.last = Some((flags, path.to_path_buf()));
        duplicate
    }

    /// The lines `event` produces, reported under `path`.
    ///
    /// Verbose mode names every wanted registry entry present in the flags,
    /// in table order; an event matching none yields nothing. Generic mode
    /// yields the path once, or the watch root for a queue overflow.
    pub fn lines(&self, event: &ResolvedEvent, path: &Path) -> Vec<OutputLine> {
        if self.generic {
            let reported = if self.semantics.is_overflow(event.flags) {
                self.root.clone()
            } else {
                path.to_path_buf()
            };
            return vec![OutputLine::Path(reported)];
        }

        let named = event.flags & self.event_want(event) & !self.semantics.kind_bits;
        let qualifier = self.semantics.qualifier(event.kind);
        self.mapping
            .matching(named)
            .map(|entry| OutputLine::Named {
                name: entry.name,
                qualifier,
                path: path.to_path_buf(),
            })
            .collect()
    }
}
