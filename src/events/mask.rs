// src/events/mask.rs

//! Mask Resolver: comma-separated event names to bitmasks.

use crate::events::registry::{EventMapping, FlagSemantics};
use crate::types::EventMask;

/// Parse a comma-separated list of event names into a mask.
///
/// Every token is looked up by exact, case-sensitive name. Tokens that name
/// no registry entry are skipped without error, so a typo simply watches
/// less. An empty string yields `0`.
pub fn parse_events(mapping: &EventMapping, names: &str) -> EventMask {
    names
        .split(',')
        .filter(|token| !token.is_empty())
        .filter_map(|token| mapping.lookup(token))
        .fold(0, |mask, bits| mask | bits)
}

/// Same as [`parse_events`] for a list of names (config file form).
pub fn parse_event_list<S: AsRef<str>>(mapping: &EventMapping, names: &[S]) -> EventMask {
    names
        .iter()
        .filter_map(|name| mapping.lookup(name.as_ref()))
        .fold(0, |mask, bits| mask | bits)
}

/// Parse a directory mask the caller supplied explicitly.
///
/// A non-empty result gets the backend's "this is about a directory" bit
/// OR-ed in so directory filtering does not depend on which names were
/// listed.
pub fn parse_dir_events(mapping: &EventMapping, semantics: &FlagSemantics, names: &str) -> EventMask {
    with_dir_bits(parse_events(mapping, names), semantics)
}

pub(crate) fn with_dir_bits(mask: EventMask, semantics: &FlagSemantics) -> EventMask {
    if mask == 0 { 0 } else { mask | semantics.explicit_dir_bits }
}

/// Which objects a mask applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskTarget {
    Files,
    Dirs,
}

/// The four precomputed default masks of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultMasks {
    pub verbose_files: EventMask,
    pub verbose_dirs: EventMask,
    pub generic_files: EventMask,
    pub generic_dirs: EventMask,
}

impl DefaultMasks {
    pub fn get(&self, generic: bool, target: MaskTarget) -> EventMask {
        match (generic, target) {
            (false, MaskTarget::Files) => self.verbose_files,
            (false, MaskTarget::Dirs) => self.verbose_dirs,
            (true, MaskTarget::Files) => self.generic_files,
            (true, MaskTarget::Dirs) => self.generic_dirs,
        }
    }
}
