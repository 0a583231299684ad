// src/events/mod.rs

//! Event name registries and the mask resolver built on them.

pub mod mask;
pub mod registry;

pub use mask::{parse_dir_events, parse_event_list, parse_events, DefaultMasks, MaskTarget};
pub use registry::{EventEntry, EventMapping, FlagSemantics};
