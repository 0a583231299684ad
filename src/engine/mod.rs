// src/engine/mod.rs

//! The event normalization pipeline and the loop that drives it.
//!
//! The synchronous pipeline lives in [`core`] (with the debouncer and the
//! classifier it uses); the async shell that talks to the event source is
//! [`runtime`].

/// What happened to one event in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Written as this many lines (zero when no wanted name matched).
    Emitted(usize),
    /// Reference no longer valid; a debounced notice is pending.
    Stale,
    /// Resolved outside the watch root.
    OutsideRoot,
    /// None of its bits are in the wanted mask.
    Filtered,
    /// The invoking user may not see the path.
    Denied,
    /// Repeat of the previous rename.
    Duplicate,
}

pub mod classify;
pub mod core;
pub mod debounce;
pub mod runtime;

pub use classify::{Classifier, OutputLine};
pub use core::EventPipeline;
pub use debounce::{Debouncer, StaleState};
pub use runtime::WatchLoop;
