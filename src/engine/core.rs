// src/engine/core.rs

//! Pure event pipeline.
//!
//! [`EventPipeline`] takes the outcome of resolving one raw event and runs
//! it through the remaining stages:
//!
//! - stale references arm the debouncer
//! - paths outside the watch root are dropped
//! - the kind-dependent want mask filters
//! - the access filter hides what the caller could not see
//! - duplicate renames collapse
//! - the classifier formats and every line is written and flushed
//!
//! It never touches the event source: the async shell in
//! [`crate::engine::runtime`] does the waiting and feeds results in, which
//! keeps everything here testable without Tokio or a kernel queue.

use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::access::AccessFilter;
use crate::backend::Resolution;
use crate::config::WatchConfig;
use crate::engine::classify::{Classifier, OutputLine};
use crate::engine::debounce::Debouncer;
use crate::engine::Dispatch;
use crate::errors::{OgwatchError, Result};
use crate::events::{EventMapping, FlagSemantics};
use crate::types::Terminator;

pub struct EventPipeline<A, W> {
    classifier: Classifier,
    debouncer: Debouncer,
    semantics: &'static FlagSemantics,
    root: PathBuf,
    generic: bool,
    terminator: Terminator,
    access: A,
    out: W,
}

impl<A, W> std::fmt::Debug for EventPipeline<A, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPipeline")
            .field("classifier", &self.classifier)
            .field("debouncer", &self.debouncer)
            .finish_non_exhaustive()
    }
}

impl<A: AccessFilter, W: Write> EventPipeline<A, W> {
    pub fn new(
        config: &WatchConfig,
        mapping: &'static EventMapping,
        semantics: &'static FlagSemantics,
        access: A,
        out: W,
        now: Instant,
    ) -> Self {
        Self {
            classifier: Classifier::new(config, mapping, semantics),
            debouncer: Debouncer::new(config.debounce(), now),
            semantics,
            root: config.root().to_path_buf(),
            generic: config.generic(),
            terminator: config.terminator(),
            access,
            out,
        }
    }

    pub fn stale_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// How long the driver should wait for new events before settling.
    pub fn stale_wait(&self, now: Instant) -> Duration {
        self.debouncer.remaining(now)
    }

    /// Settle a pending stale notice after the wait. Returns whether the
    /// notice fired (it is only printed in verbose mode).
    pub fn settle_stale(&mut self, now: Instant, event_ready: bool) -> Result<bool> {
        if !self.debouncer.settle(now, event_ready) {
            trace!(event_ready, "stale notice deferred");
            return Ok(false);
        }
        if !self.generic {
            let notice = OutputLine::Notice(self.semantics.stale_notice);
            self.emit(&notice)?;
        }
        debug!("stale notice fired");
        Ok(true)
    }

    /// Run one resolved (or stale) event through the pipeline.
    pub fn dispatch(&mut self, resolution: Resolution) -> Result<Dispatch> {
        let event = match resolution {
            Resolution::Resolved(event) => event,
            Resolution::Stale => {
                self.debouncer.mark_stale();
                return Ok(Dispatch::Stale);
            }
        };

        let path = event.path();
        if !path.starts_with(&self.root) {
            trace!(path = %path.display(), "outside watch root");
            return Ok(Dispatch::OutsideRoot);
        }

        if !self.classifier.wants(&event) {
            trace!(path = %path.display(), flags = event.flags, "not in wanted mask");
            return Ok(Dispatch::Filtered);
        }

        if !self.access.caller_can_see(&path)? {
            debug!(path = %path.display(), "access denied for caller");
            return Ok(Dispatch::Denied);
        }

        if self.classifier.is_duplicate(event.flags, &path) {
            trace!(path = %path.display(), "duplicate rename");
            return Ok(Dispatch::Duplicate);
        }

        let lines = self.classifier.lines(&event, &path);
        for line in &lines {
            self.emit(line)?;
        }
        Ok(Dispatch::Emitted(lines.len()))
    }

    fn emit(&mut self, line: &OutputLine) -> Result<()> {
        line.write(&mut self.out, self.terminator)
            .map_err(|e| OgwatchError::os("write", e))
    }
}
