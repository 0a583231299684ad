// src/engine/runtime.rs

use std::fmt;
use std::io::Write;

use tokio::time::Instant;
use tracing::{debug, info, trace};

use crate::access::AccessFilter;
use crate::backend::EventSource;
use crate::errors::Result;

use super::core::EventPipeline;

/// Watch Loop Driver.
///
/// Pulls batches from an [`EventSource`] and threads every raw event
/// through resolution and the [`EventPipeline`], strictly in delivery
/// order. Before each read a pending stale notice is settled: the loop
/// waits up to the rest of the debounce window for new events and lets
/// the pipeline decide.
pub struct WatchLoop<S, A, W> {
    source: S,
    pipeline: EventPipeline<A, W>,
}

impl<S, A, W> fmt::Debug for WatchLoop<S, A, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchLoop")
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl<S: EventSource, A: AccessFilter, W: Write> WatchLoop<S, A, W> {
    pub fn new(source: S, pipeline: EventPipeline<A, W>) -> Self {
        Self { source, pipeline }
    }

    /// Main loop. Returns `Ok` only when the source closes; any fatal
    /// condition comes back as `Err`.
    pub async fn run(mut self) -> Result<EventPipeline<A, W>> {
        info!("watch loop started");

        loop {
            if self.pipeline.stale_pending() {
                let wait = self.pipeline.stale_wait(Instant::now().into_std());
                let ready = self.source.wait_ready(wait).await?;
                self.pipeline.settle_stale(Instant::now().into_std(), ready)?;
            }

            let Some(batch) = self.source.next_batch().await? else {
                info!("event source closed");
                return Ok(self.pipeline);
            };

            debug!(events = batch.len(), "dispatching batch");

            for raw in batch {
                let resolution = self.source.resolve(raw)?;
                let outcome = self.pipeline.dispatch(resolution)?;
                trace!(?outcome, "dispatched");
            }
        }
    }
}
