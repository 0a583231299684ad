// src/backend/channel.rs

//! Event source fed through a channel.
//!
//! Path-based backends deliver events on a thread they own (notify's
//! watcher thread, the FSEvents run loop). Their callbacks push
//! [`RawEvent`]s into an unbounded channel and this source drains it in
//! delivery order.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::backend::{resolve_path_ref, EventSource, RawEvent, Resolution, SourceFuture};
use crate::errors::Result;

/// Receives raw events from a backend callback.
///
/// `keepalive` owns whatever keeps the subscription running (a notify
/// watcher, an FSEvents stream handler); dropping the source stops it.
pub struct ChannelSource {
    root: PathBuf,
    rx: mpsc::UnboundedReceiver<RawEvent>,
    stash: VecDeque<RawEvent>,
    _keepalive: Box<dyn Send>,
}

impl std::fmt::Debug for ChannelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelSource")
            .field("root", &self.root)
            .field("stashed", &self.stash.len())
            .finish_non_exhaustive()
    }
}

impl ChannelSource {
    pub fn new(
        root: impl Into<PathBuf>,
        rx: mpsc::UnboundedReceiver<RawEvent>,
        keepalive: Box<dyn Send>,
    ) -> Self {
        Self {
            root: root.into(),
            rx,
            stash: VecDeque::new(),
            _keepalive: keepalive,
        }
    }

    fn drain_ready(&mut self, batch: &mut Vec<RawEvent>) {
        batch.extend(self.stash.drain(..));
        while let Ok(event) = self.rx.try_recv() {
            batch.push(event);
        }
    }
}

impl EventSource for ChannelSource {
    fn next_batch(&mut self) -> SourceFuture<'_, Option<Vec<RawEvent>>> {
        Box::pin(async move {
            let mut batch = Vec::new();
            if self.stash.is_empty() {
                match self.rx.recv().await {
                    Some(event) => batch.push(event),
                    None => return Ok(None),
                }
            }
            self.drain_ready(&mut batch);
            Ok(Some(batch))
        })
    }

    fn wait_ready(&mut self, timeout: Duration) -> SourceFuture<'_, bool> {
        Box::pin(async move {
            if !self.stash.is_empty() {
                return Ok(true);
            }
            match tokio::time::timeout(timeout, self.rx.recv()).await {
                Ok(Some(event)) => {
                    self.stash.push_back(event);
                    Ok(true)
                }
                Ok(None) | Err(_) => Ok(false),
            }
        })
    }

    fn resolve(&self, event: RawEvent) -> Result<Resolution> {
        resolve_path_ref(&self.root, event)
    }
}
