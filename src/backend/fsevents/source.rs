// src/backend/fsevents/source.rs

use std::time::Duration;

use fsevent_stream::ffi::{
    kFSEventStreamCreateFlagFileEvents, kFSEventStreamCreateFlagUseCFTypes,
    kFSEventStreamEventIdSinceNow,
};
use fsevent_stream::stream::{create_event_stream, EventStreamHandler};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::kind_from_flags;
use crate::backend::channel::ChannelSource;
use crate::backend::{EventSource, RawEvent};
use crate::config::WatchConfig;
use crate::errors::{OgwatchError, Result};
use crate::types::EventMask;

const LATENCY: Duration = Duration::from_millis(30);

/// Stops the stream's run loop when the source goes away.
struct StreamGuard(EventStreamHandler);

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

pub(super) fn subscribe(config: &WatchConfig) -> Result<Box<dyn EventSource>> {
    let root = config.root().to_path_buf();

    let (stream, handler) = create_event_stream(
        [root.as_path()],
        kFSEventStreamEventIdSinceNow,
        LATENCY,
        kFSEventStreamCreateFlagFileEvents | kFSEventStreamCreateFlagUseCFTypes,
    )
    .map_err(|e| OgwatchError::Config(format!("cannot create fsevents stream: {e}")))?;

    let (event_tx, event_rx) = mpsc::unbounded_channel::<RawEvent>();

    tokio::spawn(async move {
        let mut events = stream.into_flatten();
        while let Some(event) = events.next().await {
            let flags = EventMask::from(event.raw_flags);
            let raw = RawEvent::path(event.path, flags, kind_from_flags(flags));
            if event_tx.send(raw).is_err() {
                break;
            }
        }
        debug!("fsevents stream ended");
    });

    info!("fsevents stream started on {:?}", root);

    Ok(Box::new(ChannelSource::new(
        root,
        event_rx,
        Box::new(StreamGuard(handler)),
    )))
}
