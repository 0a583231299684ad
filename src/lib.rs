// src/lib.rs

pub mod access;
pub mod backend;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod logging;
pub mod types;

use std::io;

use tracing::info;

use crate::access::UidSwitchingFilter;
use crate::cli::CliArgs;
use crate::config::load_setup;
use crate::engine::{EventPipeline, WatchLoop};
use crate::errors::{OgwatchError, Result};

/// High-level entry point used by `main.rs`.
///
/// Loads the configuration, subscribes the selected backend and drives the
/// watch loop over standard output. It only returns on error: a source
/// that closes is reported as [`OgwatchError::SourceClosed`].
pub async fn run(args: CliArgs) -> Result<()> {
    let setup = load_setup(&args)?;
    let backend = setup.backend;
    let config = setup.config;

    info!(
        backend = %backend.kind(),
        root = %config.root().display(),
        file_mask = %format_args!("{:#x}", config.file_mask()),
        dir_mask = %format_args!("{:#x}", config.dir_mask()),
        generic = config.generic(),
        "starting watch"
    );

    let source = backend.subscribe(&config)?;
    let access = UidSwitchingFilter::from_process();
    if access.context().is_elevated() {
        info!(
            real_uid = access.context().real_uid,
            effective_uid = access.context().effective_uid,
            "running elevated; events are checked against the real uid"
        );
    }

    let pipeline = EventPipeline::new(
        &config,
        backend.mapping(),
        backend.semantics(),
        access,
        io::stdout().lock(),
        tokio::time::Instant::now().into_std(),
    );

    WatchLoop::new(source, pipeline).run().await?;
    Err(OgwatchError::SourceClosed)
}
