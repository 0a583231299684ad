// src/config/loader.rs

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::backend::{self, Backend};
use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, WatchConfig, WatchOptions, DEFAULT_DEBOUNCE};
use crate::config::validate::validate_backend;
use crate::errors::{OgwatchError, Result};
use crate::events::mask::with_dir_bits;
use crate::events::{parse_dir_events, parse_event_list, parse_events};
use crate::types::Terminator;

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization; values are checked when the
/// [`WatchConfig`] is built.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: ConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// The selected backend together with the frozen watch configuration.
pub struct WatchSetup {
    pub backend: Box<dyn Backend>,
    pub config: WatchConfig,
}

impl std::fmt::Debug for WatchSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSetup")
            .field("backend", &self.backend.kind())
            .field("config", &self.config)
            .finish()
    }
}

/// Merge the command line with the optional config file and build the
/// watch configuration.
///
/// Precedence: CLI flag, then `[watch]` in the config file, then built-in
/// defaults. Boolean switches are enabled if either side enables them.
pub fn load_setup(args: &CliArgs) -> Result<WatchSetup> {
    let root = args.root.clone().ok_or(OgwatchError::MissingRoot)?;

    let file = match &args.config {
        Some(path) => load_from_path(path)?,
        None => ConfigFile::default(),
    };
    let section = file.watch;

    let kind = args.backend.or(section.backend).unwrap_or_default();
    validate_backend(kind)?;
    let backend = backend::for_kind(kind);

    let mapping = backend.mapping();
    let semantics = backend.semantics();

    let file_mask = match (&args.file_events, &section.file_events) {
        (Some(names), _) => parse_events(mapping, names),
        (None, Some(list)) => parse_event_list(mapping, list),
        (None, None) => 0,
    };
    let dir_mask = match (&args.dir_events, &section.dir_events) {
        (Some(names), _) => parse_dir_events(mapping, semantics, names),
        (None, Some(list)) => with_dir_bits(parse_event_list(mapping, list), semantics),
        (None, None) => 0,
    };

    let debounce = args
        .debounce_ms
        .or(section.debounce_ms)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_DEBOUNCE);

    let options = WatchOptions {
        root,
        file_mask,
        dir_mask,
        generic: args.generic || section.generic,
        terminator: Terminator::from_nul_flag(args.null_terminator || section.null_terminator),
        debounce,
    };

    let config = WatchConfig::new(options, &backend.default_masks())?;

    Ok(WatchSetup { backend, config })
}
