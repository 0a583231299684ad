#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Instant;

use ogwatch::access::mock::MockAccessFilter;
use ogwatch::config::WatchConfig;
use ogwatch::engine::EventPipeline;
use ogwatch::events::{EventMapping, FlagSemantics};
use ogwatch_test_utils::SharedBuffer;

pub use ogwatch_test_utils::{init_tracing, with_timeout};

/// A canonical temporary watch root.
pub fn temp_root() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let root = dir.path().canonicalize().expect("canonicalize temp dir");
    (dir, root)
}

/// Pipeline writing into a shared buffer through a permissive mock filter.
pub fn pipeline(
    config: &WatchConfig,
    mapping: &'static EventMapping,
    semantics: &'static FlagSemantics,
) -> (EventPipeline<MockAccessFilter, SharedBuffer>, SharedBuffer, MockAccessFilter) {
    let out = SharedBuffer::new();
    let access = MockAccessFilter::new();
    let pipeline = EventPipeline::new(
        config,
        mapping,
        semantics,
        access.clone(),
        out.clone(),
        Instant::now(),
    );
    (pipeline, out, access)
}

pub fn line(name: &str, qualifier: &str, path: &Path) -> String {
    format!("{name}{qualifier} {}", path.display())
}
