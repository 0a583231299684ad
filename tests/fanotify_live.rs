#![cfg(target_os = "linux")]

use std::fs;
use std::time::Duration;

use ogwatch::access::UidSwitchingFilter;
use ogwatch::backend::{fanotify, Backend};
use ogwatch::engine::{EventPipeline, WatchLoop};
use ogwatch::types::BackendKind;
use ogwatch_test_utils::{SharedBuffer, WatchConfigBuilder};

mod common;

/// Needs CAP_SYS_ADMIN and a filesystem that supports file handles; the
/// test skips itself when the subscription is refused.
#[tokio::test]
async fn test_fanotify_reports_created_file() {
    common::init_tracing();
    let (_dir, root) = common::temp_root();
    let config = WatchConfigBuilder::new(&root)
        .backend(BackendKind::Fanotify)
        .file_mask(fanotify::FAN_CREATE)
        .build();

    let backend = fanotify::FanotifyBackend;
    let source = match backend.subscribe(&config) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("skipping: fanotify unavailable here ({err})");
            return;
        }
    };

    fs::File::create(root.join("a.txt")).unwrap();

    let out = SharedBuffer::new();
    let pipeline = EventPipeline::new(
        &config,
        backend.mapping(),
        backend.semantics(),
        UidSwitchingFilter::from_process(),
        out.clone(),
        std::time::Instant::now(),
    );

    let expected = format!("FAN_CREATE {}", root.join("a.txt").display());
    let wait = async {
        while !out.lines().contains(&expected) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };

    tokio::select! {
        res = WatchLoop::new(source, pipeline).run() => panic!("watch loop ended early: {res:?}"),
        _ = common::with_timeout(wait) => {}
    }

    // Filesystem-wide marks see other activity too, none of it outside root.
    for line in out.lines() {
        if line == fanotify::SEMANTICS.stale_notice {
            continue;
        }
        let path = line.split_once(' ').map(|(_, p)| p).unwrap_or(&line);
        assert!(path.starts_with(&*root.to_string_lossy()), "unexpected line {line:?}");
    }
}
