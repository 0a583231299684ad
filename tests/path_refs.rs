use std::path::PathBuf;

use ogwatch::backend::{fanotify, resolve_path_ref, RawEvent, ResolvedEvent, Resolution};
use ogwatch::errors::OgwatchError;
use ogwatch::types::EntryKind;
use ogwatch_test_utils::handle_event;

#[test]
fn test_path_reference_passes_through() {
    let root = PathBuf::from("/watched");
    let raw = RawEvent::path("/watched/a.txt", fanotify::FAN_CREATE, EntryKind::File);

    let resolution = resolve_path_ref(&root, raw).unwrap();

    assert_eq!(
        resolution,
        Resolution::Resolved(ResolvedEvent::new(
            "/watched/a.txt",
            fanotify::FAN_CREATE,
            EntryKind::File
        ))
    );
}

#[test]
fn test_overflow_resolves_to_root() {
    let root = PathBuf::from("/watched");

    let resolution = resolve_path_ref(&root, RawEvent::overflow(fanotify::FAN_Q_OVERFLOW)).unwrap();

    let Resolution::Resolved(event) = resolution else {
        panic!("overflow should resolve");
    };
    assert_eq!(event.path(), root);
    assert_eq!(event.flags, fanotify::FAN_Q_OVERFLOW);
    assert_eq!(event.kind, EntryKind::Unknown);
}

#[test]
fn test_handle_on_path_source_is_protocol_error() {
    let raw = handle_event(b"h", "x", fanotify::FAN_CREATE, EntryKind::File);

    let err = resolve_path_ref(&PathBuf::from("/watched"), raw).unwrap_err();

    assert!(matches!(err, OgwatchError::Protocol(_)));
}
