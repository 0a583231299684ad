use ogwatch::backend::{fanotify, fsevents, portable, ResolvedEvent};
use ogwatch::engine::{Classifier, OutputLine};
use ogwatch::types::{BackendKind, EntryKind, Terminator};
use ogwatch_test_utils::WatchConfigBuilder;

mod common;

fn names(lines: &[OutputLine]) -> Vec<String> {
    lines
        .iter()
        .map(|l| String::from_utf8(l.to_bytes(Terminator::Newline)).unwrap())
        .collect()
}

#[test]
fn test_verbose_names_in_table_order() {
    let (_dir, root) = common::temp_root();
    let config = WatchConfigBuilder::new(&root)
        .backend(BackendKind::Fanotify)
        .file_mask(fanotify::FAN_MODIFY | fanotify::FAN_CREATE | fanotify::FAN_CLOSE_WRITE)
        .build();
    let classifier = Classifier::new(&config, &fanotify::MAPPING, &fanotify::SEMANTICS);

    let path = root.join("a.txt");
    let event = ResolvedEvent::new(
        &path,
        fanotify::FAN_CLOSE_WRITE | fanotify::FAN_CREATE,
        EntryKind::File,
    );

    assert_eq!(
        names(&classifier.lines(&event, &path)),
        vec![
            format!("{}\n", common::line("FAN_CREATE", "", &path)),
            format!("{}\n", common::line("FAN_CLOSE_WRITE", "", &path)),
        ]
    );
}

#[test]
fn test_directory_qualifier() {
    let (_dir, root) = common::temp_root();
    let config = WatchConfigBuilder::new(&root)
        .backend(BackendKind::Fanotify)
        .dir_mask(fanotify::FAN_CREATE | fanotify::FAN_ONDIR)
        .build();
    let classifier = Classifier::new(&config, &fanotify::MAPPING, &fanotify::SEMANTICS);

    let path = root.join("sub");
    let event = ResolvedEvent::new(
        &path,
        fanotify::FAN_CREATE | fanotify::FAN_ONDIR,
        EntryKind::Directory,
    );

    assert!(classifier.wants(&event));
    assert_eq!(
        names(&classifier.lines(&event, &path)),
        vec![format!("{}\n", common::line("FAN_CREATE", "|FAN_ONDIR", &path))]
    );
}

#[test]
fn test_kind_selects_want_mask() {
    let (_dir, root) = common::temp_root();
    let config = WatchConfigBuilder::new(&root)
        .backend(BackendKind::Fsevents)
        .file_mask(fsevents::ITEM_MODIFIED)
        .dir_mask(fsevents::ITEM_CREATED)
        .build();
    let classifier = Classifier::new(&config, &fsevents::MAPPING, &fsevents::SEMANTICS);

    let created_file = ResolvedEvent::new(
        root.join("f"),
        fsevents::ITEM_CREATED | fsevents::ITEM_IS_FILE,
        EntryKind::File,
    );
    let created_dir = ResolvedEvent::new(
        root.join("d"),
        fsevents::ITEM_CREATED | fsevents::ITEM_IS_DIR,
        EntryKind::Directory,
    );
    assert!(!classifier.wants(&created_file));
    assert!(classifier.wants(&created_dir));

    // Kind bits alone never count as a wanted event.
    let bare = ResolvedEvent::new(root.join("f"), fsevents::ITEM_IS_FILE, EntryKind::File);
    assert!(!classifier.wants(&bare));
}

#[test]
fn test_verbose_only_names_wanted_bits() {
    let (_dir, root) = common::temp_root();
    let config = WatchConfigBuilder::new(&root)
        .backend(BackendKind::Fsevents)
        .file_mask(fsevents::ITEM_MODIFIED)
        .build();
    let classifier = Classifier::new(&config, &fsevents::MAPPING, &fsevents::SEMANTICS);

    let path = root.join("link");
    let event = ResolvedEvent::new(
        &path,
        fsevents::ITEM_MODIFIED | fsevents::ITEM_XATTR_MOD | fsevents::ITEM_IS_SYMLINK,
        EntryKind::Symlink,
    );

    assert_eq!(
        names(&classifier.lines(&event, &path)),
        vec![format!("{}\n", common::line("ItemModified", "|ItemIsSymlink", &path))]
    );
}

#[test]
fn test_unknown_kind_is_tagged_and_unfiltered() {
    let (_dir, root) = common::temp_root();
    let config = WatchConfigBuilder::new(&root)
        .backend(BackendKind::Fsevents)
        .file_mask(fsevents::ITEM_MODIFIED)
        .build();
    let classifier = Classifier::new(&config, &fsevents::MAPPING, &fsevents::SEMANTICS);

    let path = root.join("what");
    let event = ResolvedEvent::new(&path, fsevents::ITEM_XATTR_MOD, EntryKind::Unknown);

    assert!(classifier.wants(&event));
    assert_eq!(
        names(&classifier.lines(&event, &path)),
        vec![format!("{}\n", common::line("ItemXattrMod", "|???", &path))]
    );
}

#[test]
fn test_generic_prints_path_once() {
    let (_dir, root) = common::temp_root();
    let config = WatchConfigBuilder::new(&root)
        .backend(BackendKind::Notify)
        .generic(true)
        .build();
    let classifier = Classifier::new(&config, &portable::MAPPING, &portable::SEMANTICS);

    let path = root.join("a");
    let event = ResolvedEvent::new(
        &path,
        portable::CREATE | portable::MODIFY | portable::IS_FILE,
        EntryKind::File,
    );
    assert_eq!(classifier.lines(&event, &path), vec![OutputLine::Path(path.clone())]);
}

#[test]
fn test_generic_overflow_reports_root() {
    let (_dir, root) = common::temp_root();
    let config = WatchConfigBuilder::new(&root)
        .backend(BackendKind::Fsevents)
        .generic(true)
        .build();
    let classifier = Classifier::new(&config, &fsevents::MAPPING, &fsevents::SEMANTICS);

    let path = root.join("deep/inside");
    let event = ResolvedEvent::new(&path, fsevents::KERNEL_DROPPED, EntryKind::Unknown);
    assert_eq!(classifier.lines(&event, &path), vec![OutputLine::Path(root.clone())]);
}

#[test]
fn test_duplicate_rename_collapses() {
    let (_dir, root) = common::temp_root();
    let config = WatchConfigBuilder::new(&root).backend(BackendKind::Fsevents).build();
    let mut classifier = Classifier::new(&config, &fsevents::MAPPING, &fsevents::SEMANTICS);

    let path = root.join("moved");
    let flags = fsevents::ITEM_RENAMED | fsevents::ITEM_IS_FILE;

    assert!(!classifier.is_duplicate(flags, &path));
    assert!(classifier.is_duplicate(flags, &path));

    // Different flags or path break the pair.
    assert!(!classifier.is_duplicate(flags | fsevents::ITEM_MODIFIED, &path));
    assert!(!classifier.is_duplicate(flags | fsevents::ITEM_MODIFIED, &root.join("other")));
}

#[test]
fn test_repeated_non_rename_is_not_duplicate() {
    let (_dir, root) = common::temp_root();
    let config = WatchConfigBuilder::new(&root).backend(BackendKind::Fsevents).build();
    let mut classifier = Classifier::new(&config, &fsevents::MAPPING, &fsevents::SEMANTICS);

    let path = root.join("file");
    let flags = fsevents::ITEM_MODIFIED | fsevents::ITEM_IS_FILE;
    assert!(!classifier.is_duplicate(flags, &path));
    assert!(!classifier.is_duplicate(flags, &path));
}

#[test]
fn test_output_line_terminators() {
    let line = OutputLine::Notice("ESTALE");
    assert_eq!(line.to_bytes(Terminator::Newline), b"ESTALE\n");
    assert_eq!(line.to_bytes(Terminator::Nul), b"ESTALE\0");
}
