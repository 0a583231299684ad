use std::fs;
use std::time::Duration;

use ogwatch::backend::portable;
use ogwatch::cli;
use ogwatch::config::{load_from_path, load_setup, DEFAULT_DEBOUNCE};
use ogwatch::errors::OgwatchError;
use ogwatch::types::{BackendKind, Terminator};

mod common;

#[test]
fn test_load_full_file() {
    let (_dir, root) = common::temp_root();
    let path = root.join("ogwatch.toml");
    fs::write(
        &path,
        r#"
[watch]
backend = "notify"
file_events = ["Create", "Remove"]
dir_events = ["Create"]
generic = true
null_terminator = true
debounce_ms = 75
"#,
    )
    .unwrap();

    let file = load_from_path(&path).unwrap();
    assert_eq!(file.watch.backend, Some(BackendKind::Notify));
    assert_eq!(
        file.watch.file_events,
        Some(vec!["Create".to_string(), "Remove".to_string()])
    );
    assert!(file.watch.generic);
    assert!(file.watch.null_terminator);
    assert_eq!(file.watch.debounce_ms, Some(75));
}

#[test]
fn test_unknown_key_is_rejected() {
    let (_dir, root) = common::temp_root();
    let path = root.join("ogwatch.toml");
    fs::write(&path, "[watch]\nrecursive = true\n").unwrap();

    assert!(matches!(load_from_path(&path), Err(OgwatchError::Toml(_))));
}

#[test]
fn test_missing_root_is_reported() {
    let args = cli::try_parse_from(["ogwatch", "--backend", "notify"]).unwrap();
    let err = load_setup(&args).unwrap_err();
    assert!(matches!(err, OgwatchError::MissingRoot));
    assert_eq!(err.to_string(), "Missing path argument. Use -h for help.");
}

#[test]
fn test_root_must_exist() {
    let (_dir, root) = common::temp_root();
    let missing = root.join("nope");
    let args = cli::try_parse_from(["ogwatch", "--backend", "notify", missing.to_str().unwrap()]).unwrap();
    assert!(matches!(load_setup(&args), Err(OgwatchError::Os { .. })));
}

#[test]
fn test_root_must_be_directory() {
    let (_dir, root) = common::temp_root();
    let file = root.join("plain");
    fs::write(&file, b"x").unwrap();
    let args = cli::try_parse_from(["ogwatch", "--backend", "notify", file.to_str().unwrap()]).unwrap();
    assert!(matches!(load_setup(&args), Err(OgwatchError::Config(_))));
}

#[test]
fn test_defaults_applied_when_no_masks() {
    let (_dir, root) = common::temp_root();
    let args = cli::try_parse_from(["ogwatch", "--backend", "notify", root.to_str().unwrap()]).unwrap();
    let setup = load_setup(&args).unwrap();

    let defaults = setup.backend.default_masks();
    assert_eq!(setup.config.file_mask(), defaults.verbose_files);
    assert_eq!(setup.config.dir_mask(), defaults.verbose_dirs);
    assert_eq!(setup.config.root(), root.as_path());
    assert_eq!(setup.config.debounce(), DEFAULT_DEBOUNCE);
    assert_eq!(setup.config.terminator(), Terminator::Newline);
}

#[test]
fn test_only_unknown_names_fall_back_to_defaults() {
    let (_dir, root) = common::temp_root();
    let args = cli::try_parse_from([
        "ogwatch", "--backend", "notify", "-f", "Bogus", root.to_str().unwrap(),
    ])
    .unwrap();
    let setup = load_setup(&args).unwrap();
    assert_eq!(setup.config.file_mask(), setup.backend.default_masks().verbose_files);
}

#[test]
fn test_explicit_file_mask_keeps_dir_mask_empty() {
    let (_dir, root) = common::temp_root();
    let args = cli::try_parse_from([
        "ogwatch", "--backend", "notify", "-f", "Create", root.to_str().unwrap(),
    ])
    .unwrap();
    let setup = load_setup(&args).unwrap();
    assert_eq!(setup.config.file_mask(), portable::CREATE);
    assert_eq!(setup.config.dir_mask(), 0);
}

#[test]
fn test_cli_overrides_file() {
    let (_dir, root) = common::temp_root();
    let path = root.join("ogwatch.toml");
    fs::write(
        &path,
        "[watch]\nbackend = \"notify\"\nfile_events = [\"Remove\"]\ndebounce_ms = 500\nnull_terminator = true\n",
    )
    .unwrap();

    let args = cli::try_parse_from([
        "ogwatch",
        "--config",
        path.to_str().unwrap(),
        "-f",
        "Create",
        "--debounce-ms",
        "20",
        root.to_str().unwrap(),
    ])
    .unwrap();
    let setup = load_setup(&args).unwrap();

    assert_eq!(setup.backend.kind(), BackendKind::Notify);
    assert_eq!(setup.config.file_mask(), portable::CREATE);
    assert_eq!(setup.config.debounce(), Duration::from_millis(20));
    // Switches are OR-ed.
    assert_eq!(setup.config.terminator(), Terminator::Nul);
}

#[test]
fn test_file_values_used_without_cli() {
    let (_dir, root) = common::temp_root();
    let path = root.join("ogwatch.toml");
    fs::write(
        &path,
        "[watch]\nbackend = \"notify\"\nfile_events = [\"Modify\"]\ngeneric = true\n",
    )
    .unwrap();

    let args = cli::try_parse_from(["ogwatch", "--config", path.to_str().unwrap(), root.to_str().unwrap()]).unwrap();
    let setup = load_setup(&args).unwrap();

    assert_eq!(setup.config.file_mask(), portable::MODIFY);
    assert!(setup.config.generic());
}

#[test]
fn test_debounce_out_of_range() {
    let (_dir, root) = common::temp_root();
    for ms in ["0", "10001"] {
        let args = cli::try_parse_from([
            "ogwatch", "--backend", "notify", "--debounce-ms", ms, root.to_str().unwrap(),
        ])
        .unwrap();
        assert!(matches!(load_setup(&args), Err(OgwatchError::Config(_))));
    }
}

#[test]
fn test_unavailable_backend_is_rejected() {
    let (_dir, root) = common::temp_root();
    let unavailable = if cfg!(target_os = "macos") { "fanotify" } else { "fsevents" };
    let args = cli::try_parse_from(["ogwatch", "--backend", unavailable, root.to_str().unwrap()]).unwrap();
    assert!(matches!(load_setup(&args), Err(OgwatchError::Config(_))));
}
