//! Configuration Tests
//!
//! Opening stores from TOML files and builder validation.

use crate::common::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file
}

#[test]
fn open_from_config_file() {
    let file = write_config(
        r#"
shard_num = 3
fields = ["service", "duration"]
default_limit = 25
scan_mode = "parallel"
"#,
    );

    let store = TraceStore::from_config_file(file.path()).unwrap();
    let config = store.config();
    assert_eq!(config.shard_num, 3);
    assert_eq!(config.fields, vec!["service", "duration"]);
    assert_eq!(config.default_limit, 25);
    assert_eq!(config.scan_mode, ScanMode::Parallel);
    assert_eq!(config.block_duration_secs, 3600);
}

#[test]
fn builder_overrides_file() {
    let file = write_config("shard_num = 3\nfields = [\"a\"]\n");
    let store = TraceStore::builder()
        .config_file(file.path())
        .unwrap()
        .shard_num(5)
        .open()
        .unwrap();
    assert_eq!(store.config().shard_num, 5);
    assert_eq!(store.config().fields, vec!["a"]);
}

#[test]
fn missing_file_is_io_error() {
    let err = TraceStore::from_config_file("/definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
}

#[test]
fn malformed_file_is_config_error() {
    let file = write_config("shard_num = \"many\"");
    let err = TraceStore::from_config_file(file.path()).unwrap_err();
    assert!(err.is_config());
}

#[test]
fn reserved_field_name_rejected() {
    let err = TraceStore::builder()
        .fields(["a", "data_binary"])
        .open()
        .unwrap_err();
    assert!(err.is_config());
}

#[test]
fn duplicate_field_rejected() {
    let err = TraceStore::builder().fields(["a", "a"]).open().unwrap_err();
    assert!(err.is_config());
}

#[test]
fn config_round_trips_through_toml() {
    let config = SeriesConfig {
        shard_num: 4,
        fields: vec!["x".into(), "y".into()],
        default_limit: 7,
        scan_mode: ScanMode::Parallel,
        block_duration_secs: 60,
    };
    let file = write_config(&config.to_toml_string().unwrap());
    let store = TraceStore::from_config_file(file.path()).unwrap();
    assert_eq!(store.config(), &config);
}

#[test]
fn store_without_fields_rejects_field_projection() {
    let store_without_fields = TraceStore::ephemeral().unwrap();
    assert!(store_without_fields.config().fields.is_empty());

    let err = store_without_fields
        .fetch_by_trace_id("t1", &project(&["a"]))
        .unwrap_err();
    assert!(err.is_precondition());
}
