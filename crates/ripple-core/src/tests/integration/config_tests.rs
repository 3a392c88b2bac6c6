use std::fs;

use tempfile::tempdir;

use crate::config::{self, DispatcherConfig};
use crate::error::Error;
use crate::event::{EventDispatcher, EventSystemError, MessageEvent};

#[test]
fn test_dispatcher_from_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dispatcher.json");
    fs::write(&path, r#"{ "name": "ui", "queue_capacity": 1, "report_handler_panics": false }"#).unwrap();

    let loaded: DispatcherConfig = config::load_from_path(&path).unwrap();
    loaded.validate().unwrap();
    let dispatcher = EventDispatcher::with_config(loaded);
    assert_eq!(dispatcher.config().name, "ui");

    dispatcher.queue(MessageEvent::new("log", "first")).unwrap();
    let err = dispatcher.queue(MessageEvent::new("log", "second")).unwrap_err();
    assert!(matches!(err, EventSystemError::QueueFull { capacity: 1 }));

    // Lifted into the crate error with `?`-style conversion
    let err: Error = err.into();
    assert!(err.to_string().contains("queue is full"));
}

#[cfg(feature = "toml-config")]
#[test]
fn test_toml_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dispatcher.toml");
    fs::write(&path, "name = \"input\"\nqueue_capacity = 64\n").unwrap();

    let loaded: DispatcherConfig = config::load_from_path(&path).unwrap();
    assert_eq!(loaded.name, "input");
    assert_eq!(loaded.queue_capacity, Some(64));
    assert!(loaded.report_handler_panics);
}

#[test]
fn test_unsupported_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dispatcher.ini");
    fs::write(&path, "name=ui").unwrap();

    let result: crate::Result<DispatcherConfig> = config::load_from_path(&path);
    assert!(matches!(result, Err(Error::UnsupportedConfigFormat { .. })));
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.json");

    let result: crate::Result<DispatcherConfig> = config::load_from_path(&path);
    match result {
        Err(Error::ConfigIo { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected ConfigIo error, got {:?}", other.map(|_| ())),
    }
}
