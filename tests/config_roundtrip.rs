//! Config persistence round trips through real files.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use chrono::NaiveTime;
use siyam::schedule::SoundProfile;
use siyam::{ReminderError, SiyamConfig};
use siyam_times::{Coordinates, Locality, RetryPolicy};

#[test]
fn save_then_load_preserves_every_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = SiyamConfig::default();
    config.times.base_url = "http://127.0.0.1:9000".into();
    config.times.retry = RetryPolicy::new(4, 250);
    config.times.cache_ttl_seconds = 0;
    config.reminders.location.locality = Locality::new("Istanbul", "Turkey");
    config.reminders.location.coordinates = Some(Coordinates {
        latitude: 41.0082,
        longitude: 28.9784,
    });
    config.reminders.sound_profile = SoundProfile::Chime;
    config.reminders.journal_time = NaiveTime::from_hms_opt(22, 15, 0).unwrap();
    config.reminders.toggles.hydration = true;
    config.logging.file = true;

    config.save_to_file(&path).unwrap();
    let loaded = SiyamConfig::from_file(&path).unwrap();

    assert_eq!(loaded, config);
    loaded.validate().unwrap();
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = SiyamConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, SiyamConfig::default());
}

#[test]
fn unreadable_toml_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[reminders\nlookahead_days = ").unwrap();

    let err = SiyamConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ReminderError::Config(_)), "{err:?}");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SiyamConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ReminderError::Io(_)));
}
