//! Integration test for taking the log level from the settings file.
use harboropt::cli::{RunOpts, handle_run_command};
use harboropt::log::{LOG_LEVEL_ENV_VAR, log_level};
use harboropt::settings::Settings;
use log::LevelFilter;
use std::path::Path;
use tempfile::tempdir;

/// Logging can be switched off from settings alone, which also silences the solver
#[test]
fn test_log_level_off_from_settings() {
    unsafe { std::env::remove_var(LOG_LEVEL_ENV_VAR) };

    let tempdir = tempdir().unwrap();
    let opts = RunOpts {
        output_dir: Some(tempdir.path().join("results")),
        ..RunOpts::default()
    };
    let settings = Settings {
        log_level: "off".into(),
        ..Settings::default()
    };
    handle_run_command(Path::new("demos/harbor"), &opts, Some(settings)).unwrap();

    assert_eq!(log_level(), Some(LevelFilter::Off));
}
