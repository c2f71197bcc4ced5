//! Environment variable overrides for Settings.
//!
//! Kept in a single test so no other test in this binary observes the
//! variables while they are set.

use std::env;
use std::fs;

use tempfile::TempDir;

use h5ndiff::config::Settings;

#[test]
fn given_env_vars_when_load_then_override_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("h5ndiff.toml");
    fs::write(&path, "precision = 0.5\nsymmetric = false\n").unwrap();

    // env beats file
    env::set_var("H5NDIFF_PRECISION", "0.125");
    env::set_var("H5NDIFF_SYMMETRIC", "true");
    let settings = Settings::load(Some(&path)).expect("load settings");
    assert_eq!(settings.precision, 0.125);
    assert!(settings.symmetric);

    // unparsable value is an error, not a silent default
    env::set_var("H5NDIFF_JOBS", "lots");
    let result = Settings::load(Some(&path));
    env::remove_var("H5NDIFF_JOBS");
    assert!(result.is_err());

    env::remove_var("H5NDIFF_PRECISION");
    env::remove_var("H5NDIFF_SYMMETRIC");
    let settings = Settings::load(Some(&path)).expect("load settings");
    assert_eq!(settings.precision, 0.5);
    assert!(!settings.symmetric);
}
