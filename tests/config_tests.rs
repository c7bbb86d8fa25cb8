//! Integration tests for the configuration set
//!
//! These tests cover:
//! - Loading environments from TOML, YAML and JSON files
//! - Defaults for omitted fields
//! - Merging the user, project and `CUBECOBRA_INFRA_CONFIG` files
//! - Explicit paths and missing files
//! - Secrets read through a lookup

mod common;

use common::*;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::path::PathBuf;
use tempfile::tempdir;

use cubecobra_infra::config::{
    AppEnv, ConfigSet, Secrets, CONFIG_ENV_VAR, DEFAULT_INSTANCE_TYPE, DEFAULT_SOLUTION_STACK,
};
use cubecobra_infra::error::Error;

// ============================================================================
// File Format Tests
// ============================================================================

#[test]
fn test_load_toml() {
    let file = config_file(SAMPLE_TOML, "toml");
    let config = ConfigSet::from_file(file.path()).unwrap();

    assert_eq!(config.names().collect::<Vec<_>>(), vec!["production", "development"]);
    let prod = config.resolve("production").unwrap();
    assert_eq!(prod.stack_name.as_deref(), Some("CubeCobraProdStack"));
    assert_eq!(prod.domain, "cubecobra.com");
    assert_eq!(prod.fleet_size, 3);
    assert_eq!(prod.target.region, "us-east-2");
    assert_eq!(prod.github_repository.as_deref(), Some("dekkerglen/CubeCobra"));

    let job = &prod.jobs["UpdateCards"];
    assert_eq!(job.schedule, "rate(1 day)");
    assert_eq!(job.memory_limit_mib, Some(8192));
    assert_eq!(job.cpu, Some(2048));
}

#[test]
fn test_load_yaml() {
    let yaml = r#"
environments:
  staging:
    domain: staging.example.com
    environment_name: cubecobra-staging
    env: development
    fleet_size: 2
    features:
      downtime_active: true
    target:
      account: "123456789012"
      region: us-west-2
"#;
    let file = config_file(yaml, "yml");
    let config = ConfigSet::from_file(file.path()).unwrap();
    let staging = config.resolve("staging").unwrap();

    assert_eq!(staging.env, AppEnv::Development);
    assert_eq!(staging.fleet_size, 2);
    assert!(staging.features.downtime_active);
    assert!(staging.features.use_s3);
    assert_eq!(staging.target.account, "123456789012");
}

#[test]
fn test_load_json() {
    let json = r#"{
  "environments": {
    "production": {
      "domain": "cubecobra.com",
      "create_tables": true,
      "jobs": {
        "UpdateCards": { "schedule": "rate(1 day)", "cpu": 1024 }
      }
    }
  }
}"#;
    let file = config_file(json, "json");
    let config = ConfigSet::from_file(file.path()).unwrap();
    let prod = config.resolve("production").unwrap();

    assert!(prod.create_tables);
    let job = &prod.jobs["UpdateCards"];
    assert_eq!(job.cpu, Some(1024));
    assert_eq!(job.memory_limit_mib, None);
}

#[test]
fn test_unknown_extension_falls_back() {
    let file = config_file(SAMPLE_TOML, "conf");
    let config = ConfigSet::from_file(file.path()).unwrap();
    assert!(config.resolve("development").is_ok());
}

#[test]
fn test_malformed_file_fails() {
    let file = config_file("[environments.production\ndomain = ", "toml");
    let err = ConfigSet::from_file(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse config file"));
}

// ============================================================================
// Default Value Tests
// ============================================================================

#[test]
fn test_defaults_for_omitted_fields() {
    let file = config_file("[environments.bare]\ndomain = \"example.com\"\n", "toml");
    let config = ConfigSet::from_file(file.path()).unwrap();
    let bare = config.resolve("bare").unwrap();

    assert_eq!(bare.stack_name, None);
    assert_eq!(bare.fleet_size, 1);
    assert_eq!(bare.env, AppEnv::Production);
    assert_eq!(bare.instance_type, DEFAULT_INSTANCE_TYPE);
    assert_eq!(bare.solution_stack, DEFAULT_SOLUTION_STACK);
    assert!(!bare.create_tables);
    assert!(bare.github_repository.is_none());
    assert!(bare.jobs.is_empty());
}

#[test]
fn test_unknown_environment() {
    let config = ConfigSet::default();
    let err = config.resolve("production").unwrap_err();
    assert!(matches!(err, Error::UnknownEnvironment(ref name) if name == "production"));
}

// ============================================================================
// Loading Precedence Tests
// ============================================================================

#[test]
#[serial]
fn test_explicit_path_is_used_alone() {
    let file = config_file(SAMPLE_TOML, "toml");
    let path = file.path().to_path_buf();
    let config = ConfigSet::load(Some(&path)).unwrap();
    assert_eq!(config.environments.len(), 2);
}

#[test]
#[serial]
fn test_explicit_missing_path() {
    let path = PathBuf::from("/nonexistent/cubecobra.toml");
    let err = ConfigSet::load(Some(&path)).unwrap_err();
    let err = err.downcast_ref::<Error>().unwrap();
    assert!(matches!(err, Error::ConfigNotFound(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
#[serial]
fn test_env_var_file_overrides_user_file() {
    let home = tempdir().unwrap();
    let project = tempdir().unwrap();
    let user_dir = home.path().join(".cubecobra");
    std::fs::create_dir_all(&user_dir).unwrap();
    std::fs::write(user_dir.join("cubecobra.toml"), SAMPLE_TOML).unwrap();

    let override_file = config_file(
        "[environments.development]\ndomain = \"dev.example.com\"\nfleet_size = 2\n",
        "toml",
    );

    let old_home = std::env::var_os("HOME");
    let old_dir = std::env::current_dir().unwrap();
    std::env::set_var("HOME", home.path());
    std::env::set_var(CONFIG_ENV_VAR, override_file.path());
    std::env::set_current_dir(project.path()).unwrap();

    let result = ConfigSet::load(None);

    std::env::set_current_dir(old_dir).unwrap();
    std::env::remove_var(CONFIG_ENV_VAR);
    match old_home {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }

    let config = result.unwrap();
    assert_eq!(config.resolve("production").unwrap().domain, "cubecobra.com");
    let dev = config.resolve("development").unwrap();
    assert_eq!(dev.domain, "dev.example.com");
    assert_eq!(dev.fleet_size, 2);
}

#[test]
#[serial]
fn test_no_files_yields_empty_set() {
    let home = tempdir().unwrap();
    let project = tempdir().unwrap();

    let old_home = std::env::var_os("HOME");
    let old_dir = std::env::current_dir().unwrap();
    std::env::set_var("HOME", home.path());
    std::env::remove_var(CONFIG_ENV_VAR);
    std::env::set_current_dir(project.path()).unwrap();

    let result = ConfigSet::load(None);

    std::env::set_current_dir(old_dir).unwrap();
    match old_home {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }

    assert!(result.unwrap().environments.is_empty());
}

#[test]
fn test_merge_replaces_by_name() {
    let mut base = config_set("production", environment_config());
    let mut replacement = environment_config();
    replacement.domain = "other.example.com".into();
    base.merge(config_set("production", replacement));
    base.merge(config_set("development", environment_config()));

    assert_eq!(base.environments.len(), 2);
    assert_eq!(base.resolve("production").unwrap().domain, "other.example.com");
}

// ============================================================================
// Secrets Tests
// ============================================================================

#[test]
fn test_secrets_from_lookup() {
    let secrets = Secrets::from_lookup(|key| match key {
        "SESSION_TOKEN" => Some("token".to_string()),
        "EMAIL_USER" => Some("mailer".to_string()),
        _ => None,
    });
    assert_eq!(secrets.session_token, "token");
    assert_eq!(secrets.email_user, "mailer");
    assert_eq!(secrets.access_key, "");
}

#[test]
fn test_secrets_debug_is_redacted() {
    let secrets = Secrets::from_lookup(|key| match key {
        "SESSION_SECRET" => Some("hunter2".to_string()),
        _ => None,
    });
    let debug = format!("{:?}", secrets);
    assert!(!debug.contains("hunter2"));
    assert!(debug.contains("<redacted>"));
    assert!(debug.contains("<empty>"));
}
