//! Shared fixtures for the cubecobra-infra integration tests.
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::io::Write;

use indexmap::IndexMap;
use tempfile::NamedTempFile;

use cubecobra_infra::config::{
    ConfigSet, DeploymentTarget, EnvironmentConfig, FeatureFlags, JobConfig, Secrets,
};
use cubecobra_infra::stack::{Stack, StackParams};

/// Version label used throughout the tests
pub const TEST_VERSION: &str = "1.4.2";

/// A complete environment for `example.com`
pub fn environment_config() -> EnvironmentConfig {
    EnvironmentConfig {
        stack_name: Some("CubeCobraTestStack".into()),
        domain: "example.com".into(),
        environment_name: "cubecobra-test".into(),
        app_bucket: "cubecobra-test-app".into(),
        data_bucket: "cubecobra-test-data".into(),
        log_group: "CUBECOBRA".into(),
        log_stream: "TEST".into(),
        dynamo_prefix: "TEST".into(),
        patreon_redirect_uri: "https://example.com/patreon/redirect".into(),
        features: FeatureFlags::default(),
        create_tables: true,
        github_repository: Some("dekkerglen/CubeCobra".into()),
        target: DeploymentTarget {
            account: "123456789012".into(),
            region: "us-east-2".into(),
        },
        ..EnvironmentConfig::default()
    }
}

/// A job with full sizing
pub fn job(schedule: &str, memory: u32, cpu: u32) -> JobConfig {
    JobConfig {
        command: vec!["node".into(), "jobs/run.js".into()],
        schedule: schedule.into(),
        memory_limit_mib: Some(memory),
        cpu: Some(cpu),
    }
}

/// Environment with two scheduled jobs
pub fn environment_with_jobs() -> EnvironmentConfig {
    let mut jobs = IndexMap::new();
    jobs.insert("UpdateCards".to_string(), job("rate(1 day)", 8192, 2048));
    jobs.insert(
        "RotateFeatured".to_string(),
        job("cron(0 10 ? * MON *)", 1024, 512),
    );
    EnvironmentConfig {
        jobs,
        ..environment_config()
    }
}

/// Configuration set holding one environment under `name`
pub fn config_set(name: &str, env: EnvironmentConfig) -> ConfigSet {
    let mut config = ConfigSet::default();
    config.environments.insert(name.to_string(), env);
    config
}

/// Secrets with every value set to a recognizable marker
pub fn secrets() -> Secrets {
    Secrets::from_lookup(|key| Some(format!("{}-value", key.to_lowercase())))
}

/// Parameters for an environment
pub fn params(env: EnvironmentConfig) -> StackParams {
    StackParams {
        stack_name: env
            .stack_name
            .clone()
            .unwrap_or_else(|| "CubeCobraTestStack".into()),
        version: TEST_VERSION.into(),
        environment: env,
        secrets: secrets(),
    }
}

/// Assemble a stack, panicking on failure
pub fn assemble(env: EnvironmentConfig) -> Stack {
    Stack::assemble(&params(env)).expect("stack should assemble")
}

/// Sample TOML configuration with a production and a development environment
pub const SAMPLE_TOML: &str = r#"
[environments.production]
stack_name = "CubeCobraProdStack"
domain = "cubecobra.com"
environment_name = "cubecobra-prod"
app_bucket = "cubecobra"
data_bucket = "cubecobra-data-production"
log_group = "CUBECOBRA"
log_stream = "PRODUCTION"
dynamo_prefix = "PROD"
fleet_size = 3
github_repository = "dekkerglen/CubeCobra"

[environments.production.target]
account = "123456789012"
region = "us-east-2"

[environments.production.jobs.UpdateCards]
command = ["node", "jobs/update_cards.js"]
schedule = "rate(1 day)"
memory_limit_mib = 8192
cpu = 2048

[environments.development]
domain = "cubecobradev.com"
environment_name = "cubecobra-dev"
app_bucket = "cubecobra-dev"
data_bucket = "cubecobra-data-development"
log_group = "CUBECOBRA"
log_stream = "DEVELOPMENT"
dynamo_prefix = "DEV"
env = "development"

[environments.development.target]
account = "123456789012"
region = "us-east-2"
"#;

/// Write content to a temporary file with the given extension
pub fn config_file(content: &str, extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()
        .expect("create temp config");
    file.write_all(content.as_bytes()).expect("write temp config");
    file.flush().expect("flush temp config");
    file
}
