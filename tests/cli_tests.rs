//! CLI tests for cubecobra-infra
//!
//! This test suite covers:
//! - Argument parsing and required flags
//! - Document output in JSON and YAML
//! - Plan, outputs, graph and environments commands
//! - Exit codes for configuration and usage errors
//! - Integration testing with assert_cmd

mod common;

use assert_cmd::Command;
use common::*;
use predicates::prelude::*;
use tempfile::{tempdir, NamedTempFile};

// Helper to get a command for testing
fn cubecobra_cmd() -> Command {
    let mut cmd = Command::cargo_bin("cubecobra-infra").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

// Helper to create the sample configuration
fn create_test_config() -> NamedTempFile {
    config_file(SAMPLE_TOML, "toml")
}

// ============================================================================
// Argument Parsing Tests
// ============================================================================

#[test]
fn test_help() {
    cubecobra_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("synth"))
        .stdout(predicate::str::contains("environments"));
}

#[test]
fn test_version_flag() {
    cubecobra_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_version_label() {
    let config = create_test_config();
    cubecobra_cmd()
        .arg("-c")
        .arg(config.path())
        .args(["synth", "--env", "production"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--version"));
}

#[test]
fn test_unknown_subcommand() {
    cubecobra_cmd().arg("deploy").assert().failure().code(2);
}

// ============================================================================
// Synth Command Tests
// ============================================================================

#[test]
fn test_synth_json() {
    let config = create_test_config();
    let output = cubecobra_cmd()
        .arg("-c")
        .arg(config.path())
        .args(["synth", "--env", "production", "--version", "1.0.2"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["stack"], "CubeCobraProdStack");
    assert_eq!(
        document["resources"]["Certificates/ConsoleCertificate"]["properties"]["DomainName"],
        "cubecobra.com"
    );
    assert!(document["resources"]["UpdateCards/UpdateCardsScheduleRule"].is_object());
    assert!(document["outputs"]["GitHubActionsRoleArn"].is_object());
}

#[test]
fn test_synth_yaml_to_file() {
    let config = create_test_config();
    let dir = tempdir().unwrap();
    let out = dir.path().join("out").join("development.yaml");

    cubecobra_cmd()
        .arg("-c")
        .arg(config.path())
        .args(["synth", "-e", "development", "--version", "2.0.0", "-f", "yaml", "-o"])
        .arg(&out)
        .assert()
        .success();

    let content = std::fs::read_to_string(&out).unwrap();
    let document: serde_yaml::Value = serde_yaml::from_str(&content).unwrap();
    assert_eq!(document["stack"].as_str(), Some("CubeCobraDevelopmentStack"));
    assert_eq!(document["format_version"].as_u64(), Some(1));
}

#[test]
fn test_synth_unknown_environment() {
    let config = create_test_config();
    cubecobra_cmd()
        .arg("-c")
        .arg(config.path())
        .args(["synth", "--env", "staging", "--version", "1.0.2"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn test_synth_missing_config_file() {
    cubecobra_cmd()
        .args(["-c", "/nonexistent/cubecobra.toml"])
        .args(["synth", "--env", "production", "--version", "1.0.2"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_synth_malformed_config() {
    let config = config_file("[environments.production\n", "toml");
    cubecobra_cmd()
        .arg("-c")
        .arg(config.path())
        .args(["synth", "--env", "production", "--version", "1.0.2"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_synth_job_without_sizing() {
    let config = config_file(
        &format!(
            "{}\n[environments.development.jobs.Broken]\nschedule = \"rate(1 day)\"\ncpu = 512\n",
            SAMPLE_TOML
        ),
        "toml",
    );
    cubecobra_cmd()
        .arg("-c")
        .arg(config.path())
        .args(["synth", "--env", "development", "--version", "1.0.2"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("memory_limit_mib"));
}

// ============================================================================
// Plan, Outputs and Graph Command Tests
// ============================================================================

#[test]
fn test_plan() {
    let config = create_test_config();
    cubecobra_cmd()
        .arg("-c")
        .arg(config.path())
        .args(["plan", "--env", "production", "--version", "1.0.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PLAN: CubeCobraProdStack"))
        .stdout(predicate::str::contains("ElasticBeanstalk/Environment"))
        .stdout(predicate::str::contains("[retain]"))
        .stdout(predicate::str::contains("resources,"));
}

#[test]
fn test_outputs() {
    let config = create_test_config();
    cubecobra_cmd()
        .arg("-c")
        .arg(config.path())
        .args(["outputs", "--env", "production", "--version", "1.0.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EcrRepositoryUri"))
        .stdout(predicate::str::contains("${ECR/EcrRepository.RepositoryUri}"))
        .stdout(predicate::str::contains("UpdateCardsRepositoryUri"));
}

#[test]
fn test_graph_dot() {
    let config = create_test_config();
    cubecobra_cmd()
        .arg("-c")
        .arg(config.path())
        .args(["graph", "--env", "development", "--version", "1.0.2"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph"))
        .stdout(predicate::str::contains("Route53/ConsoleAliasRecord"));
}

// ============================================================================
// Environments Command Tests
// ============================================================================

#[test]
fn test_environments_table() {
    let config = create_test_config();
    cubecobra_cmd()
        .arg("-c")
        .arg(config.path())
        .arg("environments")
        .assert()
        .success()
        .stdout(predicate::str::contains("CubeCobraProdStack"))
        .stdout(predicate::str::contains("CubeCobraDevelopmentStack"))
        .stdout(predicate::str::contains("123456789012/us-east-2"));
}

#[test]
fn test_environments_quiet() {
    let config = create_test_config();
    cubecobra_cmd()
        .arg("-c")
        .arg(config.path())
        .args(["environments", "--quiet"])
        .assert()
        .success()
        .stdout("production\ndevelopment\n");
}
