//! Configuration module for cubecobra-infra
//!
//! Handles loading the named-environment configuration set from:
//! - User configuration (~/.cubecobra/cubecobra.toml)
//! - Project configuration (./cubecobra.toml)
//! - The file named by `CUBECOBRA_INFRA_CONFIG`
//! - An explicit `--config` path (used alone when given)
//!
//! Later files override earlier ones environment by environment.
//!
//! Secrets never live in these files. They are read from the process
//! environment by [`Secrets::from_env`], once, at the entry point.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Environment variable naming an extra configuration file
pub const CONFIG_ENV_VAR: &str = "CUBECOBRA_INFRA_CONFIG";

/// Default project configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "cubecobra.toml";

/// Default instance type for the compute environment
pub const DEFAULT_INSTANCE_TYPE: &str = "t3.large";

/// Default platform for the compute environment
pub const DEFAULT_SOLUTION_STACK: &str = "64bit Amazon Linux 2023 v6.4.0 running Node.js 20";

/// Set of named deployment environments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSet {
    /// Environments by name
    pub environments: IndexMap<String, EnvironmentConfig>,
}

/// Application runtime mode passed through as `ENV`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    /// Production mode
    #[default]
    Production,
    /// Development mode
    Development,
}

impl AppEnv {
    /// String form used in the environment mapping
    pub fn as_str(&self) -> &'static str {
        match self {
            AppEnv::Production => "production",
            AppEnv::Development => "development",
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account and region a stack deploys to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentTarget {
    /// Cloud account identifier
    pub account: String,
    /// Region
    pub region: String,
}

/// Feature flags exposed to the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Serve the maintenance page
    pub downtime_active: bool,
    /// Enable ad integration
    pub nitropay_enabled: bool,
    /// Enable the in-process cache
    pub cache_enabled: bool,
    /// Run redis setup on boot
    pub redis_setup: bool,
    /// Read data from object storage
    pub use_s3: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            downtime_active: false,
            nitropay_enabled: false,
            cache_enabled: false,
            redis_setup: false,
            use_s3: true,
        }
    }
}

/// A scheduled container job.
///
/// Sizing has no default; a job without `memory_limit_mib` or `cpu` is
/// rejected before any resource is declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Container command
    pub command: Vec<String>,
    /// `cron(...)` or `rate(...)` expression
    pub schedule: String,
    /// Memory limit in MiB
    pub memory_limit_mib: Option<u32>,
    /// CPU units
    pub cpu: Option<u32>,
}

/// One named deployment environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Stack name; derived from the environment name when absent
    pub stack_name: Option<String>,
    /// Public domain name
    pub domain: String,
    /// Compute environment name
    pub environment_name: String,
    /// Bucket holding application bundles
    pub app_bucket: String,
    /// Bucket holding application data
    pub data_bucket: String,
    /// Log group name
    pub log_group: String,
    /// Log stream name
    pub log_stream: String,
    /// Table name prefix
    pub dynamo_prefix: String,
    /// Application runtime mode
    pub env: AppEnv,
    /// Minimum number of instances
    pub fleet_size: u32,
    /// Instance type
    pub instance_type: String,
    /// Platform name
    pub solution_stack: String,
    /// OAuth redirect target
    pub patreon_redirect_uri: String,
    /// Feature flags
    pub features: FeatureFlags,
    /// Declare the data tables instead of using existing ones
    pub create_tables: bool,
    /// `owner/repo` allowed to push images through OIDC federation
    pub github_repository: Option<String>,
    /// Deployment target
    pub target: DeploymentTarget,
    /// Scheduled jobs by name
    pub jobs: IndexMap<String, JobConfig>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            stack_name: None,
            domain: String::new(),
            environment_name: String::new(),
            app_bucket: String::new(),
            data_bucket: String::new(),
            log_group: String::new(),
            log_stream: String::new(),
            dynamo_prefix: String::new(),
            env: AppEnv::Production,
            fleet_size: 1,
            instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
            solution_stack: DEFAULT_SOLUTION_STACK.to_string(),
            patreon_redirect_uri: String::new(),
            features: FeatureFlags::default(),
            create_tables: false,
            github_repository: None,
            target: DeploymentTarget::default(),
            jobs: IndexMap::new(),
        }
    }
}

impl ConfigSet {
    /// Load the configuration set from all sources
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(Error::ConfigNotFound(path.clone()).into());
            }
            return Self::from_file(path);
        }

        let mut config = ConfigSet::default();
        for path in Self::get_config_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                config.merge(Self::from_file(&path)?);
            }
        }
        Ok(config)
    }

    /// Get the list of configuration file paths to check, lowest priority first
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".cubecobra").join(DEFAULT_CONFIG_FILE));
        }

        paths.push(PathBuf::from(DEFAULT_CONFIG_FILE));

        if let Ok(env_config) = std::env::var(CONFIG_ENV_VAR) {
            paths.push(PathBuf::from(env_config));
        }

        paths
    }

    /// Load from a single file, picking the format by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let config: ConfigSet = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            _ => toml::from_str(&content)
                .or_else(|_| serde_yaml::from_str(&content))
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        Ok(config)
    }

    /// Merge another set into this one; its environments win by name
    pub fn merge(&mut self, other: ConfigSet) {
        for (name, env) in other.environments {
            self.environments.insert(name, env);
        }
    }

    /// Look up a named environment
    pub fn resolve(&self, name: &str) -> crate::error::Result<&EnvironmentConfig> {
        self.environments
            .get(name)
            .ok_or_else(|| Error::UnknownEnvironment(name.to_string()))
    }

    /// Configured environment names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(String::as_str)
    }
}

/// Credentials and third-party keys passed to the application.
///
/// Absent values are empty strings; they are never replaced with
/// placeholder credentials.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    /// Access key id
    pub access_key: String,
    /// Secret access key
    pub secret_key: String,
    /// Mail account user
    pub email_user: String,
    /// Mail account password
    pub email_pass: String,
    /// Token guarding job endpoints
    pub jobs_token: String,
    /// Patreon OAuth client id
    pub patreon_client_id: String,
    /// Patreon OAuth client secret
    pub patreon_client_secret: String,
    /// Patreon webhook secret
    pub patreon_hook_secret: String,
    /// Redis host
    pub redis_host: String,
    /// Session token
    pub session_token: String,
    /// Session signing secret
    pub session_secret: String,
    /// TCGplayer public key
    pub tcg_player_public_key: String,
    /// TCGplayer private key
    pub tcg_player_private_key: String,
}

impl Secrets {
    /// Read secrets from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read secrets through a lookup function
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();
        Self {
            access_key: get("AWS_ACCESS_KEY_ID"),
            secret_key: get("AWS_SECRET_ACCESS_KEY"),
            email_user: get("EMAIL_USER"),
            email_pass: get("EMAIL_PASS"),
            jobs_token: get("JOBS_TOKEN"),
            patreon_client_id: get("PATREON_CLIENT_ID"),
            patreon_client_secret: get("PATREON_CLIENT_SECRET"),
            patreon_hook_secret: get("PATREON_HOOK_SECRET"),
            redis_host: get("REDIS_HOST"),
            session_token: get("SESSION_TOKEN"),
            session_secret: get("SESSION_SECRET"),
            tcg_player_public_key: get("TCG_PLAYER_PUBLIC_KEY"),
            tcg_player_private_key: get("TCG_PLAYER_PRIVATE_KEY"),
        }
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |s: &str| if s.is_empty() { "<empty>" } else { "<redacted>" };
        f.debug_struct("Secrets")
            .field("access_key", &redact(&self.access_key))
            .field("secret_key", &redact(&self.secret_key))
            .field("email_user", &redact(&self.email_user))
            .field("email_pass", &redact(&self.email_pass))
            .field("jobs_token", &redact(&self.jobs_token))
            .field("patreon_client_id", &redact(&self.patreon_client_id))
            .field("patreon_client_secret", &redact(&self.patreon_client_secret))
            .field("patreon_hook_secret", &redact(&self.patreon_hook_secret))
            .field("redis_host", &redact(&self.redis_host))
            .field("session_token", &redact(&self.session_token))
            .field("session_secret", &redact(&self.session_secret))
            .field("tcg_player_public_key", &redact(&self.tcg_player_public_key))
            .field("tcg_player_private_key", &redact(&self.tcg_player_private_key))
            .finish()
    }
}
