//! Environment variables injected into the compute environment.

use indexmap::IndexMap;

use super::StackParams;

/// Listening port of the application
pub const APP_PORT: &str = "8080";

/// Every key the application reads, in emission order
pub const ENVIRONMENT_KEYS: [&str; 28] = [
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_LOG_GROUP",
    "AWS_LOG_STREAM",
    "AWS_REGION",
    "CACHE_ENABLED",
    "CUBECOBRA_VERSION",
    "DATA_BUCKET",
    "DOMAIN",
    "DOWNTIME_ACTIVE",
    "DYNAMO_PREFIX",
    "EMAIL_CONFIG_PASSWORD",
    "EMAIL_CONFIG_USERNAME",
    "ENV",
    "JOBS_TOKEN",
    "NITROPAY_ENABLED",
    "PATREON_CLIENT_ID",
    "PATREON_CLIENT_SECRET",
    "PATREON_HOOK_SECRET",
    "PATREON_REDIRECT_URI",
    "PORT",
    "REDIS_HOST",
    "REDIS_SETUP",
    "SESSION",
    "SESSION_SECRET",
    "TCG_PLAYER_PRIVATE_KEY",
    "TCG_PLAYER_PUBLIC_KEY",
    "USE_S3",
];

fn flag(value: bool) -> String {
    String::from(if value { "true" } else { "false" })
}

/// The fixed key set with values resolved from configuration and secrets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentVariables {
    values: IndexMap<String, String>,
}

impl EnvironmentVariables {
    /// Resolve every key for a set of stack parameters
    pub fn from_params(params: &StackParams) -> Self {
        let env = &params.environment;
        let secrets = &params.secrets;

        // Sized by ENVIRONMENT_KEYS, so a key without a value does not compile
        let pairs: [(&str, String); ENVIRONMENT_KEYS.len()] = [
            ("AWS_ACCESS_KEY_ID", secrets.access_key.clone()),
            ("AWS_SECRET_ACCESS_KEY", secrets.secret_key.clone()),
            ("AWS_LOG_GROUP", env.log_group.clone()),
            ("AWS_LOG_STREAM", env.log_stream.clone()),
            ("AWS_REGION", env.target.region.clone()),
            ("CACHE_ENABLED", flag(env.features.cache_enabled)),
            ("CUBECOBRA_VERSION", params.version.clone()),
            ("DATA_BUCKET", env.data_bucket.clone()),
            ("DOMAIN", env.domain.clone()),
            ("DOWNTIME_ACTIVE", flag(env.features.downtime_active)),
            ("DYNAMO_PREFIX", env.dynamo_prefix.clone()),
            ("EMAIL_CONFIG_PASSWORD", secrets.email_pass.clone()),
            ("EMAIL_CONFIG_USERNAME", secrets.email_user.clone()),
            ("ENV", env.env.to_string()),
            ("JOBS_TOKEN", secrets.jobs_token.clone()),
            ("NITROPAY_ENABLED", flag(env.features.nitropay_enabled)),
            ("PATREON_CLIENT_ID", secrets.patreon_client_id.clone()),
            ("PATREON_CLIENT_SECRET", secrets.patreon_client_secret.clone()),
            ("PATREON_HOOK_SECRET", secrets.patreon_hook_secret.clone()),
            ("PATREON_REDIRECT_URI", env.patreon_redirect_uri.clone()),
            ("PORT", APP_PORT.to_string()),
            ("REDIS_HOST", secrets.redis_host.clone()),
            ("REDIS_SETUP", flag(env.features.redis_setup)),
            ("SESSION", secrets.session_token.clone()),
            ("SESSION_SECRET", secrets.session_secret.clone()),
            ("TCG_PLAYER_PRIVATE_KEY", secrets.tcg_player_private_key.clone()),
            ("TCG_PLAYER_PUBLIC_KEY", secrets.tcg_player_public_key.clone()),
            ("USE_S3", flag(env.features.use_s3)),
        ];
        let values = pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();

        Self { values }
    }

    /// Value of a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Keys in emission order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no variables
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume into the ordered mapping
    pub fn into_map(self) -> IndexMap<String, String> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnvironmentConfig, Secrets};

    fn params() -> StackParams {
        StackParams {
            stack_name: "CubeCobraTestStack".into(),
            version: "1.0.2".into(),
            environment: EnvironmentConfig {
                domain: "example.com".into(),
                ..EnvironmentConfig::default()
            },
            secrets: Secrets {
                tcg_player_public_key: "public".into(),
                tcg_player_private_key: "private".into(),
                ..Secrets::default()
            },
        }
    }

    #[test]
    fn test_every_key_present() {
        let vars = EnvironmentVariables::from_params(&params());
        assert_eq!(vars.len(), ENVIRONMENT_KEYS.len());
        assert!(vars.keys().eq(ENVIRONMENT_KEYS.iter().copied()));
        assert_eq!(vars.get("AWS_ACCESS_KEY_ID"), Some(""));
    }

    #[test]
    fn test_tcg_keys_are_not_swapped() {
        let vars = EnvironmentVariables::from_params(&params());
        assert_eq!(vars.get("TCG_PLAYER_PUBLIC_KEY"), Some("public"));
        assert_eq!(vars.get("TCG_PLAYER_PRIVATE_KEY"), Some("private"));
    }

    #[test]
    fn test_flags_and_fixed_values() {
        let vars = EnvironmentVariables::from_params(&params());
        assert_eq!(vars.get("PORT"), Some("8080"));
        assert_eq!(vars.get("USE_S3"), Some("true"));
        assert_eq!(vars.get("CACHE_ENABLED"), Some("false"));
        assert_eq!(vars.get("ENV"), Some("production"));
        assert_eq!(vars.get("CUBECOBRA_VERSION"), Some("1.0.2"));
    }
}
