//! Configuration loader for package-promoter
//!
//! This module provides configuration loading, merging and resolution into
//! the `PromoteSettings` a run works from.

use super::config::*;
use crate::cdn::DEFAULT_FASTLY_API_URL;
use crate::core::error::PromoteError;
use crate::security::credentials::{
    AWS_ACCESS_KEY_ID_VAR, AWS_REGION_VAR, AWS_SECRET_ACCESS_KEY_VAR, AwsCredentials,
    FASTLY_API_KEY_VAR, FASTLY_SERVICE_ID_VAR, FastlyCredentials,
};
use crate::validation::ReleaseValidator;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Environment variable pattern (${VAR_NAME})
const ENV_VAR_PATTERN: &str = r"\$\{([A-Z_][A-Z0-9_]*)\}";

/// Configuration load options
#[derive(Debug, Clone, Default)]
pub struct ConfigLoadOptions {
    /// Config file to read (default: ./promote-config.yaml)
    pub config_file: Option<PathBuf>,

    /// CLI arguments (highest priority)
    pub cli_args: Option<PromoteConfig>,

    /// Environment variables
    pub env: HashMap<String, String>,
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and resolve settings from every source
    pub async fn load_settings(options: ConfigLoadOptions) -> Result<PromoteSettings, PromoteError> {
        let config_file = options
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let config = Self::load(options).await?;

        Self::resolve(config, config_file)
    }

    /// Load configuration from multiple sources with priority
    ///
    /// Priority (high to low):
    /// 1. CLI arguments
    /// 2. Environment variables
    /// 3. Config file
    /// 4. Default values
    pub async fn load(options: ConfigLoadOptions) -> Result<PromoteConfig, PromoteError> {
        let mut configs: Vec<PromoteConfig> = Vec::new();

        // 4. Default values (lowest priority)
        configs.push(Self::default_config());

        // 3. Config file
        let config_file = options
            .config_file
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if let Some(file_config) = Self::load_config_file(&config_file).await? {
            configs.push(file_config);
        }

        // 2. Environment variables
        if let Some(env_config) = Self::load_env_config(&options.env) {
            configs.push(env_config);
        }

        // 1. CLI arguments (highest priority)
        if let Some(cli_config) = options.cli_args {
            configs.push(cli_config);
        }

        let merged_config = Self::merge_configs(configs);

        Self::expand_env_vars(merged_config, &options.env)
    }

    fn default_config() -> PromoteConfig {
        PromoteConfig {
            project: Some(Project::default()),
            channel: Some(Channel::default()),
            bucket: Some(DEFAULT_BUCKET.to_string()),
            ignore_failures: Some(false),
            aws: Some(AwsConfig {
                region: Some(DEFAULT_AWS_REGION.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Load configuration from a YAML file; a missing file is skipped
    async fn load_config_file(file_path: &Path) -> Result<Option<PromoteConfig>, PromoteError> {
        if !fs::try_exists(file_path).await? {
            eprintln!(
                "⏭️  Skipping config file {} as it does not exist",
                file_path.display()
            );
            return Ok(None);
        }

        let content = fs::read_to_string(file_path).await.map_err(|e| {
            PromoteError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        let mut config: PromoteConfig = serde_yaml::from_str(&content).map_err(|e| {
            PromoteError::ConfigError(format!("Failed to parse YAML config: {}", e))
        })?;

        // Catalog paths in the file are relative to the file itself
        if let Some(catalog_file) = &config.catalog_file
            && catalog_file.is_relative()
            && let Some(parent) = file_path.parent()
        {
            config.catalog_file = Some(parent.join(catalog_file));
        }

        debug!(path = %file_path.display(), "loaded config file");
        Ok(Some(config))
    }

    /// Load configuration from environment variables
    fn load_env_config(env: &HashMap<String, String>) -> Option<PromoteConfig> {
        let get = |name: &str| env.get(name).filter(|v| !v.is_empty()).cloned();

        let aws = AwsConfig {
            region: get(AWS_REGION_VAR),
            access_key_id: get(AWS_ACCESS_KEY_ID_VAR),
            secret_access_key: get(AWS_SECRET_ACCESS_KEY_VAR),
        };
        let fastly = FastlyConfig {
            api_key: get(FASTLY_API_KEY_VAR),
            service_id: get(FASTLY_SERVICE_ID_VAR),
            api_url: None,
        };

        let has_aws = aws != AwsConfig::default();
        let has_fastly = fastly != FastlyConfig::default();
        if !has_aws && !has_fastly {
            return None;
        }

        Some(PromoteConfig {
            aws: has_aws.then_some(aws),
            fastly: has_fastly.then_some(fastly),
            ..Default::default()
        })
    }

    /// Merge multiple configurations with priority
    fn merge_configs(configs: Vec<PromoteConfig>) -> PromoteConfig {
        let mut result = PromoteConfig::default();

        for config in configs {
            Self::merge_into(&mut result, config);
        }

        result
    }

    /// Merge source config into target, field by field
    fn merge_into(target: &mut PromoteConfig, source: PromoteConfig) {
        fn take<T>(target: &mut Option<T>, source: Option<T>) {
            if source.is_some() {
                *target = source;
            }
        }

        take(&mut target.project, source.project);
        take(&mut target.channel, source.channel);
        take(&mut target.version, source.version);
        take(&mut target.build_number, source.build_number);
        take(&mut target.bucket, source.bucket);
        take(&mut target.catalog_file, source.catalog_file);
        take(&mut target.ignore_failures, source.ignore_failures);

        if let Some(source_aws) = source.aws {
            let target_aws = target.aws.get_or_insert_with(AwsConfig::default);
            take(&mut target_aws.region, source_aws.region);
            take(&mut target_aws.access_key_id, source_aws.access_key_id);
            take(&mut target_aws.secret_access_key, source_aws.secret_access_key);
        }

        if let Some(source_fastly) = source.fastly {
            let target_fastly = target.fastly.get_or_insert_with(FastlyConfig::default);
            take(&mut target_fastly.api_key, source_fastly.api_key);
            take(&mut target_fastly.service_id, source_fastly.service_id);
            take(&mut target_fastly.api_url, source_fastly.api_url);
        }
    }

    /// Expand `${VAR}` references in string settings
    fn expand_env_vars(
        mut config: PromoteConfig,
        env: &HashMap<String, String>,
    ) -> Result<PromoteConfig, PromoteError> {
        let pattern = Regex::new(ENV_VAR_PATTERN)
            .map_err(|e| PromoteError::ConfigError(e.to_string()))?;
        let expand = |value: &mut Option<String>| {
            if let Some(v) = value {
                *v = Self::expand_string(&pattern, v, env);
            }
        };

        expand(&mut config.version);
        expand(&mut config.build_number);
        expand(&mut config.bucket);

        if let Some(aws) = &mut config.aws {
            expand(&mut aws.region);
            expand(&mut aws.access_key_id);
            expand(&mut aws.secret_access_key);
        }

        if let Some(fastly) = &mut config.fastly {
            expand(&mut fastly.api_key);
            expand(&mut fastly.service_id);
            expand(&mut fastly.api_url);
        }

        Ok(config)
    }

    /// Expand environment variables in a single string
    fn expand_string(pattern: &Regex, input: &str, env: &HashMap<String, String>) -> String {
        let mut result = input.to_string();

        for cap in pattern.captures_iter(input) {
            let var_name = &cap[1];

            if let Some(value) = env.get(var_name) {
                result = result.replace(&format!("${{{}}}", var_name), value);
            } else {
                warn!(variable = var_name, "environment variable not found");
                eprintln!("⚠️  Environment variable {} not found", var_name);
            }
        }

        result
    }

    /// Turn a merged configuration into settings
    ///
    /// # Errors
    ///
    /// `MissingSetting` when version or build number is absent, or when only
    /// half of the Fastly credentials are configured; `InvalidRelease` when
    /// the release coordinates fail validation.
    pub fn resolve(config: PromoteConfig, config_file: PathBuf) -> Result<PromoteSettings, PromoteError> {
        let version = config.version.ok_or_else(|| PromoteError::MissingSetting {
            name: "version".to_string(),
        })?;
        let build_number = config.build_number.ok_or_else(|| PromoteError::MissingSetting {
            name: "build_number".to_string(),
        })?;

        let validation = ReleaseValidator::new().validate(&version, &build_number);
        for warning in &validation.warnings {
            warn!("{}", warning);
            eprintln!("⚠️  {}", warning);
        }
        if !validation.is_valid {
            return Err(PromoteError::InvalidRelease(validation.errors.join("; ")));
        }
        if let Some(prerelease) = &validation.prerelease {
            info!(%version, %prerelease, "promoting a pre-release version");
        }

        let aws = config.aws.unwrap_or_default();
        let aws_credentials = match (aws.access_key_id, aws.secret_access_key) {
            (Some(id), Some(secret)) => Some(AwsCredentials::new(id, secret)),
            _ => None,
        };

        let fastly = match config.fastly {
            Some(FastlyConfig {
                api_key: Some(api_key),
                service_id: Some(service_id),
                api_url,
            }) => Some(FastlyCredentials::new(
                api_key,
                service_id,
                api_url.unwrap_or_else(|| DEFAULT_FASTLY_API_URL.to_string()),
            )),
            Some(FastlyConfig {
                api_key: Some(_),
                service_id: None,
                ..
            }) => {
                return Err(PromoteError::MissingSetting {
                    name: "fastly.service_id".to_string(),
                });
            }
            Some(FastlyConfig {
                api_key: None,
                service_id: Some(_),
                ..
            }) => {
                return Err(PromoteError::MissingSetting {
                    name: "fastly.api_key".to_string(),
                });
            }
            _ => None,
        };

        Ok(PromoteSettings {
            project: config.project.unwrap_or_default(),
            channel: config.channel.unwrap_or_default(),
            version,
            build_number,
            bucket: config.bucket.unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            aws_region: aws.region.unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            aws_credentials,
            fastly,
            catalog_file: config.catalog_file,
            ignore_failures: config.ignore_failures.unwrap_or(false),
            config_file,
        })
    }

    /// AWS credentials, or the error naming where to configure them
    pub fn require_aws_credentials(settings: &PromoteSettings) -> Result<&AwsCredentials, PromoteError> {
        settings
            .aws_credentials
            .as_ref()
            .ok_or_else(|| PromoteError::MissingCredentials {
                provider: "AWS".to_string(),
                config_file: settings.config_file.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn cli(version: &str, build_number: &str) -> PromoteConfig {
        PromoteConfig {
            version: Some(version.to_string()),
            build_number: Some(build_number.to_string()),
            ..Default::default()
        }
    }

    fn options(dir: &TempDir, cli_args: PromoteConfig, env: HashMap<String, String>) -> ConfigLoadOptions {
        ConfigLoadOptions {
            config_file: Some(dir.path().join(DEFAULT_CONFIG_FILE)),
            cli_args: Some(cli_args),
            env,
        }
    }

    #[tokio::test]
    async fn test_defaults_apply_without_file() {
        let dir = TempDir::new().unwrap();

        let settings = ConfigLoader::load_settings(options(&dir, cli("1.0.0", "1"), HashMap::new()))
            .await
            .unwrap();

        assert_eq!(settings.project, Project::Sensu);
        assert_eq!(settings.channel, Channel::Unstable);
        assert_eq!(settings.bucket, DEFAULT_BUCKET);
        assert_eq!(settings.aws_region, DEFAULT_AWS_REGION);
        assert!(settings.aws_credentials.is_none());
        assert!(settings.fastly.is_none());
        assert!(!settings.ignore_failures);
    }

    #[tokio::test]
    async fn test_priority_cli_over_env_over_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"
project: uchiwa
channel: stable
bucket: file-bucket
aws:
  region: file-region
  access_key_id: FILEKEYID
  secret_access_key: file-secret
"#,
        )
        .unwrap();

        let mut cli_args = cli("1.0.0", "1");
        cli_args.bucket = Some("cli-bucket".to_string());

        let settings = ConfigLoader::load_settings(options(
            &dir,
            cli_args,
            env(&[(AWS_REGION_VAR, "env-region")]),
        ))
        .await
        .unwrap();

        assert_eq!(settings.project, Project::Uchiwa);
        assert_eq!(settings.channel, Channel::Stable);
        assert_eq!(settings.bucket, "cli-bucket");
        assert_eq!(settings.aws_region, "env-region");

        let aws = settings.aws_credentials.unwrap();
        assert_eq!(aws.access_key_id, "FILEKEYID");
        assert_eq!(aws.secret_access_key.expose_secret(), "file-secret");
    }

    #[tokio::test]
    async fn test_env_var_expansion_in_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"
fastly:
  api_key: ${MY_FASTLY_KEY}
  service_id: svc123
"#,
        )
        .unwrap();

        let settings = ConfigLoader::load_settings(options(
            &dir,
            cli("1.0.0", "1"),
            env(&[("MY_FASTLY_KEY", "expanded-key")]),
        ))
        .await
        .unwrap();

        let fastly = settings.fastly.unwrap();
        assert_eq!(fastly.api_key.expose_secret(), "expanded-key");
        assert_eq!(fastly.service_id, "svc123");
        assert_eq!(fastly.api_url, DEFAULT_FASTLY_API_URL);
    }

    #[test]
    fn test_expand_string_leaves_unknown_variables() {
        let pattern = Regex::new(ENV_VAR_PATTERN).unwrap();
        let result = ConfigLoader::expand_string(
            &pattern,
            "${KNOWN}-${UNKNOWN}",
            &env(&[("KNOWN", "a")]),
        );

        assert_eq!(result, "a-${UNKNOWN}");
    }

    #[tokio::test]
    async fn test_relative_catalog_file_resolved_against_config_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "catalog_file: catalogs/sensu.yaml\n",
        )
        .unwrap();

        let settings = ConfigLoader::load_settings(options(&dir, cli("1.0.0", "1"), HashMap::new()))
            .await
            .unwrap();

        assert_eq!(
            settings.catalog_file,
            Some(dir.path().join("catalogs/sensu.yaml"))
        );
    }

    #[tokio::test]
    async fn test_invalid_yaml_is_config_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "channel: [stable").unwrap();

        let err = ConfigLoader::load_settings(options(&dir, cli("1.0.0", "1"), HashMap::new()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_missing_version() {
        let config = PromoteConfig {
            build_number: Some("1".to_string()),
            ..Default::default()
        };

        let err = ConfigLoader::resolve(config, PathBuf::from(DEFAULT_CONFIG_FILE)).unwrap_err();
        assert!(matches!(err, PromoteError::MissingSetting { ref name } if name == "version"));
    }

    #[test]
    fn test_missing_build_number() {
        let config = PromoteConfig {
            version: Some("1.0.0".to_string()),
            ..Default::default()
        };

        let err = ConfigLoader::resolve(config, PathBuf::from(DEFAULT_CONFIG_FILE)).unwrap_err();
        assert!(matches!(err, PromoteError::MissingSetting { ref name } if name == "build_number"));
    }

    #[test]
    fn test_invalid_build_number() {
        let err = ConfigLoader::resolve(cli("1.0.0", "zero"), PathBuf::from(DEFAULT_CONFIG_FILE))
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_RELEASE");
    }

    #[test]
    fn test_half_configured_fastly_rejected() {
        let mut config = cli("1.0.0", "1");
        config.fastly = Some(FastlyConfig {
            api_key: Some("key".to_string()),
            ..Default::default()
        });

        let err = ConfigLoader::resolve(config, PathBuf::from(DEFAULT_CONFIG_FILE)).unwrap_err();
        assert!(
            matches!(err, PromoteError::MissingSetting { ref name } if name == "fastly.service_id")
        );
    }

    #[test]
    fn test_require_aws_credentials() {
        let settings =
            ConfigLoader::resolve(cli("1.0.0", "1"), PathBuf::from("/etc/promote.yaml")).unwrap();

        let err = ConfigLoader::require_aws_credentials(&settings).unwrap_err();
        assert_eq!(
            err.to_string(),
            "AWS credentials not provided. Please configure via /etc/promote.yaml"
        );
    }

    #[test]
    fn test_load_env_config() {
        let config = ConfigLoader::load_env_config(&env(&[
            (AWS_ACCESS_KEY_ID_VAR, "AKIAEXAMPLE"),
            (AWS_SECRET_ACCESS_KEY_VAR, "secret"),
            (FASTLY_SERVICE_ID_VAR, "svc"),
            (FASTLY_API_KEY_VAR, ""),
        ]))
        .unwrap();

        let aws = config.aws.unwrap();
        assert_eq!(aws.access_key_id.as_deref(), Some("AKIAEXAMPLE"));
        assert_eq!(aws.region, None);
        let fastly = config.fastly.unwrap();
        assert_eq!(fastly.service_id.as_deref(), Some("svc"));
        assert_eq!(fastly.api_key, None);

        assert!(ConfigLoader::load_env_config(&env(&[("HOME", "/root")])).is_none());
    }

    #[test]
    fn test_merge_configs() {
        let base = PromoteConfig {
            bucket: Some("base".to_string()),
            aws: Some(AwsConfig {
                region: Some("us-east-1".to_string()),
                access_key_id: Some("BASEKEY".to_string()),
                secret_access_key: None,
            }),
            ..Default::default()
        };
        let overlay = PromoteConfig {
            aws: Some(AwsConfig {
                region: Some("eu-west-1".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = ConfigLoader::merge_configs(vec![base, overlay]);
        let aws = merged.aws.unwrap();

        assert_eq!(merged.bucket.as_deref(), Some("base"));
        assert_eq!(aws.region.as_deref(), Some("eu-west-1"));
        assert_eq!(aws.access_key_id.as_deref(), Some("BASEKEY"));
    }
}
