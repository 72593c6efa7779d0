//! Configuration module for Opsroom.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::usecases::await_provisioning::PollPolicy;
use crate::usecases::provision_workspace::FlowConfig;
use crate::usecases::reconcile_members::LookupPolicy;
use crate::usecases::resolve_coordinates::RetryPolicy;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for Opsroom.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub tenant: TenantConfig,
    pub workspace: WorkspaceConfig,
    pub provisioning: ProvisioningConfig,
    pub coordinates: CoordinatesConfig,
    pub upload: UploadConfig,
    pub membership: MembershipConfig,
    pub notify: NotifyConfig,
    pub logging: LoggingConfig,
}

/// Azure AD tenant and application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Directory (tenant) ID. `None` until configured.
    pub tenant_id: Option<String>,
    /// Application (client) ID for the client-credentials grant.
    pub client_id: Option<String>,
    /// Name of the environment variable holding the client secret.
    /// The secret itself never lives in the file.
    pub client_secret_env: String,
}

/// Team template and channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Team template to instantiate, e.g. `standard`.
    pub template_id: String,
    /// Display name of the channel whose file library receives uploads.
    pub channel_name: String,
}

/// Provisioning wait settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    /// Seconds between status polls of the creation operation.
    pub poll_interval_secs: u64,
    /// Hard ceiling in seconds on the total wait.
    pub ceiling_secs: u64,
}

/// Storage coordinate lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatesConfig {
    /// Retries after the first lookup attempt.
    pub max_retries: u32,
    /// Seconds between lookup attempts.
    pub retry_delay_secs: u64,
}

/// Chunked upload settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Size of each upload chunk in bytes.
    pub chunk_size_bytes: u64,
}

/// Membership reconciliation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipConfig {
    /// Retries after the first identity lookup attempt.
    pub lookup_retries: u32,
    /// Seconds between identity lookup attempts.
    pub lookup_delay_secs: u64,
    /// Where guest invitation redemption lands.
    pub invite_redirect_url: String,
}

/// Recipient broadcast settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Recipients fetched per page during the broadcast.
    pub page_size: usize,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/opsroom/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("opsroom")
            .join("config.yaml")
    }

    /// Map the file-level tunables into the flow configuration.
    pub fn flow_config(&self) -> FlowConfig {
        FlowConfig {
            poll: PollPolicy {
                interval: Duration::from_secs(self.provisioning.poll_interval_secs),
                ceiling: Duration::from_secs(self.provisioning.ceiling_secs),
            },
            coordinate_retry: RetryPolicy {
                max_retries: self.coordinates.max_retries,
                delay: Duration::from_secs(self.coordinates.retry_delay_secs),
            },
            member_lookup: LookupPolicy {
                max_retries: self.membership.lookup_retries,
                delay: Duration::from_secs(self.membership.lookup_delay_secs),
            },
            recipient_page_size: self.notify.page_size,
            invite_redirect_url: self.membership.invite_redirect_url.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::default()
// ---------------------------------------------------------------------------

// Config derives Default because all its fields implement Default.
// (clippy::derivable_impls)

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            template_id: "standard".to_string(),
            channel_name: "General".to_string(),
        }
    }
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            ceiling_secs: 600,
        }
    }
}

impl Default for CoordinatesConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_delay_secs: 2,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: 1024 * 1024,
        }
    }
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            lookup_retries: 3,
            lookup_delay_secs: 2,
            invite_redirect_url: "https://teams.microsoft.com".to_string(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self { page_size: 50 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TenantConfig {
    /// Conventional environment variable for the client secret.
    pub const DEFAULT_SECRET_ENV: &'static str = "OPSROOM_CLIENT_SECRET";
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            tenant_id: None,
            client_id: None,
            client_secret_env: Self::DEFAULT_SECRET_ENV.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"provisioning.ceiling_secs"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- workspace ---
        if self.workspace.template_id.trim().is_empty() {
            errors.push(ValidationError {
                field: "workspace.template_id".into(),
                message: "must not be empty".into(),
            });
        }
        if self.workspace.channel_name.trim().is_empty() {
            errors.push(ValidationError {
                field: "workspace.channel_name".into(),
                message: "must not be empty".into(),
            });
        }

        // --- provisioning ---
        if self.provisioning.poll_interval_secs == 0 {
            errors.push(ValidationError {
                field: "provisioning.poll_interval_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.provisioning.ceiling_secs == 0 {
            errors.push(ValidationError {
                field: "provisioning.ceiling_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.provisioning.ceiling_secs < self.provisioning.poll_interval_secs {
            errors.push(ValidationError {
                field: "provisioning.ceiling_secs".into(),
                message: format!(
                    "ceiling_secs ({}) must not be below poll_interval_secs ({})",
                    self.provisioning.ceiling_secs, self.provisioning.poll_interval_secs
                ),
            });
        }

        // --- coordinates ---
        if self.coordinates.retry_delay_secs == 0 {
            errors.push(ValidationError {
                field: "coordinates.retry_delay_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- upload ---
        if self.upload.chunk_size_bytes == 0 {
            errors.push(ValidationError {
                field: "upload.chunk_size_bytes".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- membership ---
        if self.membership.lookup_delay_secs == 0 {
            errors.push(ValidationError {
                field: "membership.lookup_delay_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.membership.invite_redirect_url.trim().is_empty() {
            errors.push(ValidationError {
                field: "membership.invite_redirect_url".into(),
                message: "must not be empty".into(),
            });
        }

        // --- notify ---
        if self.notify.page_size == 0 {
            errors.push(ValidationError {
                field: "notify.page_size".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use opsroom_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .tenant_id("00000000-0000-0000-0000-000000000000")
///     .provisioning_ceiling_secs(900)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- tenant ---

    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.config.tenant.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.config.tenant.client_id = Some(client_id.into());
        self
    }

    pub fn client_secret_env(mut self, var: impl Into<String>) -> Self {
        self.config.tenant.client_secret_env = var.into();
        self
    }

    // --- workspace ---

    pub fn workspace_template_id(mut self, template_id: impl Into<String>) -> Self {
        self.config.workspace.template_id = template_id.into();
        self
    }

    pub fn workspace_channel_name(mut self, channel_name: impl Into<String>) -> Self {
        self.config.workspace.channel_name = channel_name.into();
        self
    }

    // --- provisioning ---

    pub fn provisioning_poll_interval_secs(mut self, seconds: u64) -> Self {
        self.config.provisioning.poll_interval_secs = seconds;
        self
    }

    pub fn provisioning_ceiling_secs(mut self, seconds: u64) -> Self {
        self.config.provisioning.ceiling_secs = seconds;
        self
    }

    // --- coordinates ---

    pub fn coordinates_max_retries(mut self, n: u32) -> Self {
        self.config.coordinates.max_retries = n;
        self
    }

    pub fn coordinates_retry_delay_secs(mut self, seconds: u64) -> Self {
        self.config.coordinates.retry_delay_secs = seconds;
        self
    }

    // --- upload ---

    pub fn upload_chunk_size_bytes(mut self, bytes: u64) -> Self {
        self.config.upload.chunk_size_bytes = bytes;
        self
    }

    // --- membership ---

    pub fn membership_lookup_retries(mut self, n: u32) -> Self {
        self.config.membership.lookup_retries = n;
        self
    }

    pub fn membership_lookup_delay_secs(mut self, seconds: u64) -> Self {
        self.config.membership.lookup_delay_secs = seconds;
        self
    }

    pub fn membership_invite_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.config.membership.invite_redirect_url = url.into();
        self
    }

    // --- notify ---

    pub fn notify_page_size(mut self, n: usize) -> Self {
        self.config.notify.page_size = n;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    // -- Defaults --

    #[test]
    fn default_config_has_sensible_values() {
        let cfg = Config::default();
        assert!(cfg.tenant.tenant_id.is_none());
        assert!(cfg.tenant.client_id.is_none());
        assert_eq!(cfg.workspace.template_id, "standard");
        assert_eq!(cfg.workspace.channel_name, "General");
        assert_eq!(cfg.provisioning.poll_interval_secs, 5);
        assert_eq!(cfg.provisioning.ceiling_secs, 600);
        assert_eq!(cfg.coordinates.max_retries, 5);
        assert_eq!(cfg.coordinates.retry_delay_secs, 2);
        assert_eq!(cfg.upload.chunk_size_bytes, 1024 * 1024);
        assert_eq!(cfg.membership.lookup_retries, 3);
        assert_eq!(cfg.membership.lookup_delay_secs, 2);
        assert_eq!(cfg.notify.page_size, 50);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn default_config_passes_validation() {
        let cfg = Config::default();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "unexpected validation errors: {errors:?}");
    }

    #[test]
    fn flow_config_maps_file_tunables() {
        let cfg = ConfigBuilder::new()
            .provisioning_poll_interval_secs(10)
            .provisioning_ceiling_secs(120)
            .coordinates_max_retries(2)
            .membership_lookup_retries(1)
            .notify_page_size(7)
            .build();
        let flow = cfg.flow_config();
        assert_eq!(flow.poll.interval, Duration::from_secs(10));
        assert_eq!(flow.poll.ceiling, Duration::from_secs(120));
        assert_eq!(flow.coordinate_retry.max_retries, 2);
        assert_eq!(flow.member_lookup.max_retries, 1);
        assert_eq!(flow.recipient_page_size, 7);
    }

    // -- Loading --

    #[test]
    fn load_from_yaml_file() {
        let yaml = r#"
tenant:
  tenant_id: "tenant-123"
  client_id: "app-456"
  client_secret_env: MY_SECRET
workspace:
  template_id: standard
  channel_name: General
provisioning:
  poll_interval_secs: 10
  ceiling_secs: 900
coordinates:
  max_retries: 3
  retry_delay_secs: 4
upload:
  chunk_size_bytes: 2097152
membership:
  lookup_retries: 2
  lookup_delay_secs: 1
  invite_redirect_url: https://example.com/welcome
notify:
  page_size: 25
logging:
  level: debug
"#;
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(yaml.as_bytes()).unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.tenant.tenant_id, Some("tenant-123".to_string()));
        assert_eq!(cfg.tenant.client_id, Some("app-456".to_string()));
        assert_eq!(cfg.tenant.client_secret_env, "MY_SECRET");
        assert_eq!(cfg.provisioning.poll_interval_secs, 10);
        assert_eq!(cfg.provisioning.ceiling_secs, 900);
        assert_eq!(cfg.coordinates.max_retries, 3);
        assert_eq!(cfg.upload.chunk_size_bytes, 2 * 1024 * 1024);
        assert_eq!(cfg.membership.lookup_retries, 2);
        assert_eq!(
            cfg.membership.invite_redirect_url,
            "https://example.com/welcome"
        );
        assert_eq!(cfg.notify.page_size, 25);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn load_or_default_returns_default_on_missing_file() {
        let cfg = Config::load_or_default(Path::new("/nonexistent/config.yaml"));
        assert_eq!(cfg.provisioning.poll_interval_secs, 5);
    }

    #[test]
    fn load_returns_error_on_invalid_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(b"not: [valid: yaml: {{{").unwrap();
        tmp.flush().unwrap();

        let result = Config::load(tmp.path());
        assert!(result.is_err());
    }

    // -- Validation --

    #[test]
    fn validate_catches_zero_poll_interval() {
        let mut cfg = Config::default();
        cfg.provisioning.poll_interval_secs = 0;
        let errors = cfg.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "provisioning.poll_interval_secs"));
    }

    #[test]
    fn validate_catches_ceiling_below_interval() {
        let mut cfg = Config::default();
        cfg.provisioning.poll_interval_secs = 30;
        cfg.provisioning.ceiling_secs = 10;
        let errors = cfg.validate();
        assert!(errors.iter().any(
            |e| e.field == "provisioning.ceiling_secs" && e.message.contains("must not be below")
        ));
    }

    #[test]
    fn validate_catches_zero_chunk_size() {
        let mut cfg = Config::default();
        cfg.upload.chunk_size_bytes = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "upload.chunk_size_bytes"));
    }

    #[test]
    fn validate_catches_empty_channel_name() {
        let mut cfg = Config::default();
        cfg.workspace.channel_name = "  ".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "workspace.channel_name"));
    }

    #[test]
    fn validate_catches_invalid_log_level() {
        let mut cfg = Config::default();
        cfg.logging.level = "verbose".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "logging.level"));
    }

    #[test]
    fn validate_catches_zero_page_size() {
        let mut cfg = Config::default();
        cfg.notify.page_size = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "notify.page_size"));
    }

    #[test]
    fn validate_accepts_all_valid_log_levels() {
        for level in VALID_LOG_LEVELS {
            let mut cfg = Config::default();
            cfg.logging.level = level.to_string();
            let errors = cfg.validate();
            assert!(
                !errors.iter().any(|e| e.field == "logging.level"),
                "level '{level}' should be valid"
            );
        }
    }

    // -- Builder --

    #[test]
    fn builder_starts_from_defaults() {
        let cfg = ConfigBuilder::new().build();
        assert_eq!(cfg.provisioning.poll_interval_secs, 5);
        assert_eq!(cfg.workspace.channel_name, "General");
    }

    #[test]
    fn builder_overrides_fields() {
        let cfg = ConfigBuilder::new()
            .tenant_id("tenant-1")
            .client_id("app-1")
            .client_secret_env("SECRET_VAR")
            .workspace_template_id("healthcareTeam")
            .workspace_channel_name("Incidents")
            .provisioning_poll_interval_secs(15)
            .provisioning_ceiling_secs(1200)
            .coordinates_max_retries(8)
            .coordinates_retry_delay_secs(3)
            .upload_chunk_size_bytes(4 * 1024 * 1024)
            .membership_lookup_retries(5)
            .membership_lookup_delay_secs(4)
            .membership_invite_redirect_url("https://example.com/join")
            .notify_page_size(10)
            .logging_level("trace")
            .build();

        assert_eq!(cfg.tenant.tenant_id, Some("tenant-1".to_string()));
        assert_eq!(cfg.tenant.client_id, Some("app-1".to_string()));
        assert_eq!(cfg.tenant.client_secret_env, "SECRET_VAR");
        assert_eq!(cfg.workspace.template_id, "healthcareTeam");
        assert_eq!(cfg.workspace.channel_name, "Incidents");
        assert_eq!(cfg.provisioning.poll_interval_secs, 15);
        assert_eq!(cfg.provisioning.ceiling_secs, 1200);
        assert_eq!(cfg.coordinates.max_retries, 8);
        assert_eq!(cfg.coordinates.retry_delay_secs, 3);
        assert_eq!(cfg.upload.chunk_size_bytes, 4 * 1024 * 1024);
        assert_eq!(cfg.membership.lookup_retries, 5);
        assert_eq!(cfg.membership.lookup_delay_secs, 4);
        assert_eq!(cfg.membership.invite_redirect_url, "https://example.com/join");
        assert_eq!(cfg.notify.page_size, 10);
        assert_eq!(cfg.logging.level, "trace");
    }

    #[test]
    fn builder_build_validated_succeeds_for_valid_config() {
        let result = ConfigBuilder::new().tenant_id("tenant-1").build_validated();
        assert!(result.is_ok());
    }

    #[test]
    fn builder_build_validated_fails_for_invalid_config() {
        let result = ConfigBuilder::new()
            .provisioning_poll_interval_secs(0)
            .logging_level("nope")
            .build_validated();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.len() >= 2);
    }

    // -- default_path --

    #[test]
    fn default_path_ends_with_config_yaml() {
        let p = Config::default_path();
        assert!(p.ends_with("opsroom/config.yaml"));
    }

    // -- ValidationError Display --

    #[test]
    fn validation_error_display() {
        let err = ValidationError {
            field: "notify.page_size".into(),
            message: "must be greater than 0".into(),
        };
        assert_eq!(err.to_string(), "notify.page_size: must be greater than 0");
    }
}
