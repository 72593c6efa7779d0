//! Config command - View and manage OpsRoom configuration
//!
//! Provides the `opsroom config` CLI command which:
//! 1. Shows the current configuration (YAML or JSON)
//! 2. Sets individual configuration values via dot-notation keys
//! 3. Validates the configuration file and reports errors

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use opsroom_core::config::Config;

use crate::output::OutputFormat;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "provisioning.poll_interval_secs")
        key: String,
        /// New value
        value: String,
    },
    /// Validate configuration file
    Validate,
}

impl ConfigCommand {
    /// Execute the config command
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(format, config_path).await,
            ConfigCommand::Set { key, value } => {
                self.execute_set(key, value, format, config_path).await
            }
            ConfigCommand::Validate => self.execute_validate(format, config_path).await,
        }
    }

    /// Show current configuration
    async fn execute_show(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        let config = Config::load_or_default(config_path);
        info!(config_path = %config_path.display(), "Showing configuration");

        if format.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            format.document(&json);
        } else {
            format.success(&format!("Configuration ({})", config_path.display()));
            format.detail("");
            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                format.detail(line);
            }
        }
        Ok(())
    }

    /// Set a configuration value using dot-notation
    async fn execute_set(
        &self,
        key: &str,
        value: &str,
        format: OutputFormat,
        config_path: &Path,
    ) -> Result<()> {
        let mut config = Config::load_or_default(config_path);
        info!(key = %key, value = %value, "Setting configuration value");

        match apply_config_value(&mut config, key, value) {
            Ok(()) => {
                let errors = config.validate();
                if !errors.is_empty() {
                    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                    if format.is_json() {
                        format.document(&serde_json::json!({
                            "success": false,
                            "key": key,
                            "value": value,
                            "errors": messages,
                        }));
                    } else {
                        format.error(&format!(
                            "Invalid value for '{}': {}",
                            key,
                            messages.join("; ")
                        ));
                    }
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    std::fs::create_dir_all(parent)
                        .context("Failed to create configuration directory")?;
                }
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                std::fs::write(config_path, &yaml)
                    .context("Failed to write configuration file")?;

                if format.is_json() {
                    format.document(&serde_json::json!({
                        "success": true,
                        "key": key,
                        "value": value,
                        "config_path": config_path.display().to_string(),
                    }));
                } else {
                    format.success(&format!("Set {} = {}", key, value));
                    format.detail(&format!("Saved to {}", config_path.display()));
                }
            }
            Err(e) => {
                if format.is_json() {
                    format.document(&serde_json::json!({
                        "success": false,
                        "key": key,
                        "value": value,
                        "error": e.to_string(),
                    }));
                } else {
                    format.error(&format!("Failed to set '{}': {}", key, e));
                    format.detail("");
                    format.detail("Supported keys:");
                    format.detail("  tenant.tenant_id                 - Directory (tenant) ID");
                    format.detail("  tenant.client_id                 - Application (client) ID");
                    format.detail("  tenant.client_secret_env         - Env var holding the secret");
                    format.detail("  workspace.template_id            - Team template to instantiate");
                    format.detail("  workspace.channel_name           - Channel receiving uploads");
                    format.detail("  provisioning.poll_interval_secs  - Seconds between status polls");
                    format.detail("  provisioning.ceiling_secs        - Hard wait ceiling (seconds)");
                    format.detail("  coordinates.max_retries          - Lookup retries after the first try");
                    format.detail("  coordinates.retry_delay_secs     - Seconds between lookups");
                    format.detail("  upload.chunk_size_bytes          - Upload range size (bytes)");
                    format.detail("  membership.lookup_retries        - Identity lookup retries");
                    format.detail("  membership.lookup_delay_secs     - Seconds between identity lookups");
                    format.detail("  membership.invite_redirect_url   - Guest redemption landing URL");
                    format.detail("  notify.page_size                 - Recipients per broadcast page");
                    format.detail("  logging.level                    - trace|debug|info|warn|error");
                }
            }
        }
        Ok(())
    }

    /// Validate configuration file
    async fn execute_validate(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        let config = match Config::load(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                if !config_path.exists() {
                    if format.is_json() {
                        format.document(&serde_json::json!({
                            "valid": false,
                            "config_path": config_path.display().to_string(),
                            "errors": ["Configuration file not found. Using defaults."],
                        }));
                    } else {
                        format.detail(&format!(
                            "Configuration file not found at {}",
                            config_path.display()
                        ));
                        format.detail(
                            "Using default configuration. Run 'opsroom config set <key> <value>' to create one.",
                        );
                    }
                    return Ok(());
                }

                if format.is_json() {
                    format.document(&serde_json::json!({
                        "valid": false,
                        "config_path": config_path.display().to_string(),
                        "errors": [format!("Failed to parse configuration: {}", e)],
                    }));
                } else {
                    format.error(&format!("Failed to parse configuration: {}", e));
                    format.detail(&format!("File: {}", config_path.display()));
                }
                return Ok(());
            }
        };

        info!(config_path = %config_path.display(), "Validating configuration");
        let errors = config.validate();

        if format.is_json() {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            format.document(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": config_path.display().to_string(),
                "errors": messages,
            }));
        } else if errors.is_empty() {
            format.success("Configuration is valid");
            format.detail(&format!("File: {}", config_path.display()));
        } else {
            format.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            format.detail(&format!("File: {}", config_path.display()));
            format.detail("");
            for error in &errors {
                format.detail(&format!("  {} - {}", error.field, error.message));
            }
        }
        Ok(())
    }
}

/// Apply a dot-notation key/value pair to a Config struct
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    fn optional(value: &str) -> Option<String> {
        if value.is_empty() || value == "none" {
            None
        } else {
            Some(value.to_string())
        }
    }

    match key {
        // --- tenant ---
        "tenant.tenant_id" => {
            config.tenant.tenant_id = optional(value);
        }
        "tenant.client_id" => {
            config.tenant.client_id = optional(value);
        }
        "tenant.client_secret_env" => {
            config.tenant.client_secret_env = value.to_string();
        }

        // --- workspace ---
        "workspace.template_id" => {
            config.workspace.template_id = value.to_string();
        }
        "workspace.channel_name" => {
            config.workspace.channel_name = value.to_string();
        }

        // --- provisioning ---
        "provisioning.poll_interval_secs" => {
            config.provisioning.poll_interval_secs = value
                .parse::<u64>()
                .context("Expected a positive integer for provisioning.poll_interval_secs")?;
        }
        "provisioning.ceiling_secs" => {
            config.provisioning.ceiling_secs = value
                .parse::<u64>()
                .context("Expected a positive integer for provisioning.ceiling_secs")?;
        }

        // --- coordinates ---
        "coordinates.max_retries" => {
            config.coordinates.max_retries = value
                .parse::<u32>()
                .context("Expected a non-negative integer")?;
        }
        "coordinates.retry_delay_secs" => {
            config.coordinates.retry_delay_secs = value
                .parse::<u64>()
                .context("Expected a positive integer")?;
        }

        // --- upload ---
        "upload.chunk_size_bytes" => {
            config.upload.chunk_size_bytes = value
                .parse::<u64>()
                .context("Expected a positive integer")?;
        }

        // --- membership ---
        "membership.lookup_retries" => {
            config.membership.lookup_retries = value
                .parse::<u32>()
                .context("Expected a non-negative integer")?;
        }
        "membership.lookup_delay_secs" => {
            config.membership.lookup_delay_secs = value
                .parse::<u64>()
                .context("Expected a positive integer")?;
        }
        "membership.invite_redirect_url" => {
            config.membership.invite_redirect_url = value.to_string();
        }

        // --- notify ---
        "notify.page_size" => {
            config.notify.page_size = value
                .parse::<usize>()
                .context("Expected a positive integer")?;
        }

        // --- logging ---
        "logging.level" => {
            config.logging.level = value.to_string();
        }

        _ => {
            anyhow::bail!("Unknown configuration key: '{}'", key);
        }
    }
    Ok(())
}
