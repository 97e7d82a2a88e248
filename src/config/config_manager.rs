use std::fs;
use std::path::{Path, PathBuf};
use crate::config::constants::{API_KEY_ENV, CONFIG_DIR_NAME, CONFIG_FILE_NAME, ENGINE_URL_ENV};
use crate::errors::{ClientError, ClientResult};
use crate::structs::config::config::Config;

const SAMPLE_CONFIG: &str = r#"# Approval client configuration

# Where the Engine listens. http(s) URLs; the push channel uses ws(s) on /ws.
engine_url = "http://localhost:3000"

# Bearer credential sent with every request (or set APPROVAL_API_KEY)
api_key = ""

# Connect on startup
auto_connect = true

# Show a notification for every new approval request
approval_notifications = true

# Use the push channel; polling still runs as a fallback
real_time_updates = true

# Seconds. Advisory; the Engine decides when a request expires
approval_timeout = 300

# Inline labels next to decorated lines
show_inline_decorations = true

[policy]
# More buffered changes than this need a human decision
change_count_threshold = 5
# More than this makes the request high priority
high_priority_change_threshold = 20
# Whole-word matches in added or modified lines need a human decision
structural_keywords = ["import", "export", "delete"]
deletions_require_approval = true
# Engine risk levels treated as high risk
high_risk_levels = ["high", "critical"]

[timers]
reconnect_base_delay_ms = 1000
max_reconnect_attempts = 5
heartbeat_interval_secs = 30
queue_refresh_secs = 30
workflow_poll_secs = 10
notification_drain_ms = 100

[notifications]
auto_hide = true
auto_hide_delay_ms = 5000
history_capacity = 100
"#;

pub struct ConfigManager;

impl ConfigManager {
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_default()
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// File at the default location (or defaults), then environment overrides.
    pub fn load() -> ClientResult<Config> {
        let config = Self::load_from(&Self::config_path())?;
        Ok(Self::apply_env_overrides(config, |key| std::env::var(key).ok()))
    }

    pub fn load_from(path: &Path) -> ClientResult<Config> {
        if !path.exists() {
            log::debug!("📋 No config at {}; using defaults", path.display());
            return Ok(Config::default());
        }

        log::info!("📋 Loading config from: {}", path.display());
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            ClientError::config_error(
                &format!("{} is not valid TOML: {}", path.display(), e.message()),
                None,
                Some("Run 'approval-client init' on a fresh machine to see the expected layout"),
            )
        })
    }

    /// Non-empty values from `lookup` win over the file.
    pub fn apply_env_overrides(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
        if let Some(url) = lookup(ENGINE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.engine_url = url.trim().to_string();
        }
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            config.api_key = key.trim().to_string();
        }
        config
    }

    pub fn init() -> ClientResult<PathBuf> {
        let path = Self::config_path();
        Self::write_sample(&path)?;
        Ok(path)
    }

    /// Writes the commented sample; never overwrites an existing file.
    pub fn write_sample(path: &Path) -> ClientResult<()> {
        if path.exists() {
            return Err(ClientError::config_error(
                &format!("{} already exists", path.display()),
                None,
                Some("Edit the existing file or remove it first"),
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, SAMPLE_CONFIG)?;
        log::info!("✅ Created sample config at: {}", path.display());
        Ok(())
    }

    /// Every problem at once, so the user can fix them in one pass.
    pub fn validate(config: &Config) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match reqwest::Url::parse(&config.engine_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(format!("engine_url must use http or https, got '{}'", url.scheme())),
            Err(e) => errors.push(format!("engine_url '{}' is not a valid URL: {}", config.engine_url, e)),
        }

        let policy = &config.policy;
        if policy.high_priority_change_threshold < policy.change_count_threshold {
            errors.push(format!(
                "policy.high_priority_change_threshold ({}) is below policy.change_count_threshold ({})",
                policy.high_priority_change_threshold, policy.change_count_threshold
            ));
        }
        if policy.structural_keywords.iter().any(|k| k.trim().is_empty()) {
            errors.push("policy.structural_keywords contains an empty keyword".to_string());
        }

        let timers = &config.timers;
        let intervals = [
            ("timers.reconnect_base_delay_ms", timers.reconnect_base_delay_ms),
            ("timers.heartbeat_interval_secs", timers.heartbeat_interval_secs),
            ("timers.queue_refresh_secs", timers.queue_refresh_secs),
            ("timers.workflow_poll_secs", timers.workflow_poll_secs),
            ("timers.notification_drain_ms", timers.notification_drain_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                errors.push(format!("{} must be greater than zero", name));
            }
        }
        if timers.max_reconnect_attempts == 0 {
            errors.push("timers.max_reconnect_attempts must be greater than zero".to_string());
        }

        if config.notifications.history_capacity == 0 {
            errors.push("notifications.history_capacity must be greater than zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
