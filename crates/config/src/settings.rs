//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{admin, mail, persistence, server};
use crate::{ConfigError, DialogueConfig};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Admin dashboard credentials
    #[serde(default)]
    pub admin: AdminConfig,

    /// Slot-filling dialogue
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Lead storage (SQLite)
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Lead notification mail relay
    #[serde(default)]
    pub mail: MailConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_dialogue()?;
        self.validate_persistence()?;
        self.validate_mail()?;
        self.validate_admin()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 This may block legitimate requests."
            );
        }

        if self.environment.is_production() && server.expose_leads_endpoint {
            tracing::warn!("server.expose_leads_endpoint is on in production: /leads is unauthenticated");
        }

        Ok(())
    }

    fn validate_dialogue(&self) -> Result<(), ConfigError> {
        if self.dialogue.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dialogue.max_sessions".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn validate_persistence(&self) -> Result<(), ConfigError> {
        let persistence = &self.persistence;
        if !persistence.enabled {
            return Ok(());
        }

        if persistence.sqlite_path.trim().is_empty() {
            return Err(ConfigError::MissingField("persistence.sqlite_path".to_string()));
        }

        if persistence.pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "persistence.pool_size".to_string(),
                message: "Pool size must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    fn validate_mail(&self) -> Result<(), ConfigError> {
        let mail = &self.mail;
        if !mail.enabled {
            return Ok(());
        }

        if mail.smtp_host.trim().is_empty() {
            return Err(ConfigError::MissingField("mail.smtp_host".to_string()));
        }
        for (field, value) in [("mail.from", &mail.from), ("mail.to", &mail.to)] {
            if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                if self.environment.is_strict() {
                    return Err(ConfigError::MissingField(field.to_string()));
                }
                tracing::warn!(field, "Mail is enabled but not fully configured; lead notifications will fail");
            }
        }
        if mail.queue_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "mail.queue_capacity".to_string(),
                message: "Queue capacity must be at least 1".to_string(),
            });
        }
        if mail.username.is_some() != mail.password.is_some() {
            return Err(ConfigError::InvalidValue {
                field: "mail.username".to_string(),
                message: "SMTP username and password must be set together".to_string(),
            });
        }

        Ok(())
    }

    fn validate_admin(&self) -> Result<(), ConfigError> {
        if self.admin.password.is_none() {
            if self.environment.is_strict() {
                return Err(ConfigError::MissingField("admin.password".to_string()));
            }
            tracing::warn!("No admin password configured; /admin endpoints will reject every request");
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Serve the HTML chat page on `/` instead of the JSON status
    #[serde(default = "default_true")]
    pub chat_ui: bool,

    /// Route the unauthenticated `GET /leads` listing
    #[serde(default)]
    pub expose_leads_endpoint: bool,
}

fn default_host() -> String {
    server::DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    server::DEFAULT_PORT
}
fn default_timeout() -> u64 {
    server::DEFAULT_TIMEOUT_SECONDS
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: default_true(),
            // Empty by default - must be explicitly configured for production
            cors_origins: Vec::new(),
            chat_ui: default_true(),
            expose_leads_endpoint: false,
        }
    }
}

/// Admin dashboard credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Shared admin password (set via ADMIN_PASSWORD or REALTY_AGENT__ADMIN__PASSWORD)
    #[serde(default)]
    pub password: Option<String>,

    /// Realm sent in the Basic challenge
    #[serde(default = "default_realm")]
    pub realm: String,
}

fn default_realm() -> String {
    admin::REALM.to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password: None,
            realm: default_realm(),
        }
    }
}

/// SQLite lead storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Store leads in SQLite (false = in-memory list only)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Database file path
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,

    /// r2d2 pool size
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_sqlite_path() -> String {
    persistence::SQLITE_PATH.to_string()
}
fn default_pool_size() -> u32 {
    persistence::POOL_SIZE
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sqlite_path: default_sqlite_path(),
            pool_size: default_pool_size(),
        }
    }
}

/// Mail relay used to notify the operator about new leads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Send lead notifications (disabled by default for development)
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Sender address
    #[serde(default)]
    pub from: Option<String>,

    /// Operator address receiving notifications
    #[serde(default)]
    pub to: Option<String>,

    #[serde(default = "default_mail_subject")]
    pub subject: String,

    /// SMTP command timeout
    #[serde(default = "default_mail_timeout")]
    pub timeout_seconds: u64,

    /// Pending notifications held before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_smtp_host() -> String {
    mail::SMTP_HOST.to_string()
}
fn default_smtp_port() -> u16 {
    mail::SMTP_PORT
}
fn default_mail_subject() -> String {
    mail::SUBJECT.to_string()
}
fn default_mail_timeout() -> u64 {
    mail::TIMEOUT_SECONDS
}
fn default_queue_capacity() -> usize {
    mail::QUEUE_CAPACITY
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            from: None,
            to: None,
            subject: default_mail_subject(),
            timeout_seconds: default_mail_timeout(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics on /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from `config/` and the environment
///
/// Priority (highest to lowest):
/// 1. Plain deployment variables (`PORT`, `ADMIN_PASSWORD`, `SMTP_*`)
/// 2. Environment variables (REALTY_AGENT_ prefix)
/// 3. config/{env}.yaml (if env specified)
/// 4. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings with an explicit config directory
pub fn load_settings_from(config_dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(
        File::with_name(&config_dir.join("default").to_string_lossy()).required(false),
    );

    // An explicitly named environment must have its file
    if let Some(env_name) = env {
        let base = config_dir.join(env_name);
        let found = ["yaml", "yml", "toml", "json"]
            .iter()
            .any(|ext| base.with_extension(ext).exists());
        if !found {
            return Err(ConfigError::FileNotFound(base.to_string_lossy().into_owned()));
        }
        builder = builder.add_source(File::with_name(&base.to_string_lossy()));
    }

    builder = builder.add_source(
        Environment::with_prefix("REALTY_AGENT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let mut settings: Settings = config.try_deserialize()?;

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;

    settings.validate()?;

    Ok(settings)
}

/// Apply the plain deployment variables on top of layered settings
///
/// `lookup` is usually `std::env::var`; tests pass a map.
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(port) = get("PORT") {
        settings.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field: "PORT".to_string(),
            message: format!("Not a valid port: {}", port),
        })?;
    }

    if let Some(password) = get("ADMIN_PASSWORD") {
        settings.admin.password = Some(password);
    }

    if let Some(path) = get("LEADS_DB_PATH") {
        settings.persistence.sqlite_path = path;
    }

    if let Some(host) = get("SMTP_HOST") {
        settings.mail.smtp_host = host;
    }
    if let Some(port) = get("SMTP_PORT") {
        settings.mail.smtp_port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field: "SMTP_PORT".to_string(),
            message: format!("Not a valid port: {}", port),
        })?;
    }
    if let Some(username) = get("SMTP_USERNAME") {
        settings.mail.username = Some(username);
    }
    if let Some(password) = get("SMTP_PASSWORD") {
        settings.mail.password = Some(password);
    }
    if let Some(from) = get("SMTP_FROM") {
        settings.mail.from = Some(from);
    }
    if let Some(to) = get("LEAD_NOTIFY_TO") {
        settings.mail.to = Some(to);
    }

    // Sender defaults to the relay account
    if settings.mail.from.is_none() {
        settings.mail.from = settings.mail.username.clone();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SlotMergePolicy;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 5002);
        assert_eq!(settings.dialogue.max_sessions, 1000);
        assert_eq!(settings.dialogue.merge_policy, SlotMergePolicy::LastWriteWins);
        assert!(settings.persistence.enabled);
        assert!(!settings.mail.enabled);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_server_validation() {
        let mut settings = Settings::default();

        settings.server.port = 0;
        assert!(settings.validate_server().is_err());
        settings.server.port = 8080;

        settings.server.timeout_seconds = 0;
        assert!(settings.validate_server().is_err());
        settings.server.timeout_seconds = 30;

        assert!(settings.validate_server().is_ok());
    }

    #[test]
    fn test_dialogue_validation() {
        let mut settings = Settings::default();
        settings.dialogue.max_sessions = 0;
        assert!(settings.validate_dialogue().is_err());
    }

    #[test]
    fn test_mail_validation() {
        let mut settings = Settings::default();
        settings.mail.enabled = true;

        // Missing from/to only warns outside production
        assert!(settings.validate_mail().is_ok());
        settings.environment = RuntimeEnvironment::Production;
        assert!(settings.validate_mail().is_err());

        settings.mail.from = Some("bot@example.com".to_string());
        settings.mail.to = Some("ops@example.com".to_string());
        assert!(settings.validate_mail().is_ok());

        // Username without password
        settings.mail.username = Some("bot@example.com".to_string());
        assert!(settings.validate_mail().is_err());
        settings.mail.password = Some("app-password".to_string());
        assert!(settings.validate_mail().is_ok());
    }

    #[test]
    fn test_production_requires_admin_password() {
        let mut settings = Settings::default();
        settings.environment = RuntimeEnvironment::Production;
        assert!(settings.validate_admin().is_err());

        settings.admin.password = Some("s3cret".to_string());
        assert!(settings.validate_admin().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        apply_env_overrides(
            &mut settings,
            lookup(&[
                ("PORT", "9090"),
                ("ADMIN_PASSWORD", "hunter2"),
                ("SMTP_USERNAME", "bot@example.com"),
                ("SMTP_PASSWORD", "app-password"),
                ("LEAD_NOTIFY_TO", "ops@example.com"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.admin.password.as_deref(), Some("hunter2"));
        assert_eq!(settings.mail.to.as_deref(), Some("ops@example.com"));
        // Sender falls back to the relay account
        assert_eq!(settings.mail.from.as_deref(), Some("bot@example.com"));
    }

    #[test]
    fn test_env_override_rejects_bad_port() {
        let mut settings = Settings::default();
        let result = apply_env_overrides(&mut settings, lookup(&[("PORT", "not-a-port")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut settings = Settings::default();
        apply_env_overrides(&mut settings, lookup(&[("ADMIN_PASSWORD", "  ")])).unwrap();
        assert!(settings.admin.password.is_none());
    }

    #[test]
    fn test_load_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.yaml"),
            "server:\n  port: 7000\ndialogue:\n  max_sessions: 5\n  merge_policy: first_write_wins\npersistence:\n  enabled: false\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("staging.yaml"), "admin:\n  password: stage-pass\n")
            .unwrap();

        let settings = load_settings_from(dir.path(), Some("staging")).unwrap();
        assert_eq!(settings.dialogue.max_sessions, 5);
        assert_eq!(settings.dialogue.merge_policy, SlotMergePolicy::FirstWriteWins);
        assert!(!settings.persistence.enabled);
        assert_eq!(settings.admin.password.as_deref(), Some("stage-pass"));
    }

    #[test]
    fn test_missing_env_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings_from(dir.path(), Some("production")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));

        // No files at all is fine without an environment
        assert!(load_settings_from(dir.path(), None).is_ok());
    }
}
