use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::payment::PaymentMethod;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub server: ServerConfig,
    pub refund: RefundConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_host: String,
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct RefundConfig {
    pub default_payment_method: PaymentMethod,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub gateway_base_url: Option<String>,
    pub gateway_api_key: Option<String>,
    pub gateway_timeout_secs: Option<u64>,
    pub server_port: Option<u16>,
    pub default_payment_method: Option<PaymentMethod>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig {
                base_url: "https://irctc1.p.rapidapi.com".to_string(),
                api_host: "irctc1.p.rapidapi.com".to_string(),
                api_key: None,
                timeout_secs: 10,
                max_retries: 1,
            },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 3001 },
            refund: RefundConfig { default_payment_method: PaymentMethod::Upi },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl GatewayConfig {
    pub fn api_key_value(&self) -> Option<&str> {
        self.api_key.as_ref().map(|key| key.expose_secret()).filter(|key| !key.trim().is_empty())
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("railrefund.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(gateway) = patch.gateway {
            if let Some(base_url) = gateway.base_url {
                self.gateway.base_url = base_url;
            }
            if let Some(api_host) = gateway.api_host {
                self.gateway.api_host = api_host;
            }
            if let Some(api_key) = gateway.api_key {
                self.gateway.api_key = Some(api_key.into());
            }
            if let Some(timeout_secs) = gateway.timeout_secs {
                self.gateway.timeout_secs = timeout_secs;
            }
            if let Some(max_retries) = gateway.max_retries {
                self.gateway.max_retries = max_retries;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(refund) = patch.refund {
            if let Some(method) = refund.default_payment_method {
                self.refund.default_payment_method = method;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("RAILREFUND_GATEWAY_BASE_URL") {
            self.gateway.base_url = value;
        }
        if let Some(value) = read_env("RAILREFUND_GATEWAY_API_HOST") {
            self.gateway.api_host = value;
        }
        let api_key = read_env("RAILREFUND_GATEWAY_API_KEY").or_else(|| read_env("RAPIDAPI_KEY"));
        if let Some(value) = api_key {
            self.gateway.api_key = Some(value.into());
        }
        if let Some(value) = read_env("RAILREFUND_GATEWAY_TIMEOUT_SECS") {
            self.gateway.timeout_secs = parse_u64("RAILREFUND_GATEWAY_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("RAILREFUND_GATEWAY_MAX_RETRIES") {
            self.gateway.max_retries = parse_u32("RAILREFUND_GATEWAY_MAX_RETRIES", &value)?;
        }

        if let Some(value) = read_env("RAILREFUND_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        let port = read_env("RAILREFUND_SERVER_PORT").map(|value| ("RAILREFUND_SERVER_PORT", value));
        let port = port.or_else(|| read_env("PORT").map(|value| ("PORT", value)));
        if let Some((key, value)) = port {
            self.server.port = parse_u16(key, &value)?;
        }

        if let Some(value) = read_env("RAILREFUND_REFUND_DEFAULT_PAYMENT_METHOD") {
            self.refund.default_payment_method =
                value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "RAILREFUND_REFUND_DEFAULT_PAYMENT_METHOD".to_string(),
                    value: value.clone(),
                })?;
        }

        let log_level =
            read_env("RAILREFUND_LOGGING_LEVEL").or_else(|| read_env("RAILREFUND_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("RAILREFUND_LOGGING_FORMAT").or_else(|| read_env("RAILREFUND_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.gateway_base_url {
            self.gateway.base_url = base_url;
        }
        if let Some(api_key) = overrides.gateway_api_key {
            self.gateway.api_key = Some(api_key.into());
        }
        if let Some(timeout_secs) = overrides.gateway_timeout_secs {
            self.gateway.timeout_secs = timeout_secs;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(method) = overrides.default_payment_method {
            self.refund.default_payment_method = method;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_gateway(&self.gateway)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("railrefund.toml"), PathBuf::from("config/railrefund.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_gateway(gateway: &GatewayConfig) -> Result<(), ConfigError> {
    let base_url = gateway.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "gateway.base_url must start with http:// or https://".to_string(),
        ));
    }

    if gateway.api_host.trim().is_empty() {
        return Err(ConfigError::Validation(
            "gateway.api_host is required (the RapidAPI host header, e.g. `irctc1.p.rapidapi.com`)"
                .to_string(),
        ));
    }

    if gateway.timeout_secs == 0 || gateway.timeout_secs > 120 {
        return Err(ConfigError::Validation(
            "gateway.timeout_secs must be in range 1..=120".to_string(),
        ));
    }

    if gateway.max_retries > 1 {
        return Err(ConfigError::Validation(
            "gateway.max_retries must be 0 or 1 (the gateway retries at most once)".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address is required".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    gateway: Option<GatewayPatch>,
    server: Option<ServerPatch>,
    refund: Option<RefundPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct GatewayPatch {
    base_url: Option<String>,
    api_host: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct RefundPatch {
    #[serde(default, deserialize_with = "deserialize_payment_method")]
    default_payment_method: Option<PaymentMethod>,
}

/// Same spellings as the env var and command-line inputs (`debit-card`,
/// `Debit Card`, `debit_card`).
fn deserialize_payment_method<'de, D>(deserializer: D) -> Result<Option<PaymentMethod>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| raw.parse::<PaymentMethod>().map_err(serde::de::Error::custom))
        .transpose()
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::domain::payment::PaymentMethod;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const ENV_KEYS: [&str; 8] = [
        "RAILREFUND_GATEWAY_API_KEY",
        "RAPIDAPI_KEY",
        "RAILREFUND_GATEWAY_TIMEOUT_SECS",
        "RAILREFUND_GATEWAY_MAX_RETRIES",
        "RAILREFUND_SERVER_PORT",
        "PORT",
        "RAILREFUND_LOG_LEVEL",
        "RAILREFUND_LOG_FORMAT",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_target_rapidapi_with_single_retry() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&ENV_KEYS);

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.gateway.api_host == "irctc1.p.rapidapi.com", "default host is rapidapi")?;
        ensure(config.gateway.max_retries == 1, "gateway retries once by default")?;
        ensure(config.gateway.api_key_value().is_none(), "no api key by default")?;
        ensure(config.server.port == 3001, "proxy listens on 3001 by default")?;
        ensure(
            config.refund.default_payment_method == PaymentMethod::Upi,
            "upi is the default payment method",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&ENV_KEYS);
        env::set_var("TEST_RAPIDAPI_KEY", "rk-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("railrefund.toml");
            fs::write(
                &path,
                r#"
[gateway]
api_key = "${TEST_RAPIDAPI_KEY}"
timeout_secs = 5

[refund]
default_payment_method = "debit-card"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.gateway.api_key_value() == Some("rk-from-env"),
                "api key should be interpolated from environment",
            )?;
            ensure(config.gateway.timeout_secs == 5, "timeout should come from file")?;
            ensure(
                config.refund.default_payment_method == PaymentMethod::DebitCard,
                "payment method should come from file",
            )
        })();

        clear_vars(&["TEST_RAPIDAPI_KEY"]);
        result
    }

    #[test]
    fn legacy_rapidapi_and_port_variables_are_honoured() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&ENV_KEYS);
        env::set_var("RAPIDAPI_KEY", "rk-legacy");
        env::set_var("PORT", "8088");
        env::set_var("RAILREFUND_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.gateway.api_key_value() == Some("rk-legacy"), "RAPIDAPI_KEY is read")?;
            ensure(config.server.port == 8088, "PORT is read")?;
            ensure(matches!(config.logging.format, LogFormat::Json), "json format from alias")
        })();

        clear_vars(&ENV_KEYS);
        result
    }

    #[test]
    fn file_payment_method_accepts_display_names_and_rejects_unknown() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&ENV_KEYS);

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("railrefund.toml");

            fs::write(&path, "[refund]\ndefault_payment_method = \"Net Banking\"\n")
                .map_err(|err| err.to_string())?;
            let config = AppConfig::load(LoadOptions {
                config_path: Some(path.clone()),
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;
            ensure(
                config.refund.default_payment_method == PaymentMethod::NetBanking,
                "display name should parse from file",
            )?;

            fs::write(&path, "[refund]\ndefault_payment_method = \"cheque\"\n")
                .map_err(|err| err.to_string())?;
            let error = AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                .err()
                .ok_or_else(|| "unknown method should fail".to_string())?;
            ensure(
                matches!(error, ConfigError::ParseFile { .. })
                    && error.to_string().contains("could not parse config file"),
                "unknown method is a parse error",
            )
        })();

        clear_vars(&ENV_KEYS);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&ENV_KEYS);
        env::set_var("RAILREFUND_GATEWAY_TIMEOUT_SECS", "20");
        env::set_var("RAILREFUND_SERVER_PORT", "4000");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("railrefund.toml");
            fs::write(
                &path,
                r#"
[gateway]
timeout_secs = 3

[server]
port = 5000

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    server_port: Some(6000),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.gateway.timeout_secs == 20, "env timeout should win over file")?;
            ensure(config.server.port == 6000, "override port should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")
        })();

        clear_vars(&ENV_KEYS);
        result
    }

    #[test]
    fn validation_rejects_more_than_one_retry() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&ENV_KEYS);
        env::set_var("RAILREFUND_GATEWAY_MAX_RETRIES", "3");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("gateway.max_retries")
            );
            ensure(has_message, "validation failure should mention gateway.max_retries")
        })();

        clear_vars(&ENV_KEYS);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&ENV_KEYS);
        env::set_var("RAILREFUND_GATEWAY_API_KEY", "rk-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("rk-secret-value"), "debug output should not contain api key")?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )
        })();

        clear_vars(&ENV_KEYS);
        result
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&ENV_KEYS);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let result = AppConfig::load(LoadOptions {
            config_path: Some(dir.path().join("missing.toml")),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing required file should fail",
        )
    }
}
