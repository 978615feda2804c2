use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use railrefund_core::config::{AppConfig, LoadOptions};
use toml::Value;

struct Field {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(format!("- {} = {} (source: {source})", field.key_path, field.value));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let gateway = &config.gateway;
    vec![
        Field {
            key_path: "gateway.base_url",
            env_keys: &["RAILREFUND_GATEWAY_BASE_URL"],
            value: gateway.base_url.clone(),
        },
        Field {
            key_path: "gateway.api_host",
            env_keys: &["RAILREFUND_GATEWAY_API_HOST"],
            value: gateway.api_host.clone(),
        },
        Field {
            key_path: "gateway.api_key",
            env_keys: &["RAILREFUND_GATEWAY_API_KEY", "RAPIDAPI_KEY"],
            value: redact_key(gateway.api_key_value()),
        },
        Field {
            key_path: "gateway.timeout_secs",
            env_keys: &["RAILREFUND_GATEWAY_TIMEOUT_SECS"],
            value: gateway.timeout_secs.to_string(),
        },
        Field {
            key_path: "gateway.max_retries",
            env_keys: &["RAILREFUND_GATEWAY_MAX_RETRIES"],
            value: gateway.max_retries.to_string(),
        },
        Field {
            key_path: "server.bind_address",
            env_keys: &["RAILREFUND_SERVER_BIND_ADDRESS"],
            value: config.server.bind_address.clone(),
        },
        Field {
            key_path: "server.port",
            env_keys: &["RAILREFUND_SERVER_PORT", "PORT"],
            value: config.server.port.to_string(),
        },
        Field {
            key_path: "refund.default_payment_method",
            env_keys: &["RAILREFUND_REFUND_DEFAULT_PAYMENT_METHOD"],
            value: config.refund.default_payment_method.slug().to_string(),
        },
        Field {
            key_path: "logging.level",
            env_keys: &["RAILREFUND_LOGGING_LEVEL", "RAILREFUND_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key_path: "logging.format",
            env_keys: &["RAILREFUND_LOGGING_FORMAT", "RAILREFUND_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("railrefund.toml"), PathBuf::from("config/railrefund.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

/// Keeps the first four characters so operators can tell keys apart.
fn redact_key(key: Option<&str>) -> String {
    match key.map(str::trim) {
        None | Some("") => "<unset>".to_string(),
        Some(key) if key.chars().count() > 8 => {
            let prefix: String = key.chars().take(4).collect();
            format!("{prefix}***")
        }
        Some(_) => "<redacted>".to_string(),
    }
}
