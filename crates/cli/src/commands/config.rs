use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use margin_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run(options: LoadOptions) -> String {
    let explicit_path = options.config_path.clone();
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path(explicit_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields: Vec<(&str, String, &str)> = vec![
        ("database.url", config.database.url.clone(), "MARGIN_DATABASE_URL"),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            "MARGIN_DATABASE_MAX_CONNECTIONS",
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            "MARGIN_DATABASE_TIMEOUT_SECS",
        ),
        (
            "engine.overheads_pct",
            config.engine.overheads_pct.to_string(),
            "MARGIN_ENGINE_OVERHEADS_PCT",
        ),
        (
            "engine.quarantine_threshold_pct",
            config.engine.quarantine_threshold_pct.to_string(),
            "MARGIN_ENGINE_QUARANTINE_THRESHOLD_PCT",
        ),
        (
            "engine.default_mode",
            config.engine.default_mode.as_str().to_string(),
            "MARGIN_ENGINE_DEFAULT_MODE",
        ),
        ("logging.level", config.logging.level.clone(), "MARGIN_LOGGING_LEVEL"),
        ("logging.format", format!("{:?}", config.logging.format), "MARGIN_LOGGING_FORMAT"),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_key) in fields {
        let source = field_source(
            key,
            Some(env_key),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(format!("- {key} = {value} (source: {source})"));
    }

    lines.join("\n")
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("margin.toml"), PathBuf::from("config/margin.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
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
