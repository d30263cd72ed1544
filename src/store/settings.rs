//! Settings file loading and secret masking.

use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

/// Fixed replacement for sensitive `env` values, regardless of their length.
/// Masking is one-way; the original value never leaves this module.
pub const SETTINGS_MASK: &str = "••••••••";

const SENSITIVE_MARKERS: [&str; 3] = ["KEY", "TOKEN", "SECRET"];

/// Load `<root>/settings.json`.
///
/// Absent file: empty mapping. Unreadable or malformed file: a mapping
/// holding only an `error` entry (the soft-fail sentinel the dashboard
/// renders instead of a dialog). Otherwise the decoded object with sensitive
/// `env` entries masked.
pub(crate) fn load_settings(root: &Path) -> Map<String, Value> {
    let path = root.join("settings.json");
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Map::new(),
        Err(e) => {
            warn!("failed to read {}: {e}", path.display());
            return error_sentinel(format!("failed to read settings.json: {e}"));
        }
    };

    let mut settings = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(settings)) => settings,
        Ok(_) => return error_sentinel("settings.json is not a JSON object".to_string()),
        Err(e) => {
            warn!("malformed {}: {e}", path.display());
            return error_sentinel(format!("failed to parse settings.json: {e}"));
        }
    };

    mask_sensitive_env(&mut settings);
    settings
}

fn error_sentinel(message: String) -> Map<String, Value> {
    let mut sentinel = Map::new();
    sentinel.insert("error".to_string(), Value::String(message));
    sentinel
}

fn mask_sensitive_env(settings: &mut Map<String, Value>) {
    if let Some(Value::Object(env)) = settings.get_mut("env") {
        for (name, value) in env.iter_mut() {
            if is_sensitive(name) {
                *value = Value::String(SETTINGS_MASK.to_string());
            }
        }
    }
}

/// Case-insensitive substring match; a name like `monkey_count` also
/// matches.
fn is_sensitive(name: &str) -> bool {
    let upper = name.to_uppercase();
    SENSITIVE_MARKERS.iter().any(|marker| upper.contains(marker))
}
