use std::path::Path;

use anyhow::Result;
use sentinel_sdk::config::{default_config_path, ALLOWED_KEYS};
use sentinel_sdk::SentinelConfig;

use crate::output;

pub fn set(path: Option<&Path>, key: &str, value: &str) -> Result<()> {
    if !ALLOWED_KEYS.contains(&key) {
        return Err(output::fail_with_hint(
            &format!("unknown config key: {key}"),
            &format!("allowed keys: {}", ALLOWED_KEYS.join(", ")),
        ));
    }

    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    // env overrides are not persisted
    let mut config = if path.exists() {
        SentinelConfig::from_file(&path)?
    } else {
        SentinelConfig::default()
    };
    config.set(key, value)?;
    config.save(&path)?;

    if output::is_json() {
        output::json_output(serde_json::json!({ "key": key, "value": value }));
    } else {
        output::success(&format!("{key} updated in {}", path.display()));
    }
    Ok(())
}

pub fn show(path: Option<&Path>) -> Result<()> {
    let config = SentinelConfig::load(path)?;
    let entries = config.entries();

    if output::is_json() {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v)))
            .collect();
        output::json_output(serde_json::Value::Object(map));
    } else {
        for (key, value) in &entries {
            output::label(key, if value.is_empty() { "(unset)" } else { value });
        }
    }
    Ok(())
}
