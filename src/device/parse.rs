use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::model::Device;

pub fn load_devices(path: &Path) -> Result<Vec<Device>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read device inventory {}", path.display()))?;
    parse_devices(&raw).with_context(|| format!("invalid device inventory {}", path.display()))
}

pub(super) fn parse_devices(raw: &str) -> Result<Vec<Device>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON")?;

    let list = match parsed {
        Value::Array(_) => parsed,
        Value::Object(mut object) => object
            .remove("devices")
            .ok_or_else(|| anyhow!("expected a device array or an object with `devices`"))?,
        _ => return Err(anyhow!("unexpected JSON type for device inventory")),
    };

    serde_json::from_value(list).context("device records did not match the expected shape")
}
