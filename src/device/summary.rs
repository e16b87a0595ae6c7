use std::collections::BTreeMap;

use serde::Serialize;

use super::model::Device;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeviceSummary {
    pub total: usize,
    pub active: usize,
    pub by_group: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
}

impl DeviceSummary {
    pub fn from_devices<'a>(devices: impl IntoIterator<Item = &'a Device>) -> Self {
        let mut summary = Self::default();

        for device in devices {
            summary.total += 1;
            if device.is_active {
                summary.active += 1;
            }

            let group = device.group_name().unwrap_or("Ungrouped");
            *summary.by_group.entry(group.to_owned()).or_default() += 1;

            let category = if device.category().is_empty() {
                "unknown"
            } else {
                device.category()
            };
            *summary.by_category.entry(category.to_owned()).or_default() += 1;
        }

        summary
    }
}
