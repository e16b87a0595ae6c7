use std::sync::Arc;

use crate::device::Device;

/// Case-insensitive substring match on name, hostname and vendor, or a plain
/// substring match on the IP address. An empty term matches everything.
pub fn matches_search(device: &Device, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }

    let needle = search.to_lowercase();
    device.given_name.to_lowercase().contains(&needle)
        || device.hostname.to_lowercase().contains(&needle)
        || device.vendor.to_lowercase().contains(&needle)
        || device.ip.contains(search)
}

pub fn matches_group(device: &Device, group_filter: Option<&str>) -> bool {
    match group_filter {
        None => true,
        Some(name) => device.group_name() == Some(name),
    }
}

pub fn filter_devices(
    devices: &[Arc<Device>],
    search: &str,
    group_filter: Option<&str>,
) -> Vec<Arc<Device>> {
    devices
        .iter()
        .filter(|device| matches_search(device, search) && matches_group(device, group_filter))
        .cloned()
        .collect()
}
