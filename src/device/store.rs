use std::sync::Arc;

use thiserror::Error;

use super::actions::{DeviceAction, apply_action};
use super::model::{Device, DeviceGroup, DeviceId};
use super::summary::DeviceSummary;

const GROUPS: [(u32, &str); 4] = [(1, "Default"), (2, "Staff"), (3, "Guests"), (4, "IoT")];

pub fn group_name(group_id: u32) -> Option<&'static str> {
    GROUPS
        .iter()
        .find(|(id, _)| *id == group_id)
        .map(|(_, name)| *name)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("device {0} not found")]
    DeviceNotFound(DeviceId),
    #[error("unknown group id {0}")]
    UnknownGroup(u32),
}

/// Last-known-good device records. Every mutation swaps in a fresh `Arc` and
/// bumps the revision.
#[derive(Debug, Default)]
pub struct DeviceStore {
    devices: Vec<Arc<Device>>,
    revision: u64,
}

impl DeviceStore {
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            devices: devices.into_iter().map(Arc::new).collect(),
            revision: 0,
        }
    }

    pub fn devices(&self) -> &[Arc<Device>] {
        &self.devices
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: &DeviceId) -> Option<&Arc<Device>> {
        self.devices.iter().find(|device| &device.id == id)
    }

    pub fn summary(&self) -> DeviceSummary {
        DeviceSummary::from_devices(self.devices.iter().map(Arc::as_ref))
    }

    pub fn group_names(&self) -> Vec<String> {
        let mut names = self
            .devices
            .iter()
            .filter_map(|device| device.group.as_ref())
            .map(|group| (group.id, group.name.clone()))
            .collect::<Vec<_>>();
        names.sort();
        names.dedup();
        names.into_iter().map(|(_, name)| name).collect()
    }

    pub fn replace_all(&mut self, devices: Vec<Device>) {
        self.devices = devices.into_iter().map(Arc::new).collect();
        self.revision += 1;
    }

    pub fn apply(&mut self, id: &DeviceId, action: DeviceAction) -> Result<Arc<Device>, StoreError> {
        self.update(id, |device| apply_action(device, action))
    }

    pub fn rename(&mut self, id: &DeviceId, given_name: &str) -> Result<Arc<Device>, StoreError> {
        self.update(id, |device| Device {
            given_name: given_name.to_owned(),
            ..device.clone()
        })
    }

    pub fn set_group(&mut self, id: &DeviceId, group_id: u32) -> Result<Arc<Device>, StoreError> {
        let name = group_name(group_id).ok_or(StoreError::UnknownGroup(group_id))?;
        self.update(id, |device| Device {
            group: Some(DeviceGroup {
                id: group_id,
                name: name.to_owned(),
                is_default: group_id == 1,
            }),
            ..device.clone()
        })
    }

    fn update(
        &mut self,
        id: &DeviceId,
        change: impl FnOnce(&Device) -> Device,
    ) -> Result<Arc<Device>, StoreError> {
        let slot = self
            .devices
            .iter_mut()
            .find(|device| &device.id == id)
            .ok_or_else(|| StoreError::DeviceNotFound(id.clone()))?;

        let updated = Arc::new(change(slot));
        *slot = Arc::clone(&updated);
        self.revision += 1;
        Ok(updated)
    }
}
