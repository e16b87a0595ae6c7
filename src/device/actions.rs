use serde::{Deserialize, Serialize};

use super::model::{BlockCategory, Device};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DeviceAction {
    Isolate,
    Release,
    ToggleBlock { category: BlockCategory },
}

impl DeviceAction {
    pub fn describe(self) -> String {
        match self {
            Self::Isolate => "Device isolated".to_owned(),
            Self::Release => "Device released".to_owned(),
            Self::ToggleBlock { category } => format!("{} filter toggled", category.label()),
        }
    }
}

/// Returns the refreshed device record; the input record is left untouched.
pub fn apply_action(device: &Device, action: DeviceAction) -> Device {
    let mut updated = device.clone();

    match action {
        DeviceAction::Isolate => {
            for category in BlockCategory::ALL {
                if category != BlockCategory::Safesearch {
                    updated.blocklist.set(category, true);
                }
            }
        }
        DeviceAction::Release => {
            for category in BlockCategory::ALL {
                if category != BlockCategory::Safesearch {
                    updated.blocklist.set(category, false);
                }
            }
            updated.blocklist.safesearch = true;
        }
        DeviceAction::ToggleBlock { category } => {
            let blocked = updated.blocklist.get(category);
            updated.blocklist.set(category, !blocked);
        }
    }

    updated.has_custom_blocklist = true;
    updated
}
