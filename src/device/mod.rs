mod actions;
mod model;
mod parse;
mod store;
mod summary;

pub use actions::DeviceAction;
pub use model::{BlockCategory, Device, DeviceId};
pub use parse::load_devices;
pub use store::{DeviceStore, StoreError, group_name};
