use thiserror::Error;

use crate::device::DeviceId;

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("device record has an empty id")]
    EmptyId,
    #[error("device {0} has no group")]
    MissingGroup(DeviceId),
    #[error("device {id} has confidence {confidence} outside [0, 1]")]
    ConfidenceOutOfRange { id: DeviceId, confidence: f32 },
    #[error("device {0} appears more than once")]
    DuplicateId(DeviceId),
    #[error("canvas size {width}x{height} is not usable")]
    InvalidCanvas { width: f32, height: f32 },
    #[error("layout setting `{name}` is out of range: {value}")]
    InvalidConfig { name: &'static str, value: f32 },
}
