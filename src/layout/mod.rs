mod config;
mod error;
mod filter;
mod forces;
mod particle;
mod quadtree;
mod session;
mod snapshot;

pub use config::LayoutConfig;
pub use error::LayoutError;
pub use filter::filter_devices;
pub(crate) use forces::group_band_center;
pub use session::{LayoutSession, Phase, TickHandle};
pub use snapshot::{LayoutSnapshot, NodeSnapshot};
