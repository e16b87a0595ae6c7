use std::sync::Arc;

use eframe::egui::Vec2;

use crate::device::{Device, DeviceId};

use super::particle::ParticleRegistry;

#[derive(Clone, Debug)]
pub struct NodeSnapshot {
    pub id: DeviceId,
    pub group_id: u32,
    pub position: Vec2,
    pub pinned: bool,
    pub device: Arc<Device>,
}

/// Read-only copy of the layout after one tick. Renderers only ever see
/// these; the live particle array stays inside the session.
#[derive(Clone, Debug)]
pub struct LayoutSnapshot {
    pub step: u64,
    pub alpha: f32,
    pub canvas: Vec2,
    pub nodes: Vec<NodeSnapshot>,
}

impl LayoutSnapshot {
    pub(super) fn capture(registry: &ParticleRegistry, step: u64, alpha: f32, canvas: Vec2) -> Self {
        let nodes = registry
            .particles()
            .iter()
            .zip(registry.devices())
            .map(|(particle, device)| NodeSnapshot {
                id: particle.id.clone(),
                group_id: particle.group_id,
                position: particle.position,
                pinned: particle.pinned,
                device: Arc::clone(device),
            })
            .collect();

        Self {
            step,
            alpha,
            canvas,
            nodes,
        }
    }

    pub fn node(&self, id: &DeviceId) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|node| &node.id == id)
    }
}
