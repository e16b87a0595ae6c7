use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::device::{Device, DeviceId};
use crate::util::stable_pair;

use super::error::LayoutError;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub id: DeviceId,
    pub group_id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub pinned: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub added: usize,
    pub removed: usize,
    pub regrouped: usize,
}

impl ReconcileOutcome {
    pub fn changed(&self) -> bool {
        self.added > 0 || self.removed > 0 || self.regrouped > 0
    }
}

/// Spawn point near the canvas centre, jittered per id so a batch of new
/// particles never starts stacked on one spot.
pub(super) fn spawn_position(id: &DeviceId, canvas: Vec2, jitter: f32) -> Vec2 {
    let (jx, jy) = stable_pair(id.as_str());
    canvas * 0.5 + vec2(jx, jy) * jitter
}

fn validated_group(device: &Device) -> Result<u32, LayoutError> {
    if device.id.is_empty() {
        return Err(LayoutError::EmptyId);
    }

    let group_id = device
        .group_id()
        .ok_or_else(|| LayoutError::MissingGroup(device.id.clone()))?;

    let confidence = device.confidence();
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(LayoutError::ConfidenceOutOfRange {
            id: device.id.clone(),
            confidence,
        });
    }

    Ok(group_id)
}

#[derive(Debug, Default)]
pub struct ParticleRegistry {
    particles: Vec<Particle>,
    devices: Vec<Arc<Device>>,
    index_by_id: HashMap<DeviceId, usize>,
}

impl ParticleRegistry {
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub(super) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn devices(&self) -> &[Arc<Device>] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn get(&self, id: &DeviceId) -> Option<&Particle> {
        self.index_by_id.get(id).map(|&index| &self.particles[index])
    }

    pub(super) fn get_mut(&mut self, id: &DeviceId) -> Option<&mut Particle> {
        let index = *self.index_by_id.get(id)?;
        self.particles.get_mut(index)
    }

    /// Makes the particle set mirror `devices`. Retained particles keep their
    /// position, velocity and pin untouched; the whole batch is validated
    /// before anything changes.
    pub fn reconcile(
        &mut self,
        devices: &[Arc<Device>],
        canvas: Vec2,
        jitter: f32,
    ) -> Result<ReconcileOutcome, LayoutError> {
        let mut seen = HashSet::with_capacity(devices.len());
        let mut group_ids = Vec::with_capacity(devices.len());
        for device in devices {
            group_ids.push(validated_group(device)?);
            if !seen.insert(&device.id) {
                return Err(LayoutError::DuplicateId(device.id.clone()));
            }
        }

        let mut previous = self
            .particles
            .drain(..)
            .map(|particle| (particle.id.clone(), particle))
            .collect::<HashMap<_, _>>();

        let mut outcome = ReconcileOutcome::default();
        let mut particles = Vec::with_capacity(devices.len());
        for (device, group_id) in devices.iter().zip(group_ids) {
            let particle = match previous.remove(&device.id) {
                Some(mut retained) => {
                    if retained.group_id != group_id {
                        retained.group_id = group_id;
                        outcome.regrouped += 1;
                    }
                    retained
                }
                None => {
                    outcome.added += 1;
                    Particle {
                        id: device.id.clone(),
                        group_id,
                        position: spawn_position(&device.id, canvas, jitter),
                        velocity: Vec2::ZERO,
                        pinned: false,
                    }
                }
            };
            particles.push(particle);
        }
        outcome.removed = previous.len();

        self.index_by_id = particles
            .iter()
            .enumerate()
            .map(|(index, particle)| (particle.id.clone(), index))
            .collect();
        self.particles = particles;
        self.devices = devices.to_vec();

        if outcome.changed() {
            debug!(
                added = outcome.added,
                removed = outcome.removed,
                regrouped = outcome.regrouped,
                total = self.particles.len(),
                "particle set reconciled"
            );
        }

        Ok(outcome)
    }
}
