use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use eframe::egui::{Vec2, vec2};
use tracing::{debug, info, warn};

use crate::device::{Device, DeviceId};

use super::config::LayoutConfig;
use super::error::LayoutError;
use super::forces::ForceField;
use super::particle::{Particle, ParticleRegistry, ReconcileOutcome, spawn_position};
use super::snapshot::LayoutSnapshot;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Converged,
}

/// Proof of being the current run. Not `Clone`: `start` hands out exactly
/// one, and `start`/`stop` invalidate every earlier handle.
#[derive(Debug)]
pub struct TickHandle {
    generation: u64,
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    group_ids: Vec<u32>,
    deltas: Vec<Vec2>,
}

pub struct LayoutSession {
    config: LayoutConfig,
    registry: ParticleRegistry,
    canvas: Vec2,
    alpha: f32,
    step: u64,
    phase: Phase,
    generation: u64,
    latest: Option<Arc<LayoutSnapshot>>,
    scratch: Scratch,
}

fn validated_canvas(width: f32, height: f32) -> Result<Vec2, LayoutError> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(vec2(width, height))
    } else {
        Err(LayoutError::InvalidCanvas { width, height })
    }
}

impl LayoutSession {
    pub fn new(config: LayoutConfig, width: f32, height: f32) -> Result<Self, LayoutError> {
        config.validate()?;
        let canvas = validated_canvas(width, height)?;

        Ok(Self {
            alpha: config.alpha_start,
            config,
            registry: ParticleRegistry::default(),
            canvas,
            step: 0,
            phase: Phase::Idle,
            generation: next_generation(),
            latest: None,
            scratch: Scratch::default(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn canvas(&self) -> Vec2 {
        self.canvas
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        self.registry.particles()
    }

    pub fn latest_snapshot(&self) -> Option<Arc<LayoutSnapshot>> {
        self.latest.clone()
    }

    pub fn is_current(&self, handle: &TickHandle) -> bool {
        handle.generation == self.generation && self.phase != Phase::Idle
    }

    /// Begins a fresh run. Any earlier run is stopped first, so at most one
    /// handle can drive this session at a time.
    pub fn start(&mut self) -> TickHandle {
        self.stop();
        self.phase = Phase::Running;
        self.step = 0;
        self.alpha = self.config.alpha_start;
        info!(particles = self.registry.len(), "layout started");
        TickHandle {
            generation: self.generation,
        }
    }

    /// Idempotent. Once this returns no outstanding handle produces another
    /// snapshot.
    pub fn stop(&mut self) {
        if self.phase != Phase::Idle {
            info!(step = self.step, "layout stopped");
        }
        self.phase = Phase::Idle;
        self.generation = next_generation();
    }

    pub fn reconcile(&mut self, devices: &[Arc<Device>]) -> Result<ReconcileOutcome, LayoutError> {
        let outcome = self
            .registry
            .reconcile(devices, self.canvas, self.config.spawn_jitter)?;

        if self.registry.is_empty() {
            self.stop();
            self.latest = None;
            return Ok(outcome);
        }

        if outcome.changed() {
            self.reheat();
        }
        if self.phase != Phase::Idle {
            self.refresh_snapshot();
        }
        Ok(outcome)
    }

    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), LayoutError> {
        let canvas = validated_canvas(width, height)?;
        if (canvas - self.canvas).abs().max_elem() < 0.5 {
            return Ok(());
        }

        debug!(width, height, "layout canvas resized");
        self.canvas = canvas;
        self.reheat();
        Ok(())
    }

    /// Holds a particle at `position` (e.g. while dragged). It keeps acting on
    /// its neighbours but ignores forces itself until released.
    pub fn pin(&mut self, id: &DeviceId, position: Vec2) -> bool {
        if !position.is_finite() {
            return false;
        }
        let Some(particle) = self.registry.get_mut(id) else {
            return false;
        };
        particle.pinned = true;
        particle.position = position;
        particle.velocity = Vec2::ZERO;
        self.reheat();
        true
    }

    pub fn release(&mut self, id: &DeviceId) -> bool {
        let Some(particle) = self.registry.get_mut(id) else {
            return false;
        };
        let was_pinned = particle.pinned;
        particle.pinned = false;
        was_pinned
    }

    /// Advances one step when called with the current handle while running.
    /// Stale handles, an idle session and a converged layout all yield `None`.
    pub fn tick(&mut self, handle: &TickHandle) -> Option<Arc<LayoutSnapshot>> {
        if handle.generation != self.generation || self.phase != Phase::Running {
            return None;
        }

        self.integrate();
        self.step += 1;
        self.alpha *= 1.0 - self.config.alpha_decay();

        if self.alpha < self.config.alpha_min {
            self.phase = Phase::Converged;
            debug!(step = self.step, alpha = self.alpha, "layout converged");
        }

        Some(self.refresh_snapshot())
    }

    fn reheat(&mut self) {
        self.alpha = self.alpha.max(self.config.reheat_alpha);
        if self.phase == Phase::Converged {
            self.phase = Phase::Running;
        }
    }

    fn refresh_snapshot(&mut self) -> Arc<LayoutSnapshot> {
        let snapshot = Arc::new(LayoutSnapshot::capture(
            &self.registry,
            self.step,
            self.alpha,
            self.canvas,
        ));
        self.latest = Some(Arc::clone(&snapshot));
        snapshot
    }

    fn integrate(&mut self) {
        let Self {
            config,
            registry,
            canvas,
            alpha,
            scratch,
            ..
        } = self;

        scratch.positions.clear();
        scratch.group_ids.clear();
        for particle in registry.particles() {
            scratch.positions.push(particle.position);
            scratch.group_ids.push(particle.group_id);
        }

        let field = ForceField::new(
            &scratch.positions,
            &scratch.group_ids,
            *canvas,
            config,
            *alpha,
        );
        scratch.deltas.clear();
        scratch
            .deltas
            .extend((0..scratch.positions.len()).map(|index| field.net_delta(index)));

        for (particle, delta) in registry.particles_mut().iter_mut().zip(&scratch.deltas) {
            if particle.pinned {
                particle.velocity = Vec2::ZERO;
                continue;
            }

            particle.velocity = (particle.velocity + *delta) * config.friction;
            particle.position += particle.velocity;

            if !particle.position.is_finite() || !particle.velocity.is_finite() {
                let fallback = spawn_position(&particle.id, *canvas, config.spawn_jitter);
                warn!(
                    id = %particle.id,
                    x = particle.position.x,
                    y = particle.position.y,
                    "non-finite particle state; resetting near canvas centre"
                );
                particle.position = fallback;
                particle.velocity = Vec2::ZERO;
            }
        }
    }
}

impl Drop for LayoutSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::fixtures::device;

    const WIDTH: f32 = 800.0;
    const HEIGHT: f32 = 600.0;

    fn devices(count: usize, groups: u32) -> Vec<Arc<Device>> {
        (0..count)
            .map(|index| {
                let group_id = (index as u32 % groups) + 1;
                Arc::new(device(
                    &format!("dev-{index}"),
                    &format!("Host-{index}"),
                    &format!("192.168.1.{index}"),
                    group_id,
                    crate::device::group_name(group_id).unwrap_or("Default"),
                ))
            })
            .collect()
    }

    fn session_with(devices: &[Arc<Device>]) -> LayoutSession {
        let mut session = LayoutSession::new(LayoutConfig::default(), WIDTH, HEIGHT).unwrap();
        session.reconcile(devices).unwrap();
        session
    }

    fn run_to_convergence(session: &mut LayoutSession, handle: &TickHandle) -> usize {
        let mut ticks = 0;
        while session.phase() == Phase::Running {
            session.tick(handle).unwrap();
            ticks += 1;
            assert!(ticks <= 1_000, "layout never converged");
        }
        ticks
    }

    fn kinetic_energy(session: &LayoutSession) -> f32 {
        session
            .particles()
            .iter()
            .map(|particle| particle.velocity.length_sq())
            .sum()
    }

    #[test]
    fn converges_within_the_tick_budget() {
        let mut session = session_with(&devices(40, 3));
        let handle = session.start();

        let mut previous_alpha = session.alpha();
        let mut ticks = 0;
        while session.phase() == Phase::Running {
            let snapshot = session.tick(&handle).unwrap();
            assert!(snapshot.alpha < previous_alpha);
            previous_alpha = snapshot.alpha;
            ticks += 1;
            assert!(ticks <= 300, "still running after {ticks} ticks");
        }

        assert_eq!(session.phase(), Phase::Converged);
        assert!(kinetic_energy(&session) < 1.0, "{}", kinetic_energy(&session));
        assert!(session.tick(&handle).is_none());
        assert_eq!(session.latest_snapshot().unwrap().step, ticks as u64);
    }

    #[test]
    fn settled_discs_do_not_overlap() {
        let mut session = session_with(&devices(30, 2));
        let handle = session.start();
        run_to_convergence(&mut session, &handle);

        let reach = session.config().collision_radius * 2.0;
        let particles = session.particles();
        for (index, first) in particles.iter().enumerate() {
            for second in &particles[index + 1..] {
                let distance = (first.position - second.position).length();
                assert!(
                    distance >= reach - 1.0,
                    "{} and {} only {distance} apart",
                    first.id,
                    second.id
                );
            }
        }
    }

    #[test]
    fn groups_settle_into_separate_bands() {
        let mut session = session_with(&devices(24, 2));
        let handle = session.start();
        run_to_convergence(&mut session, &handle);

        let mean_x = |group_id: u32| {
            let xs = session
                .particles()
                .iter()
                .filter(|particle| particle.group_id == group_id)
                .map(|particle| particle.position.x)
                .collect::<Vec<_>>();
            xs.iter().sum::<f32>() / xs.len() as f32
        };

        let band_width = WIDTH / session.config().group_bands as f32;
        let separation = mean_x(2) - mean_x(1);
        assert!(separation >= band_width * 0.5, "separation {separation}");
    }

    #[test]
    fn snapshots_are_finite_and_detached() {
        let mut session = session_with(&devices(10, 4));
        let handle = session.start();

        let first = session.tick(&handle).unwrap();
        let frozen = first.nodes.iter().map(|node| node.position).collect::<Vec<_>>();
        session.tick(&handle).unwrap();

        assert_eq!(
            first.nodes.iter().map(|node| node.position).collect::<Vec<_>>(),
            frozen
        );
        assert!(first.nodes.iter().all(|node| node.position.is_finite()));
        assert_eq!(first.step, 1);
    }

    #[test]
    fn reconcile_leaves_retained_motion_alone_and_reheats() {
        let all = devices(12, 3);
        let mut session = session_with(&all);
        let handle = session.start();
        run_to_convergence(&mut session, &handle);
        let before = session.particles().to_vec();

        session.reconcile(&all[..8]).unwrap();

        assert_eq!(session.phase(), Phase::Running);
        assert_eq!(session.alpha(), session.config().reheat_alpha);
        for particle in session.particles() {
            let original = before.iter().find(|old| old.id == particle.id).unwrap();
            assert_eq!(particle, original);
        }
        assert!(session.tick(&handle).is_some());
    }

    #[test]
    fn unchanged_inputs_do_not_reheat() {
        let all = devices(6, 2);
        let mut session = session_with(&all);
        let handle = session.start();
        run_to_convergence(&mut session, &handle);

        let outcome = session.reconcile(&all).unwrap();
        assert!(!outcome.changed());
        assert_eq!(session.phase(), Phase::Converged);
        assert!(session.tick(&handle).is_none());
    }

    #[test]
    fn refreshed_records_reach_the_latest_snapshot() {
        let all = devices(3, 1);
        let mut session = session_with(&all);
        let handle = session.start();
        run_to_convergence(&mut session, &handle);

        let mut refreshed = all.clone();
        let mut record = (*refreshed[0]).clone();
        record.has_custom_blocklist = true;
        refreshed[0] = Arc::new(record);
        session.reconcile(&refreshed).unwrap();

        let snapshot = session.latest_snapshot().unwrap();
        assert!(snapshot.node(&all[0].id).unwrap().device.has_custom_blocklist());
    }

    #[test]
    fn stop_silences_outstanding_handles() {
        let mut session = session_with(&devices(5, 1));
        let handle = session.start();
        assert!(session.tick(&handle).is_some());

        session.stop();
        session.stop();

        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.tick(&handle).is_none());
        assert!(!session.is_current(&handle));
    }

    #[test]
    fn restarting_invalidates_the_previous_handle() {
        let mut session = session_with(&devices(5, 1));
        let first = session.start();
        session.tick(&first).unwrap();

        let second = session.start();
        assert_eq!(session.step(), 0);
        assert!(session.tick(&first).is_none());
        assert!(session.tick(&second).is_some());
        assert_eq!(session.step(), 1);
    }

    #[test]
    fn handles_do_not_cross_sessions() {
        let mut first = session_with(&devices(3, 1));
        let mut second = session_with(&devices(3, 1));
        let handle = first.start();
        let _other = second.start();

        assert!(second.tick(&handle).is_none());
    }

    #[test]
    fn emptying_the_device_set_stops_the_run() {
        let mut session = session_with(&devices(4, 2));
        let handle = session.start();
        session.tick(&handle).unwrap();

        session.reconcile(&[]).unwrap();

        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.latest_snapshot().is_none());
        assert!(session.tick(&handle).is_none());
    }

    #[test]
    fn pinned_particles_hold_still_but_still_push() {
        let all = devices(2, 1);
        let config = LayoutConfig {
            centering_strength: 0.0,
            grouping_strength: 0.0,
            ..Default::default()
        };
        let mut session = LayoutSession::new(config, WIDTH, HEIGHT).unwrap();
        session.reconcile(&all).unwrap();
        let handle = session.start();
        let anchor = vec2(400.0, 300.0);
        assert!(session.pin(&all[0].id, anchor));
        let free_start = session.particles()[1].position;

        for _ in 0..5 {
            session.tick(&handle).unwrap();
        }

        let pinned = &session.particles()[0];
        assert_eq!(pinned.position, anchor);
        assert_eq!(pinned.velocity, Vec2::ZERO);
        let free = &session.particles()[1];
        assert!((free.position - anchor).length() > (free_start - anchor).length());

        assert!(session.release(&all[0].id));
        assert!(!session.release(&all[0].id));
        assert!(!session.pin(&DeviceId::from("missing"), anchor));
    }

    #[test]
    fn non_finite_state_is_reset_before_snapshotting() {
        let all = devices(3, 1);
        let mut session = session_with(&all);
        let handle = session.start();
        session.registry.particles_mut()[1].velocity = vec2(f32::INFINITY, 0.0);

        let snapshot = session.tick(&handle).unwrap();

        assert!(snapshot.nodes.iter().all(|node| node.position.is_finite()));
        let reset = &session.particles()[1];
        assert_eq!(reset.velocity, Vec2::ZERO);
        assert_eq!(
            reset.position,
            spawn_position(&reset.id, session.canvas(), session.config().spawn_jitter)
        );
    }

    #[test]
    fn resize_reheats_a_settled_layout() {
        let mut session = session_with(&devices(4, 2));
        let handle = session.start();
        run_to_convergence(&mut session, &handle);

        session.resize(WIDTH, HEIGHT).unwrap();
        assert_eq!(session.phase(), Phase::Converged);

        session.resize(1024.0, 700.0).unwrap();
        assert_eq!(session.phase(), Phase::Running);
        assert_eq!(session.canvas(), vec2(1024.0, 700.0));
        assert!(session.resize(0.0, 700.0).is_err());
    }

    #[test]
    fn construction_validates_inputs() {
        assert!(matches!(
            LayoutSession::new(LayoutConfig::default(), f32::NAN, 10.0),
            Err(LayoutError::InvalidCanvas { .. })
        ));
        let bad = LayoutConfig {
            friction: -0.1,
            ..Default::default()
        };
        assert!(LayoutSession::new(bad, WIDTH, HEIGHT).is_err());
    }
}
