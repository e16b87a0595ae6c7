use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::error::LayoutError;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub repulsion_strength: f32,
    pub repulsion_min_distance: f32,
    pub barnes_hut_theta: f32,
    pub barnes_hut_threshold: usize,
    pub centering_strength: f32,
    pub collision_radius: f32,
    pub collision_strength: f32,
    pub grouping_strength: f32,
    pub group_bands: usize,
    pub friction: f32,
    pub alpha_start: f32,
    pub alpha_min: f32,
    pub settle_ticks: u32,
    pub reheat_alpha: f32,
    pub spawn_jitter: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            repulsion_strength: -300.0,
            repulsion_min_distance: 1.0,
            barnes_hut_theta: 0.9,
            barnes_hut_threshold: 128,
            centering_strength: 1.0,
            collision_radius: 30.0,
            collision_strength: 1.0,
            grouping_strength: 0.1,
            group_bands: 4,
            friction: 0.6,
            alpha_start: 1.0,
            alpha_min: 0.001,
            settle_ticks: 300,
            reheat_alpha: 0.3,
            spawn_jitter: 50.0,
        }
    }
}

impl LayoutConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read layout config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("invalid layout config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("rejected layout config {}", path.display()))?;
        Ok(config)
    }

    /// Per-tick multiplicative cooling chosen so alpha drops below `alpha_min`
    /// no later than `settle_ticks` ticks after a start from `alpha_start`.
    pub fn alpha_decay(&self) -> f32 {
        let ticks = self.settle_ticks.max(2) - 1;
        let ratio = (self.alpha_min / self.alpha_start).clamp(f32::MIN_POSITIVE, 1.0);
        1.0 - ratio.powf(1.0 / ticks as f32)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let checks: [(&'static str, f32, bool); 12] = [
            ("repulsion_strength", self.repulsion_strength, self.repulsion_strength <= 0.0),
            (
                "repulsion_min_distance",
                self.repulsion_min_distance,
                self.repulsion_min_distance > 0.0,
            ),
            ("barnes_hut_theta", self.barnes_hut_theta, self.barnes_hut_theta >= 0.0),
            ("centering_strength", self.centering_strength, self.centering_strength >= 0.0),
            ("collision_radius", self.collision_radius, self.collision_radius >= 0.0),
            (
                "collision_strength",
                self.collision_strength,
                (0.0..=1.0).contains(&self.collision_strength),
            ),
            ("grouping_strength", self.grouping_strength, self.grouping_strength >= 0.0),
            ("group_bands", self.group_bands as f32, self.group_bands > 0),
            ("friction", self.friction, (0.0..1.0).contains(&self.friction)),
            (
                "alpha_min",
                self.alpha_min,
                self.alpha_min > 0.0 && self.alpha_min < self.alpha_start,
            ),
            ("alpha_start", self.alpha_start, self.alpha_start <= 1.0),
            (
                "reheat_alpha",
                self.reheat_alpha,
                self.reheat_alpha > self.alpha_min && self.reheat_alpha <= self.alpha_start,
            ),
        ];

        for (name, value, in_range) in checks {
            if !value.is_finite() || !in_range {
                return Err(LayoutError::InvalidConfig { name, value });
            }
        }

        if !self.spawn_jitter.is_finite() || self.spawn_jitter < 0.0 {
            return Err(LayoutError::InvalidConfig {
                name: "spawn_jitter",
                value: self.spawn_jitter,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(LayoutConfig::default().validate(), Ok(()));
    }

    #[test]
    fn decay_reaches_alpha_min_within_the_budget() {
        let config = LayoutConfig::default();
        let decay = config.alpha_decay();

        let mut alpha = config.alpha_start;
        let mut ticks = 0;
        while alpha >= config.alpha_min {
            alpha *= 1.0 - decay;
            ticks += 1;
        }

        assert!(ticks <= config.settle_ticks, "took {ticks} ticks");
        assert!(ticks >= config.settle_ticks - 2, "took {ticks} ticks");
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{ "collision_radius": 18.0, "group_bands": 6 }"#).unwrap();
        assert_eq!(config.collision_radius, 18.0);
        assert_eq!(config.group_bands, 6);
        assert_eq!(config.repulsion_strength, -300.0);
    }

    #[test]
    fn rejects_unstable_friction() {
        let config = LayoutConfig {
            friction: 1.2,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(LayoutError::InvalidConfig {
                name: "friction",
                value: 1.2
            })
        );
    }
}
