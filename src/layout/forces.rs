use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::config::LayoutConfig;
use super::quadtree::QuadNode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Force {
    Repulsion,
    Centering,
    Collision,
    Grouping,
}

pub(super) const FORCE_ORDER: [Force; 4] = [
    Force::Repulsion,
    Force::Centering,
    Force::Collision,
    Force::Grouping,
];

impl Force {
    fn strength(self, config: &LayoutConfig) -> f32 {
        match self {
            Self::Repulsion => config.repulsion_strength,
            Self::Centering => config.centering_strength,
            Self::Collision => config.collision_strength,
            Self::Grouping => config.grouping_strength,
        }
    }

    /// Collision keeps full strength as the layout cools; overlaps that remain
    /// at low alpha would otherwise never resolve.
    fn cooled(self) -> bool {
        !matches!(self, Self::Collision)
    }

    fn contribution(self, field: &ForceField<'_>, index: usize) -> Vec2 {
        match self {
            Self::Repulsion => field.repulsion(index),
            Self::Centering => field.centering(),
            Self::Collision => field.collision(index),
            Self::Grouping => field.grouping(index),
        }
    }
}

/// Target x for a 1-based group id: the centre of its band.
pub(crate) fn group_band_center(group_id: u32, canvas_width: f32, bands: usize) -> f32 {
    let bands = bands.max(1);
    let band = (group_id.saturating_sub(1) as usize).min(bands - 1);
    let band_width = canvas_width / bands as f32;
    (band as f32 + 0.5) * band_width
}

fn fallback_direction(first: usize, second: usize) -> Vec2 {
    let (low, high) = if first < second {
        (first, second)
    } else {
        (second, first)
    };
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * TAU;
    let direction = vec2(angle.cos(), angle.sin());
    if first < second { direction } else { -direction }
}

/// Forces evaluated against an immutable tick-start snapshot. Every
/// contribution reads `positions` only, so evaluation order across particles
/// cannot change the result.
pub(super) struct ForceField<'a> {
    positions: &'a [Vec2],
    group_ids: &'a [u32],
    canvas: Vec2,
    config: &'a LayoutConfig,
    alpha: f32,
    mean: Vec2,
    index: Option<QuadNode>,
}

impl<'a> ForceField<'a> {
    pub(super) fn new(
        positions: &'a [Vec2],
        group_ids: &'a [u32],
        canvas: Vec2,
        config: &'a LayoutConfig,
        alpha: f32,
    ) -> Self {
        let mut mean = Vec2::ZERO;
        for position in positions {
            mean += *position;
        }
        if !positions.is_empty() {
            mean /= positions.len() as f32;
        }

        let index = if positions.len() > config.barnes_hut_threshold {
            QuadNode::build(positions)
        } else {
            None
        };

        Self {
            positions,
            group_ids,
            canvas,
            config,
            alpha,
            mean,
            index,
        }
    }

    pub(super) fn net_delta(&self, index: usize) -> Vec2 {
        FORCE_ORDER.iter().fold(Vec2::ZERO, |total, force| {
            let mut scale = force.strength(self.config);
            if force.cooled() {
                scale *= self.alpha;
            }
            if scale == 0.0 {
                return total;
            }
            total + force.contribution(self, index) * scale
        })
    }

    fn pair_repulsion(&self, point: Vec2, other: Vec2) -> Vec2 {
        let delta = other - point;
        let min_distance = self.config.repulsion_min_distance;
        delta / delta.length_sq().max(min_distance * min_distance)
    }

    /// Sum of `(other - self) / d²`; negative strength turns it into a push.
    fn repulsion(&self, index: usize) -> Vec2 {
        let point = self.positions[index];
        match &self.index {
            Some(tree) => {
                let mut total = Vec2::ZERO;
                self.accumulate_repulsion(tree, index, &mut total);
                total
            }
            None => self
                .positions
                .iter()
                .enumerate()
                .filter(|(other_index, _)| *other_index != index)
                .fold(Vec2::ZERO, |total, (_, other)| {
                    total + self.pair_repulsion(point, *other)
                }),
        }
    }

    fn accumulate_repulsion(&self, node: &QuadNode, index: usize, total: &mut Vec2) {
        if node.mass <= 0.0 {
            return;
        }

        let point = self.positions[index];

        if node.is_leaf() {
            for &other_index in &node.indices {
                if other_index != index {
                    *total += self.pair_repulsion(point, self.positions[other_index]);
                }
            }
            return;
        }

        let distance = (node.center_of_mass - point).length();
        let can_approximate = !node.bounds.contains(point)
            && distance > 0.0
            && (node.bounds.side_length() / distance) < self.config.barnes_hut_theta
            && node.mass > 1.0;

        if can_approximate {
            *total += self.pair_repulsion(point, node.center_of_mass) * node.mass;
            return;
        }

        for child in node.children.iter().flatten() {
            self.accumulate_repulsion(child, index, total);
        }
    }

    fn centering(&self) -> Vec2 {
        self.canvas * 0.5 - self.mean
    }

    /// Half of each pair's overlap, along the line between centres.
    fn collision(&self, index: usize) -> Vec2 {
        let reach = self.config.collision_radius * 2.0;
        if reach <= 0.0 {
            return Vec2::ZERO;
        }

        let point = self.positions[index];
        let mut total = Vec2::ZERO;
        let mut push_from = |other_index: usize| {
            if other_index == index {
                return;
            }
            let delta = point - self.positions[other_index];
            let distance = delta.length();
            if distance >= reach {
                return;
            }
            let direction = if distance > 0.0001 {
                delta / distance
            } else {
                fallback_direction(index, other_index)
            };
            total += direction * ((reach - distance) * 0.5);
        };

        match &self.index {
            Some(tree) => tree.for_each_within(point, reach, self.positions, &mut push_from),
            None => (0..self.positions.len()).for_each(push_from),
        }
        total
    }

    fn grouping(&self, index: usize) -> Vec2 {
        let target = group_band_center(
            self.group_ids[index],
            self.canvas.x,
            self.config.group_bands,
        );
        vec2(target - self.positions[index].x, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(
        positions: &'a [Vec2],
        group_ids: &'a [u32],
        config: &'a LayoutConfig,
    ) -> ForceField<'a> {
        ForceField::new(positions, group_ids, vec2(800.0, 600.0), config, 1.0)
    }

    #[test]
    fn repulsion_pushes_pairs_apart_symmetrically() {
        let config = LayoutConfig::default();
        let positions = [vec2(390.0, 300.0), vec2(410.0, 300.0)];
        let groups = [1, 1];
        let field = field(&positions, &groups, &config);

        let left = field.repulsion(0) * config.repulsion_strength;
        let right = field.repulsion(1) * config.repulsion_strength;

        assert!(left.x < 0.0);
        assert!(right.x > 0.0);
        assert!((left + right).length() < 1e-4);
        assert!((left.x + 15.0).abs() < 1e-3);
    }

    #[test]
    fn coincident_particles_stay_finite() {
        let config = LayoutConfig::default();
        let positions = [vec2(400.0, 300.0); 3];
        let groups = [2, 2, 2];
        let field = field(&positions, &groups, &config);

        for index in 0..positions.len() {
            let delta = field.net_delta(index);
            assert!(delta.is_finite(), "{delta:?}");
        }

        let first = field.collision(0);
        let second = field.collision(1);
        assert!(first.length() > 0.0);
        assert!(second.length() > 0.0);
    }

    #[test]
    fn collision_is_silent_once_discs_separate() {
        let config = LayoutConfig::default();
        let positions = [vec2(100.0, 100.0), vec2(161.0, 100.0)];
        let groups = [1, 1];
        let field = field(&positions, &groups, &config);

        assert_eq!(field.collision(0), Vec2::ZERO);

        let overlapping = [vec2(100.0, 100.0), vec2(140.0, 100.0)];
        let field = ForceField::new(&overlapping, &groups, vec2(800.0, 600.0), &config, 1.0);
        assert_eq!(field.collision(0), vec2(-10.0, 0.0));
        assert_eq!(field.collision(1), vec2(10.0, 0.0));
    }

    #[test]
    fn centering_targets_the_canvas_middle() {
        let config = LayoutConfig::default();
        let positions = [vec2(0.0, 0.0), vec2(200.0, 100.0)];
        let groups = [1, 1];
        let field = field(&positions, &groups, &config);

        assert_eq!(field.centering(), vec2(300.0, 250.0));
    }

    #[test]
    fn grouping_pulls_only_along_x_toward_the_band() {
        let config = LayoutConfig::default();
        let positions = [vec2(400.0, 50.0), vec2(400.0, 50.0)];
        let groups = [1, 4];
        let field = field(&positions, &groups, &config);

        assert_eq!(field.grouping(0), vec2(-300.0, 0.0));
        assert_eq!(field.grouping(1), vec2(300.0, 0.0));
    }

    #[test]
    fn band_centres_split_the_canvas_evenly() {
        assert_eq!(group_band_center(1, 800.0, 4), 100.0);
        assert_eq!(group_band_center(3, 800.0, 4), 500.0);
        assert_eq!(group_band_center(9, 800.0, 4), 700.0);
        assert_eq!(group_band_center(0, 800.0, 4), 100.0);
    }

    #[test]
    fn cooling_scales_everything_except_collision() {
        let config = LayoutConfig {
            repulsion_strength: 0.0,
            centering_strength: 0.0,
            grouping_strength: 0.0,
            ..Default::default()
        };
        let positions = [vec2(100.0, 100.0), vec2(140.0, 100.0)];
        let groups = [1, 1];

        let hot = ForceField::new(&positions, &groups, vec2(800.0, 600.0), &config, 1.0);
        let cold = ForceField::new(&positions, &groups, vec2(800.0, 600.0), &config, 0.01);
        assert_eq!(hot.net_delta(0), cold.net_delta(0));
    }

    #[test]
    fn barnes_hut_with_zero_theta_matches_exact_sums() {
        let positions = (0..220)
            .map(|index| {
                let angle = index as f32 * 0.37;
                vec2(400.0, 300.0) + vec2(angle.cos(), angle.sin()) * (index as f32 * 1.7)
            })
            .collect::<Vec<_>>();
        let groups = vec![1; positions.len()];

        let exact_config = LayoutConfig {
            barnes_hut_threshold: usize::MAX,
            ..Default::default()
        };
        let tree_config = LayoutConfig {
            barnes_hut_threshold: 0,
            barnes_hut_theta: 0.0,
            ..Default::default()
        };
        let exact = field(&positions, &groups, &exact_config);
        let tree = field(&positions, &groups, &tree_config);
        assert!(tree.index.is_some());

        for index in [0, 17, 101, 219] {
            let expected = exact.repulsion(index);
            let actual = tree.repulsion(index);
            let tolerance = expected.length().max(1.0) * 1e-3;
            assert!(
                (expected - actual).length() < tolerance,
                "{index}: {expected:?} vs {actual:?}"
            );
            assert!((exact.collision(index) - tree.collision(index)).length() < 1e-3);
        }
    }

    #[test]
    fn barnes_hut_approximation_stays_close() {
        let positions = (0..300)
            .map(|index| vec2((index % 20) as f32 * 35.0, (index / 20) as f32 * 35.0))
            .collect::<Vec<_>>();
        let groups = vec![1; positions.len()];

        let exact_config = LayoutConfig {
            barnes_hut_threshold: usize::MAX,
            ..Default::default()
        };
        let tree_config = LayoutConfig {
            barnes_hut_threshold: 0,
            ..Default::default()
        };
        let exact = field(&positions, &groups, &exact_config);
        let tree = field(&positions, &groups, &tree_config);

        for index in [0, 19, 299] {
            let expected = exact.repulsion(index);
            let actual = tree.repulsion(index);
            assert!(
                expected.dot(actual) > 0.0,
                "{index}: {expected:?} vs {actual:?}"
            );
            assert!((expected - actual).length() < expected.length() * 0.35 + 0.05);
        }
    }
}
