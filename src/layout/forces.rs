use eframe::egui::Vec2;
use rand::Rng;

use super::graph::{Node, Spring};
use super::{CENTER, LayoutConfig};

/// Inverse-square repulsion pushing `a` away from `b`, or `None` when the
/// pair is too close (this also covers self-pairs) or not finite.
pub(super) fn repulsion_between(a: Vec2, b: Vec2, config: &LayoutConfig) -> Option<Vec2> {
    if !a.is_finite() || !b.is_finite() {
        return None;
    }

    let delta = a - b;
    let distance_cubed = delta.length().powi(3);
    if distance_cubed < config.min_distance_cubed {
        return None;
    }

    Some(delta * (config.repulsion / distance_cubed))
}

fn repel(nodes: &mut [Node], a: usize, b: usize, config: &LayoutConfig) {
    let Some(force) = repulsion_between(nodes[a].position, nodes[b].position, config) else {
        return;
    };

    nodes[a].acceleration += force;
    nodes[b].acceleration -= force;
}

pub(super) fn apply_spring(nodes: &mut [Node], spring: &Spring, config: &LayoutConfig) {
    let start = nodes[spring.start].position;
    let end = nodes[spring.end].position;
    if start.is_finite() && end.is_finite() {
        let pull = (end - start) * config.spring_constant;
        nodes[spring.start].acceleration += pull;
        nodes[spring.end].acceleration -= pull;
    }

    repel(nodes, spring.start, spring.end, config);
}

fn confinement(position: Vec2, config: &LayoutConfig) -> Vec2 {
    let offset = position - CENTER;
    -offset * (config.gravity * offset.length_sq())
}

pub(super) fn accumulate<R: Rng + ?Sized>(
    nodes: &mut [Node],
    springs: &[Spring],
    config: &LayoutConfig,
    friction: f32,
    rng: &mut R,
) {
    for node in nodes.iter_mut() {
        node.acceleration = Vec2::ZERO;
    }

    let node_count = nodes.len();
    for index in 0..node_count {
        let velocity = nodes[index].velocity;
        if velocity.is_finite() {
            nodes[index].acceleration -= velocity * friction;
        }

        for _ in 0..config.repulsion_samples {
            let other = rng.random_range(0..node_count);
            repel(nodes, index, other, config);
        }

        let position = nodes[index].position;
        if position.is_finite() {
            nodes[index].acceleration += confinement(position, config);
        }
    }

    for spring in springs {
        apply_spring(nodes, spring, config);
    }

    for node in nodes.iter_mut() {
        if !node.acceleration.is_finite() {
            node.acceleration = Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::layout::graph::{NodeKey, NodeKind, SpringKind};

    fn node(id: &str, position: Vec2) -> Node {
        Node {
            key: NodeKey::new(NodeKind::Item, id),
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
        }
    }

    fn assert_close(actual: Vec2, expected: Vec2) {
        let error = (actual - expected).length();
        assert!(
            error <= 1e-9 + expected.length() * 1e-5,
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn spring_forces_are_equal_and_opposite() {
        let config = LayoutConfig::default();
        let mut nodes = vec![node("a", vec2(0.2, 0.3)), node("b", vec2(0.35, 0.9))];
        let spring = Spring {
            kind: SpringKind::Ingredient,
            start: 0,
            end: 1,
        };

        apply_spring(&mut nodes, &spring, &config);

        assert_ne!(nodes[0].acceleration, Vec2::ZERO);
        assert_eq!(nodes[0].acceleration, -nodes[1].acceleration);
    }

    #[test]
    fn repulsion_is_antisymmetric_and_pushes_apart() {
        let config = LayoutConfig::default();
        let a = vec2(0.4, 0.5);
        let b = vec2(0.5, 0.5);

        let on_a = repulsion_between(a, b, &config).unwrap();
        let on_b = repulsion_between(b, a, &config).unwrap();
        assert_eq!(on_a, -on_b);
        assert!(on_a.x < 0.0);
        // |Q * d / d^3| = Q / d^2
        assert_close(on_a, vec2(-config.repulsion / 0.01, 0.0));
    }

    #[test]
    fn repulsion_skips_near_coincident_pairs() {
        let config = LayoutConfig::default();
        let a = vec2(0.5, 0.5);

        assert_eq!(repulsion_between(a, a, &config), None);
        assert_eq!(repulsion_between(a, a + vec2(1e-4, 0.0), &config), None);
        assert_eq!(repulsion_between(a, vec2(f32::NAN, 0.5), &config), None);
    }

    #[test]
    fn confinement_vanishes_at_center_and_grows_cubically() {
        let config = LayoutConfig::default();
        assert_eq!(confinement(CENTER, &config), Vec2::ZERO);

        let near = confinement(CENTER + vec2(0.1, 0.0), &config).length();
        let far = confinement(CENTER + vec2(0.2, 0.0), &config).length();
        assert!((far / near - 8.0).abs() < 1e-3);
    }

    #[test]
    fn accumulate_resets_previous_acceleration() {
        let config = LayoutConfig {
            repulsion_samples: 0,
            ..LayoutConfig::default()
        };
        let mut nodes = vec![node("center", CENTER)];
        nodes[0].acceleration = vec2(3.0, -2.0);

        accumulate(&mut nodes, &[], &config, 0.5, &mut StdRng::seed_from_u64(1));
        assert_eq!(nodes[0].acceleration, Vec2::ZERO);
    }

    #[test]
    fn friction_opposes_velocity() {
        let config = LayoutConfig {
            repulsion_samples: 0,
            ..LayoutConfig::default()
        };
        let mut nodes = vec![node("moving", CENTER)];
        nodes[0].velocity = vec2(0.01, -0.02);

        accumulate(&mut nodes, &[], &config, 0.5, &mut StdRng::seed_from_u64(1));
        assert_close(nodes[0].acceleration, vec2(-0.005, 0.01));
    }

    #[test]
    fn symmetric_pair_has_zero_net_force() {
        let config = LayoutConfig {
            repulsion_samples: 0,
            ..LayoutConfig::default()
        };
        let mut nodes = vec![node("left", vec2(0.4, 0.5)), node("right", vec2(0.6, 0.5))];
        let springs = [Spring {
            kind: SpringKind::TagMembership,
            start: 0,
            end: 1,
        }];

        accumulate(&mut nodes, &springs, &config, 0.0, &mut StdRng::seed_from_u64(1));
        assert_close(nodes[0].acceleration + nodes[1].acceleration, Vec2::ZERO);
        assert_ne!(nodes[0].acceleration, Vec2::ZERO);
    }

    #[test]
    fn non_finite_node_contributes_nothing() {
        let config = LayoutConfig::default();
        let mut nodes = vec![
            node("broken", vec2(f32::INFINITY, 0.5)),
            node("fine", vec2(0.3, 0.5)),
        ];
        let springs = [Spring {
            kind: SpringKind::Ingredient,
            start: 0,
            end: 1,
        }];

        accumulate(&mut nodes, &springs, &config, 0.1, &mut StdRng::seed_from_u64(9));
        assert!(nodes[0].acceleration.is_finite());
        assert_close(nodes[1].acceleration, confinement(vec2(0.3, 0.5), &config));
    }
}
