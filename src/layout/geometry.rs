use eframe::egui::Vec2;

use super::LayoutConfig;
use super::graph::{Graph, Node};

#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    pub weight: u32,
    pub points: Vec<Vec2>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecipeGeometry {
    pub recipe: usize,
    pub result: usize,
    pub ingredient_curves: Vec<(usize, Curve)>,
    pub result_curve: Curve,
    pub angle: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagLink {
    pub tag: usize,
    pub item: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FinalSnapshot {
    pub recipes: Vec<RecipeGeometry>,
    pub tag_links: Vec<TagLink>,
}

impl FinalSnapshot {
    pub fn recipe(&self, node: usize) -> Option<&RecipeGeometry> {
        self.recipes.iter().find(|geometry| geometry.recipe == node)
    }
}

fn interpolate(t: f32, p1: Vec2, p2: Vec2, p3: Vec2) -> Vec2 {
    let a = 1.0 - 3.0 * t + 2.0 * t * t;
    let b = 4.0 * t - 4.0 * t * t;
    let c = -t + 2.0 * t * t;
    p1 * a + p2 * b + p3 * c
}

fn sample(segments: usize, t_start: f32, p1: Vec2, p2: Vec2, p3: Vec2) -> Vec<Vec2> {
    (0..=segments)
        .map(|step| {
            let t = t_start + (step as f32) * 0.5 / (segments as f32);
            interpolate(t, p1, p2, p3)
        })
        .collect()
}

fn stack_ingredients(ingredients: &[usize]) -> Vec<(usize, u32)> {
    let mut stacks: Vec<(usize, u32)> = Vec::new();
    for &ingredient in ingredients {
        match stacks.iter_mut().find(|(node, _)| *node == ingredient) {
            Some((_, count)) => *count += 1,
            None => stacks.push((ingredient, 1)),
        }
    }
    stacks
}

fn weighted_mean(nodes: &[Node], stacks: &[(usize, u32)]) -> Option<Vec2> {
    let total = stacks.iter().map(|(_, count)| *count).sum::<u32>();
    if total == 0 {
        return None;
    }

    let sum = stacks
        .iter()
        .fold(Vec2::ZERO, |sum, (node, count)| {
            sum + nodes[*node].position * (*count as f32)
        });
    Some(sum / total as f32)
}

/// Orientation of the sample whose distance from `origin` is closest to
/// `target_radius`; the first sample wins ties.
fn orientation(origin: Vec2, samples: &[Vec2], target_radius: f32) -> f32 {
    let mut best: Option<(f32, Vec2)> = None;
    for &point in samples {
        let offset = point - origin;
        let miss = (offset.length() - target_radius).abs();
        if best.is_none_or(|(best_miss, _)| miss < best_miss) {
            best = Some((miss, offset));
        }
    }

    best.map_or(0.0, |(_, offset)| offset.y.atan2(offset.x))
}

pub(super) fn finalize(graph: &Graph, config: &LayoutConfig) -> FinalSnapshot {
    let nodes = &graph.nodes;
    let segments = config.curve_segments.max(1);
    let target_radius = 4.0 * config.node_radius;

    let recipes = graph
        .recipes
        .iter()
        .map(|links| {
            let recipe_pos = nodes[links.node].position;
            let result_pos = nodes[links.result].position;
            let stacks = stack_ingredients(&links.ingredients);

            let ingredient_curves = stacks
                .iter()
                .map(|&(ingredient, count)| {
                    let points = sample(
                        segments,
                        0.0,
                        nodes[ingredient].position,
                        recipe_pos,
                        result_pos,
                    );
                    (
                        ingredient,
                        Curve {
                            weight: count,
                            points,
                        },
                    )
                })
                .collect();

            // Recipes without ingredients flow straight out of themselves.
            let mean = weighted_mean(nodes, &stacks).unwrap_or(recipe_pos);
            let result_points = sample(segments, 0.5, mean, recipe_pos, result_pos);
            let angle = orientation(recipe_pos, &result_points, target_radius);

            RecipeGeometry {
                recipe: links.node,
                result: links.result,
                ingredient_curves,
                result_curve: Curve {
                    weight: links.result_count,
                    points: result_points,
                },
                angle,
            }
        })
        .collect();

    let tag_links = graph
        .tag_members
        .iter()
        .map(|&(tag, item)| TagLink { tag, item })
        .collect();

    FinalSnapshot { recipes, tag_links }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use eframe::egui::vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::dataset::{Dataset, Ingredient, Recipe, RecipeResult};
    use crate::layout::graph::{NodeKey, NodeKind};

    fn sample_graph() -> Graph {
        let mut dataset = Dataset::default();
        dataset.add_item("plank");
        dataset.add_item("coal");
        dataset.add_item("torch");
        dataset.add_tag("#fuel", ["coal"]);
        dataset.add_recipe(
            "torch",
            Recipe {
                ingredients: vec![
                    Ingredient::Item("plank".to_owned()),
                    Ingredient::Tag("#fuel".to_owned()),
                    Ingredient::Item("plank".to_owned()),
                ],
                result: RecipeResult {
                    item: "torch".to_owned(),
                    count: 4,
                },
            },
        );

        let mut graph = Graph::build(
            &dataset,
            &LayoutConfig::default(),
            &mut StdRng::seed_from_u64(3),
        )
        .unwrap();
        let placements = [
            (NodeKey::new(NodeKind::Item, "plank"), vec2(0.1, 0.1)),
            (NodeKey::new(NodeKind::Item, "coal"), vec2(0.9, 0.2)),
            (NodeKey::new(NodeKind::Item, "torch"), vec2(0.5, 0.9)),
            (NodeKey::new(NodeKind::Tag, "#fuel"), vec2(0.7, 0.1)),
            (NodeKey::new(NodeKind::Recipe, "torch"), vec2(0.4, 0.4)),
        ];
        for (key, position) in placements {
            let index = graph.index_of(&key).unwrap();
            graph.nodes[index].position = position;
        }
        graph
    }

    #[test]
    fn basis_hits_the_control_points() {
        let p1 = vec2(0.0, 0.0);
        let p2 = vec2(1.0, 2.0);
        let p3 = vec2(3.0, -1.0);

        assert_eq!(interpolate(0.0, p1, p2, p3), p1);
        assert_eq!(interpolate(0.5, p1, p2, p3), p2);
        assert_eq!(interpolate(1.0, p1, p2, p3), p3);
    }

    #[test]
    fn finalize_is_deterministic() {
        let graph = sample_graph();
        let config = LayoutConfig::default();

        assert_eq!(finalize(&graph, &config), finalize(&graph, &config));
    }

    #[test]
    fn stacks_ingredients_and_samples_both_halves() {
        let graph = sample_graph();
        let config = LayoutConfig::default();
        let snapshot = finalize(&graph, &config);

        let recipe = graph
            .index_of(&NodeKey::new(NodeKind::Recipe, "torch"))
            .unwrap();
        let plank = graph
            .index_of(&NodeKey::new(NodeKind::Item, "plank"))
            .unwrap();
        let geometry = snapshot.recipe(recipe).unwrap();

        assert_eq!(geometry.ingredient_curves.len(), 2);
        let (first, plank_curve) = &geometry.ingredient_curves[0];
        assert_eq!(*first, plank);
        assert_eq!(plank_curve.weight, 2);
        assert_eq!(plank_curve.points.len(), config.curve_segments + 1);
        assert_eq!(plank_curve.points[0], vec2(0.1, 0.1));
        assert_eq!(*plank_curve.points.last().unwrap(), vec2(0.4, 0.4));

        assert_eq!(geometry.result_curve.weight, 4);
        assert_eq!(geometry.result_curve.points[0], vec2(0.4, 0.4));
        assert_eq!(*geometry.result_curve.points.last().unwrap(), vec2(0.5, 0.9));
        assert!(geometry.angle.is_finite());

        assert_eq!(snapshot.tag_links.len(), 1);
    }

    #[test]
    fn orientation_prefers_sample_nearest_target_radius() {
        let origin = vec2(0.5, 0.5);
        let samples = [
            origin,
            origin + vec2(0.02, 0.0),
            origin + vec2(0.0, 0.05),
            origin + vec2(0.0, 0.3),
        ];

        let angle = orientation(origin, &samples, 0.05);
        assert!((angle - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn orientation_keeps_first_sample_on_ties() {
        let origin = Vec2::ZERO;
        let samples = [vec2(1.0, 0.0), vec2(0.0, 1.0)];

        assert_eq!(orientation(origin, &samples, 1.0), 0.0);
    }

    #[test]
    fn weighted_mean_counts_stack_sizes() {
        let graph = sample_graph();
        let plank = graph
            .index_of(&NodeKey::new(NodeKind::Item, "plank"))
            .unwrap();
        let fuel = graph
            .index_of(&NodeKey::new(NodeKind::Tag, "#fuel"))
            .unwrap();

        let mean = weighted_mean(&graph.nodes, &[(plank, 2), (fuel, 1)]).unwrap();
        assert!((mean - vec2(0.3, 0.1)).length() < 1e-6);
        assert_eq!(weighted_mean(&graph.nodes, &[]), None);
    }
}
