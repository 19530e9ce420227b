use std::collections::HashSet;
use std::f32::consts::TAU;

use eframe::egui::{Color32, Vec2, vec2};

use super::geometry::FinalSnapshot;
use super::graph::{Node, NodeKind, Spring};

pub const BACKGROUND: Color32 = Color32::from_rgb(135, 206, 235);
pub const FINAL_BACKGROUND: Color32 = Color32::from_rgb(0xba, 0xe7, 0xf9);

const GLYPH_ARC_SEGMENTS: usize = 24;

/// Drawing backend. Every coordinate and length is in layout space; the
/// implementation owns the mapping to pixels.
pub trait Canvas {
    fn clear(&mut self, color: Color32);
    fn point(&mut self, center: Vec2, radius: f32, color: Color32);
    fn ring(&mut self, center: Vec2, radius: f32, width: f32, color: Color32);
    fn polyline(&mut self, points: &[Vec2], width: f32, color: Color32);
    fn dashed_line(&mut self, from: Vec2, to: Vec2, width: f32, dash: f32, gap: f32, color: Color32);
    fn polygon(&mut self, points: &[Vec2], fill: Color32, stroke_width: f32, stroke: Color32);
}

#[derive(Clone, Copy, Default)]
pub struct Highlight<'a> {
    pub hovered: Option<usize>,
    pub matches: Option<&'a HashSet<usize>>,
}

impl Highlight<'_> {
    fn is_match(&self, index: usize) -> bool {
        self.matches.is_some_and(|matches| matches.contains(&index))
    }
}

const SEARCH_RING: Color32 = Color32::from_rgb(255, 214, 92);

fn live_color(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Recipe => Color32::RED,
        NodeKind::Tag => Color32::GREEN,
        NodeKind::Item => Color32::BLUE,
    }
}

pub fn final_color(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Item => Color32::from_rgb(0x63, 0x46, 0xe2),
        NodeKind::Tag => Color32::from_rgb(0x53, 0xe2, 0x46),
        NodeKind::Recipe => Color32::from_rgb(0xe2, 0x46, 0x46),
    }
}

pub fn paint_live(
    nodes: &[Node],
    springs: &[Spring],
    radius: f32,
    highlight: Highlight<'_>,
    canvas: &mut dyn Canvas,
) {
    canvas.clear(BACKGROUND);

    for spring in springs {
        canvas.polyline(
            &[nodes[spring.start].position, nodes[spring.end].position],
            radius / 5.0,
            Color32::BLACK,
        );
    }

    if let Some(node) = highlight.hovered.and_then(|index| nodes.get(index)) {
        canvas.point(node.position, 1.5 * radius, Color32::WHITE);
    }

    for (index, node) in nodes.iter().enumerate() {
        if highlight.is_match(index) {
            canvas.ring(node.position, 1.8 * radius, radius / 3.0, SEARCH_RING);
        }
        canvas.point(node.position, radius, live_color(node.key.kind));
    }
}

/// Outline of a recipe glyph: a circle of radius `2r` drawn the long way
/// around, closed by a tip `4r` out along `angle`.
pub fn recipe_glyph(center: Vec2, radius: f32, angle: f32) -> Vec<Vec2> {
    let start = angle + TAU / 6.0;
    let sweep = TAU - TAU / 3.0;
    let mut points = (0..=GLYPH_ARC_SEGMENTS)
        .map(|step| {
            let theta = start + sweep * (step as f32) / (GLYPH_ARC_SEGMENTS as f32);
            center + vec2(theta.cos(), theta.sin()) * (2.0 * radius)
        })
        .collect::<Vec<_>>();
    points.push(center + vec2(angle.cos(), angle.sin()) * (4.0 * radius));
    points
}

fn tag_glyph(center: Vec2, radius: f32) -> [Vec2; 4] {
    let r = 3.0 * radius;
    [
        center + vec2(r, 0.0),
        center + vec2(0.0, r),
        center + vec2(-r, 0.0),
        center + vec2(0.0, -r),
    ]
}

pub fn paint_final(
    nodes: &[Node],
    snapshot: &FinalSnapshot,
    radius: f32,
    highlight: Highlight<'_>,
    canvas: &mut dyn Canvas,
) {
    canvas.clear(FINAL_BACKGROUND);

    for geometry in &snapshot.recipes {
        for (_, curve) in &geometry.ingredient_curves {
            canvas.polyline(
                &curve.points,
                curve.weight as f32 * radius / 10.0,
                Color32::BLACK,
            );
        }
        canvas.polyline(
            &geometry.result_curve.points,
            geometry.result_curve.weight as f32 * radius / 10.0,
            Color32::BLACK,
        );
    }

    for link in &snapshot.tag_links {
        canvas.dashed_line(
            nodes[link.item].position,
            nodes[link.tag].position,
            3.0 * radius / 5.0,
            4.0 * radius,
            2.0 * radius,
            Color32::BLACK,
        );
    }

    let outline = radius / 2.0;
    for (index, node) in nodes.iter().enumerate() {
        let center = node.position;
        let fill = final_color(node.key.kind);

        if highlight.hovered == Some(index) {
            canvas.point(center, 5.0 * radius, Color32::WHITE);
        }
        if highlight.is_match(index) {
            canvas.ring(center, 5.0 * radius, radius / 2.0, SEARCH_RING);
        }

        match node.key.kind {
            NodeKind::Item => {
                canvas.point(center, 2.0 * radius, fill);
                canvas.ring(center, 2.0 * radius, outline, Color32::BLACK);
            }
            NodeKind::Tag => {
                canvas.polygon(&tag_glyph(center, radius), fill, outline, Color32::BLACK);
            }
            NodeKind::Recipe => {
                let angle = snapshot
                    .recipe(index)
                    .map_or(0.0, |geometry| geometry.angle);
                canvas.polygon(
                    &recipe_glyph(center, radius, angle),
                    fill,
                    outline,
                    Color32::BLACK,
                );
            }
        }
    }
}
