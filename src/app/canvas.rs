use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use crate::layout::Canvas;

use super::render_utils::{pixels_per_unit, world_to_screen};

pub(super) struct EguiCanvas<'a> {
    painter: &'a Painter,
    rect: Rect,
    pan: Vec2,
    zoom: f32,
    scale: f32,
}

impl<'a> EguiCanvas<'a> {
    pub(super) fn new(painter: &'a Painter, rect: Rect, pan: Vec2, zoom: f32) -> Self {
        Self {
            painter,
            rect,
            pan,
            zoom,
            scale: pixels_per_unit(rect, zoom),
        }
    }

    fn to_screen(&self, world: Vec2) -> Pos2 {
        world_to_screen(self.rect, self.pan, self.zoom, world)
    }

    fn stroke(&self, width: f32, color: Color32) -> Stroke {
        Stroke::new((width * self.scale).max(0.5), color)
    }
}

impl Canvas for EguiCanvas<'_> {
    fn clear(&mut self, color: Color32) {
        self.painter.rect_filled(self.rect, 0.0, color);
    }

    fn point(&mut self, center: Vec2, radius: f32, color: Color32) {
        self.painter
            .circle_filled(self.to_screen(center), radius * self.scale, color);
    }

    fn ring(&mut self, center: Vec2, radius: f32, width: f32, color: Color32) {
        self.painter.circle_stroke(
            self.to_screen(center),
            radius * self.scale,
            self.stroke(width, color),
        );
    }

    fn polyline(&mut self, points: &[Vec2], width: f32, color: Color32) {
        let points = points
            .iter()
            .map(|point| self.to_screen(*point))
            .collect::<Vec<_>>();
        self.painter
            .add(Shape::line(points, self.stroke(width, color)));
    }

    fn dashed_line(&mut self, from: Vec2, to: Vec2, width: f32, dash: f32, gap: f32, color: Color32) {
        let path = [self.to_screen(from), self.to_screen(to)];
        self.painter.extend(Shape::dashed_line(
            &path,
            self.stroke(width, color),
            (dash * self.scale).max(1.0),
            (gap * self.scale).max(1.0),
        ));
    }

    fn polygon(&mut self, points: &[Vec2], fill: Color32, stroke_width: f32, stroke: Color32) {
        let points = points
            .iter()
            .map(|point| self.to_screen(*point))
            .collect::<Vec<_>>();
        self.painter.add(Shape::convex_polygon(
            points,
            fill,
            self.stroke(stroke_width, stroke),
        ));
    }
}
