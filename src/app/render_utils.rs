use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::layout::CENTER;

pub(super) fn pixels_per_unit(rect: Rect, zoom: f32) -> f32 {
    rect.width().min(rect.height()) * 0.5 * zoom
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + (world - CENTER) * pixels_per_unit(rect, zoom)
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / pixels_per_unit(rect, zoom) + CENTER
}

pub(super) fn draw_frame_border(painter: &Painter, rect: Rect) {
    painter.rect_stroke(
        rect,
        0.0,
        Stroke::new(1.0, Color32::from_rgba_unmultiplied(20, 20, 20, 90)),
        eframe::egui::StrokeKind::Inside,
    );
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn center_maps_to_panned_rect_center() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0));
        let pan = vec2(10.0, -20.0);

        assert_eq!(world_to_screen(rect, pan, 2.0, CENTER), pos2(410.0, 280.0));
    }

    #[test]
    fn unit_square_spans_half_the_short_side() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0));
        let left = world_to_screen(rect, Vec2::ZERO, 1.0, vec2(0.0, 0.5));
        let right = world_to_screen(rect, Vec2::ZERO, 1.0, vec2(1.0, 0.5));

        assert_eq!(right.x - left.x, 300.0);
    }

    #[test]
    fn screen_to_world_inverts_world_to_screen() {
        let rect = Rect::from_min_max(pos2(100.0, 50.0), pos2(900.0, 650.0));
        let pan = vec2(-35.0, 12.5);
        let world = vec2(0.3, 0.8);

        let back = screen_to_world(rect, pan, 1.7, world_to_screen(rect, pan, 1.7, world));
        assert!((back - world).length() < 1e-5);
    }
}
