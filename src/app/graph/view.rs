use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Sense, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::layout::{Highlight, NodeKind, paint_final, paint_live};
use crate::util::{format_stack_count, short_name};

use super::super::canvas::EguiCanvas;
use super::super::render_utils::{draw_frame_border, world_to_screen};
use super::super::{SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let search_query = self.search.trim();
        if search_query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.session_revision == self.session_revision
            && cached.query == search_query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .session
            .nodes()
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                fuzzy_match_score(&matcher, &short_name(&node.key.id), search_query)
                    .map(|_| index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: search_query.to_owned(),
            session_revision: self.session_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn hover_text(&self, index: usize) -> Option<String> {
        let node = self.session.nodes().get(index)?;
        let mut text = format!("{} {}", node.key.kind.label(), node.key.id);

        match node.key.kind {
            NodeKind::Recipe => {
                if let Some(recipe) = self.dataset.recipes.get(&node.key.id) {
                    text.push_str(&format!(
                        "  ->  {} ({}) {}",
                        recipe.result.count,
                        format_stack_count(u64::from(recipe.result.count)),
                        short_name(&recipe.result.item)
                    ));
                }
            }
            NodeKind::Tag => {
                if let Some(members) = self.dataset.tags.get(&node.key.id) {
                    text.push_str(&format!("  |  {} members", members.len()));
                }
            }
            NodeKind::Item => {}
        }

        Some(text)
    }

    fn advance_simulation(&mut self, ui: &Ui) {
        if self.paused || self.session.outcome().is_finished() {
            return;
        }

        let delta_ms = ui.input(|input| input.stable_dt) * 1000.0;
        for _ in 0..self.steps_per_frame.max(1) {
            if self.session.step(delta_ms).is_finished() {
                break;
            }
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        self.advance_simulation(ui);
        if !self.paused && !self.session.outcome().is_finished() {
            ui.ctx().request_repaint();
        }

        self.update_hovered(ui, rect);
        if response.clicked()
            && let Some(index) = self.hovered
        {
            self.pin_plan(index);
        }
        let matches = self.cached_search_matches();
        let highlight = Highlight {
            hovered: self.hovered,
            matches: matches.as_deref(),
        };

        let radius = self.session.config().node_radius;
        let mut canvas = EguiCanvas::new(&painter, rect, self.pan, self.zoom);
        match self.session.snapshot() {
            Some(snapshot) => paint_final(
                self.session.nodes(),
                snapshot,
                radius,
                highlight,
                &mut canvas,
            ),
            None => paint_live(
                self.session.nodes(),
                self.session.springs(),
                radius,
                highlight,
                &mut canvas,
            ),
        }
        draw_frame_border(&painter, rect);

        if let Some(index) = self.hovered
            && let Some(text) = self.hover_text(index)
        {
            let anchor = world_to_screen(
                rect,
                self.pan,
                self.zoom,
                self.session.nodes()[index].position,
            );
            painter.text(
                anchor + vec2(14.0, -14.0),
                Align2::LEFT_BOTTOM,
                text,
                FontId::proportional(13.0),
                Color32::from_gray(20),
            );
        }

        if response.double_clicked() {
            self.pan = egui::Vec2::ZERO;
            self.zoom = 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_query_skips_item_with_same_name() {
        let matcher = SkimMatcherV2::default();
        let tag = short_name("#minecraft:planks");
        let item = short_name("minecraft:planks");

        assert!(fuzzy_match_score(&matcher, &tag, "#planks").is_some());
        assert!(fuzzy_match_score(&matcher, &item, "#planks").is_none());
        assert!(fuzzy_match_score(&matcher, &item, "planks").is_some());
    }
}
