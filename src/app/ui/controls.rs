use eframe::egui::{self, Color32, RichText, Ui};

use crate::layout::{NodeKind, StepOutcome, final_color};

use super::super::ViewModel;

impl ViewModel {
    fn draw_status(&self, ui: &mut Ui) {
        let session = &self.session;
        let outcome = session.outcome();
        let phase_color = match outcome {
            StepOutcome::Running => Color32::from_rgb(103, 196, 255),
            StepOutcome::Converged => Color32::from_rgb(120, 210, 120),
            StepOutcome::StepLimit => Color32::from_rgb(241, 146, 94),
        };

        egui::Grid::new("layout_status")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                ui.label("phase");
                ui.label(RichText::new(outcome.label()).color(phase_color));
                ui.end_row();

                ui.label("steps");
                ui.label(format!("{} / {}", session.steps(), session.config().max_steps));
                ui.end_row();

                ui.label("simulated time");
                ui.label(format!("{:.1} s", session.elapsed_ms() / 1000.0));
                ui.end_row();

                ui.label("friction");
                ui.label(format!("{:.5}", session.friction()));
                ui.end_row();

                ui.label("max speed²");
                if session.max_speed_sq().is_finite() {
                    ui.label(format!("{:.3e}", session.max_speed_sq()));
                } else {
                    ui.label("-");
                }
                ui.end_row();

                ui.label("threshold");
                ui.label(format!("{:.1e}", session.config().convergence_threshold));
                ui.end_row();
            });

        if let Some(snapshot) = session.snapshot() {
            ui.add_space(4.0);
            ui.label(format!(
                "{} recipe curves, {} tag links",
                snapshot.recipes.len(),
                snapshot.tag_links.len()
            ));
        }
    }

    fn draw_legend(ui: &mut Ui) {
        for kind in [NodeKind::Item, NodeKind::Tag, NodeKind::Recipe] {
            ui.horizontal(|ui| {
                ui.label(RichText::new("●").color(final_color(kind)));
                ui.label(kind.label());
            });
        }
    }

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Simulation");
        ui.add_space(4.0);
        self.draw_status(ui);

        ui.separator();
        let running = !self.session.outcome().is_finished();
        ui.add_enabled(running, egui::Checkbox::new(&mut self.paused, "pause"));
        ui.add_enabled(
            running,
            egui::Slider::new(&mut self.steps_per_frame, 1..=64).text("steps per frame"),
        );

        ui.separator();
        ui.heading("Search");
        ui.add(egui::TextEdit::singleline(&mut self.search).hint_text("item, tag or recipe id"));
        if let Some(cache) = &self.search_match_cache
            && !self.search.trim().is_empty()
        {
            ui.label(format!("{} matches", cache.matches.len()));
        }

        ui.separator();
        ui.heading("Hovered");
        match self.hovered.and_then(|index| self.hover_text(index)) {
            Some(text) => ui.label(text),
            None => ui.weak("nothing under the pointer"),
        };

        ui.separator();
        self.draw_plan(ui);

        ui.separator();
        Self::draw_legend(ui);
        ui.add_space(6.0);
        ui.weak("drag to pan, scroll to zoom, click to plan, double-click to reset the view");
    }
}
