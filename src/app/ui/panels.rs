use eframe::egui::{self, Align, Context, Layout};

use crate::dataset::DatasetPaths;
use crate::layout::GraphError;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        paths: &DatasetPaths,
    ) -> Result<(), GraphError> {
        let mut restart_requested = false;

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("recipe-orbs");
                    ui.separator();
                    ui.label(format!("recipes: {}", paths.recipes.display()));
                    ui.label(format!("nodes: {}", self.session.nodes().len()));
                    ui.label(format!("springs: {}", self.session.springs().len()));
                    if ui.button("Restart layout").clicked() {
                        restart_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!("seed {}", self.seed));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));

        if restart_requested {
            self.restart()?;
        }

        Ok(())
    }
}
