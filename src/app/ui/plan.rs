use eframe::egui::{self, RichText, Ui};

use crate::plan::{PlanNode, PlanPath, PlanStep, target_for};
use crate::util::format_stack_count;

use super::super::{PlanState, ViewModel};

enum PlanAction {
    Expand(PlanPath),
    Split(PlanPath),
    Cycle {
        path: PlanPath,
        options: usize,
        forward: bool,
    },
}

fn draw_plan_node(ui: &mut Ui, node: &PlanNode, actions: &mut Vec<PlanAction>) {
    ui.horizontal(|ui| match &node.step {
        PlanStep::Need { split, .. } => {
            let toggle = if node.expanded { "-" } else { "+" };
            if ui.small_button(toggle).clicked() {
                actions.push(PlanAction::Expand(node.path.clone()));
            }
            ui.label(node.title());
            let split_label = if *split { "join" } else { "split" };
            if ui.small_button(split_label).clicked() {
                actions.push(PlanAction::Split(node.path.clone()));
            }
        }
        PlanStep::Recipe { .. } | PlanStep::Member { .. } => {
            let options = node.choice_count();
            let cycle = |forward| PlanAction::Cycle {
                path: node.path.clone(),
                options,
                forward,
            };
            if options > 1 && ui.small_button("<").clicked() {
                actions.push(cycle(false));
            }
            ui.weak(node.title());
            if options > 1 && ui.small_button(">").clicked() {
                actions.push(cycle(true));
            }
        }
    });

    if !node.children.is_empty() {
        ui.indent(("plan_node", &node.path), |ui| {
            for child in &node.children {
                draw_plan_node(ui, child, actions);
            }
        });
    }
}

impl ViewModel {
    pub(in crate::app) fn pin_plan(&mut self, index: usize) {
        let Some(node) = self.session.nodes().get(index) else {
            return;
        };
        if let Some((target, count)) = target_for(&self.dataset, &node.key) {
            self.plan = Some(PlanState {
                target,
                count,
                choices: Default::default(),
            });
        }
    }

    pub(in crate::app) fn draw_plan(&mut self, ui: &mut Ui) {
        ui.heading("Plan");
        let Some(state) = self.plan.as_mut() else {
            ui.weak("click an item, tag or recipe to plan it");
            return;
        };

        ui.horizontal(|ui| {
            ui.label("make");
            ui.add(egui::DragValue::new(&mut state.count).range(1..=u64::from(u32::MAX)));
            if ui.small_button("clear").clicked() {
                state.choices = Default::default();
            }
        });

        let root = self
            .planner
            .plan(&self.dataset, &state.target, state.count, &state.choices);
        let mut actions = Vec::new();
        egui::ScrollArea::vertical()
            .id_salt("plan_tree")
            .max_height(260.0)
            .show(ui, |ui| draw_plan_node(ui, &root, &mut actions));

        ui.label(RichText::new("to gather").strong());
        for (ingredient, count) in root.totals() {
            ui.label(format!("{} {}", format_stack_count(count), ingredient.id()));
        }

        for action in actions {
            match action {
                PlanAction::Expand(path) => state.choices.toggle_expanded(&path),
                PlanAction::Split(path) => state.choices.toggle_split(&path),
                PlanAction::Cycle {
                    path,
                    options,
                    forward,
                } => state.choices.cycle(&path, options, forward),
            }
        }
    }
}
