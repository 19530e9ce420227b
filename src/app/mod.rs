use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::dataset::{Dataset, DatasetPaths, Ingredient, load_dataset};
use crate::layout::{GraphError, LayoutConfig, LayoutSession};
use crate::plan::{PlanChoices, Planner};

mod canvas;
mod graph;
mod render_utils;
mod ui;

pub struct RecipeOrbsApp {
    paths: DatasetPaths,
    config: LayoutConfig,
    seed: Option<u64>,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Dataset, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    dataset: Dataset,
    config: LayoutConfig,
    session: LayoutSession,
    seed: u64,
    session_revision: u64,
    pan: Vec2,
    zoom: f32,
    paused: bool,
    steps_per_frame: usize,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    hovered: Option<usize>,
    planner: Planner,
    plan: Option<PlanState>,
}

struct PlanState {
    target: Ingredient,
    count: u64,
    choices: PlanChoices,
}

struct SearchMatchCache {
    query: String,
    session_revision: u64,
    matches: Arc<HashSet<usize>>,
}

impl ViewModel {
    fn new(dataset: Dataset, config: LayoutConfig, seed: u64) -> Result<Self, GraphError> {
        let session = Self::start_session(&dataset, config, seed)?;
        let planner = Planner::new(&dataset);
        Ok(Self {
            dataset,
            config,
            session,
            seed,
            session_revision: 0,
            pan: Vec2::ZERO,
            zoom: 1.0,
            paused: false,
            steps_per_frame: 1,
            search: String::new(),
            search_match_cache: None,
            hovered: None,
            planner,
            plan: None,
        })
    }

    fn start_session(
        dataset: &Dataset,
        config: LayoutConfig,
        seed: u64,
    ) -> Result<LayoutSession, GraphError> {
        info!(seed, "starting layout session");
        LayoutSession::new(dataset, config, StdRng::seed_from_u64(seed))
    }

    fn restart(&mut self) -> Result<(), GraphError> {
        let seed = rand::random();
        self.session = Self::start_session(&self.dataset, self.config, seed)?;
        self.seed = seed;
        self.session_revision = self.session_revision.wrapping_add(1);
        self.search_match_cache = None;
        self.hovered = None;
        Ok(())
    }
}

impl RecipeOrbsApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        paths: DatasetPaths,
        config: LayoutConfig,
        seed: Option<u64>,
    ) -> Self {
        let state = Self::start_load(paths.clone());
        Self {
            paths,
            config,
            seed,
            state,
        }
    }

    fn start_load(paths: DatasetPaths) -> AppState {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_dataset(&paths).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        AppState::Loading { rx }
    }

    fn ready_state(dataset: Dataset, config: LayoutConfig, seed: Option<u64>) -> AppState {
        let seed = seed.unwrap_or_else(rand::random);
        match ViewModel::new(dataset, config, seed) {
            Ok(model) => AppState::Ready(Box::new(model)),
            Err(error) => AppState::Error(error.to_string()),
        }
    }
}

impl eframe::App for RecipeOrbsApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(dataset) => Self::ready_state(dataset, self.config, self.seed),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading crafting dataset...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to build the recipe graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.paths.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                if let Err(error) = model.show(ctx, &self.paths) {
                    transition = Some(AppState::Error(error.to_string()));
                }
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
