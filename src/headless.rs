use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::info;

use crate::dataset::Dataset;
use crate::layout::{Curve, LayoutConfig, LayoutSession, Node, RecipeGeometry, StepOutcome};

pub const FRAME_MS: f32 = 1000.0 / 60.0;

#[derive(Debug, Serialize)]
struct ExportNode<'a> {
    kind: &'static str,
    id: &'a str,
    position: [f32; 2],
}

#[derive(Debug, Serialize)]
struct ExportCurve {
    weight: u32,
    points: Vec<[f32; 2]>,
}

#[derive(Debug, Serialize)]
struct ExportIngredient<'a> {
    kind: &'static str,
    id: &'a str,
    curve: ExportCurve,
}

#[derive(Debug, Serialize)]
struct ExportRecipe<'a> {
    id: &'a str,
    result: &'a str,
    angle: f32,
    ingredients: Vec<ExportIngredient<'a>>,
    result_curve: ExportCurve,
}

#[derive(Debug, Serialize)]
struct ExportTagLink<'a> {
    tag: &'a str,
    item: &'a str,
}

#[derive(Debug, Serialize)]
struct ExportSnapshot<'a> {
    seed: u64,
    outcome: &'static str,
    steps: usize,
    nodes: Vec<ExportNode<'a>>,
    recipes: Vec<ExportRecipe<'a>>,
    tag_links: Vec<ExportTagLink<'a>>,
}

fn export_curve(curve: &Curve) -> ExportCurve {
    ExportCurve {
        weight: curve.weight,
        points: curve.points.iter().map(|point| [point.x, point.y]).collect(),
    }
}

fn export_recipe<'a>(nodes: &'a [Node], geometry: &RecipeGeometry) -> ExportRecipe<'a> {
    ExportRecipe {
        id: &nodes[geometry.recipe].key.id,
        result: &nodes[geometry.result].key.id,
        angle: geometry.angle,
        ingredients: geometry
            .ingredient_curves
            .iter()
            .map(|(ingredient, curve)| ExportIngredient {
                kind: nodes[*ingredient].key.kind.label(),
                id: &nodes[*ingredient].key.id,
                curve: export_curve(curve),
            })
            .collect(),
        result_curve: export_curve(&geometry.result_curve),
    }
}

fn export_snapshot(session: &LayoutSession, seed: u64) -> Option<ExportSnapshot<'_>> {
    let snapshot = session.snapshot()?;
    let nodes = session.nodes();

    Some(ExportSnapshot {
        seed,
        outcome: session.outcome().label(),
        steps: session.steps(),
        nodes: nodes
            .iter()
            .map(|node| ExportNode {
                kind: node.key.kind.label(),
                id: &node.key.id,
                position: [node.position.x, node.position.y],
            })
            .collect(),
        recipes: snapshot
            .recipes
            .iter()
            .map(|geometry| export_recipe(nodes, geometry))
            .collect(),
        tag_links: snapshot
            .tag_links
            .iter()
            .map(|link| ExportTagLink {
                tag: &nodes[link.tag].key.id,
                item: &nodes[link.item].key.id,
            })
            .collect(),
    })
}

pub fn run_to_completion(session: &mut LayoutSession) -> StepOutcome {
    loop {
        let outcome = session.step(FRAME_MS);
        if outcome.is_finished() {
            return outcome;
        }
    }
}

pub fn run(dataset: &Dataset, config: LayoutConfig, seed: u64, output: Option<&Path>) -> Result<()> {
    info!(seed, "running headless layout");
    let mut session = LayoutSession::new(dataset, config, StdRng::seed_from_u64(seed))
        .context("failed to build the recipe graph")?;
    let outcome = run_to_completion(&mut session);
    info!(outcome = outcome.label(), steps = session.steps(), "layout finished");

    let export = export_snapshot(&session, seed).context("finished layout has no snapshot")?;
    let json = serde_json::to_string_pretty(&export).context("failed to serialize snapshot")?;

    match output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("failed to write snapshot to {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").context("failed to write snapshot to stdout")?;
        }
    }

    Ok(())
}
