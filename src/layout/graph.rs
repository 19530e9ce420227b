use std::collections::{HashMap, HashSet};
use std::fmt;
use std::mem::{Discriminant, discriminant};

use eframe::egui::{Vec2, vec2};
use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::dataset::{Dataset, Ingredient};

use super::LayoutConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Item,
    Tag,
    Recipe,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Tag => "tag",
            Self::Recipe => "recipe",
        }
    }
}

/// Identity of a node: ids are only unique within a kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub kind: NodeKind,
    pub id: String,
}

impl NodeKey {
    pub fn new(kind: NodeKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{{}}}", self.kind.label(), self.id)
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub key: NodeKey,
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpringKind {
    TagMembership,
    Ingredient,
    Result { count: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spring {
    pub kind: SpringKind,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("{referenced_by} references unknown {missing}")]
    UnknownNode {
        missing: NodeKey,
        referenced_by: NodeKey,
    },
}

#[derive(Clone, Debug)]
pub struct RecipeLinks {
    pub node: usize,
    pub ingredients: Vec<usize>,
    pub result: usize,
    pub result_count: u32,
}

#[derive(Clone, Debug)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub springs: Vec<Spring>,
    pub recipes: Vec<RecipeLinks>,
    pub tag_members: Vec<(usize, usize)>,
    index_by_key: HashMap<NodeKey, usize>,
}

struct SpringSet {
    springs: Vec<Spring>,
    seen: HashSet<(Discriminant<SpringKind>, usize, usize)>,
    duplicates: usize,
}

impl SpringSet {
    fn new() -> Self {
        Self {
            springs: Vec::new(),
            seen: HashSet::new(),
            duplicates: 0,
        }
    }

    fn insert(&mut self, kind: SpringKind, start: usize, end: usize) {
        if self.seen.insert((discriminant(&kind), start, end)) {
            self.springs.push(Spring { kind, start, end });
        } else {
            self.duplicates += 1;
        }
    }
}

impl Graph {
    pub fn build<R: Rng + ?Sized>(
        dataset: &Dataset,
        config: &LayoutConfig,
        rng: &mut R,
    ) -> Result<Self, GraphError> {
        let keys = dataset
            .items
            .iter()
            .map(|id| NodeKey::new(NodeKind::Item, id.as_str()))
            .chain(
                dataset
                    .tags
                    .keys()
                    .map(|id| NodeKey::new(NodeKind::Tag, id.as_str())),
            )
            .chain(
                dataset
                    .recipes
                    .keys()
                    .map(|id| NodeKey::new(NodeKind::Recipe, id.as_str())),
            );

        let speed = config.initial_speed.abs();
        let mut nodes = Vec::with_capacity(dataset.node_count());
        let mut index_by_key = HashMap::with_capacity(dataset.node_count());
        for key in keys {
            index_by_key.insert(key.clone(), nodes.len());
            nodes.push(Node {
                key,
                position: vec2(rng.random::<f32>(), rng.random::<f32>()),
                velocity: vec2(
                    rng.random_range(-speed..=speed),
                    rng.random_range(-speed..=speed),
                ),
                acceleration: Vec2::ZERO,
            });
        }

        let lookup = |missing: NodeKey, referenced_by: &NodeKey| {
            index_by_key
                .get(&missing)
                .copied()
                .ok_or_else(|| GraphError::UnknownNode {
                    missing,
                    referenced_by: referenced_by.clone(),
                })
        };

        let mut springs = SpringSet::new();
        let mut tag_members = Vec::new();

        for (tag, members) in &dataset.tags {
            let tag_key = NodeKey::new(NodeKind::Tag, tag.as_str());
            let tag_index = lookup(tag_key.clone(), &tag_key)?;
            for item in members {
                let item_index = lookup(NodeKey::new(NodeKind::Item, item.as_str()), &tag_key)?;
                springs.insert(SpringKind::TagMembership, item_index, tag_index);
                tag_members.push((tag_index, item_index));
            }
        }

        let mut recipes = Vec::with_capacity(dataset.recipes.len());
        for (id, recipe) in &dataset.recipes {
            let recipe_key = NodeKey::new(NodeKind::Recipe, id.as_str());
            let recipe_index = lookup(recipe_key.clone(), &recipe_key)?;

            let mut ingredients = Vec::with_capacity(recipe.ingredients.len());
            for ingredient in &recipe.ingredients {
                let ingredient_key = match ingredient {
                    Ingredient::Item(item) => NodeKey::new(NodeKind::Item, item.as_str()),
                    Ingredient::Tag(tag) => NodeKey::new(NodeKind::Tag, tag.as_str()),
                };
                let ingredient_index = lookup(ingredient_key, &recipe_key)?;
                springs.insert(SpringKind::Ingredient, ingredient_index, recipe_index);
                ingredients.push(ingredient_index);
            }

            let result_index = lookup(
                NodeKey::new(NodeKind::Item, recipe.result.item.as_str()),
                &recipe_key,
            )?;
            springs.insert(
                SpringKind::Result {
                    count: recipe.result.count,
                },
                recipe_index,
                result_index,
            );

            recipes.push(RecipeLinks {
                node: recipe_index,
                ingredients,
                result: result_index,
                result_count: recipe.result.count,
            });
        }

        debug!(
            nodes = nodes.len(),
            springs = springs.springs.len(),
            duplicate_springs = springs.duplicates,
            "built layout graph"
        );

        Ok(Self {
            nodes,
            springs: springs.springs,
            recipes,
            tag_members,
            index_by_key,
        })
    }

    pub fn index_of(&self, key: &NodeKey) -> Option<usize> {
        self.index_by_key.get(key).copied()
    }
}
