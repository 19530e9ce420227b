use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("recipe {recipe}: ingredient {index} names neither an item nor a tag")]
    EmptyIngredient { recipe: String, index: usize },

    #[error("recipe {recipe}: ingredient {index} names both an item and a tag")]
    AmbiguousIngredient { recipe: String, index: usize },

    #[error("recipe {recipe}: result count must be at least 1")]
    ZeroResultCount { recipe: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ingredient {
    Item(String),
    Tag(String),
}

impl Ingredient {
    pub fn id(&self) -> &str {
        match self {
            Self::Item(id) | Self::Tag(id) => id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecipeResult {
    pub item: String,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipe {
    pub ingredients: Vec<Ingredient>,
    pub result: RecipeResult,
}

#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub items: BTreeSet<String>,
    pub tags: BTreeMap<String, BTreeSet<String>>,
    pub recipes: BTreeMap<String, Recipe>,
}

impl Dataset {
    pub fn add_item(&mut self, id: impl Into<String>) -> bool {
        self.items.insert(id.into())
    }

    /// Merges members into the tag, creating it if needed. Returns false when
    /// the tag already existed.
    pub fn add_tag<I, S>(&mut self, tag: impl Into<String>, members: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tag = tag.into();
        let is_new = !self.tags.contains_key(&tag);
        self.tags
            .entry(tag)
            .or_default()
            .extend(members.into_iter().map(Into::into));
        is_new
    }

    pub fn add_recipe(&mut self, id: impl Into<String>, recipe: Recipe) -> bool {
        self.recipes.insert(id.into(), recipe).is_none()
    }

    pub fn node_count(&self) -> usize {
        self.items.len() + self.tags.len() + self.recipes.len()
    }

    pub fn ingredient_entry_count(&self) -> usize {
        self.recipes
            .values()
            .map(|recipe| recipe.ingredients.len())
            .sum()
    }
}
