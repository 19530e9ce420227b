use anyhow::{Context, Result};
use serde::Deserialize;

use super::model::{DatasetError, Ingredient, Recipe, RecipeResult};

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawTag {
    pub(super) tag: String,
    #[serde(default)]
    pub(super) items: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawIngredient {
    #[serde(default)]
    item: Option<String>,
    #[serde(default)]
    tag: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawResult {
    id: String,
    count: u32,
}

#[derive(Clone, Debug, Deserialize)]
struct RawRecipe {
    id: String,
    #[serde(default)]
    ingredients: Vec<RawIngredient>,
    result: RawResult,
}

pub(super) fn parse_items(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).context("item list is not a JSON array of strings")
}

pub(super) fn parse_tags(raw: &str) -> Result<Vec<RawTag>> {
    serde_json::from_str(raw).context("invalid tag JSON")
}

pub(super) fn parse_recipes(raw: &str) -> Result<Vec<(String, Recipe)>> {
    let records: Vec<RawRecipe> = serde_json::from_str(raw).context("invalid recipe JSON")?;
    records
        .into_iter()
        .map(|record| -> Result<(String, Recipe)> {
            let recipe = convert_recipe(&record)?;
            Ok((record.id, recipe))
        })
        .collect()
}

fn convert_recipe(record: &RawRecipe) -> Result<Recipe, DatasetError> {
    if record.result.count == 0 {
        return Err(DatasetError::ZeroResultCount {
            recipe: record.id.clone(),
        });
    }

    let ingredients = record
        .ingredients
        .iter()
        .enumerate()
        .map(|(index, ingredient)| {
            match (ingredient.item.as_ref(), ingredient.tag.as_ref()) {
                (Some(item), None) => Ok(Ingredient::Item(item.clone())),
                (None, Some(tag)) => Ok(Ingredient::Tag(tag.clone())),
                (Some(_), Some(_)) => Err(DatasetError::AmbiguousIngredient {
                    recipe: record.id.clone(),
                    index,
                }),
                (None, None) => Err(DatasetError::EmptyIngredient {
                    recipe: record.id.clone(),
                    index,
                }),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Recipe {
        ingredients,
        result: RecipeResult {
            item: record.result.id.clone(),
            count: record.result.count,
        },
    })
}
