use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::model::Dataset;
use super::parse::{parse_items, parse_recipes, parse_tags};

pub const ITEMS_FILE: &str = "item.json";
pub const TAGS_FILE: &str = "tag.json";
pub const RECIPES_FILE: &str = "recipe.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetPaths {
    pub items: PathBuf,
    pub tags: PathBuf,
    pub recipes: PathBuf,
}

impl DatasetPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            items: dir.join(ITEMS_FILE),
            tags: dir.join(TAGS_FILE),
            recipes: dir.join(RECIPES_FILE),
        }
    }
}

fn read_file(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {what} from {}", path.display()))
}

pub fn load_dataset(paths: &DatasetPaths) -> Result<Dataset> {
    let items = parse_items(&read_file(&paths.items, "items")?)
        .with_context(|| format!("failed to parse {}", paths.items.display()))?;
    let tags = parse_tags(&read_file(&paths.tags, "tags")?)
        .with_context(|| format!("failed to parse {}", paths.tags.display()))?;
    let recipes = parse_recipes(&read_file(&paths.recipes, "recipes")?)
        .with_context(|| format!("failed to parse {}", paths.recipes.display()))?;

    let mut dataset = Dataset::default();

    for item in items {
        if !dataset.add_item(item.clone()) {
            warn!(%item, "duplicate item id");
        }
    }

    for raw_tag in tags {
        if !dataset.add_tag(raw_tag.tag.clone(), raw_tag.items) {
            warn!(tag = %raw_tag.tag, "tag listed more than once, merging members");
        }
    }

    for (id, recipe) in recipes {
        if !dataset.add_recipe(id.clone(), recipe) {
            warn!(recipe = %id, "duplicate recipe id, keeping the last definition");
        }
    }

    info!(
        items = dataset.items.len(),
        tags = dataset.tags.len(),
        recipes = dataset.recipes.len(),
        "loaded crafting dataset"
    );

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_dataset(dir: &Path, items: &str, tags: &str, recipes: &str) -> DatasetPaths {
        let paths = DatasetPaths::in_dir(dir);
        fs::write(&paths.items, items).unwrap();
        fs::write(&paths.tags, tags).unwrap();
        fs::write(&paths.recipes, recipes).unwrap();
        paths
    }

    #[test]
    fn loads_all_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_dataset(
            dir.path(),
            r#"["stick", "oak_planks", "oak_planks"]"#,
            r##"[{"tag": "#planks", "items": ["oak_planks"]}]"##,
            r##"[{"id": "stick", "ingredients": [{"tag": "#planks"}, {"tag": "#planks"}], "result": {"id": "stick", "count": 4}}]"##,
        );

        let dataset = load_dataset(&paths).unwrap();
        assert_eq!(dataset.items.len(), 2);
        assert_eq!(dataset.tags.len(), 1);
        assert_eq!(dataset.recipes["stick"].ingredients.len(), 2);
    }

    #[test]
    fn missing_file_error_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DatasetPaths::in_dir(dir.path());

        let message = format!("{:#}", load_dataset(&paths).unwrap_err());
        assert!(message.contains("item.json"), "{message}");
    }

    #[test]
    fn invalid_recipe_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_dataset(
            dir.path(),
            "[]",
            "[]",
            r#"[{"id": "r", "ingredients": [{}], "result": {"id": "x", "count": 1}}]"#,
        );

        let message = format!("{:#}", load_dataset(&paths).unwrap_err());
        assert!(message.contains("recipe.json"), "{message}");
        assert!(message.contains("neither an item nor a tag"), "{message}");
    }
}
