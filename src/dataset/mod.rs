mod collect;
mod model;
mod parse;

pub use collect::{DatasetPaths, load_dataset};
pub use model::{Dataset, Ingredient, Recipe, RecipeResult};
