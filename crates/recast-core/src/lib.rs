pub mod config;
pub mod error;
pub mod knowledge;
pub mod model;
pub mod parse;

pub use config::RecastConfig;
pub use error::CoreError;
pub use knowledge::KnowledgeBase;
pub use model::{Category, Ingredient, Instruction, Nutrition, Quantity, Recipe, RecipeInput};
pub use parse::{IngredientParser, InstructionParser, RecipeAssembler};
