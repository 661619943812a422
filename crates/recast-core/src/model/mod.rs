pub mod category;
pub mod ingredient;
pub mod instruction;
pub mod quantity;
pub mod recipe;

pub use category::Category;
pub use ingredient::Ingredient;
pub use instruction::Instruction;
pub use quantity::Quantity;
pub use recipe::{Nutrition, Recipe, RecipeInput};
