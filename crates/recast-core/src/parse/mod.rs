pub mod assemble;
pub mod ingredient;
pub mod instruction;
pub mod tagger;

pub use assemble::RecipeAssembler;
pub use ingredient::{normalize_fractions, IngredientParser};
pub use instruction::InstructionParser;
pub use tagger::{LexiconTagger, Tag, Tagger};
