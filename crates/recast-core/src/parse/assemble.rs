use tracing::info;

use super::ingredient::IngredientParser;
use super::instruction::InstructionParser;
use crate::error::CoreError;
use crate::knowledge::KnowledgeBase;
use crate::model::{Ingredient, Instruction, Nutrition, Recipe, RecipeInput};

/// Builds a working-copy [`Recipe`] from the input record.
pub struct RecipeAssembler<'a> {
    ingredients: IngredientParser<'a>,
    instructions: InstructionParser<'a>,
}

impl<'a> RecipeAssembler<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Result<Self, CoreError> {
        Ok(Self {
            ingredients: IngredientParser::new(kb),
            instructions: InstructionParser::new(kb)?,
        })
    }

    pub fn ingredient_parser(&self) -> &IngredientParser<'a> {
        &self.ingredients
    }

    pub fn instruction_parser(&self) -> &InstructionParser<'a> {
        &self.instructions
    }

    /// Parse every non-blank line, number the results by position, and
    /// freeze the outcome as the original snapshot.
    pub fn assemble(&self, input: &RecipeInput) -> Result<Recipe, CoreError> {
        let nutrition = Nutrition {
            calories: input.calories,
            carbs: input.carbs,
            fat: input.fat,
            protein: input.protein,
            cholesterol: input.cholesterol,
            sodium: input.sodium,
        };
        nutrition.validate()?;

        let ingredients: Vec<Ingredient> = non_blank(&input.ingredients)
            .enumerate()
            .map(|(slot, line)| {
                let mut ing = self.ingredients.parse(line);
                ing.slot = Some(slot);
                ing
            })
            .collect();
        let instructions: Vec<Instruction> = non_blank(&input.instructions)
            .enumerate()
            .map(|(slot, line)| {
                let mut step = self.instructions.parse(line);
                step.slot = Some(slot);
                step
            })
            .collect();

        let mut recipe = Recipe::new(input.name.trim(), ingredients, instructions);
        recipe.preptime = input.preptime;
        recipe.cooktime = input.cooktime;
        recipe.totaltime = input.totaltime;
        recipe.nutrition = nutrition;
        recipe.url = input.url.clone();
        recipe.link_ingredients();

        info!(
            name = %recipe.name,
            ingredients = recipe.ingredients.len(),
            instructions = recipe.instructions.len(),
            "assembled recipe"
        );
        Ok(recipe.into_working_copy())
    }
}

fn non_blank(lines: &[String]) -> impl Iterator<Item = &str> {
    lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn input() -> RecipeInput {
        RecipeInput {
            name: "Weeknight Chili ".into(),
            preptime: 15,
            cooktime: 40,
            totaltime: 55,
            ingredients: vec![
                "1 lb ground beef".into(),
                "  ".into(),
                "1 (15 ounce) can black beans, drained".into(),
                "2 teaspoons chili powder".into(),
            ],
            instructions: vec![
                "Brown the ground beef in a large pot.".into(),
                "Add the beans and chili powder; simmer for 30 minutes.".into(),
            ],
            calories: 420.0,
            protein: 30.0,
            ..RecipeInput::default()
        }
    }

    #[test]
    fn test_assemble_numbers_slots_and_snapshots() {
        let kb = KnowledgeBase::builtin().unwrap();
        let recipe = RecipeAssembler::new(&kb).unwrap().assemble(&input()).unwrap();

        assert_eq!(recipe.name, "Weeknight Chili");
        assert_eq!(recipe.ingredients.len(), 3);
        let slots: Vec<Option<usize>> = recipe.ingredients.iter().map(|i| i.slot).collect();
        assert_eq!(slots, vec![Some(0), Some(1), Some(2)]);
        assert_eq!(recipe.ingredients[0].category(), Category::Meat);
        assert_eq!(recipe.instructions[1].duration, Some(30));
        assert!(recipe.instructions[0].tools.contains("pot"));
        assert_eq!(recipe.instructions[0].ingredients, vec!["ground beef".to_string()]);
        assert_eq!(recipe.nutrition.protein, 30.0);

        let original = recipe.original().unwrap();
        assert_eq!(original.ingredients, recipe.ingredients);
        assert_eq!(original.instructions, recipe.instructions);
    }

    #[test]
    fn test_rejects_negative_nutrition() {
        let kb = KnowledgeBase::builtin().unwrap();
        let mut bad = input();
        bad.sodium = -5.0;
        let err = RecipeAssembler::new(&kb).unwrap().assemble(&bad).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRecipe(_)));
    }
}
