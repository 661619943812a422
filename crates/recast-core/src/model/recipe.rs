use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::category::Category;
use super::ingredient::Ingredient;
use super::instruction::Instruction;
use crate::error::CoreError;
use crate::knowledge::lexicon;

/// The structured record supplied by the scraping side.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecipeInput {
    pub name: String,
    #[serde(default)]
    pub preptime: u32,
    #[serde(default)]
    pub cooktime: u32,
    #[serde(default)]
    pub totaltime: u32,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default, alias = "protien")]
    pub protein: f64,
    #[serde(default)]
    pub cholesterol: f64,
    #[serde(default)]
    pub sodium: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Nutrition {
    pub calories: f64,
    pub carbs: f64,
    pub fat: f64,
    pub protein: f64,
    pub cholesterol: f64,
    pub sodium: f64,
}

impl Nutrition {
    pub fn validate(&self) -> Result<(), CoreError> {
        let fields = [
            ("calories", self.calories),
            ("carbs", self.carbs),
            ("fat", self.fat),
            ("protein", self.protein),
            ("cholesterol", self.cholesterol),
            ("sodium", self.sodium),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::InvalidRecipe(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// A recipe aggregate. The working copy carries a shared, read-only snapshot
/// of the recipe as first assembled; the snapshot itself has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub preptime: u32,
    pub cooktime: u32,
    pub totaltime: u32,
    pub nutrition: Nutrition,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<Instruction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip)]
    original: Option<Arc<Recipe>>,
}

impl Recipe {
    pub fn new(
        name: impl Into<String>,
        ingredients: Vec<Ingredient>,
        instructions: Vec<Instruction>,
    ) -> Self {
        Self {
            name: name.into(),
            preptime: 0,
            cooktime: 0,
            totaltime: 0,
            nutrition: Nutrition::default(),
            ingredients,
            instructions,
            url: None,
            original: None,
        }
    }

    /// Freeze the current state as the original snapshot. A recipe that
    /// already has a snapshot keeps it.
    pub fn into_working_copy(mut self) -> Self {
        if self.original.is_none() {
            let mut snapshot = self.clone();
            snapshot.original = None;
            self.original = Some(Arc::new(snapshot));
        }
        self
    }

    pub fn original(&self) -> Option<&Recipe> {
        self.original.as_deref()
    }

    /// Shared handle to the snapshot, for readers that outlive this borrow.
    pub fn original_handle(&self) -> Option<Arc<Recipe>> {
        self.original.clone()
    }

    pub fn is_original(&self) -> bool {
        self.original.is_none()
    }

    pub fn tools(&self) -> BTreeSet<String> {
        self.instructions
            .iter()
            .flat_map(|i| i.tools.iter().cloned())
            .collect()
    }

    pub fn methods(&self) -> BTreeSet<String> {
        self.instructions
            .iter()
            .flat_map(|i| i.methods.iter().cloned())
            .collect()
    }

    pub fn has_category(&self, category: Category) -> bool {
        self.ingredients.iter().any(|i| i.category() == category)
    }

    /// Sum of the stated step durations, in minutes.
    pub fn step_minutes(&self) -> u32 {
        self.instructions.iter().filter_map(|i| i.duration).sum()
    }

    /// Carry a change in summed step time into cooktime and totaltime.
    pub fn apply_step_time_change(&mut self, minutes_before: u32) {
        let after = i64::from(self.step_minutes());
        let delta = after - i64::from(minutes_before);
        if delta == 0 {
            return;
        }
        let shift = |value: u32| -> u32 {
            (i64::from(value) + delta).clamp(0, i64::from(u32::MAX)) as u32
        };
        self.cooktime = shift(self.cooktime);
        self.totaltime = shift(self.totaltime);
    }

    /// Recompute which ingredients each step mentions.
    pub fn link_ingredients(&mut self) {
        let names: Vec<String> = self.ingredients.iter().map(|i| i.name().to_string()).collect();
        for step in &mut self.instructions {
            let mut linked: Vec<String> = names
                .iter()
                .filter(|name| lexicon::mentions(&step.text, name))
                .cloned()
                .collect();
            linked.sort();
            linked.dedup();
            step.ingredients = linked;
        }
    }

    /// Append `(tag)` to the name unless it is already there.
    pub fn tag_name(&mut self, tag: &str) {
        let suffix = format!("({tag})");
        if !self.name.contains(&suffix) {
            self.name = format!("{} {suffix}", self.name.trim_end());
        }
    }

    /// Swap an existing `(from)` tag for `(to)`, or append `(to)`.
    pub fn retag_name(&mut self, from: &str, to: &str) {
        let old = format!(" ({from})");
        if self.name.contains(&old) {
            self.name = self.name.replace(&old, "");
        }
        self.tag_name(to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(text: &str, minutes: Option<u32>) -> Instruction {
        Instruction {
            text: text.into(),
            tools: BTreeSet::new(),
            implied_tools: BTreeSet::new(),
            methods: BTreeSet::new(),
            duration: minutes,
            ingredients: Vec::new(),
            slot: None,
        }
    }

    #[test]
    fn test_working_copy_snapshot_is_frozen() {
        let recipe = Recipe::new("Chili", vec![], vec![step("Stir.", None)]).into_working_copy();
        let mut working = recipe.clone();
        working.instructions.push(step("Serve.", None));
        assert_eq!(working.original().unwrap().instructions.len(), 1);
        assert!(working.original().unwrap().is_original());
        assert!(!working.is_original());
    }

    #[test]
    fn test_into_working_copy_keeps_existing_snapshot() {
        let mut working = Recipe::new("Chili", vec![], vec![]).into_working_copy();
        working.name = "Changed".into();
        let again = working.into_working_copy();
        assert_eq!(again.original().unwrap().name, "Chili");
    }

    #[test]
    fn test_step_time_change_saturates() {
        let mut recipe = Recipe::new("Soup", vec![], vec![step("Simmer.", Some(30))]);
        recipe.cooktime = 20;
        recipe.totaltime = 40;
        let before = recipe.step_minutes();
        recipe.instructions[0].duration = Some(5);
        recipe.apply_step_time_change(before);
        assert_eq!(recipe.cooktime, 0);
        assert_eq!(recipe.totaltime, 15);
    }

    #[test]
    fn test_tagging() {
        let mut recipe = Recipe::new("Chili", vec![], vec![]);
        recipe.tag_name("vegetarian");
        recipe.tag_name("vegetarian");
        assert_eq!(recipe.name, "Chili (vegetarian)");
        recipe.retag_name("vegetarian", "vegan");
        assert_eq!(recipe.name, "Chili (vegan)");
    }

    #[test]
    fn test_link_ingredients() {
        let ing = Ingredient::new("2 onions", "onion", Category::Vegetable);
        let mut recipe = Recipe::new("Soup", vec![ing], vec![step("Dice the onions.", None)]);
        recipe.link_ingredients();
        assert_eq!(recipe.instructions[0].ingredients, vec!["onion".to_string()]);
    }

    #[test]
    fn test_nutrition_validation() {
        let mut n = Nutrition::default();
        assert!(n.validate().is_ok());
        n.fat = -1.0;
        assert!(n.validate().is_err());
    }

    #[test]
    fn test_input_accepts_legacy_protein_key() {
        let input: RecipeInput =
            serde_json::from_str(r#"{"name":"X","protien":12}"#).unwrap();
        assert_eq!(input.protein, 12.0);
        assert!(input.ingredients.is_empty());
    }
}
