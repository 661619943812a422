use tracing::debug;

use recast_core::knowledge::lexicon;
use recast_core::model::{Instruction, Recipe};

use crate::error::TransformError;
use crate::report::TransformReport;
use crate::transformer::Transformer;

impl Transformer<'_> {
    /// Convert the recipe to a primary cooking method.
    ///
    /// Setup steps of other methods are dropped and the target's own setup
    /// step is added when missing. Every primary-method step is rewritten to
    /// the target's words and tools. Missing prerequisite ingredients are
    /// appended. A recipe with no primary-method step gets the target's
    /// generic cooking step.
    pub fn to_method(&self, recipe: &mut Recipe, method: &str) -> Result<TransformReport, TransformError> {
        let unsupported = || TransformError::UnsupportedMethod {
            method: method.to_string(),
        };
        let canonical = self.kb.resolve_method(method).ok_or_else(unsupported)?;
        let target = self.kb.method_profile(canonical).ok_or_else(unsupported)?;
        let mut report = TransformReport::new(format!("to_method({canonical})"));
        let before = recipe.step_minutes();

        let count = recipe.instructions.len();
        recipe
            .instructions
            .retain(|step| !self.is_foreign_setup(step, canonical));
        report.removed += count - recipe.instructions.len();

        let mut touched = 0;
        for step in &mut recipe.instructions {
            if !step.methods.iter().any(|m| self.kb.is_primary(m)) {
                continue;
            }
            touched += 1;
            if self.convert_step(step, canonical) {
                report.rewritten_steps += 1;
            }
        }

        if let (Some(setup), Some(marker)) = (&target.setup, self.kb.setup_marker(canonical)) {
            if !recipe.instructions.iter().any(|s| marker.is_match(&s.text)) {
                recipe.instructions.insert(0, self.instructions.parse(&setup.text));
                report.added += 1;
            }
        }

        for prereq in &target.prerequisites {
            let present = recipe
                .ingredients
                .iter()
                .any(|i| lexicon::mentions(i.name(), &prereq.key));
            if !present {
                debug!(method = canonical, line = %prereq.line, "adding prerequisite");
                recipe.ingredients.push(self.ingredients.parse(&prereq.line));
                report.added += 1;
            }
        }

        if touched == 0 {
            let text = target.step.replace("{main}", &Self::main_ingredient(recipe));
            let mut step = self.instructions.parse(&text);
            step.imply_tool(&target.tool);
            recipe.instructions.push(step);
            report.added += 1;
        }

        recipe.tag_name(&target.forms.base);
        self.finish(recipe, before, &report);
        Ok(report)
    }

    /// A setup step of another primary method that mentions no ingredient.
    fn is_foreign_setup(&self, step: &Instruction, target: &str) -> bool {
        if !step.ingredients.is_empty() {
            return false;
        }
        if self
            .kb
            .setup_marker(target)
            .is_some_and(|own| own.is_match(&step.text))
        {
            return false;
        }
        self.kb
            .primary_methods()
            .iter()
            .filter(|m| m.as_str() != target)
            .filter_map(|m| self.kb.setup_marker(m))
            .any(|marker| marker.is_match(&step.text))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::TransformError;
    use crate::transformer::tests::{kb, recipe};
    use crate::transformer::Transformer;

    fn baked(kb: &recast_core::KnowledgeBase) -> recast_core::Recipe {
        recipe(
            kb,
            &["2 chicken breasts", "1 tablespoon olive oil", "1 teaspoon salt"],
            &[
                "Preheat the oven to 400 degrees F.",
                "Season the chicken breasts with salt and place on a baking sheet.",
                "Bake in the oven for 25 minutes.",
            ],
        )
    }

    #[test]
    fn test_bake_to_stir_fry() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = baked(&kb);
        let report = t.to_method(&mut dish, "Stir Fry").unwrap();

        assert_eq!(report.removed, 1);
        assert_eq!(dish.instructions.len(), 2);
        let cook = &dish.instructions[1];
        assert_eq!(cook.text, "Stir-fry in the skillet for 25 minutes.");
        assert!(cook.uses_method("stir-fry"));
        assert!(cook.tools.contains("skillet"));
        assert!(dish.ingredients.iter().any(|i| i.name() == "soy sauce"));
        assert!(!dish.ingredients.iter().any(|i| i.name() == "sesame oil"));
        assert_eq!(dish.name, "Test Dish (stir-fry)");
        assert_eq!(dish.cooktime, 30);
    }

    #[test]
    fn test_fry_adds_dredge_and_generic_step() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = recipe(&kb, &["1 lb pork chops"], &["Season the pork chops."]);
        t.to_method(&mut dish, "fry").unwrap();

        let names: Vec<&str> = dish.ingredients.iter().map(|i| i.name()).collect();
        assert!(names.contains(&"vegetable oil"));
        assert!(names.contains(&"all-purpose flour"));
        let last = dish.instructions.last().unwrap();
        assert!(last.text.starts_with("Dredge the pork chops"));
        assert!(last.uses_method("fry"));
        assert!(last.tools.contains("skillet"));
    }

    #[test]
    fn test_method_tool_survives_later_swaps() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = recipe(&kb, &["1 lb ground beef"], &["Bake the ground beef for 20 minutes."]);
        t.to_method(&mut dish, "stir-fry").unwrap();
        t.to_vegetarian(&mut dish).unwrap();

        let cook = dish
            .instructions
            .iter()
            .find(|s| s.uses_method("stir-fry"))
            .unwrap();
        assert_eq!(cook.text, "Stir-fry the tofu for 20 minutes.");
        assert!(cook.tools.contains("skillet"));
        assert!(dish.tools().contains("skillet"));
    }

    #[test]
    fn test_grill_inserts_setup_step() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = baked(&kb);
        t.to_method(&mut dish, "grilled").unwrap();
        assert!(dish.instructions[0].text.starts_with("Preheat an outdoor grill"));
        assert!(dish.instructions.iter().all(|s| !s.text.contains("oven")));
    }

    #[test]
    fn test_unsupported_method_leaves_recipe_unchanged() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = baked(&kb);
        let before = dish.clone();
        for bad in ["sous vide", "whisk", ""] {
            assert!(matches!(
                t.to_method(&mut dish, bad),
                Err(TransformError::UnsupportedMethod { .. })
            ));
        }
        assert_eq!(dish, before);
    }
}
