use rand::seq::SliceRandom;
use rand::Rng;

use recast_core::knowledge::{lexicon, SubstituteRule};
use recast_core::model::Recipe;

use crate::error::TransformError;
use crate::report::TransformReport;
use crate::transformer::Transformer;

const HEALTHY: &str = "healthy";
const INDULGENT: &str = "indulgent";

impl Transformer<'_> {
    /// Replace ingredients named in the healthier-substitution table,
    /// keeping quantity and unit.
    pub fn to_healthy(&self, recipe: &mut Recipe) -> Result<TransformReport, TransformError> {
        let table = self.kb.health();
        let mut report = TransformReport::new("to_healthy");
        let before = recipe.step_minutes();

        for index in 0..recipe.ingredients.len() {
            let current = &recipe.ingredients[index];
            let Some(rule) = SubstituteRule::pick(&table.healthier, current.name()) else {
                continue;
            };
            if rule.key.is_none() || current.name().eq_ignore_ascii_case(&rule.name) {
                continue;
            }
            let replacement = current.substitute(rule.name.clone(), rule.category);
            report.rewritten_steps += self.swap_ingredient(recipe, index, replacement);
            report.substituted += 1;
        }

        recipe.retag_name(INDULGENT, HEALTHY);
        self.finish(recipe, before, &report);
        Ok(report)
    }

    /// Replace every ingredient in a category with indulgent options by a
    /// random one of them. Ingredients that already are one are kept.
    pub fn from_healthy<R: Rng + ?Sized>(
        &self,
        recipe: &mut Recipe,
        rng: &mut R,
    ) -> Result<TransformReport, TransformError> {
        let table = self.kb.health();
        let mut report = TransformReport::new("from_healthy");
        let before = recipe.step_minutes();

        for index in 0..recipe.ingredients.len() {
            let current = &recipe.ingredients[index];
            let Some(options) = table.indulgent.get(&current.category()) else {
                continue;
            };
            if options.iter().any(|o| lexicon::mentions(current.name(), o)) {
                continue;
            }
            let Some(choice) = options.choose(rng) else {
                report.no_substitute(index, current);
                continue;
            };
            let replacement = current.substitute(choice.clone(), current.category());
            report.rewritten_steps += self.swap_ingredient(recipe, index, replacement);
            report.substituted += 1;
        }

        recipe.retag_name(HEALTHY, INDULGENT);
        self.finish(recipe, before, &report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use recast_core::model::Category;

    use crate::transformer::tests::{kb, recipe};
    use crate::transformer::Transformer;

    #[test]
    fn test_to_healthy_swaps_table_entries() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = recipe(
            &kb,
            &["1/2 cup sour cream", "3 tablespoons butter", "1 cup black beans"],
            &["Melt the butter.", "Stir in the sour cream."],
        );
        let report = t.to_healthy(&mut dish).unwrap();

        assert_eq!(report.substituted, 2);
        assert_eq!(dish.ingredients[0].name(), "greek yogurt");
        assert_eq!(dish.ingredients[1].name(), "unsweetened applesauce");
        assert_eq!(dish.ingredients[1].category(), Category::Fruit);
        assert_eq!(dish.ingredients[1].unit.as_deref(), Some("tablespoon"));
        assert_eq!(dish.ingredients[2].name(), "black beans");
        assert_eq!(dish.instructions[1].text, "Stir in the greek yogurt.");
        assert_eq!(dish.name, "Test Dish (healthy)");

        let again = t.to_healthy(&mut dish).unwrap();
        assert_eq!(again.substituted, 0);
    }

    #[test]
    fn test_from_healthy_is_seeded_and_keeps_categories() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let lines = ["2 chicken breasts", "1 onion", "1 cup rice"];
        let steps = ["Season the chicken breasts.", "Slice the onion."];

        let mut first = recipe(&kb, &lines, &steps);
        t.from_healthy(&mut first, &mut StdRng::seed_from_u64(11)).unwrap();
        let mut second = recipe(&kb, &lines, &steps);
        t.from_healthy(&mut second, &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(first.ingredients, second.ingredients);

        let options = &kb.health().indulgent;
        let meat = &first.ingredients[0];
        assert_eq!(meat.category(), Category::Meat);
        assert!(options[&Category::Meat].iter().any(|o| o == meat.name()));
        let veg = &first.ingredients[1];
        assert_eq!(veg.category(), Category::Vegetable);
        assert!(options[&Category::Vegetable].iter().any(|o| o == veg.name()));
        assert_eq!(first.ingredients[2].name(), "rice");
        assert_eq!(first.name, "Test Dish (indulgent)");
    }

    #[test]
    fn test_health_tags_replace_each_other() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = recipe(&kb, &["1 cup rice"], &["Cook the rice."]);
        t.from_healthy(&mut dish, &mut StdRng::seed_from_u64(1)).unwrap();
        t.to_healthy(&mut dish).unwrap();
        assert_eq!(dish.name, "Test Dish (healthy)");
    }
}
