use std::collections::BTreeSet;

use tracing::debug;

use recast_core::knowledge::{lexicon, Conversion, SimplifyTable};
use recast_core::model::{Ingredient, Instruction, Recipe};

use crate::error::TransformError;
use crate::report::TransformReport;
use crate::transformer::Transformer;

const STORE_BOUGHT: &str = "store-bought";

fn conversion_for<'t>(table: &'t SimplifyTable, name: &str) -> Option<&'t Conversion> {
    table.conversions.iter().find(|c| lexicon::mentions(name, &c.key))
}

fn is_labor_intensive(table: &SimplifyTable, ing: &Ingredient) -> bool {
    if conversion_for(table, ing.name()).is_some_and(|c| c.always) {
        return true;
    }
    let Some(prep) = ing.preparation.as_deref() else {
        return false;
    };
    let words = lexicon::words(prep);
    words.len() >= table.max_preparation_words
        || words.iter().any(|w| table.labor_markers.iter().any(|m| m == w))
}

/// Descriptor with `freshly`/`fresh` swapped for `store-bought`.
fn store_bought(descriptor: Option<&str>) -> String {
    let mut words: Vec<&str> = descriptor
        .map(|d| d.split_whitespace().collect())
        .unwrap_or_default();
    words.retain(|w| !matches!(w.to_lowercase().as_str(), "freshly" | "fresh" | STORE_BOUGHT));
    words.insert(0, STORE_BOUGHT);
    words.join(" ")
}

enum StepPlan {
    Keep,
    Remove,
    Shorten,
}

impl Transformer<'_> {
    /// Swap labor-intensive ingredients for pre-prepared equivalents.
    ///
    /// Prep steps that only handle those ingredients are dropped; prep steps
    /// that also handle other ingredients have their stated times cut by the
    /// table's duration factor. Cooking steps keep their times. Ingredients
    /// sharing a consolidation key collapse onto the first of them.
    pub fn to_easy(&self, recipe: &mut Recipe) -> Result<TransformReport, TransformError> {
        let table = self.kb.simplify();
        let mut report = TransformReport::new("to_easy");
        let before = recipe.step_minutes();

        let labor: Vec<usize> = (0..recipe.ingredients.len())
            .filter(|&i| is_labor_intensive(table, &recipe.ingredients[i]))
            .collect();

        if !labor.is_empty() {
            let labor_names: BTreeSet<String> = labor
                .iter()
                .map(|&i| recipe.ingredients[i].name().to_string())
                .collect();
            let plans: Vec<StepPlan> = recipe
                .instructions
                .iter()
                .map(|step| self.plan_step(step, &labor_names, recipe))
                .collect();

            let steps = std::mem::take(&mut recipe.instructions);
            for (mut step, plan) in steps.into_iter().zip(plans) {
                match plan {
                    StepPlan::Remove => {
                        report.removed += 1;
                        continue;
                    }
                    StepPlan::Shorten => {
                        if self.shorten(&mut step, table.duration_factor) {
                            report.rewritten_steps += 1;
                        }
                    }
                    StepPlan::Keep => {}
                }
                recipe.instructions.push(step);
            }
        }

        for index in labor {
            let current = &recipe.ingredients[index];
            if let Some(conv) = conversion_for(table, current.name()) {
                if !current.name().eq_ignore_ascii_case(&conv.name) {
                    let replacement = current.substitute(conv.name.clone(), conv.category);
                    report.rewritten_steps += self.swap_ingredient(recipe, index, replacement);
                    report.substituted += 1;
                }
                continue;
            }
            let ing = &mut recipe.ingredients[index];
            debug!(ingredient = ing.name(), "using store-bought ingredient");
            ing.descriptor = Some(store_bought(ing.descriptor.as_deref()));
            ing.preparation = None;
            report.substituted += 1;
        }

        self.consolidate(recipe, table, &mut report);

        recipe.tag_name("easy");
        self.finish(recipe, before, &report);
        Ok(report)
    }

    /// Cooking steps are never touched. A prep step on labor-intensive
    /// ingredients goes away, or is shortened when it also handles others.
    fn plan_step(&self, step: &Instruction, labor: &BTreeSet<String>, recipe: &Recipe) -> StepPlan {
        if !labor.iter().any(|n| lexicon::mentions(&step.text, n)) {
            return StepPlan::Keep;
        }
        if step.methods.iter().any(|m| self.kb.is_primary(m)) {
            return StepPlan::Keep;
        }
        let prep = self.kb.simplify().prep_methods.as_slice();
        if !step.methods.iter().any(|m| prep.iter().any(|p| p == m)) {
            return StepPlan::Keep;
        }
        let others = recipe
            .ingredients
            .iter()
            .filter(|i| !labor.contains(i.name()))
            .any(|i| lexicon::mentions(&step.text, i.name()));
        if others {
            StepPlan::Shorten
        } else {
            StepPlan::Remove
        }
    }

    fn shorten(&self, step: &mut Instruction, factor: f64) -> bool {
        let Some(text) = self.instructions.scale_durations(&step.text, factor) else {
            return false;
        };
        if text == step.text {
            return false;
        }
        step.text = text;
        self.refresh(step);
        true
    }

    /// Replace every ingredient matching a consolidation key with the first
    /// one that does, keeping each line's own quantity and unit.
    fn consolidate(&self, recipe: &mut Recipe, table: &SimplifyTable, report: &mut TransformReport) {
        for key in &table.consolidate {
            let matching: Vec<usize> = (0..recipe.ingredients.len())
                .filter(|&i| lexicon::mentions(recipe.ingredients[i].name(), key))
                .collect();
            let Some((&first, rest)) = matching.split_first() else {
                continue;
            };
            let keeper = recipe.ingredients[first].clone();
            for &index in rest {
                if recipe.ingredients[index].name() == keeper.name() {
                    continue;
                }
                let replacement = keeper.clone().in_slot_of(&recipe.ingredients[index]);
                report.rewritten_steps += self.swap_ingredient(recipe, index, replacement);
                report.substituted += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use recast_core::model::Category;

    use crate::transformer::tests::{kb, recipe};
    use crate::transformer::Transformer;

    #[test]
    fn test_toasted_chili_becomes_chili_powder() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = recipe(
            &kb,
            &["dried whole chili, toasted and ground", "2 cups tomato sauce"],
            &[
                "Toast the chili in a dry skillet, then grind it.",
                "Simmer the tomato sauce with the chili for 20 minutes.",
            ],
        );
        let report = t.to_easy(&mut dish).unwrap();

        let chili = &dish.ingredients[0];
        assert_eq!(chili.name(), "chili powder");
        assert_eq!(chili.category(), Category::HerbSpice);
        assert_eq!(chili.slot, Some(0));
        assert_eq!(report.removed, 1);
        assert_eq!(dish.instructions.len(), 1);
        assert_eq!(
            dish.instructions[0].text,
            "Simmer the tomato sauce with the chili powder for 20 minutes."
        );
        assert_eq!(dish.instructions[0].duration, Some(20));
        assert_eq!(dish.cooktime, 30);
        assert_eq!(dish.totaltime, 45);
        assert_eq!(dish.name, "Test Dish (easy)");
    }

    #[test]
    fn test_shared_prep_step_is_shortened() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = recipe(
            &kb,
            &["dried whole chili, toasted and ground", "1 onion"],
            &[
                "Toast the chili and dice the onion for 10 minutes.",
                "Simmer the onion with the chili for 20 minutes.",
            ],
        );
        let report = t.to_easy(&mut dish).unwrap();

        assert_eq!(report.removed, 0);
        assert_eq!(
            dish.instructions[0].text,
            "Toast the chili powder and dice the onion for 5 minutes."
        );
        assert_eq!(
            dish.instructions[1].text,
            "Simmer the onion with the chili powder for 20 minutes."
        );
        assert_eq!(dish.cooktime, 25);
        assert_eq!(dish.totaltime, 40);
    }

    #[test]
    fn test_cooking_step_keeps_its_time() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = recipe(
            &kb,
            &["2 chicken breasts", "4 cloves garlic, peeled and minced"],
            &["Bake the chicken with the garlic for 40 minutes."],
        );
        t.to_easy(&mut dish).unwrap();

        assert_eq!(dish.ingredients[1].name(), "jarred minced garlic");
        let step = &dish.instructions[0];
        assert_eq!(step.text, "Bake the chicken with the jarred minced garlic for 40 minutes.");
        assert_eq!(step.duration, Some(40));
        assert_eq!(dish.cooktime, 30);
        assert_eq!(dish.totaltime, 45);
    }

    #[test]
    fn test_no_conversion_falls_back_to_store_bought() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = recipe(
            &kb,
            &["1 cup freshly toasted walnuts"],
            &["Fold in the walnuts."],
        );
        t.to_easy(&mut dish).unwrap();
        let walnuts = &dish.ingredients[0];
        assert_eq!(walnuts.name(), "walnuts");
        assert!(walnuts.preparation.is_none());
        assert_eq!(walnuts.descriptor.as_deref(), Some("store-bought"));
    }

    #[test]
    fn test_cheeses_are_consolidated() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = recipe(
            &kb,
            &["1 cup shredded mozzarella cheese", "1/2 cup parmesan cheese"],
            &["Top with the parmesan cheese."],
        );
        t.to_easy(&mut dish).unwrap();
        assert_eq!(dish.ingredients[1].name(), "mozzarella cheese");
        assert_eq!(dish.ingredients[1].unit.as_deref(), Some("cup"));
        assert_eq!(dish.ingredients[1].slot, Some(1));
        assert_eq!(dish.instructions[0].text, "Top with the mozzarella cheese.");
    }

    #[test]
    fn test_simple_recipe_only_gets_tagged() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = recipe(&kb, &["2 cups rice"], &["Cook the rice for 15 minutes."]);
        let before = dish.clone();
        let report = t.to_easy(&mut dish).unwrap();
        assert!(report.is_noop());
        assert_eq!(dish.ingredients, before.ingredients);
        assert_eq!(dish.instructions, before.instructions);
        assert_eq!(dish.name, "Test Dish (easy)");
    }
}
