use std::collections::{HashMap, HashSet};

use tracing::debug;

use recast_core::knowledge::StyleProfile;
use recast_core::model::{Category, Recipe};

use crate::error::TransformError;
use crate::report::TransformReport;
use crate::transformer::{capitalize, join_list, Transformer};

/// Hands out replacement ingredients for one style: unused same-category
/// entries first, then unused staples, then the same-category list again.
struct Picker<'p> {
    profile: &'p StyleProfile,
    used: HashSet<String>,
    reuse: HashMap<Category, usize>,
}

impl<'p> Picker<'p> {
    fn new(profile: &'p StyleProfile, recipe: &Recipe) -> Self {
        Self {
            profile,
            used: recipe.ingredients.iter().map(|i| i.name().to_lowercase()).collect(),
            reuse: HashMap::new(),
        }
    }

    fn list(&self, category: Category) -> &'p [String] {
        self.profile
            .ingredients
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn fresh(&self, category: Category) -> Option<&'p String> {
        self.list(category)
            .iter()
            .find(|name| !self.used.contains(&name.to_lowercase()))
    }

    fn cycled(&mut self, category: Category) -> Option<&'p String> {
        let list = self.list(category);
        if list.is_empty() {
            return None;
        }
        let turn = self.reuse.entry(category).or_insert(0);
        let name = &list[*turn % list.len()];
        *turn += 1;
        Some(name)
    }

    fn pick(&mut self, category: Category) -> Option<(String, Category)> {
        let found = self
            .fresh(category)
            .map(|n| (n, category))
            .or_else(|| self.fresh(Category::Unknown).map(|n| (n, Category::Unknown)))
            .or_else(|| self.cycled(category).map(|n| (n, category)))
            .or_else(|| self.cycled(Category::Unknown).map(|n| (n, Category::Unknown)));
        let (name, category) = found?;
        self.used.insert(name.to_lowercase());
        Some((name.clone(), category))
    }
}

impl Transformer<'_> {
    /// Shift the recipe toward a cuisine.
    ///
    /// `k = round(threshold * ingredients)` of the ingredients not already
    /// characteristic of the style are replaced, in original order. If the
    /// style has a cooking method no step uses yet, a threshold of 0.5 or more
    /// converts the first primary-method step (or appends a style step), and a
    /// lower one appends a step that only mentions the style's flavors.
    /// A threshold of 0 changes nothing.
    pub fn to_style(
        &self,
        recipe: &mut Recipe,
        style: &str,
        threshold: f64,
    ) -> Result<TransformReport, TransformError> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(TransformError::parameter("threshold", threshold));
        }
        let profile = self
            .kb
            .style(style)
            .ok_or_else(|| TransformError::InvalidStyle {
                style: style.to_string(),
            })?;
        let mut report = TransformReport::new(format!("to_style({})", profile.label));
        if threshold == 0.0 {
            return Ok(report);
        }
        let before = recipe.step_minutes();

        let count = recipe.ingredients.len();
        let k = (threshold * count as f64).round() as usize;
        let targets: Vec<usize> = (0..count)
            .filter(|&i| !profile.is_characteristic(recipe.ingredients[i].name()))
            .take(k)
            .collect();

        let mut picker = Picker::new(profile, recipe);
        let mut introduced = Vec::new();
        for index in targets {
            let current = &recipe.ingredients[index];
            let Some((name, category)) = picker.pick(current.category()) else {
                report.no_substitute(index, current);
                continue;
            };
            let replacement = current.substitute(name.clone(), category);
            report.rewritten_steps += self.swap_ingredient(recipe, index, replacement);
            report.substituted += 1;
            introduced.push(name);
        }

        if let Some(method) = &profile.method {
            if !recipe.instructions.iter().any(|s| s.uses_method(method)) {
                self.add_style_method(recipe, profile, method, threshold, &introduced, &mut report);
            }
        }

        recipe.tag_name(&profile.label);
        self.finish(recipe, before, &report);
        Ok(report)
    }

    fn add_style_method(
        &self,
        recipe: &mut Recipe,
        profile: &StyleProfile,
        method: &str,
        threshold: f64,
        introduced: &[String],
        report: &mut TransformReport,
    ) {
        let flavors = join_list(&profile.flavors);
        if threshold < 0.5 {
            let text = profile.finish.replace("{flavors}", &flavors);
            recipe.instructions.push(self.instructions.parse(&text));
            report.added += 1;
            return;
        }

        let existing = recipe
            .instructions
            .iter()
            .position(|s| s.methods.iter().any(|m| self.kb.is_primary(m)));
        if let Some(index) = existing {
            if self.convert_step(&mut recipe.instructions[index], method) {
                report.rewritten_steps += 1;
            }
            debug!(step = index, method, "converted step to style method");
            return;
        }

        let Some(target) = self.kb.method_profile(method) else {
            return;
        };
        let ingredients = if introduced.is_empty() {
            Self::main_ingredient(recipe)
        } else {
            join_list(introduced)
        };
        let text = profile
            .step
            .replace("{method}", &capitalize(&target.forms.base))
            .replace("{ingredients}", &ingredients)
            .replace("{flavors}", &flavors);
        recipe.instructions.push(self.instructions.parse(&text));
        report.added += 1;
    }
}

#[cfg(test)]
mod tests {
    use recast_core::model::Category;

    use crate::error::TransformError;
    use crate::transformer::tests::{kb, recipe};
    use crate::transformer::Transformer;

    const SIX: [&str; 6] = [
        "1 lb ground beef",
        "1 cup shredded cheddar cheese",
        "2 tomatoes, diced",
        "2 tablespoons fresh basil",
        "1 cup chicken broth",
        "1 lemon",
    ];

    #[test]
    fn test_threshold_zero_is_a_no_op() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = recipe(&kb, &SIX, &["Bake for 20 minutes."]);
        let before = dish.clone();
        let report = t.to_style(&mut dish, "Thai", 0.0).unwrap();
        assert!(report.is_noop());
        assert_eq!(dish.ingredients, before.ingredients);
        assert_eq!(dish.instructions, before.instructions);
        assert_eq!(dish.name, before.name);
    }

    #[test]
    fn test_half_threshold_replaces_first_three() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = recipe(&kb, &SIX, &["Brown the ground beef.", "Bake for 20 minutes."]);
        let before = dish.clone();
        let report = t.to_style(&mut dish, "Thai", 0.5).unwrap();

        assert_eq!(report.substituted, 3);
        assert_eq!(dish.ingredients[0].name(), "chicken thighs");
        assert_eq!(dish.ingredients[0].category(), Category::Meat);
        assert_eq!(dish.ingredients[1].name(), "coconut cream");
        assert_eq!(dish.ingredients[2].name(), "bok choy");
        assert_eq!(&dish.ingredients[3..], &before.ingredients[3..]);
        assert_eq!(dish.instructions[0].text, "Brown the chicken thighs.");
        assert!(dish.instructions[1].uses_method("stir-fry"));
        assert_eq!(dish.name, "Test Dish (Thai)");
    }

    #[test]
    fn test_full_threshold_leaves_nothing_uncharacteristic() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = recipe(&kb, &SIX, &["Simmer everything for 20 minutes."]);
        t.to_style(&mut dish, "mexican", 1.0).unwrap();

        let style = kb.style("mexican").unwrap();
        for ing in &dish.ingredients {
            let has_entry = style
                .ingredients
                .get(&ing.category())
                .is_some_and(|list| !list.is_empty());
            if ing.category() != Category::Unknown && has_entry {
                assert!(style.is_characteristic(ing.name()), "{} is not Mexican", ing.name());
            }
        }
        assert!(dish.instructions.iter().any(|s| s.uses_method("grill")));
    }

    #[test]
    fn test_low_threshold_only_mentions_flavors() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = recipe(&kb, &SIX, &["Bake for 20 minutes."]);
        t.to_style(&mut dish, "thai", 0.2).unwrap();
        assert_eq!(dish.instructions[0].text, "Bake for 20 minutes.");
        let last = dish.instructions.last().unwrap();
        assert!(last.text.contains("fish sauce, lime juice and thai basil"));
    }

    #[test]
    fn test_invalid_arguments_leave_recipe_unchanged() {
        let kb = kb();
        let t = Transformer::new(&kb).unwrap();
        let mut dish = recipe(&kb, &SIX, &["Bake for 20 minutes."]);
        let before = dish.clone();

        assert!(matches!(
            t.to_style(&mut dish, "Martian", 0.5),
            Err(TransformError::InvalidStyle { .. })
        ));
        assert!(matches!(
            t.to_style(&mut dish, "Thai", 1.5),
            Err(TransformError::InvalidParameter { .. })
        ));
        assert!(matches!(
            t.to_style(&mut dish, "Thai", f64::NAN),
            Err(TransformError::InvalidParameter { .. })
        ));
        assert_eq!(dish, before);
    }
}
