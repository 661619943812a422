use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use recast_core::knowledge::{lexicon, DietTable, SubstituteRule};
use recast_core::model::{Ingredient, Recipe};

use crate::error::TransformError;
use crate::report::TransformReport;
use crate::transformer::Transformer;

impl Transformer<'_> {
    pub fn to_vegan(&self, recipe: &mut Recipe) -> Result<TransformReport, TransformError> {
        self.to_diet(recipe, "vegan")
    }

    pub fn to_vegetarian(&self, recipe: &mut Recipe) -> Result<TransformReport, TransformError> {
        self.to_diet(recipe, "vegetarian")
    }

    pub fn to_pescatarian(&self, recipe: &mut Recipe) -> Result<TransformReport, TransformError> {
        self.to_diet(recipe, "pescatarian")
    }

    pub fn from_vegan<R: Rng + ?Sized>(
        &self,
        recipe: &mut Recipe,
        rng: &mut R,
    ) -> Result<TransformReport, TransformError> {
        self.from_diet(recipe, "vegan", rng)
    }

    pub fn from_vegetarian<R: Rng + ?Sized>(
        &self,
        recipe: &mut Recipe,
        rng: &mut R,
    ) -> Result<TransformReport, TransformError> {
        self.from_diet(recipe, "vegetarian", rng)
    }

    pub fn from_pescatarian<R: Rng + ?Sized>(
        &self,
        recipe: &mut Recipe,
        rng: &mut R,
    ) -> Result<TransformReport, TransformError> {
        self.from_diet(recipe, "pescatarian", rng)
    }

    fn diet_table(&self, diet: &str) -> Result<&DietTable, TransformError> {
        self.kb
            .diet(diet)
            .ok_or_else(|| TransformError::parameter("diet", diet))
    }

    /// Replace every ingredient in a category the diet excludes. Category
    /// membership is re-checked on every call, so repeating it is a no-op.
    pub fn to_diet(&self, recipe: &mut Recipe, diet: &str) -> Result<TransformReport, TransformError> {
        let table = self.diet_table(diet)?;
        let mut report = TransformReport::new(format!("to_{}", table.label));
        let before = recipe.step_minutes();

        for index in 0..recipe.ingredients.len() {
            let current = &recipe.ingredients[index];
            if !table.excludes.contains(&current.category()) {
                continue;
            }
            let rule = table
                .substitutes
                .get(&current.category())
                .and_then(|rules| SubstituteRule::pick(rules, current.name()));
            let Some(rule) = rule else {
                report.no_substitute(index, current);
                continue;
            };

            let replacement = current.substitute(rule.name.clone(), rule.category);
            report.rewritten_steps += self.swap_ingredient(recipe, index, replacement);
            report.substituted += 1;
            self.apply_rule_extras(recipe, rule, &mut report);
        }

        self.retag_diet(recipe, &table.label);
        self.finish(recipe, before, &report);
        Ok(report)
    }

    /// Method change and cooking note attached to a substitution rule, applied
    /// to the steps that mention the new ingredient.
    fn apply_rule_extras(&self, recipe: &mut Recipe, rule: &SubstituteRule, report: &mut TransformReport) {
        if rule.method.is_none() && rule.note.is_none() {
            return;
        }
        for step in &mut recipe.instructions {
            if !lexicon::mentions(&step.text, &rule.name) {
                continue;
            }
            let mut changed = false;
            if let Some(method) = &rule.method {
                if step.methods.iter().any(|m| self.kb.is_primary(m) && m != method) {
                    changed |= self.convert_step(step, method);
                }
            }
            if let Some(note) = &rule.note {
                let note = note.replace("{name}", &rule.name);
                if !step.text.contains(&note) {
                    step.text = format!("{} {note}", step.text.trim_end());
                    self.refresh(step);
                    changed = true;
                }
            }
            if changed {
                report.rewritten_steps += 1;
            }
        }
    }

    /// Add back one ingredient per reintroduced category the recipe lacks,
    /// chosen at random, with a preparation step first and an incorporation
    /// step before the last step. Existing ingredients are left alone.
    pub fn from_diet<R: Rng + ?Sized>(
        &self,
        recipe: &mut Recipe,
        diet: &str,
        rng: &mut R,
    ) -> Result<TransformReport, TransformError> {
        let table = self.diet_table(diet)?;
        let mut report = TransformReport::new(format!("from_{}", table.label));
        let before = recipe.step_minutes();

        for reintro in &table.reintroduce {
            if recipe.has_category(reintro.category) {
                continue;
            }
            let Some(choice) = reintro.choices.choose(rng) else {
                debug!(category = %reintro.category, "no reintroduction choices");
                continue;
            };

            let line = format!("{} {choice}", reintro.amount);
            let parsed = self.ingredients.parse(&line);
            let mut added = Ingredient::new(line, choice.as_str(), reintro.category);
            added.quantity = parsed.quantity;
            added.unit = parsed.unit;
            recipe.ingredients.push(added);

            let prepare = self.instructions.parse(&reintro.prepare.replace("{name}", choice));
            recipe.instructions.insert(0, prepare);
            let incorporate = self
                .instructions
                .parse(&reintro.incorporate.replace("{name}", choice));
            let at = recipe.instructions.len().saturating_sub(1).max(1);
            recipe.instructions.insert(at.min(recipe.instructions.len()), incorporate);

            debug!(ingredient = %choice, category = %reintro.category, "reintroduced ingredient");
            report.added += 1;
        }

        self.retag_diet(recipe, &table.inverse_label);
        self.finish(recipe, before, &report);
        Ok(report)
    }

    /// Replace any diet tag on the name with `tag`.
    fn retag_diet(&self, recipe: &mut Recipe, tag: &str) {
        for name in self.kb.diet_names() {
            if let Some(other) = self.kb.diet(name) {
                for label in [&other.label, &other.inverse_label] {
                    if label != tag {
                        recipe.retag_name(label, tag);
                    }
                }
            }
        }
        recipe.tag_name(tag);
    }
}
