//! Text-level edits shared by the operations: swapping an ingredient through
//! the steps that mention it, and moving steps from one cooking method to
//! another.

use regex::Captures;
use tracing::debug;

use recast_core::knowledge::lexicon;
use recast_core::model::{Ingredient, Instruction, Recipe};

use crate::transformer::{surface_key, Transformer};

impl Transformer<'_> {
    /// Replace `recipe.ingredients[index]` and rewrite every step that
    /// mentions the old name. Returns the number of steps rewritten.
    pub(crate) fn swap_ingredient(
        &self,
        recipe: &mut Recipe,
        index: usize,
        replacement: Ingredient,
    ) -> usize {
        let old = recipe.ingredients[index].name().to_string();
        let new = replacement.name().to_string();
        recipe.ingredients[index] = replacement;
        if old.eq_ignore_ascii_case(&new) {
            return 0;
        }

        let fallbacks = self.fallback_words(recipe, &old);
        let mut rewritten = 0;
        for step in &mut recipe.instructions {
            let updated = lexicon::replace_phrase(&step.text, &old, &new).or_else(|| {
                fallbacks
                    .iter()
                    .find_map(|word| lexicon::replace_phrase(&step.text, word, &new))
            });
            if let Some(text) = updated {
                step.text = text;
                self.instructions.refresh(step);
                rewritten += 1;
            }
        }
        debug!(from = %old, to = %new, steps = rewritten, "substituted ingredient");
        rewritten
    }

    /// Single words of `name` that steps may use on their own ("beef" for
    /// "ground beef"), last word first. Words shared with another ingredient
    /// or carrying no meaning alone are left out.
    fn fallback_words(&self, recipe: &Recipe, name: &str) -> Vec<String> {
        let words = lexicon::words(name);
        if words.len() < 2 {
            return Vec::new();
        }
        words
            .into_iter()
            .rev()
            .filter(|w| w.len() > 3)
            .filter(|w| !self.kb.is_name_word(w) && !self.kb.is_descriptor(w))
            .filter(|w| !recipe.ingredients.iter().any(|i| lexicon::mentions(i.name(), w)))
            .collect()
    }

    pub(crate) fn refresh(&self, step: &mut Instruction) {
        self.instructions.refresh(step);
    }

    /// Rewrite primary-method words in `text` to the matching form of
    /// `target`. `None` when nothing changed.
    pub(crate) fn rewrite_method_words(&self, text: &str, target: &str) -> Option<String> {
        let profile = self.kb.method_profile(target)?;
        let mut changed = false;
        let out = self.method_words.replace_all(text, |caps: &Captures<'_>| {
            let surface = &caps[0];
            match self.surfaces.get(&surface_key(surface)) {
                Some(Some((method, form))) if method != target => {
                    changed = true;
                    lexicon::match_case(surface, profile.forms.get(*form))
                }
                _ => surface.to_string(),
            }
        });
        let out = out.into_owned();
        changed.then_some(out)
    }

    /// Swap the tools of other primary methods for the canonical tool of
    /// `target`. `None` when nothing changed.
    pub(crate) fn rewrite_tools(&self, text: &str, target: &str) -> Option<String> {
        let profile = self.kb.method_profile(target)?;
        let mut foreign: Vec<&str> = self
            .kb
            .primary_methods()
            .iter()
            .filter(|m| m.as_str() != target)
            .filter_map(|m| self.kb.method_profile(m))
            .flat_map(|p| p.tools.iter().map(String::as_str))
            .filter(|t| *t != profile.tool && !profile.tools.iter().any(|own| own == t))
            .collect();
        foreign.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        foreign.dedup();

        let mut out = text.to_string();
        let mut changed = false;
        for tool in foreign {
            if let Some(updated) = lexicon::replace_phrase(&out, tool, &profile.tool) {
                out = updated;
                changed = true;
            }
        }
        changed.then_some(out)
    }

    /// Move one step to `target`: method words, then tools. The canonical
    /// tool is implied on the step either way, so it survives later
    /// rewrites. Returns true when the text changed.
    pub(crate) fn convert_step(&self, step: &mut Instruction, target: &str) -> bool {
        let mut text = step.text.clone();
        if let Some(updated) = self.rewrite_method_words(&text, target) {
            text = updated;
        }
        if let Some(updated) = self.rewrite_tools(&text, target) {
            text = updated;
        }
        let changed = text != step.text;
        if changed {
            step.text = text;
            self.refresh(step);
        }
        if let Some(profile) = self.kb.method_profile(target) {
            step.imply_tool(&profile.tool);
        }
        changed
    }
}
