use std::collections::HashMap;
use std::str::FromStr;

use rand::Rng;
use regex::Regex;
use tracing::info;

use recast_core::knowledge::{Form, KnowledgeBase};
use recast_core::model::{Category, Recipe};
use recast_core::parse::{IngredientParser, InstructionParser};

use crate::error::TransformError;
use crate::report::TransformReport;

/// One requested transformation, as named on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    ToDiet(String),
    FromDiet(String),
    ToHealthy,
    FromHealthy,
    Easy,
    Style { name: String, threshold: Option<f64> },
    Method(String),
}

impl FromStr for Operation {
    type Err = TransformError;

    /// `to-vegan`, `from-healthy`, `easy`, `style=thai:0.5`, `method=stir-fry`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = s.trim();
        let unknown = || TransformError::UnknownOperation { op: s.to_string() };
        if let Some(rest) = op.strip_prefix("style=") {
            let (name, threshold) = match rest.rsplit_once(':') {
                Some((name, t)) => {
                    let value: f64 = t
                        .trim()
                        .parse()
                        .map_err(|_| TransformError::parameter("threshold", t))?;
                    (name, Some(value))
                }
                None => (rest, None),
            };
            if name.trim().is_empty() {
                return Err(unknown());
            }
            return Ok(Operation::Style {
                name: name.trim().to_string(),
                threshold,
            });
        }
        if let Some(method) = op.strip_prefix("method=") {
            if method.trim().is_empty() {
                return Err(unknown());
            }
            return Ok(Operation::Method(method.trim().to_string()));
        }
        match op {
            "easy" | "to-easy" => Ok(Operation::Easy),
            "to-healthy" => Ok(Operation::ToHealthy),
            "from-healthy" => Ok(Operation::FromHealthy),
            _ => {
                if let Some(diet) = op.strip_prefix("to-").filter(|d| !d.is_empty()) {
                    Ok(Operation::ToDiet(diet.to_string()))
                } else if let Some(diet) = op.strip_prefix("from-").filter(|d| !d.is_empty()) {
                    Ok(Operation::FromDiet(diet.to_string()))
                } else {
                    Err(unknown())
                }
            }
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::ToDiet(d) => write!(f, "to-{d}"),
            Operation::FromDiet(d) => write!(f, "from-{d}"),
            Operation::ToHealthy => write!(f, "to-healthy"),
            Operation::FromHealthy => write!(f, "from-healthy"),
            Operation::Easy => write!(f, "easy"),
            Operation::Style {
                name,
                threshold: Some(t),
            } => write!(f, "style={name}:{t}"),
            Operation::Style { name, .. } => write!(f, "style={name}"),
            Operation::Method(m) => write!(f, "method={m}"),
        }
    }
}

/// Applies transformations to a working-copy [`Recipe`] using a shared
/// read-only [`KnowledgeBase`].
///
/// Every operation validates its arguments before touching the recipe, so a
/// rejected call leaves it unchanged. Operations that draw at random take the
/// randomness source as an argument.
pub struct Transformer<'kb> {
    pub(crate) kb: &'kb KnowledgeBase,
    pub(crate) ingredients: IngredientParser<'kb>,
    pub(crate) instructions: InstructionParser<'kb>,
    /// Every primary-method surface, longest first.
    pub(crate) method_words: Regex,
    pub(crate) surfaces: HashMap<String, Option<(String, Form)>>,
    style_threshold: f64,
}

/// Lowercase with hyphens and runs of whitespace folded to one space.
pub(crate) fn surface_key(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

impl<'kb> Transformer<'kb> {
    pub fn new(kb: &'kb KnowledgeBase) -> Result<Self, TransformError> {
        let mut alternatives = Vec::new();
        let mut surfaces = HashMap::new();
        for s in kb.primary_surfaces() {
            let key = surface_key(&s.surface);
            if key.is_empty() {
                continue;
            }
            alternatives.push(
                key.split(' ')
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"[\s-]+"),
            );
            surfaces
                .entry(key)
                .or_insert_with(|| s.method.clone().map(|m| (m, s.form)));
        }
        let method_words = Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))
            .map_err(recast_core::CoreError::from)?;

        Ok(Self {
            kb,
            ingredients: IngredientParser::new(kb),
            instructions: InstructionParser::new(kb)?,
            method_words,
            surfaces,
            style_threshold: 1.0,
        })
    }

    /// Threshold used for `style=<NAME>` operations that name none.
    pub fn with_style_threshold(mut self, threshold: f64) -> Self {
        self.style_threshold = threshold;
        self
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        self.kb
    }

    /// Dispatch one [`Operation`].
    pub fn apply<R: Rng + ?Sized>(
        &self,
        recipe: &mut Recipe,
        op: &Operation,
        rng: &mut R,
    ) -> Result<TransformReport, TransformError> {
        match op {
            Operation::ToDiet(diet) => self.to_diet(recipe, diet),
            Operation::FromDiet(diet) => self.from_diet(recipe, diet, rng),
            Operation::ToHealthy => self.to_healthy(recipe),
            Operation::FromHealthy => self.from_healthy(recipe, rng),
            Operation::Easy => self.to_easy(recipe),
            Operation::Style { name, threshold } => {
                self.to_style(recipe, name, threshold.unwrap_or(self.style_threshold))
            }
            Operation::Method(method) => self.to_method(recipe, method),
        }
    }

    /// Bookkeeping shared by every operation: carry the step-time change into
    /// the recipe timings and relink step ingredients.
    pub(crate) fn finish(&self, recipe: &mut Recipe, minutes_before: u32, report: &TransformReport) {
        recipe.apply_step_time_change(minutes_before);
        recipe.link_ingredients();
        info!(
            operation = %report.operation,
            substituted = report.substituted,
            added = report.added,
            removed = report.removed,
            rewritten_steps = report.rewritten_steps,
            notices = report.notices.len(),
            "transformation applied"
        );
    }

    /// Name used in generated steps: the first meat or seafood, else the
    /// first ingredient.
    pub(crate) fn main_ingredient(recipe: &Recipe) -> String {
        recipe
            .ingredients
            .iter()
            .find(|i| matches!(i.category(), Category::Meat | Category::Seafood))
            .or_else(|| recipe.ingredients.first())
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "ingredients".to_string())
    }
}

/// "a", "a and b", "a, b and c".
pub(crate) fn join_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
