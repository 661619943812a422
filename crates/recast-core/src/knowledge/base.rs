use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::lexicon::{self, PhraseIndex};
use crate::error::CoreError;
use crate::model::Category;

const BUILTIN: &str = include_str!("../../data/knowledge.json");

/// A replacement ingredient. `key`, when present, restricts the rule to
/// ingredients whose name mentions it; a rule without a key is the default
/// for its table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstituteRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub name: String,
    pub category: Category,
    /// Primary method the new ingredient should be cooked with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Sentence appended to steps using the new ingredient; `{name}` is filled in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SubstituteRule {
    /// First keyed rule mentioned by `name`, else the first unkeyed rule.
    pub fn pick<'a>(rules: &'a [SubstituteRule], name: &str) -> Option<&'a SubstituteRule> {
        rules
            .iter()
            .find(|r| r.key.as_deref().is_some_and(|k| lexicon::mentions(name, k)))
            .or_else(|| rules.iter().find(|r| r.key.is_none()))
    }
}

/// Ingredient added back by the inverse diet operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reintroduction {
    pub category: Category,
    /// Amount prefix for the added line, e.g. "12 ounces".
    pub amount: String,
    pub choices: Vec<String>,
    /// Step inserted first; `{name}` is filled in.
    pub prepare: String,
    /// Step inserted before the final step; `{name}` is filled in.
    pub incorporate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietTable {
    pub label: String,
    pub inverse_label: String,
    pub excludes: Vec<Category>,
    /// Rules keyed by the excluded source category.
    pub substitutes: BTreeMap<Category, Vec<SubstituteRule>>,
    #[serde(default)]
    pub reintroduce: Vec<Reintroduction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub label: String,
    /// Characteristic ingredients per category, most characteristic first.
    /// The `unknown` list holds staples used when a category has no equivalent.
    pub ingredients: BTreeMap<Category, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub flavors: Vec<String>,
    /// Template for a style cooking step: `{method}`, `{ingredients}`, `{flavors}`.
    pub step: String,
    /// Template for a light-touch finishing step: `{flavors}`.
    pub finish: String,
}

impl StyleProfile {
    /// True when `name` mentions any characteristic ingredient of this style.
    pub fn is_characteristic(&self, name: &str) -> bool {
        self.ingredients
            .values()
            .flatten()
            .any(|entry| lexicon::mentions(name, entry))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodForms {
    pub base: String,
    pub past: String,
    pub gerund: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Form {
    Base,
    Past,
    Gerund,
}

impl MethodForms {
    pub fn get(&self, form: Form) -> &str {
        match form {
            Form::Base => &self.base,
            Form::Past => &self.past,
            Form::Gerund => &self.gerund,
        }
    }
}

/// A surface word or phrase for a primary method. Blocker phrases such as
/// "baking soda" carry no method and are left as they are.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSurface {
    pub surface: String,
    pub method: Option<String>,
    pub form: Form,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prerequisite {
    /// Word whose presence in any ingredient name satisfies the requirement.
    pub key: String,
    /// Ingredient line added when missing.
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupStep {
    pub text: String,
    /// Regex identifying an existing setup step for this method.
    pub marker: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodProfile {
    pub forms: MethodForms,
    #[serde(default)]
    pub aliases: BTreeMap<String, Form>,
    /// Canonical tool written into converted steps.
    pub tool: String,
    /// Tools that belong to this method and are swapped out when converting away.
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<Prerequisite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<SetupStep>,
    /// Generic cooking step: `{main}` is the main ingredient.
    pub step: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub key: String,
    pub name: String,
    pub category: Category,
    /// Convert even when the ingredient carries no preparation.
    #[serde(default)]
    pub always: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifyTable {
    /// Preparations with at least this many words count as labor-intensive.
    pub max_preparation_words: usize,
    /// Preparation words that mark a multi-step preparation on their own.
    pub labor_markers: Vec<String>,
    pub conversions: Vec<Conversion>,
    /// Canonical non-primary methods that make a step preparation work.
    pub prep_methods: Vec<String>,
    pub duration_factor: f64,
    #[serde(default)]
    pub consolidate: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthTable {
    pub healthier: Vec<SubstituteRule>,
    pub indulgent: BTreeMap<Category, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    categories: BTreeMap<Category, Vec<String>>,
    units: BTreeMap<String, Vec<String>>,
    descriptors: Vec<String>,
    preparations: Vec<String>,
    name_words: Vec<String>,
    function_words: Vec<String>,
    tools: Vec<String>,
    methods: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    method_blockers: Vec<String>,
    primary_methods: Vec<String>,
    method_profiles: BTreeMap<String, MethodProfile>,
    diets: BTreeMap<String, DietTable>,
    styles: BTreeMap<String, StyleProfile>,
    simplify: SimplifyTable,
    health: HealthTable,
}

/// Read-only lookup tables: category word lists, unit/tool/method vocabularies,
/// and the substitution tables used by the transformation engine.
#[derive(Debug)]
pub struct KnowledgeBase {
    categories: Vec<(Category, Vec<Vec<String>>)>,
    units: PhraseIndex,
    tools: PhraseIndex,
    methods: PhraseIndex,
    descriptors: BTreeSet<String>,
    preparations: BTreeSet<String>,
    name_words: BTreeSet<String>,
    function_words: BTreeSet<String>,
    primary_methods: Vec<String>,
    method_profiles: BTreeMap<String, MethodProfile>,
    setup_markers: BTreeMap<String, Regex>,
    primary_surfaces: Vec<MethodSurface>,
    diets: BTreeMap<String, DietTable>,
    styles: BTreeMap<String, StyleProfile>,
    simplify: SimplifyTable,
    health: HealthTable,
}

impl KnowledgeBase {
    /// The tables compiled into the binary.
    pub fn builtin() -> Result<Self, CoreError> {
        Self::from_json(BUILTIN)
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CoreError::KnowledgeBase(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        let file: KnowledgeFile = serde_json::from_str(text)
            .map_err(|e| CoreError::KnowledgeBase(format!("malformed knowledge base: {e}")))?;
        Self::build(file)
    }

    fn build(file: KnowledgeFile) -> Result<Self, CoreError> {
        let categories = Category::PRIORITY
            .iter()
            .map(|cat| {
                let entries = file
                    .categories
                    .get(cat)
                    .map(|list| list.iter().map(|e| lexicon::stems(e)).filter(|s| !s.is_empty()).collect())
                    .unwrap_or_default();
                (*cat, entries)
            })
            .collect();

        let units = PhraseIndex::new(file.units.iter().flat_map(|(canonical, aliases)| {
            std::iter::once((canonical.clone(), canonical.clone()))
                .chain(aliases.iter().map(move |a| (a.clone(), canonical.clone())))
        }));

        let tools = PhraseIndex::new(file.tools.iter().map(|t| (t.clone(), t.clone())));

        let primary_methods: Vec<String> = file.primary_methods.iter().map(|m| m.to_lowercase()).collect();
        for method in &primary_methods {
            if !file.method_profiles.contains_key(method) {
                return Err(CoreError::KnowledgeBase(format!(
                    "primary method '{method}' has no method profile"
                )));
            }
        }

        let mut primary_surfaces = Vec::new();
        let mut method_pairs: Vec<(String, String)> = Vec::new();
        for (method, profile) in &file.method_profiles {
            let forms = [
                (profile.forms.base.clone(), Form::Base),
                (profile.forms.past.clone(), Form::Past),
                (profile.forms.gerund.clone(), Form::Gerund),
            ];
            for (surface, form) in forms.into_iter().chain(profile.aliases.clone()) {
                method_pairs.push((surface.clone(), method.clone()));
                primary_surfaces.push(MethodSurface {
                    surface: surface.to_lowercase(),
                    method: Some(method.clone()),
                    form,
                });
            }
        }
        for (method, surfaces) in &file.methods {
            method_pairs.push((method.clone(), method.clone()));
            for s in surfaces {
                method_pairs.push((s.clone(), method.clone()));
            }
        }
        // Blockers map to an empty canonical: they consume their words so that
        // "baking soda" is never read as a bake step.
        for blocker in &file.method_blockers {
            method_pairs.push((blocker.clone(), String::new()));
            primary_surfaces.push(MethodSurface {
                surface: blocker.to_lowercase(),
                method: None,
                form: Form::Base,
            });
        }
        primary_surfaces.sort_by(|a, b| {
            b.surface
                .len()
                .cmp(&a.surface.len())
                .then(a.surface.cmp(&b.surface))
        });
        primary_surfaces.dedup_by(|a, b| a.surface == b.surface);
        let methods = PhraseIndex::new(method_pairs);

        let mut setup_markers = BTreeMap::new();
        for (method, profile) in &file.method_profiles {
            if let Some(setup) = &profile.setup {
                let re = Regex::new(&format!("(?i){}", setup.marker)).map_err(|e| {
                    CoreError::KnowledgeBase(format!("bad setup marker for '{method}': {e}"))
                })?;
                setup_markers.insert(method.clone(), re);
            }
        }

        for (name, diet) in &file.diets {
            for rules in diet.substitutes.values() {
                for rule in rules {
                    if diet.excludes.contains(&rule.category) {
                        return Err(CoreError::KnowledgeBase(format!(
                            "diet '{name}' substitutes '{}' with excluded category {}",
                            rule.name, rule.category
                        )));
                    }
                }
            }
        }

        let mut styles = BTreeMap::new();
        for (name, profile) in file.styles {
            if let Some(m) = &profile.method {
                if !primary_methods.contains(m) {
                    return Err(CoreError::KnowledgeBase(format!(
                        "style '{name}' uses unknown primary method '{m}'"
                    )));
                }
            }
            styles.insert(name.to_lowercase(), profile);
        }

        let lower_set = |list: Vec<String>| -> BTreeSet<String> {
            list.into_iter().map(|w| w.to_lowercase()).collect()
        };

        Ok(Self {
            categories,
            units,
            tools,
            methods,
            descriptors: lower_set(file.descriptors),
            preparations: lower_set(file.preparations),
            name_words: lower_set(file.name_words),
            function_words: lower_set(file.function_words),
            primary_methods,
            method_profiles: file.method_profiles,
            setup_markers,
            primary_surfaces,
            diets: file.diets.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect(),
            styles,
            simplify: file.simplify,
            health: file.health,
        })
    }

    /// Classify an ingredient name by the first category list (in priority
    /// order) with an entry occurring in the name. Anything named a sauce is
    /// a Sauce. Never fails.
    pub fn classify(&self, name: &str) -> Category {
        let name_stems = lexicon::stems(name);
        if name_stems.is_empty() {
            return Category::Unknown;
        }
        if name_stems.iter().any(|s| s == "sauce") {
            return Category::Sauce;
        }
        self.categories
            .iter()
            .find(|(_, entries)| entries.iter().any(|e| lexicon::contains_run(&name_stems, e)))
            .map(|(cat, _)| *cat)
            .unwrap_or(Category::Unknown)
    }

    pub fn units(&self) -> &PhraseIndex {
        &self.units
    }

    pub fn tools(&self) -> &PhraseIndex {
        &self.tools
    }

    pub fn methods(&self) -> &PhraseIndex {
        &self.methods
    }

    pub fn is_descriptor(&self, word: &str) -> bool {
        self.descriptors.contains(word)
    }

    pub fn is_preparation(&self, word: &str) -> bool {
        self.preparations.contains(word)
    }

    pub fn is_name_word(&self, word: &str) -> bool {
        self.name_words.contains(word)
    }

    pub fn is_function_word(&self, word: &str) -> bool {
        self.function_words.contains(word)
    }

    pub fn primary_methods(&self) -> &[String] {
        &self.primary_methods
    }

    pub fn is_primary(&self, method: &str) -> bool {
        self.primary_methods.iter().any(|m| m == method)
    }

    /// Resolve a user-supplied method name ("Stir fry", "sauté", "baking")
    /// to a canonical primary method.
    pub fn resolve_method(&self, name: &str) -> Option<&str> {
        let tokens = lexicon::stems(name);
        let m = self.methods.match_at(&tokens, 0)?;
        if m.len != tokens.len() {
            return None;
        }
        self.primary_methods
            .iter()
            .find(|p| **p == m.canonical)
            .map(String::as_str)
    }

    pub fn method_profile(&self, method: &str) -> Option<&MethodProfile> {
        self.method_profiles.get(method)
    }

    pub fn setup_marker(&self, method: &str) -> Option<&Regex> {
        self.setup_markers.get(method)
    }

    /// Every primary-method word plus the blocker phrases, longest first.
    pub fn primary_surfaces(&self) -> &[MethodSurface] {
        &self.primary_surfaces
    }

    pub fn diet(&self, name: &str) -> Option<&DietTable> {
        self.diets.get(&name.to_lowercase())
    }

    pub fn style(&self, name: &str) -> Option<&StyleProfile> {
        self.styles.get(&name.trim().to_lowercase())
    }

    pub fn style_names(&self) -> impl Iterator<Item = &str> {
        self.styles.values().map(|s| s.label.as_str())
    }

    pub fn diet_names(&self) -> impl Iterator<Item = &str> {
        self.diets.keys().map(String::as_str)
    }

    pub fn simplify(&self) -> &SimplifyTable {
        &self.simplify
    }

    pub fn health(&self) -> &HealthTable {
        &self.health
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::builtin().unwrap()
    }

    #[test]
    fn test_builtin_loads() {
        let kb = kb();
        assert!(kb.primary_methods().len() >= 9);
        assert!(kb.style("thai").is_some());
        assert!(kb.style(" Mexican ").is_some());
        assert!(kb.diet("vegan").is_some());
    }

    #[test]
    fn test_classify_priority() {
        let kb = kb();
        assert_eq!(kb.classify("bay scallops"), Category::Seafood);
        assert_eq!(kb.classify("ground beef"), Category::Meat);
        assert_eq!(kb.classify("basil"), Category::HerbSpice);
        assert_eq!(kb.classify("chicken broth"), Category::Meat);
        assert_eq!(kb.classify("fish stock"), Category::Seafood);
        assert_eq!(kb.classify("fish sauce"), Category::Sauce);
        assert_eq!(kb.classify("oyster sauces"), Category::Sauce);
        assert_eq!(kb.classify("vegetable broth"), Category::Sauce);
        assert_eq!(kb.classify("peanut butter"), Category::Sauce);
        assert_eq!(kb.classify("tomatoes"), Category::Vegetable);
        assert_eq!(kb.classify("cheddar cheese"), Category::Dairy);
        assert_eq!(kb.classify("lemons"), Category::Fruit);
        assert_eq!(kb.classify("all-purpose flour"), Category::Unknown);
        assert_eq!(kb.classify(""), Category::Unknown);
    }

    #[test]
    fn test_resolve_method_aliases() {
        let kb = kb();
        assert_eq!(kb.resolve_method("bake"), Some("bake"));
        assert_eq!(kb.resolve_method("Stir Fry"), Some("stir-fry"));
        assert_eq!(kb.resolve_method("stir-fry"), Some("stir-fry"));
        assert_eq!(kb.resolve_method("sauté"), Some("saute"));
        assert_eq!(kb.resolve_method("whisk"), None);
        assert_eq!(kb.resolve_method("sous vide"), None);
    }

    #[test]
    fn test_rejects_diet_substitute_in_excluded_category() {
        let text = BUILTIN.replacen(
            r#""name": "tofu", "category": "vegetable""#,
            r#""name": "tofu", "category": "meat""#,
            1,
        );
        assert_ne!(text, BUILTIN);
        let err = KnowledgeBase::from_json(&text).unwrap_err();
        assert!(matches!(err, CoreError::KnowledgeBase(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            KnowledgeBase::from_json("{"),
            Err(CoreError::KnowledgeBase(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(&path, BUILTIN).unwrap();
        let kb = KnowledgeBase::load(&path).unwrap();
        assert_eq!(kb.classify("salmon"), Category::Seafood);
        assert!(KnowledgeBase::load(&dir.path().join("missing.json")).is_err());
    }
}
