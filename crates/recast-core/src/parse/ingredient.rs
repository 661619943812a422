use tracing::debug;

use super::tagger::{LexiconTagger, Tag, Tagger};
use crate::knowledge::{lexicon, KnowledgeBase};
use crate::model::{Ingredient, Quantity};

const VULGAR_FRACTIONS: &[(char, &str)] = &[
    ('½', "1/2"),
    ('⅓', "1/3"),
    ('⅔', "2/3"),
    ('¼', "1/4"),
    ('¾', "3/4"),
    ('⅕', "1/5"),
    ('⅖', "2/5"),
    ('⅗', "3/5"),
    ('⅘', "4/5"),
    ('⅙', "1/6"),
    ('⅚', "5/6"),
    ('⅛', "1/8"),
    ('⅜', "3/8"),
    ('⅝', "5/8"),
    ('⅞', "7/8"),
];

/// Replace unicode vulgar fractions with ASCII ones: "1½" becomes "1 1/2".
pub fn normalize_fractions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '⁄' {
            out.push('/');
            continue;
        }
        match VULGAR_FRACTIONS.iter().find(|(v, _)| *v == c) {
            Some((_, ascii)) => {
                if out.ends_with(|p: char| p.is_ascii_digit()) {
                    out.push(' ');
                }
                out.push_str(ascii);
            }
            None => out.push(c),
        }
    }
    out
}

/// Remove "(...)" groups, returning the remaining text and the group contents.
fn split_parentheticals(text: &str) -> (String, Vec<String>) {
    let mut rest = String::with_capacity(text.len());
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '(' => {
                if depth > 0 {
                    current.push(c);
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let group = current.trim();
                    if !group.is_empty() {
                        groups.push(group.to_string());
                    }
                    current.clear();
                    rest.push(' ');
                } else {
                    current.push(c);
                }
            }
            _ if depth > 0 => current.push(c),
            _ => rest.push(c),
        }
    }
    // Unclosed group: keep its text.
    rest.push_str(&current);
    (rest, groups)
}

/// Leading numeral of `parts`, and how many parts it used.
fn leading_quantity(parts: &[&str]) -> (Option<Quantity>, usize) {
    let Some(first) = parts.first() else {
        return (None, 0);
    };
    if let Some(second) = parts.get(1).filter(|s| s.contains('/')) {
        if let Some(q) = Quantity::parse(&format!("{first} {second}")) {
            return (Some(q), 2);
        }
    }
    if let Some(q) = Quantity::parse(first) {
        return (Some(q), 1);
    }
    // "2-3": keep the lower bound.
    if let Some((low, high)) = first.split_once('-') {
        if let (Some(q), Some(_)) = (Quantity::parse(low), Quantity::parse(high)) {
            return (Some(q), 1);
        }
    }
    (None, 0)
}

/// Turns one raw ingredient line into an [`Ingredient`]. Never fails:
/// anything it cannot place ends up in the name.
pub struct IngredientParser<'a, T = LexiconTagger<'a>> {
    kb: &'a KnowledgeBase,
    tagger: T,
}

impl<'a> IngredientParser<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self {
            kb,
            tagger: LexiconTagger::new(kb),
        }
    }
}

impl<'a, T: Tagger> IngredientParser<'a, T> {
    pub fn with_tagger(kb: &'a KnowledgeBase, tagger: T) -> Self {
        Self { kb, tagger }
    }

    pub fn parse(&self, raw: &str) -> Ingredient {
        let normalized = normalize_fractions(raw.trim());
        let (line, groups) = split_parentheticals(&normalized);
        let (head, tail) = match line.split_once(',') {
            Some((head, tail)) => (head, Some(tail)),
            None => (line.as_str(), None),
        };

        let parts: Vec<&str> = head.split_whitespace().collect();
        let (quantity, used) = leading_quantity(&parts);
        let words = lexicon::words(&parts[used..].join(" "));
        let stems: Vec<String> = words.iter().map(|w| lexicon::stem(w)).collect();

        let mut at = 0;
        let mut unit = self.kb.units().match_at(&stems, 0).map(|m| {
            at = m.len;
            m.canonical
        });
        if unit.is_some() && words.get(at).is_some_and(|w| w == "of") {
            at += 1;
        }

        let rest = &words[at..];
        let tags = self.tagger.tag(rest);
        let mut name: Vec<&str> = Vec::new();
        let mut descriptors: Vec<String> = groups;
        let mut preparations: Vec<String> = Vec::new();
        let mut adverbs: Vec<&str> = Vec::new();

        for (word, tag) in rest.iter().zip(tags) {
            match tag {
                Tag::Adverb => adverbs.push(word),
                Tag::Participle => {
                    let mut phrase: Vec<&str> = std::mem::take(&mut adverbs);
                    phrase.push(word);
                    preparations.push(phrase.join(" "));
                }
                Tag::Adjective => {
                    descriptors.extend(adverbs.drain(..).map(str::to_string));
                    descriptors.push(word.clone());
                }
                Tag::Unit if quantity.is_some() && unit.is_none() => {
                    unit = self
                        .kb
                        .units()
                        .match_at(&[lexicon::stem(word)], 0)
                        .map(|m| m.canonical);
                }
                Tag::Noun | Tag::Unit => {
                    descriptors.extend(adverbs.drain(..).map(str::to_string));
                    name.push(word);
                }
                Tag::Numeral | Tag::Function => {}
            }
        }
        descriptors.extend(adverbs.into_iter().map(str::to_string));

        if lexicon::contains_run(rest, &["to".to_string(), "taste".to_string()]) {
            preparations.push("to taste".to_string());
        }
        if let Some(tail) = tail {
            let tail = tail.trim_matches(|c: char| c == ',' || c.is_whitespace());
            if !tail.is_empty() {
                preparations.push(tail.to_string());
            }
        }

        let name = if name.is_empty() {
            descriptors
                .pop()
                .or_else(|| preparations.pop())
                .unwrap_or_else(|| raw.trim().to_lowercase())
        } else {
            name.join(" ")
        };
        let category = self.kb.classify(&name);

        let mut ingredient = Ingredient::new(raw.trim(), name, category);
        ingredient.quantity = quantity;
        ingredient.unit = unit;
        ingredient.descriptor = (!descriptors.is_empty()).then(|| descriptors.join(" "));
        ingredient.preparation = (!preparations.is_empty()).then(|| preparations.join(", "));

        debug!(
            line = raw,
            name = ingredient.name(),
            category = %ingredient.category(),
            "parsed ingredient"
        );
        ingredient
    }
}
