//! Word-level helpers shared by the parsers and the transformation engine:
//! tokenizing, crude plural stemming, and stem-aware phrase matching.

use regex::{Captures, Regex};

/// Lowercased word tokens. Hyphens and apostrophes inside a word are kept,
/// so "stir-fry" is one token and "stir fry" is two.
pub fn words(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = text.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        let joiner = (c == '-' || c == '\'')
            && !current.is_empty()
            && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
        if c.is_alphanumeric() || joiner {
            current.extend(c.to_lowercase());
        } else if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Strip a plural suffix. Both sides of every comparison are stemmed the same
/// way, so the result only has to be consistent, not a dictionary form.
pub fn stem(word: &str) -> String {
    let w = word.to_lowercase();
    let n = w.chars().count();
    if n <= 3 {
        return w;
    }
    if let Some(base) = w.strip_suffix("ies") {
        if n > 4 {
            return format!("{base}y");
        }
    }
    for suffix in ["oes", "ches", "shes", "sses", "xes", "zes"] {
        if w.ends_with(suffix) {
            return w[..w.len() - 2].to_string();
        }
    }
    if w.ends_with("ss") || w.ends_with("us") || w.ends_with("is") {
        return w;
    }
    match w.strip_suffix('s') {
        Some(base) => base.to_string(),
        None => w,
    }
}

pub fn stems(text: &str) -> Vec<String> {
    words(text).iter().map(|w| stem(w)).collect()
}

/// True when `needle` occurs as a contiguous run inside `haystack`.
pub fn contains_run(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty()
        && haystack.len() >= needle.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

/// True when `text` mentions `phrase`, ignoring case and plural forms.
pub fn mentions(text: &str, phrase: &str) -> bool {
    contains_run(&stems(text), &stems(phrase))
}

/// Case-insensitive regex matching `phrase` as whole words, tolerating
/// plural forms of each word and hyphen/space variation between words.
pub fn phrase_regex(phrase: &str) -> Result<Regex, regex::Error> {
    let parts: Vec<String> = words(phrase)
        .iter()
        .flat_map(|w| w.split('-').map(str::to_string).collect::<Vec<_>>())
        .filter(|w| !w.is_empty())
        .map(|w| word_alternation(&w))
        .collect();
    let body = if parts.is_empty() {
        regex::escape(phrase.trim())
    } else {
        parts.join(r"[\s-]+")
    };
    Regex::new(&format!(r"(?i)\b{body}\b"))
}

fn word_alternation(word: &str) -> String {
    let s = stem(word);
    let mut forms = vec![word.to_string(), s.clone(), format!("{s}s"), format!("{s}es")];
    if let Some(base) = s.strip_suffix('y') {
        forms.push(format!("{base}ies"));
    }
    forms.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    forms.dedup();
    let escaped: Vec<String> = forms.iter().map(|f| regex::escape(f)).collect();
    format!("(?:{})", escaped.join("|"))
}

/// Replace every mention of `phrase` in `text`. Returns `None` when nothing matched.
pub fn replace_phrase(text: &str, phrase: &str, replacement: &str) -> Option<String> {
    let re = phrase_regex(phrase).ok()?;
    if !re.is_match(text) {
        return None;
    }
    let out = re.replace_all(text, |caps: &Captures<'_>| match_case(&caps[0], replacement));
    Some(out.into_owned())
}

/// Capitalize `replacement` when `surface` starts with an uppercase letter.
pub fn match_case(surface: &str, replacement: &str) -> String {
    let upper = surface.chars().next().is_some_and(|c| c.is_uppercase());
    if !upper {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A priority list of multi-word phrases, matched longest-first over stems.
#[derive(Debug, Clone, Default)]
pub struct PhraseIndex {
    entries: Vec<(Vec<String>, String)>,
}

/// One phrase found by [`PhraseIndex::scan`], in token positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseMatch {
    pub start: usize,
    pub len: usize,
    pub canonical: String,
}

impl PhraseIndex {
    /// Build from `(surface, canonical)` pairs.
    pub fn new<I, S, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, C)>,
        S: AsRef<str>,
        C: Into<String>,
    {
        let mut entries: Vec<(Vec<String>, String)> = pairs
            .into_iter()
            .map(|(surface, canonical)| (stems(surface.as_ref()), canonical.into()))
            .filter(|(s, _)| !s.is_empty())
            .collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The canonical entry whose phrase starts exactly at `tokens[at]`.
    pub fn match_at(&self, tokens: &[String], at: usize) -> Option<PhraseMatch> {
        let rest = tokens.get(at..)?;
        self.entries
            .iter()
            .find(|(phrase, _)| rest.len() >= phrase.len() && rest[..phrase.len()] == phrase[..])
            .map(|(phrase, canonical)| PhraseMatch {
                start: at,
                len: phrase.len(),
                canonical: canonical.clone(),
            })
    }

    /// Non-overlapping matches over stemmed tokens, left to right.
    pub fn scan(&self, tokens: &[String]) -> Vec<PhraseMatch> {
        let mut found = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            match self.match_at(tokens, i) {
                Some(m) => {
                    i += m.len;
                    found.push(m);
                }
                None => i += 1,
            }
        }
        found
    }

    /// True when any entry occurs anywhere in `tokens`.
    pub fn any_in(&self, tokens: &[String]) -> bool {
        self.entries.iter().any(|(phrase, _)| contains_run(tokens, phrase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_keep_inner_hyphens() {
        assert_eq!(words("Stir-fry the beef, then stir."), vec!["stir-fry", "the", "beef", "then", "stir"]);
        assert_eq!(words("9x13-inch dish"), vec!["9x13-inch", "dish"]);
        assert!(words("  ,; ").is_empty());
    }

    #[test]
    fn test_stem_plurals() {
        assert_eq!(stem("tomatoes"), "tomato");
        assert_eq!(stem("berries"), "berry");
        assert_eq!(stem("Onions"), "onion");
        assert_eq!(stem("peaches"), "peach");
        assert_eq!(stem("asparagus"), "asparagus");
        assert_eq!(stem("egg"), "egg");
    }

    #[test]
    fn test_mentions_with_plurals() {
        assert!(mentions("Dice the tomatoes finely.", "tomato"));
        assert!(mentions("brown the ground beef", "ground beef"));
        assert!(!mentions("brown the beef", "ground beef"));
        assert!(!mentions("anything", ""));
    }

    #[test]
    fn test_replace_phrase_preserves_case() {
        let out = replace_phrase("Ground beef goes in. Brown the ground beef.", "ground beef", "tofu").unwrap();
        assert_eq!(out, "Tofu goes in. Brown the tofu.");
        assert!(replace_phrase("no match here", "beef", "tofu").is_none());
    }

    #[test]
    fn test_replace_phrase_plural_and_hyphen() {
        let out = replace_phrase("Add the cherries.", "cherry", "plum").unwrap();
        assert_eq!(out, "Add the plum.");
        let out = replace_phrase("Stir fry quickly", "stir-fry", "bake").unwrap();
        assert_eq!(out, "Bake quickly");
    }

    #[test]
    fn test_phrase_index_longest_first() {
        let index = PhraseIndex::new([("pan", "pan"), ("sheet pan", "sheet pan"), ("oven", "oven")]);
        let tokens = stems("Line a sheet pan and heat the oven and a pan");
        let found: Vec<String> = index.scan(&tokens).into_iter().map(|m| m.canonical).collect();
        assert_eq!(found, vec!["sheet pan", "oven", "pan"]);
    }
}
