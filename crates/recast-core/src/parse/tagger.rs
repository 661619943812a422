use crate::knowledge::{lexicon, KnowledgeBase};

/// Coarse part-of-speech classes the ingredient parser cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Numeral,
    Unit,
    /// Modifier kept as a descriptor ("fresh", "boneless").
    Adjective,
    /// Verb-derived modifier kept as a preparation ("chopped").
    Participle,
    /// Attaches to the following modifier ("finely chopped").
    Adverb,
    Noun,
    Function,
}

/// Annotates word tokens with a [`Tag`] each.
pub trait Tagger {
    fn tag(&self, words: &[String]) -> Vec<Tag>;
}

/// Tags words by knowledge-base vocabulary, falling back to suffix rules.
#[derive(Debug, Clone, Copy)]
pub struct LexiconTagger<'a> {
    kb: &'a KnowledgeBase,
}

impl<'a> LexiconTagger<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self { kb }
    }

    fn tag_word(&self, word: &str) -> Tag {
        if is_numeral(word) {
            return Tag::Numeral;
        }
        if self.kb.is_function_word(word) {
            return Tag::Function;
        }
        if self.kb.is_name_word(word) {
            return Tag::Noun;
        }
        if self.kb.is_descriptor(word) {
            return Tag::Adjective;
        }
        if looks_adverbial(word) {
            return Tag::Adverb;
        }
        if self.kb.is_preparation(word) || looks_participial(word) {
            return Tag::Participle;
        }
        let stem = [lexicon::stem(word)];
        if self.kb.units().match_at(&stem, 0).is_some_and(|m| m.len == 1) {
            return Tag::Unit;
        }
        Tag::Noun
    }
}

impl Tagger for LexiconTagger<'_> {
    fn tag(&self, words: &[String]) -> Vec<Tag> {
        words.iter().map(|w| self.tag_word(w)).collect()
    }
}

fn is_numeral(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '/')
}

// "-ly" words, excluding "-lly" nouns ("jelly", "belly").
fn looks_adverbial(word: &str) -> bool {
    word.len() > 4 && word.ends_with("ly") && !word.ends_with("lly")
}

// "-ed" words of five or more letters, excluding "-eed" ("seed", "weed").
fn looks_participial(word: &str) -> bool {
    word.len() > 4 && word.ends_with("ed") && !word.ends_with("eed")
}
