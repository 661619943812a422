use std::collections::BTreeSet;

use regex::{Captures, Regex};
use tracing::debug;

use crate::error::CoreError;
use crate::knowledge::{lexicon, KnowledgeBase};
use crate::model::{Instruction, Quantity};

const NUMBER: &str = r"\d+(?:\s+\d+/\d+|[./]\d+)?";

/// Turns one raw instruction line into an [`Instruction`]: tools and methods
/// by vocabulary lookup, duration from "N minutes"-style expressions.
pub struct InstructionParser<'a> {
    kb: &'a KnowledgeBase,
    duration: Regex,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TimeUnit {
    Second,
    Minute,
    Hour,
}

impl TimeUnit {
    fn from_word(word: &str) -> Self {
        let w = word.to_lowercase();
        if w.starts_with('s') {
            TimeUnit::Second
        } else if w.starts_with('h') {
            TimeUnit::Hour
        } else {
            TimeUnit::Minute
        }
    }

    fn seconds(self) -> f64 {
        match self {
            TimeUnit::Second => 1.0,
            TimeUnit::Minute => 60.0,
            TimeUnit::Hour => 3600.0,
        }
    }
}

fn number(text: &str) -> Option<f64> {
    Quantity::parse(text).map(|q| q.as_f64())
}

fn amount(value: u64, singular: &str) -> String {
    if value == 1 {
        format!("{value} {singular}")
    } else {
        format!("{value} {singular}s")
    }
}

impl<'a> InstructionParser<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Result<Self, CoreError> {
        let duration = Regex::new(&format!(
            r"(?i)\b({NUMBER})(?:\s*(?:-|–|to)\s*({NUMBER}))?\s*(seconds?|secs?|minutes?|mins?|hours?|hrs?)\b"
        ))?;
        Ok(Self { kb, duration })
    }

    pub fn parse(&self, raw: &str) -> Instruction {
        let mut step = Instruction {
            text: raw.trim().to_string(),
            tools: BTreeSet::new(),
            implied_tools: BTreeSet::new(),
            methods: BTreeSet::new(),
            duration: None,
            ingredients: Vec::new(),
            slot: None,
        };
        self.refresh(&mut step);
        debug!(
            line = raw,
            tools = ?step.tools,
            methods = ?step.methods,
            duration = ?step.duration,
            "parsed instruction"
        );
        step
    }

    /// Re-derive tools, methods and duration after the text changed.
    pub fn refresh(&self, step: &mut Instruction) {
        let tokens = lexicon::stems(&step.text);
        step.tools = self
            .kb
            .tools()
            .scan(&tokens)
            .into_iter()
            .map(|m| m.canonical)
            .chain(step.implied_tools.iter().cloned())
            .collect();
        step.methods = self
            .kb
            .methods()
            .scan(&tokens)
            .into_iter()
            .map(|m| m.canonical)
            .filter(|m| !m.is_empty())
            .collect();
        step.duration = self.duration(&step.text);
    }

    /// Total minutes stated in `text`, rounded up. Ranges count at their upper
    /// bound. `None` when no time expression is present.
    pub fn duration(&self, text: &str) -> Option<u32> {
        let mut seconds = 0.0;
        let mut found = false;
        for caps in self.duration.captures_iter(text) {
            let value = caps
                .get(2)
                .or_else(|| caps.get(1))
                .and_then(|m| number(m.as_str()));
            if let Some(value) = value {
                seconds += value * TimeUnit::from_word(&caps[3]).seconds();
                found = true;
            }
        }
        found.then(|| (seconds / 60.0).ceil().min(f64::from(u32::MAX)) as u32)
    }

    /// Rewrite every time expression in `text` scaled by `factor`, rounding up.
    /// Returns `None` when the text states no time.
    pub fn scale_durations(&self, text: &str, factor: f64) -> Option<String> {
        if !self.duration.is_match(text) {
            return None;
        }
        let out = self.duration.replace_all(text, |caps: &Captures<'_>| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(1))
                .and_then(|m| number(m.as_str()));
            let Some(value) = value else {
                return caps[0].to_string();
            };
            match TimeUnit::from_word(&caps[3]) {
                TimeUnit::Second => amount((value * factor).ceil() as u64, "second"),
                TimeUnit::Minute => amount((value * factor).ceil().max(1.0) as u64, "minute"),
                TimeUnit::Hour => {
                    let minutes = (value * 60.0 * factor).ceil().max(1.0) as u64;
                    if minutes % 60 == 0 {
                        amount(minutes / 60, "hour")
                    } else {
                        amount(minutes, "minute")
                    }
                }
            }
        });
        Some(out.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::builtin().unwrap()
    }

    #[test]
    fn test_duration_ranges_and_sums() {
        let kb = kb();
        let parser = InstructionParser::new(&kb).unwrap();
        assert_eq!(parser.duration("Bake for 25 to 30 minutes."), Some(30));
        assert_eq!(parser.duration("Simmer 1 hour and 15 minutes"), Some(75));
        assert_eq!(parser.duration("Whisk for 30 seconds."), Some(1));
        assert_eq!(parser.duration("Cook 1 1/2 hours"), Some(90));
        assert_eq!(parser.duration("Preheat oven to 350 degrees F."), None);
        assert_eq!(parser.duration("Stir in the salt."), None);
    }

    #[test]
    fn test_tools_and_methods() {
        let kb = kb();
        let parser = InstructionParser::new(&kb).unwrap();

        let step = parser.parse("Stir-fry the beef in a wok for 5 minutes.");
        assert!(step.uses_method("stir-fry"));
        assert!(step.tools.contains("wok"));
        assert_eq!(step.duration, Some(5));

        let step = parser.parse("Preheat the oven and line a baking sheet with parchment paper.");
        assert!(step.methods.is_empty());
        assert!(step.tools.contains("oven"));
        assert!(step.tools.contains("baking sheet"));
        assert!(step.tools.contains("parchment paper"));
    }

    #[test]
    fn test_blockers_are_not_methods() {
        let kb = kb();
        let parser = InstructionParser::new(&kb).unwrap();
        let step = parser.parse("Whisk the flour with the baking soda.");
        assert_eq!(step.methods.iter().collect::<Vec<_>>(), vec!["whisk"]);
        assert!(step.duration.is_none());
    }

    #[test]
    fn test_scale_durations() {
        let kb = kb();
        let parser = InstructionParser::new(&kb).unwrap();
        assert_eq!(
            parser.scale_durations("Toast the seeds for 10 minutes.", 0.5).as_deref(),
            Some("Toast the seeds for 5 minutes.")
        );
        assert_eq!(
            parser.scale_durations("Soak for 2 hours.", 0.5).as_deref(),
            Some("Soak for 1 hour.")
        );
        assert_eq!(
            parser.scale_durations("Soak for 1 hour.", 0.5).as_deref(),
            Some("Soak for 30 minutes.")
        );
        assert!(parser.scale_durations("Chop the onion.", 0.5).is_none());
    }
}
