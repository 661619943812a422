use std::collections::{HashMap, HashSet};

use serde::Serialize;

use recast_core::model::Recipe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Ingredient,
    Instruction,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Ingredient => write!(f, "ingredient"),
            Section::Instruction => write!(f, "instruction"),
        }
    }
}

/// One changed line. `slot` is the parse index in the original recipe and
/// is `None` for lines that were added.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffEntry {
    pub section: Section,
    pub slot: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// Differences between a working recipe and its original snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecipeDiff {
    pub added: Vec<DiffEntry>,
    pub removed: Vec<DiffEntry>,
    pub substituted: Vec<DiffEntry>,
}

impl RecipeDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.substituted.is_empty()
    }
}

/// Compare a working copy against the snapshot it carries. A recipe without
/// a snapshot is its own original and has no differences.
pub fn compare_to_original(recipe: &Recipe) -> RecipeDiff {
    match recipe.original() {
        Some(original) => compute_diff(original, recipe),
        None => RecipeDiff::default(),
    }
}

/// A slotted line reduced to what the diff compares.
struct Line {
    slot: Option<usize>,
    key: String,
    label: String,
}

fn ingredient_lines(recipe: &Recipe) -> Vec<Line> {
    recipe
        .ingredients
        .iter()
        .map(|i| Line {
            slot: i.slot,
            key: format!("{}|{}", i.name().to_lowercase(), i.category()),
            label: i.name().to_string(),
        })
        .collect()
}

fn instruction_lines(recipe: &Recipe) -> Vec<Line> {
    recipe
        .instructions
        .iter()
        .map(|s| Line {
            slot: s.slot,
            key: s.text.clone(),
            label: s.text.clone(),
        })
        .collect()
}

fn diff_section(section: Section, before: &[Line], after: &[Line], diff: &mut RecipeDiff) {
    let original: HashMap<usize, &Line> = before
        .iter()
        .filter_map(|l| l.slot.map(|s| (s, l)))
        .collect();
    let kept: HashSet<usize> = after.iter().filter_map(|l| l.slot).collect();

    for line in after {
        let old = line.slot.and_then(|s| original.get(&s));
        match old {
            None => diff.added.push(DiffEntry {
                section,
                slot: None,
                before: None,
                after: Some(line.label.clone()),
            }),
            Some(old) if old.key != line.key => diff.substituted.push(DiffEntry {
                section,
                slot: line.slot,
                before: Some(old.label.clone()),
                after: Some(line.label.clone()),
            }),
            Some(_) => {}
        }
    }

    let mut gone: Vec<&Line> = before
        .iter()
        .filter(|l| l.slot.is_some_and(|s| !kept.contains(&s)))
        .collect();
    gone.sort_by_key(|l| l.slot);
    diff.removed.extend(gone.into_iter().map(|l| DiffEntry {
        section,
        slot: l.slot,
        before: Some(l.label.clone()),
        after: None,
    }));
}

fn compute_diff(original: &Recipe, current: &Recipe) -> RecipeDiff {
    let mut diff = RecipeDiff::default();
    diff_section(
        Section::Ingredient,
        &ingredient_lines(original),
        &ingredient_lines(current),
        &mut diff,
    );
    diff_section(
        Section::Instruction,
        &instruction_lines(original),
        &instruction_lines(current),
        &mut diff,
    );
    diff
}
