use serde::Serialize;
use tracing::warn;

use recast_core::model::{Category, Ingredient};

/// A non-fatal condition met while transforming.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// No substitution rule covers this ingredient; it was left as is.
    NoSubstituteAvailable {
        index: usize,
        ingredient: String,
        category: Category,
    },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::NoSubstituteAvailable {
                index,
                ingredient,
                category,
            } => write!(
                f,
                "no substitute available for '{ingredient}' ({category}) at ingredient {index}"
            ),
        }
    }
}

/// What one transformation call did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformReport {
    pub operation: String,
    pub substituted: usize,
    pub added: usize,
    pub removed: usize,
    pub rewritten_steps: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<Notice>,
}

impl TransformReport {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            ..Self::default()
        }
    }

    /// True when the call changed nothing.
    pub fn is_noop(&self) -> bool {
        self.substituted == 0 && self.added == 0 && self.removed == 0 && self.rewritten_steps == 0
    }

    pub(crate) fn no_substitute(&mut self, index: usize, ingredient: &Ingredient) {
        warn!(
            operation = %self.operation,
            ingredient = ingredient.name(),
            category = %ingredient.category(),
            "no substitute available"
        );
        self.notices.push(Notice::NoSubstituteAvailable {
            index,
            ingredient: ingredient.name().to_string(),
            category: ingredient.category(),
        });
    }
}
