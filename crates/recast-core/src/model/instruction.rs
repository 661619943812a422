use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One parsed instruction step.
///
/// `tools`, `methods` and `duration` are derived from `text` by the
/// instruction parser; rewriting a step means parsing the new text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub text: String,
    #[serde(default)]
    pub tools: BTreeSet<String>,
    /// Tools the step's cooking method needs even when the text names none.
    /// Kept across re-parsing.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub implied_tools: BTreeSet<String>,
    #[serde(default)]
    pub methods: BTreeSet<String>,
    /// Minutes; `None` when the step states no time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Names of recipe ingredients mentioned by this step.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingredients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<usize>,
}

impl Instruction {
    pub fn uses_method(&self, method: &str) -> bool {
        self.methods.contains(method)
    }

    /// Record `tool` as the one tool implied by the step's method.
    pub fn imply_tool(&mut self, tool: &str) {
        self.implied_tools = BTreeSet::from([tool.to_string()]);
        self.tools.insert(tool.to_string());
    }
}
