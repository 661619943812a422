use serde::{Deserialize, Serialize};

use super::category::Category;
use super::quantity::Quantity;

/// One parsed ingredient line.
///
/// `name` and `category` are fixed at creation; a transformation that changes
/// either replaces the whole ingredient. `slot` is the parse index in the
/// original recipe and survives in-place substitution; added ingredients
/// have no slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    raw_text: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation: Option<String>,
    category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<usize>,
}

impl Ingredient {
    pub fn new(raw_text: impl Into<String>, name: impl Into<String>, category: Category) -> Self {
        Self {
            raw_text: raw_text.into(),
            name: name.into(),
            quantity: None,
            unit: None,
            descriptor: None,
            preparation: None,
            category,
            slot: None,
        }
    }

    /// Build a replacement for `self` that takes over its slot, quantity and unit.
    pub fn substitute(&self, name: impl Into<String>, category: Category) -> Self {
        let name = name.into();
        let mut sub = Self::new(String::new(), name, category);
        sub.quantity = self.quantity;
        sub.unit = self.unit.clone();
        sub.slot = self.slot;
        sub.raw_text = sub.render();
        sub
    }

    /// Take over the slot, quantity and unit of `other`.
    pub fn in_slot_of(mut self, other: &Ingredient) -> Self {
        self.quantity = other.quantity;
        self.unit = other.unit.clone();
        self.slot = other.slot;
        self.raw_text = self.render();
        self
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Render back to a single ingredient line.
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(q) = &self.quantity {
            parts.push(q.to_string());
        }
        if let Some(u) = &self.unit {
            parts.push(u.clone());
        }
        if let Some(d) = &self.descriptor {
            parts.push(d.clone());
        }
        parts.push(self.name.clone());
        let mut line = parts.join(" ");
        if let Some(p) = &self.preparation {
            line.push_str(", ");
            line.push_str(p);
        }
        line
    }
}

impl std::fmt::Display for Ingredient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beef() -> Ingredient {
        let mut ing = Ingredient::new("1 lb ground beef", "ground beef", Category::Meat);
        ing.quantity = Some(Quantity::whole(1));
        ing.unit = Some("pound".into());
        ing.slot = Some(3);
        ing
    }

    #[test]
    fn test_substitute_keeps_quantity_unit_and_slot() {
        let sub = beef().substitute("tofu", Category::Vegetable);
        assert_eq!(sub.name(), "tofu");
        assert_eq!(sub.category(), Category::Vegetable);
        assert_eq!(sub.quantity, Some(Quantity::whole(1)));
        assert_eq!(sub.unit.as_deref(), Some("pound"));
        assert_eq!(sub.slot, Some(3));
        assert_eq!(sub.raw_text(), "1 pound tofu");
    }

    #[test]
    fn test_render_with_modifiers() {
        let mut ing = Ingredient::new("", "basil", Category::HerbSpice);
        ing.quantity = Some(Quantity::whole(2));
        ing.unit = Some("cup".into());
        ing.descriptor = Some("fresh".into());
        ing.preparation = Some("chopped".into());
        assert_eq!(ing.render(), "2 cup fresh basil, chopped");
    }

    #[test]
    fn test_serde_roundtrip() {
        let ing = beef();
        let json = serde_json::to_string(&ing).unwrap();
        let parsed: Ingredient = serde_json::from_str(&json).unwrap();
        assert_eq!(ing, parsed);
        assert!(!json.contains("descriptor"));
    }
}
