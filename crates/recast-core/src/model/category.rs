use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Category tag assigned to every ingredient. `Unknown` is the explicit fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    HerbSpice,
    Vegetable,
    Meat,
    Dairy,
    Fruit,
    Sauce,
    Seafood,
    Unknown,
}

impl Category {
    /// Classification order. Seafood and Meat come first so "chicken broth"
    /// stays an animal product and "bay scallop" is not read as a herb.
    /// Names containing the word "sauce" skip this order entirely.
    pub const PRIORITY: [Category; 7] = [
        Category::Seafood,
        Category::Meat,
        Category::Sauce,
        Category::Dairy,
        Category::HerbSpice,
        Category::Vegetable,
        Category::Fruit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HerbSpice => "herb_spice",
            Self::Vegetable => "vegetable",
            Self::Meat => "meat",
            Self::Dairy => "dairy",
            Self::Fruit => "fruit",
            Self::Sauce => "sauce",
            Self::Seafood => "seafood",
            Self::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::HerbSpice => "Herb/Spice",
            Self::Vegetable => "Vegetable",
            Self::Meat => "Meat",
            Self::Dairy => "Dairy",
            Self::Fruit => "Fruit",
            Self::Sauce => "Sauce",
            Self::Seafood => "Seafood",
            Self::Unknown => "Unknown",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let normalized = s.trim().to_lowercase().replace(['/', ' ', '-'], "_");
        match normalized.as_str() {
            "herb_spice" | "herb" | "spice" => Ok(Self::HerbSpice),
            "vegetable" => Ok(Self::Vegetable),
            "meat" => Ok(Self::Meat),
            "dairy" => Ok(Self::Dairy),
            "fruit" => Ok(Self::Fruit),
            "sauce" => Ok(Self::Sauce),
            "seafood" => Ok(Self::Seafood),
            "unknown" => Ok(Self::Unknown),
            _ => Err(CoreError::KnowledgeBase(format!("unknown category '{s}'"))),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
