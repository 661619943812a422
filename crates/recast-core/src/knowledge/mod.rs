pub mod base;
pub mod lexicon;

pub use base::{
    Conversion, DietTable, Form, HealthTable, KnowledgeBase, MethodForms, MethodProfile,
    MethodSurface, Prerequisite, Reintroduction, SetupStep, SimplifyTable, StyleProfile,
    SubstituteRule,
};
pub use lexicon::{PhraseIndex, PhraseMatch};
