pub mod diet;
pub mod diff;
pub mod error;
pub mod health;
pub mod method;
pub mod report;
pub mod rewrite;
pub mod simplify;
pub mod style;
pub mod transformer;

pub use diff::{compare_to_original, DiffEntry, RecipeDiff, Section};
pub use error::TransformError;
pub use report::{Notice, TransformReport};
pub use transformer::{Operation, Transformer};
