use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("Invalid recipe: {0}")]
    InvalidRecipe(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}
