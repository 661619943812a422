use recast_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Unknown style '{style}'")]
    InvalidStyle { style: String },

    #[error("Invalid {name}: {value}")]
    InvalidParameter { name: String, value: String },

    #[error("Unsupported cooking method '{method}'")]
    UnsupportedMethod { method: String },

    #[error("Unknown operation '{op}'")]
    UnknownOperation { op: String },

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl TransformError {
    pub(crate) fn parameter(name: &str, value: impl ToString) -> Self {
        TransformError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}
