// ABOUTME: Error types for frame construction and helper engine operations
// ABOUTME: Defines the invalid-argument frame error and the crate-wide helper error

use thiserror::Error;

/// Failure raised while building a context frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Invalid argument: frame source must be a plain object, got {0}")]
    InvalidArgument(&'static str),
}

#[derive(Error, Debug)]
pub enum HelperError {
    #[error("Template syntax error: {0}")]
    SyntaxError(String),

    #[error("Unknown helper group: {0}")]
    UnknownGroup(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Handlebars error: {0}")]
    HandlebarsError(#[from] handlebars::RenderError),

    #[error("Template registration error: {0}")]
    TemplateError(#[from] handlebars::TemplateError),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, HelperError>;

impl From<FrameError> for handlebars::RenderError {
    fn from(err: FrameError) -> Self {
        handlebars::RenderError::new(err.to_string())
    }
}
