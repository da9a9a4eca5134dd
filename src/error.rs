//! Error types for jsxkit operations.

use thiserror::Error;

/// Errors that can end a conversion stage.
///
/// Localized heuristic failures (one attribute, one pattern candidate, one
/// asset) never surface here; they are collected as warnings instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no markup was supplied")]
    MissingInput,

    #[error("parse error: {0}")]
    Parse(String),

    #[error("component split failed: {0}")]
    Split(String),

    #[error("code generation failed: {0}")]
    Codegen(String),

    #[error("CSS conversion failed: {0}")]
    Css(String),

    #[error("asset extraction failed: {0}")]
    Asset(String),

    #[error("packaging failed: {0}")]
    Package(String),

    #[error("settings error: {0}")]
    Settings(String),

    #[error("conversion cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
