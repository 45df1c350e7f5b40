use thiserror::Error;

/// Fatal errors of a diff invocation. Malformed markup is never one of them:
/// it degrades to fewer tokens plus diagnostics instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiffError {
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("edit script does not cover the {side} sequence: {detail}")]
    BrokenScript { side: &'static str, detail: String },
}
