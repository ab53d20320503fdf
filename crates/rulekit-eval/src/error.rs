//! Build-time error types.
//!
//! Only pipeline *construction* produces errors. Once a tree is compiled,
//! per-event failures are recorded as boolean outcomes on the event itself
//! and never surface as `Err` (see the crate docs on the two-tier taxonomy).

use thiserror::Error;

/// Errors that can occur while compiling a stage definition into an
/// expression tree. All of them are fatal: a pipeline that fails to
/// compile starts nothing.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A definition node had the wrong JSON type.
    #[error("invalid definition type: expected \"{expected}\" but got \"{actual}\"")]
    InvalidDefinitionType {
        expected: &'static str,
        actual: String,
    },

    /// A qualified operator name was not present in the registry.
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    /// A required operator argument was structurally missing or empty.
    #[error("operator \"{0}\" requires a non-empty argument")]
    EmptyArgument(String),

    /// Building a block entry failed; wraps the causal chain with the
    /// offending key for diagnostics.
    #[error("Stage block \"{key}\" building failed: {source}")]
    StageBlockBuildFailed {
        key: String,
        #[source]
        source: Box<BuildError>,
    },
}

impl BuildError {
    /// Wrap this error with the block key it occurred under.
    pub fn in_block(self, key: &str) -> BuildError {
        BuildError::StageBlockBuildFailed {
            key: key.to_string(),
            source: Box::new(self),
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, BuildError>;
