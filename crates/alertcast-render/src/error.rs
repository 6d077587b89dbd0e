//! Error types for the alertcast-render crate.

use thiserror::Error;

/// Errors that can occur while rendering an alert batch.
///
/// All variants are recoverable: a failed render for one batch or one
/// destination never terminates the process, and any pages built before
/// the failure are discarded rather than partially delivered.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A named template failed to compile at registration time.
    #[error("template parse failed: {name}: {reason}")]
    TemplateParse {
        /// The name of the template that failed to parse.
        name: String,
        /// The parser's description of the failure.
        reason: String,
    },

    /// A template failed at render time, e.g. referenced a missing field.
    #[error("template execution failed: {name} ({context}): {reason}")]
    TemplateExecution {
        /// The name of the template that failed.
        name: String,
        /// What was being rendered, e.g. `alert 3` or `group 'DiskFull'`.
        context: String,
        /// The renderer's description of the failure.
        reason: String,
    },

    /// Grouping was requested but an alert lacks the grouping label.
    #[error("alert #{index} ({alert}) is missing grouping label {label:?}")]
    MissingGroupLabel {
        /// The label key alerts were grouped by.
        label: String,
        /// The batch-order index of the offending alert.
        index: usize,
        /// A short description of the offending alert.
        alert: String,
    },

    /// Configuration names a template not present in the registry.
    #[error("unknown template: {name}")]
    UnknownTemplate {
        /// The template name that was not registered.
        name: String,
    },

    /// Invalid rendering configuration.
    #[error("invalid render config: {reason}")]
    InvalidConfig {
        /// The reason the configuration is invalid.
        reason: String,
    },
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
