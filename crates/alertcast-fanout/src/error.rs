//! Error types for the alertcast-fanout crate.

use thiserror::Error;

/// Errors that can occur while fanning out pages to destinations.
#[derive(Debug, Error)]
pub enum FanoutError {
    /// Rendering the batch for a destination failed.
    #[error("render failed: {0}")]
    Render(#[from] alertcast_render::RenderError),

    /// Delivering a page to a destination failed.
    #[error("delivery to {destination} failed: {reason}")]
    DeliveryFailed {
        /// The destination the page was bound for.
        destination: String,
        /// The deliverer's description of the failure.
        reason: String,
    },
}

/// Result type for fan-out operations.
pub type Result<T> = std::result::Result<T, FanoutError>;
