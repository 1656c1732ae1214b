//! Log-level port — lets the host change verbosity at runtime.

use switchbridge_domain::error::BoxError;

/// Applies a new maximum log level to the running subscriber.
pub trait LogLevelControl: Send + Sync {
    /// Switch the active filter to `level`.
    ///
    /// # Errors
    ///
    /// Returns an error when the subscriber can no longer be reconfigured.
    fn set_level(&self, level: tracing::Level) -> Result<(), BoxError>;
}
