/// Errors raised by the client itself, before any request is sent.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The value cannot be expressed on the wire (a block kind this client
    /// does not know).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The signed-in user lacks the role the operation needs.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}
