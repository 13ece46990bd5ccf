/// Domain-level errors raised while reading or validating price-watch
/// documents.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The document is not well-formed or does not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The document parsed but violates a catalog rule.
    #[error("Validation failed: {0}")]
    Validation(String),
}
