// Error taxonomy shared by the broker and its dictionaries

/// Errors surfaced by [`crate::Broker`] and [`crate::Dictionary`] operations.
///
/// Every variant is terminal for the call that raised it; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    /// The provider could not create a broker resource
    #[error("Unable to initialize broker: {0}")]
    InitializationFailure(String),
    /// No provider can satisfy a dictionary request
    #[error("{0}")]
    NotFound(String),
    /// The provider reported an error after an otherwise-completed call
    #[error("Provider error: {0}")]
    ProviderError(String),
    /// Operation attempted on a disposed broker or dictionary
    #[error("{0} has been disposed")]
    DisposedUse(&'static str),
    /// A required key, path or word was missing
    #[error("Argument '{0}' must not be empty")]
    InvalidArgument(&'static str),
}

/// Result type for broker and dictionary operations
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Reject an empty required argument.
pub(crate) fn require(value: &str, name: &'static str) -> BrokerResult<()> {
    if value.is_empty() {
        return Err(BrokerError::InvalidArgument(name));
    }
    Ok(())
}
