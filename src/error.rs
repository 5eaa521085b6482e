use thiserror::Error;

/// Error type for quipster operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error
{   /// Request is missing a value the prompt template needs,
    /// or is otherwise malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String)
  , /// No prompt package registered under this name
    #[error("Unknown package: {0}")]
    UnknownPackage(String)
  , /// API key is missing for a plugin
    #[error("Missing API key for: {0}")]
    MissingApiKey(String)
  , /// HTTP request error
    #[error("HTTP error: {0}")]
    HttpError(String)
  , /// API returned an error response
    #[error("API error: {0}")]
    ApiError(String)
  , /// Failed to parse API response
    #[error("Parse error: {0}")]
    ParseError(String)
  , /// No choices in API response
    #[error("API response contained no choices")]
    NoChoicesInResponse
  , /// Rate limit exceeded
    #[error("API rate limit exceeded")]
    RateLimitExceeded
  , /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String)
  , /// Timeout error
    #[error("Request timed out")]
    Timeout
  , /// Generic error
    #[error("Error: {0}")]
    Other(String)
}

impl Error
{   /// True when the caller sent something unusable, false when
    /// the failure came from the generation service or its plumbing
    pub fn is_client_error(&self) -> bool
    {   matches!(
          self,
          Error::InvalidRequest(_) | Error::UnknownPackage(_)
        )
    }
}
