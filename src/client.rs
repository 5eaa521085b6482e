use async_trait::async_trait;

use crate::error::Error;
use crate::request::PluginRequest;

/// The external text-generation service.
///
/// Built once at startup and shared by every package as
/// `Arc<dyn TextGenerator>`. Implementations must tolerate
/// concurrent calls.
#[async_trait]
pub trait TextGenerator: Send + Sync
{   /// Generate text for a fully resolved prompt
    async fn generate(
      &self
    , request: &PluginRequest
    ) -> Result<String, Error>;
}
