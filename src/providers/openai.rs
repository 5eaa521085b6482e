use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, log, trace, Level};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::client::TextGenerator;
use crate::config::PluginConfig;
use crate::error::Error;
use crate::request::PluginRequest;

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>
}

impl ChatRequest
{   pub fn from_plugin_request(request: &PluginRequest) -> Self
    {   ChatRequest
        {   model: request.plugin.clone()
          , messages: vec![
              ChatMessage
              {   role: "user".to_string()
                , content: request.prompt.clone()
              }
            ]
          , max_tokens: Some(request.config.max_tokens())
          , temperature: Some(request.config.temperature)
          , stream: Some(false)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse
{   pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ChatMessage
  , pub finish_reason: Option<String>
}

// ===== Plugin Actor =====

pub type GenerateReply = Result<String, Error>;

/// Commands for the OpenAiPlugin actor
pub enum PluginCommand
{   Generate
    {   request: PluginRequest
      , reply: mpsc::UnboundedSender<GenerateReply>
    }
  , Shutdown
}

/// Connection state shared by in-flight requests
pub struct OpenAiPluginState
{   api_key: Option<String>
  , api_base: String
  , http_client: reqwest::Client
  , verbose: bool
}

impl OpenAiPluginState
{   pub fn new(
      api_key: Option<String>
    , config: &PluginConfig
    ) -> Result<Self, Error>
    {   debug!("Creating OpenAiPluginState for {}", config.api_base);
        let http_client = reqwest::Client::builder()
          .timeout(Duration::from_secs(config.timeout_secs))
          .user_agent(concat!(
            env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")
          ))
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::InvalidConfiguration(e.to_string())
          })?;

        Ok(OpenAiPluginState
        {   api_key
          , api_base: config.api_base.trim_end_matches('/').to_string()
          , http_client
          , verbose: config.verbose
        })
    }

    /// Level for request and response bodies; `verbose` lifts them
    /// from trace to debug
    fn wire_level(&self) -> Level
    {   if self.verbose
        {   Level::Debug
        } else
        {   Level::Trace
        }
    }

    async fn handle_generate(
      &self
    , request: PluginRequest
    ) -> Result<String, Error>
    {   debug!("Handling generate for plugin: {}", request.plugin);

        let api_key = self.api_key.as_ref().ok_or_else(|| {
          error!("No API key for plugin: {}", request.plugin);
          Error::MissingApiKey(request.plugin.clone())
        })?;

        let body = ChatRequest::from_plugin_request(&request);
        log!(self.wire_level(), "Chat request: {:?}", body);

        let response = self.http_client
          .post(format!("{}/chat/completions", self.api_base))
          .bearer_auth(api_key)
          .json(&body)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            if e.is_timeout()
            {   Error::Timeout
            } else
            {   Error::HttpError(e.to_string())
            }
          })?;

        let status = response.status();
        trace!("Chat response status: {}", status);

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {   error!("Rate limited by {}", self.api_base);
            return Err(Error::RateLimitExceeded);
        }

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Plugin API error ({}): {}", status, error_text);
            return Err(Error::ApiError(
              format!("{}: {}", status, error_text)
            ));
        }

        let chat_response: ChatResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            Error::ParseError(e.to_string())
          })?;

        log!(self.wire_level(), "Chat response: {:?}", chat_response);

        chat_response.choices.first()
          .map(|c| c.message.content.clone())
          .ok_or_else(|| {
            error!("No choices in response");
            Error::NoChoicesInResponse
          })
    }
}

/// Generation plugin speaking the OpenAI-compatible
/// `chat/completions` API
pub struct OpenAiPlugin
{   tx: mpsc::UnboundedSender<PluginCommand>
  , _task: tokio::task::JoinHandle<()>
}

impl OpenAiPlugin
{   /// Create and spawn a new plugin client.
    /// Must be called inside a tokio runtime.
    pub fn new(
      api_key: Option<String>
    , config: &PluginConfig
    ) -> Result<Self, Error>
    {   debug!("Creating OpenAiPlugin");
        let state = OpenAiPluginState::new(api_key, config)?;
        let (cmd_tx, cmd_rx)
          = mpsc::unbounded_channel();

        let _task = tokio::spawn(async move {
          run_plugin_loop(cmd_rx, state).await;
        });

        Ok(OpenAiPlugin
        {   tx: cmd_tx
          , _task
        })
    }

    /// Build from config, reading the key from `config.api_key_env`
    pub fn from_config(config: &PluginConfig) -> Result<Self, Error>
    {   let key = config.api_key();
        if key.is_none()
        {   info!(
              "{} is not set; generation calls will fail",
              config.api_key_env
            );
        }
        OpenAiPlugin::new(key, config)
    }

    /// Stop accepting new requests. Requests already in flight
    /// finish on their own tasks.
    pub fn shutdown(&self) -> Result<(), Error>
    {   debug!("Shutting down OpenAiPlugin");
        self.tx.send(PluginCommand::Shutdown)
          .map_err(|_| {
            Error::Other(
              "Plugin already shutdown".to_string()
            )
          })
    }
}

#[async_trait]
impl TextGenerator for OpenAiPlugin
{   async fn generate(
      &self
    , request: &PluginRequest
    ) -> Result<String, Error>
    {   debug!("generate queued for plugin: {}", request.plugin);
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        self.tx.send(PluginCommand::Generate {
          request: request.clone(),
          reply: reply_tx,
        }).map_err(|_| {
          error!("Plugin disconnected");
          Error::Other(
            "Plugin disconnected".to_string()
          )
        })?;

        match reply_rx.recv().await
        {   Some(result) => result
          , None => {
              error!("Plugin dropped the request");
              Err(Error::Other(
                "Plugin dropped the request".to_string()
              ))
            }
        }
    }
}

/// Main plugin event loop
///
/// Each request runs on its own task so concurrent callers
/// never wait on one another.
async fn run_plugin_loop(
  mut cmd_rx: mpsc::UnboundedReceiver<PluginCommand>
, state: OpenAiPluginState
)
{   debug!("Starting plugin loop");
    let state = Arc::new(state);

    loop
    { match cmd_rx.recv().await
      {   Some(PluginCommand::Generate { request, reply }) => {
            debug!("Processing Generate");
            let state = Arc::clone(&state);
            tokio::spawn(async move {
              let result = state.handle_generate(request).await;
              let _ = reply.send(result);
            });
          }
        , Some(PluginCommand::Shutdown) => {
            info!("Plugin client shutting down");
            break;
          }
        , None => {
            debug!("Command channel closed");
            break;
          }
      }
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::request::GenerationConfig;

    #[test]
    fn test_chat_request_from_plugin_request()
    {   let request = PluginRequest
        {   plugin: "gpt-3".to_string()
          , prompt: "Say hi.".to_string()
          , config: GenerationConfig::new(30, 0.8)
        };
        let body = serde_json::to_value(
          ChatRequest::from_plugin_request(&request)
        ).unwrap();
        assert_eq!(body["model"], "gpt-3");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Say hi.");
        assert_eq!(body["max_tokens"], 40);
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_trailing_slash_trimmed()
    {   let config = PluginConfig
        {   api_base: "http://localhost:1234/v1/".to_string()
          , ..PluginConfig::default()
        };
        let state = OpenAiPluginState::new(None, &config).unwrap();
        assert_eq!(state.api_base, "http://localhost:1234/v1");
    }

    #[test]
    fn test_verbose_lifts_wire_logging_to_debug()
    {   let quiet = OpenAiPluginState::new(None, &PluginConfig::default())
          .unwrap();
        assert!(!quiet.verbose);
        assert_eq!(quiet.wire_level(), Level::Trace);

        let config = PluginConfig
        {   verbose: true
          , ..PluginConfig::default()
        };
        let loud = OpenAiPluginState::new(None, &config).unwrap();
        assert_eq!(loud.wire_level(), Level::Debug);
    }
}
