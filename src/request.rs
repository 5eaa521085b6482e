//! Request and configuration types shared by packages and plugins

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Named string parameters supplied by the caller, in the order given
pub type GenerationRequest = IndexMap<String, String>;

/// Request body as received over HTTP; `null` values are allowed
pub type RequestBody = IndexMap<String, Option<String>>;

/// Drop `null` entries so they count as absent parameters
pub fn request_from_body(body: RequestBody) -> GenerationRequest
{   body.into_iter()
      .filter_map(|(k, v)| v.map(|v| (k, v)))
      .collect()
}

/// Fixed generation controls passed to the plugin on every call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig
{   /// Controls length of generated output
    pub max_words: u32
  , /// Controls randomness of output (range: 0.0-1.0)
    pub temperature: f32
}

impl GenerationConfig
{   pub const fn new(max_words: u32, temperature: f32) -> Self
    {   GenerationConfig { max_words, temperature }
    }

    /// Token budget handed to chat-completion style APIs.
    /// English averages about four tokens per three words.
    pub fn max_tokens(&self) -> u32
    {   self.max_words.saturating_mul(4).div_ceil(3).max(1)
    }
}

/// A fully resolved prompt ready for the generation plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRequest
{   /// Plugin (model) identifier, e.g. `gpt-3`
    pub plugin: String
  , /// Prompt text with every placeholder substituted
    pub prompt: String
  , pub config: GenerationConfig
}

/// Describes one input a package accepts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec
{   pub name: &'static str
  , pub required: bool
  , /// Closed set of accepted values, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<&'static str>>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>
}

impl ParameterSpec
{   pub const fn required(name: &'static str) -> Self
    {   ParameterSpec
        {   name
          , required: true
          , choices: None
          , default: None
        }
    }
}
