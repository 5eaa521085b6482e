//! Configuration for the generation plugin and the HTTP server

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Plugin configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig
{   /// API base URL
    pub api_base: String
  , /// Environment variable holding the API key
    pub api_key_env: String
  , /// Request timeout in seconds
    pub timeout_secs: u64
  , /// Enable detailed logging
    pub verbose: bool
}

impl Default for PluginConfig
{   fn default() -> Self
    {   PluginConfig
        {   api_base: DEFAULT_API_BASE.to_string()
          , api_key_env: DEFAULT_API_KEY_ENV.to_string()
          , timeout_secs: DEFAULT_TIMEOUT_SECS
          , verbose: false
        }
    }
}

impl PluginConfig
{   /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String>
    {   std::env::var(&self.api_key_env)
          .ok()
          .filter(|k| !k.trim().is_empty())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig
{   /// Socket address to listen on
    pub bind: String
}

impl Default for ServerConfig
{   fn default() -> Self
    {   ServerConfig
        {   bind: DEFAULT_BIND.to_string()
        }
    }
}

/// quipster configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuipsterConfig
{   /// Generation plugin configuration
    pub plugin: PluginConfig
  , /// HTTP server configuration
    pub server: ServerConfig
}

impl QuipsterConfig
{   /// Load from an optional JSON file, then apply environment
    /// overrides and validate
    pub fn load(path: Option<&Path>) -> Result<Self, Error>
    {   let mut config = match path
        {   Some(p) => {
              debug!("Loading config from {}", p.display());
              let raw = std::fs::read_to_string(p).map_err(|e| {
                Error::InvalidConfiguration(
                  format!("cannot read {}: {}", p.display(), e)
                )
              })?;
              Self::from_json(&raw)?
            }
          , None => QuipsterConfig::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(raw: &str) -> Result<Self, Error>
    {   serde_json::from_str(raw).map_err(|e| {
          Error::InvalidConfiguration(e.to_string())
        })
    }

    /// Apply `QUIPSTER_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), Error>
    where F: Fn(&str) -> Option<String>
    {   if let Some(base) = lookup("QUIPSTER_API_BASE")
        {   debug!("QUIPSTER_API_BASE override: {}", base);
            self.plugin.api_base = base;
        }
        if let Some(bind) = lookup("QUIPSTER_BIND")
        {   debug!("QUIPSTER_BIND override: {}", bind);
            self.server.bind = bind;
        }
        if let Some(secs) = lookup("QUIPSTER_TIMEOUT_SECS")
        {   self.plugin.timeout_secs = secs.trim().parse().map_err(|_| {
              Error::InvalidConfiguration(
                format!("QUIPSTER_TIMEOUT_SECS is not a number: {}", secs)
              )
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Error>
    {   if self.plugin.api_base.trim().is_empty()
        {   return Err(Error::InvalidConfiguration(
              "plugin.api_base must not be empty".to_string()
            ));
        }
        if self.plugin.timeout_secs == 0
        {   return Err(Error::InvalidConfiguration(
              "plugin.timeout_secs must be greater than zero".to_string()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults()
    {   let config = QuipsterConfig::default();
        assert_eq!(config.plugin.api_base, DEFAULT_API_BASE);
        assert_eq!(config.plugin.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.plugin.timeout_secs, 60);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults()
    {   let config = QuipsterConfig::from_json(
          r#"{ "plugin": { "timeout_secs": 5 } }"#
        ).unwrap();
        assert_eq!(config.plugin.timeout_secs, 5);
        assert_eq!(config.plugin.api_base, DEFAULT_API_BASE);
        assert_eq!(config.server.bind, DEFAULT_BIND);
    }

    #[test]
    fn test_env_overrides()
    {   let vars: HashMap<&str, &str> = [
          ("QUIPSTER_API_BASE", "http://localhost:9000/v1")
        , ("QUIPSTER_BIND", "0.0.0.0:3000")
        , ("QUIPSTER_TIMEOUT_SECS", "12")
        ].into_iter().collect();

        let mut config = QuipsterConfig::default();
        config.apply_env(|k| vars.get(k).map(|v| v.to_string()))
          .unwrap();
        assert_eq!(config.plugin.api_base, "http://localhost:9000/v1");
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(config.plugin.timeout_secs, 12);
    }

    #[test]
    fn test_bad_timeout_override()
    {   let mut config = QuipsterConfig::default();
        let result = config.apply_env(|k| {
          (k == "QUIPSTER_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout()
    {   let mut config = QuipsterConfig::default();
        config.plugin.timeout_secs = 0;
        assert!(matches!(
          config.validate(),
          Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_base()
    {   let mut config = QuipsterConfig::default();
        config.plugin.api_base = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file()
    {   let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quipster.json");
        std::fs::write(
          &path,
          r#"{ "plugin": { "api_key_env": "MY_KEY", "verbose": true },
               "server": { "bind": "127.0.0.1:9999" } }"#
        ).unwrap();

        let config = QuipsterConfig::load(Some(&path)).unwrap();
        assert_eq!(config.plugin.api_key_env, "MY_KEY");
        assert!(config.plugin.verbose);
        assert_eq!(config.plugin.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_load_missing_file()
    {   let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        match QuipsterConfig::load(Some(&path))
        {   Err(Error::InvalidConfiguration(msg)) => {
              assert!(msg.starts_with("cannot read"), "{msg}");
              assert!(msg.contains("absent.json"), "{msg}");
            }
          , other => panic!("unexpected result: {other:?}")
        }
    }

    #[test]
    fn test_load_rejects_invalid_file_contents()
    {   let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero.json");
        std::fs::write(&path, r#"{ "plugin": { "timeout_secs": 0 } }"#)
          .unwrap();

        assert!(matches!(
          QuipsterConfig::load(Some(&path)),
          Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_malformed_json()
    {   assert!(QuipsterConfig::from_json("{ plugin: ").is_err());
    }
}
