//! Prompt packages and the generation handler

use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, error};

use crate::client::TextGenerator;
use crate::error::Error;
use crate::registry::{InsultStyle, GREETING};
use crate::request::{
  GenerationConfig, GenerationRequest, ParameterSpec, PluginRequest
};
use crate::template::PromptTemplate;

/// Plugin identifier both packages generate with
pub const DEFAULT_PLUGIN: &str = "gpt-3";

/// A fixed prompt design: which template to use for a request and
/// how the plugin should be driven
pub trait PromptPackage: Send + Sync
{   /// Route segment, e.g. `compliment`
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Inputs in the order the demo prompts for them
    fn parameters(&self) -> Vec<ParameterSpec>;

    fn config(&self) -> GenerationConfig;

    fn plugin(&self) -> &'static str
    {   DEFAULT_PLUGIN
    }

    fn select_template(&self, request: &GenerationRequest) -> PromptTemplate;

    /// Sample inputs the demo runs before going interactive
    fn examples(&self) -> Vec<GenerationRequest>
    {   Vec::new()
    }
}

fn request_of(pairs: &[(&str, &str)]) -> GenerationRequest
{   pairs.iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect()
}

/// Generates an unusual greeting with a compliment
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplimentPackage;

impl PromptPackage for ComplimentPackage
{   fn name(&self) -> &'static str
    {   "compliment"
    }

    fn description(&self) -> &'static str
    {   "Generate Compliments with GPT-3"
    }

    fn parameters(&self) -> Vec<ParameterSpec>
    {   vec![
          ParameterSpec::required("name")
        , ParameterSpec::required("trait")
        ]
    }

    fn config(&self) -> GenerationConfig
    {   GenerationConfig::new(30, 0.8)
    }

    fn select_template(&self, _request: &GenerationRequest) -> PromptTemplate
    {   GREETING
    }

    fn examples(&self) -> Vec<GenerationRequest>
    {   vec![
          request_of(&[
            ("name", "Han Solo")
          , ("trait", "heroism in the face of adversity")
          ])
        ]
    }
}

/// Generates insults in a selectable style
#[derive(Debug, Clone, Copy, Default)]
pub struct InsultPackage;

impl PromptPackage for InsultPackage
{   fn name(&self) -> &'static str
    {   "insult"
    }

    fn description(&self) -> &'static str
    {   "Generate Insults with GPT-3"
    }

    fn parameters(&self) -> Vec<ParameterSpec>
    {   vec![
          ParameterSpec::required("topic")
        , ParameterSpec
          {   name: "style"
            , required: false
            , choices: Some(
                InsultStyle::ALL.iter().map(InsultStyle::as_str).collect()
              )
            , default: Some(InsultStyle::default().as_str())
          }
        ]
    }

    fn config(&self) -> GenerationConfig
    {   GenerationConfig::new(100, 0.8)
    }

    fn select_template(&self, request: &GenerationRequest) -> PromptTemplate
    {   let style = InsultStyle::from_key(
          request.get("style").map(String::as_str)
        );
        debug!("Insult style resolved to {}", style);
        style.template()
    }

    fn examples(&self) -> Vec<GenerationRequest>
    {   vec![
          request_of(&[("topic", "this caviar"), ("style", "1920s")])
        , request_of(&[("topic", "your face"), ("style", "Shakespeare")])
        , request_of(&[("topic", "this breakfast buffet"), ("style", "Pirate")])
        ]
    }
}

/// Binds a package to the shared generation client
#[derive(Clone)]
pub struct PackageService
{   package: Arc<dyn PromptPackage>
  , client: Arc<dyn TextGenerator>
}

impl PackageService
{   pub fn new(
      package: Arc<dyn PromptPackage>
    , client: Arc<dyn TextGenerator>
    ) -> Self
    {   PackageService { package, client }
    }

    pub fn package(&self) -> &dyn PromptPackage
    {   self.package.as_ref()
    }

    /// Resolve the prompt for `request` without calling the plugin
    pub fn prepare(
      &self
    , request: &GenerationRequest
    ) -> Result<PluginRequest, Error>
    {   let template = self.package.select_template(request);

        let args: IndexMap<String, String> = template.placeholders()
          .into_iter()
          .filter_map(|name| {
            request.get(name).map(|v| (name.to_string(), v.clone()))
          })
          .collect();

        let prompt = template.render(&args).map_err(|e| {
          debug!("{} rejected request: {}", self.package.name(), e);
          e
        })?;

        Ok(PluginRequest
        {   plugin: self.package.plugin().to_string()
          , prompt
          , config: self.package.config()
        })
    }

    /// Generate text from prompt parameters
    pub async fn generate(
      &self
    , request: &GenerationRequest
    ) -> Result<String, Error>
    {   let plugin_request = self.prepare(request)?;
        debug!(
          "{} dispatching to plugin {}",
          self.package.name(),
          plugin_request.plugin
        );
        self.client.generate(&plugin_request).await.map_err(|e| {
          error!("{} generation failed: {}", self.package.name(), e);
          e
        })
    }
}

/// Every package this crate ships, keyed by route name
pub fn builtin_packages() -> Vec<Arc<dyn PromptPackage>>
{   vec![
      Arc::new(ComplimentPackage)
    , Arc::new(InsultPackage)
    ]
}

#[cfg(test)]
mod tests
{   use super::*;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl TextGenerator for Unreachable
    {   async fn generate(
          &self
        , _request: &PluginRequest
        ) -> Result<String, Error>
        {   Err(Error::Other("should not be called".to_string()))
        }
    }

    fn service(package: Arc<dyn PromptPackage>) -> PackageService
    {   PackageService::new(package, Arc::new(Unreachable))
    }

    #[test]
    fn test_compliment_prompt()
    {   let svc = service(Arc::new(ComplimentPackage));
        let req = svc.prepare(&request_of(&[
          ("name", "Han Solo")
        , ("trait", "heroism in the face of adversity")
        ])).unwrap();
        assert_eq!(
          req.prompt,
          "Say an unusual greeting to Han Solo. Compliment them on their \
           heroism in the face of adversity."
        );
        assert_eq!(req.plugin, "gpt-3");
        assert_eq!(req.config, GenerationConfig::new(30, 0.8));
    }

    #[test]
    fn test_insult_classy_prompt()
    {   let svc = service(Arc::new(InsultPackage));
        let req = svc.prepare(&request_of(&[
          ("topic", "this caviar")
        , ("style", "1920s")
        ])).unwrap();
        assert_eq!(
          req.prompt,
          "Please create a classy 1920s style insult about this caviar. \
           The insult feel like dated English from another time."
        );
        assert_eq!(req.config, GenerationConfig::new(100, 0.8));
    }

    #[test]
    fn test_insult_without_style_uses_classy()
    {   let svc = service(Arc::new(InsultPackage));
        let req = svc.prepare(&request_of(&[("topic", "your face")]))
          .unwrap();
        assert!(req.prompt.starts_with("Please create a classy 1920s"));
    }

    #[test]
    fn test_missing_parameter_is_invalid_request()
    {   let svc = service(Arc::new(ComplimentPackage));
        let err = svc.prepare(&request_of(&[("name", "Leia")]))
          .unwrap_err();
        assert_eq!(
          err,
          Error::InvalidRequest("missing value for: trait".to_string())
        );
    }

    #[test]
    fn test_generate_stops_before_plugin_on_bad_request()
    {   let svc = service(Arc::new(InsultPackage));
        let result = tokio_test::block_on(
          svc.generate(&request_of(&[("style", "Pirate")]))
        );
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn test_insult_parameters_list_styles()
    {   let params = InsultPackage.parameters();
        assert_eq!(params[0].name, "topic");
        assert!(params[0].required);
        assert_eq!(params[1].name, "style");
        assert!(!params[1].required);
        assert_eq!(
          params[1].choices.as_deref(),
          Some(&["1920s", "Silly", "Dismissive", "Shakespeare", "Pirate"][..])
        );
        assert_eq!(params[1].default, Some("1920s"));
    }

    #[test]
    fn test_examples_are_valid_requests()
    {   for package in builtin_packages()
        {   let svc = service(Arc::clone(&package));
            for example in package.examples()
            {   assert!(svc.prepare(&example).is_ok());
            }
        }
    }
}
