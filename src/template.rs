//! Prompt templates with `{name}` placeholders

use std::sync::OnceLock;

use indexmap::IndexMap;
use log::trace;
use regex::Regex;

use crate::error::Error;

/// `{{` and `}}` are escaped braces, `{ident}` is a placeholder
fn token_pattern() -> &'static Regex
{   static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
      Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .expect("placeholder pattern is valid")
    })
}

/// An immutable prompt string with named placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PromptTemplate(&'static str);

impl PromptTemplate
{   pub const fn new(text: &'static str) -> Self
    {   PromptTemplate(text)
    }

    pub fn as_str(&self) -> &'static str
    {   self.0
    }

    /// Placeholder names in order of first appearance
    pub fn placeholders(&self) -> Vec<&'static str>
    {   let mut names: Vec<&'static str> = Vec::new();
        for caps in token_pattern().captures_iter(self.0)
        {   if let Some(m) = caps.get(1)
            {   let name = m.as_str();
                if !names.contains(&name)
                {   names.push(name);
                }
            }
        }
        names
    }

    /// Substitute every placeholder from `values`.
    ///
    /// Fails with [`Error::InvalidRequest`] naming every placeholder
    /// that has no value. Extra entries in `values` are ignored.
    pub fn render(
      &self
    , values: &IndexMap<String, String>
    ) -> Result<String, Error>
    {   let missing: Vec<&str> = self.placeholders()
          .into_iter()
          .filter(|name| !values.contains_key(*name))
          .collect();
        if !missing.is_empty()
        {   return Err(Error::InvalidRequest(
              format!("missing value for: {}", missing.join(", "))
            ));
        }

        let mut out = String::with_capacity(self.0.len());
        let mut last = 0;
        for caps in token_pattern().captures_iter(self.0)
        {   let Some(whole) = caps.get(0) else { continue };
            out.push_str(&self.0[last..whole.start()]);
            match caps.get(1)
            {   Some(name) => out.push_str(&values[name.as_str()])
              , None => out.push_str(&whole.as_str()[..1])
            }
            last = whole.end();
        }
        out.push_str(&self.0[last..]);

        trace!("Rendered prompt: {}", out);
        Ok(out)
    }
}

impl std::fmt::Display for PromptTemplate
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.write_str(self.0)
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    fn values(pairs: &[(&str, &str)]) -> IndexMap<String, String>
    {   pairs.iter()
          .map(|(k, v)| (k.to_string(), v.to_string()))
          .collect()
    }

    #[test]
    fn test_placeholders_in_order()
    {   let t = PromptTemplate::new("{b} and {a} then {b} again");
        assert_eq!(t.placeholders(), vec!["b", "a"]);
    }

    #[test]
    fn test_no_placeholders()
    {   let t = PromptTemplate::new("Tell me a joke.");
        assert!(t.placeholders().is_empty());
        assert_eq!(t.render(&IndexMap::new()).unwrap(), "Tell me a joke.");
    }

    #[test]
    fn test_render_repeated_placeholder()
    {   let t = PromptTemplate::new("{x}, {x}!");
        assert_eq!(
          t.render(&values(&[("x", "hey")])).unwrap(),
          "hey, hey!"
        );
    }

    #[test]
    fn test_render_ignores_extra_values()
    {   let t = PromptTemplate::new("Hi {name}.");
        let rendered = t.render(
          &values(&[("name", "Leia"), ("style", "Pirate")])
        ).unwrap();
        assert_eq!(rendered, "Hi Leia.");
    }

    #[test]
    fn test_missing_values_are_all_reported()
    {   let t = PromptTemplate::new("{name} has {trait}");
        let err = t.render(&IndexMap::new()).unwrap_err();
        assert_eq!(
          err,
          Error::InvalidRequest("missing value for: name, trait".to_string())
        );
    }

    #[test]
    fn test_escaped_braces()
    {   let t = PromptTemplate::new("{{literal}} {word}");
        assert_eq!(t.placeholders(), vec!["word"]);
        assert_eq!(
          t.render(&values(&[("word", "ok")])).unwrap(),
          "{literal} ok"
        );
    }

    #[test]
    fn test_values_are_not_reinterpreted()
    {   let t = PromptTemplate::new("about {topic}.");
        let rendered = t.render(&values(&[("topic", "{name}")])).unwrap();
        assert_eq!(rendered, "about {name}.");
    }

    #[test]
    fn test_stray_brace_is_literal()
    {   let t = PromptTemplate::new("a { b } {c}");
        assert_eq!(t.placeholders(), vec!["c"]);
        assert_eq!(t.render(&values(&[("c", "d")])).unwrap(), "a { b } d");
    }
}
