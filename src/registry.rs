//! Fixed prompt templates and the insult style enumeration

use crate::template::PromptTemplate;

pub const GREETING: PromptTemplate = PromptTemplate::new(
  "Say an unusual greeting to {name}. Compliment them on their {trait}."
);

// Insult prompts. They're surprisingly simple.

pub const DISMISSIVE: PromptTemplate = PromptTemplate::new(
  "Please create a backhanded insult about {topic}. \
   The insult should be subtle and dismissive."
);

pub const CLASSY: PromptTemplate = PromptTemplate::new(
  "Please create a classy 1920s style insult about {topic}. \
   The insult feel like dated English from another time."
);

pub const SILLY: PromptTemplate = PromptTemplate::new(
  "Please create a silly insult about {topic}. \
   The insult should make a young child giggle and sound like a Dr. Seuss quote.."
);

pub const SHAKESPEARE: PromptTemplate = PromptTemplate::new(
  "Please create a Shakespeare insult about {topic}. \
   The insult should sound as if it comes from a Shakespearean play."
);

pub const PIRATE: PromptTemplate = PromptTemplate::new(
  "Arr Matey! Please create a pirate style insult about {topic}. \
   The insult should sound as from the deck of a pirate ship."
);

/// Closed set of insult styles. [`InsultStyle::as_str`] gives the
/// wire value (`"1920s"`, `"Silly"`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InsultStyle
{   #[default]
    Classy
  , Silly
  , Dismissive
  , Shakespeare
  , Pirate
}

impl InsultStyle
{   pub const ALL: [InsultStyle; 5] = [
      InsultStyle::Classy
    , InsultStyle::Silly
    , InsultStyle::Dismissive
    , InsultStyle::Shakespeare
    , InsultStyle::Pirate
    ];

    /// Wire value shown to callers
    pub fn as_str(&self) -> &'static str
    {   match self
        {   InsultStyle::Classy => "1920s"
          , InsultStyle::Silly => "Silly"
          , InsultStyle::Dismissive => "Dismissive"
          , InsultStyle::Shakespeare => "Shakespeare"
          , InsultStyle::Pirate => "Pirate"
        }
    }

    fn variant_name(&self) -> &'static str
    {   match self
        {   InsultStyle::Classy => "classy"
          , InsultStyle::Silly => "silly"
          , InsultStyle::Dismissive => "dismissive"
          , InsultStyle::Shakespeare => "shakespeare"
          , InsultStyle::Pirate => "pirate"
        }
    }

    /// Look up a style by wire value or variant name, ignoring case.
    /// Absent or unknown keys select [`InsultStyle::Classy`].
    pub fn from_key(key: Option<&str>) -> InsultStyle
    {   let Some(key) = key.map(str::trim)
        else
        {   return InsultStyle::default();
        };
        InsultStyle::ALL
          .into_iter()
          .find(|s| {
            s.as_str().eq_ignore_ascii_case(key)
              || s.variant_name().eq_ignore_ascii_case(key)
          })
          .unwrap_or_default()
    }

    pub fn template(&self) -> PromptTemplate
    {   match self
        {   InsultStyle::Classy => CLASSY
          , InsultStyle::Silly => SILLY
          , InsultStyle::Dismissive => DISMISSIVE
          , InsultStyle::Shakespeare => SHAKESPEARE
          , InsultStyle::Pirate => PIRATE
        }
    }
}

impl std::fmt::Display for InsultStyle
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.write_str(self.as_str())
    }
}
