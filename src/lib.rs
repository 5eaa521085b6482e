pub mod error;
pub mod config;
pub mod template;
pub mod registry;
pub mod request;
pub mod client;
pub mod providers;
pub mod package;
pub mod server;

/*

quipster: prompt packages served over HTTP.

Each package owns a fixed prompt template (or a small closed set of
them), a fixed generation config, and a list of named parameters.
A request fills the template and makes exactly one call to the
generation plugin.

quipster/
├── src/
│   ├── lib.rs          # Re-exports
│   ├── error.rs        # Error type shared by every layer
│   ├── config.rs       # Plugin and server configuration
│   ├── template.rs     # `{placeholder}` prompt templates
│   ├── registry.rs     # Template constants and insult styles
│   ├── request.rs      # Request, config and plugin call types
│   ├── client.rs       # TextGenerator trait
│   ├── providers/      # TextGenerator implementations
│   ├── package.rs      # Prompt packages and the generate handler
│   ├── server.rs       # axum routes
│   └── main.rs         # `serve` and `demo` commands
└── tests/

*/

pub use client::TextGenerator;
pub use config::QuipsterConfig;
pub use error::Error;
pub use package::{
  builtin_packages, ComplimentPackage, InsultPackage, PackageService,
  PromptPackage
};
pub use registry::InsultStyle;
pub use request::{GenerationConfig, GenerationRequest, PluginRequest};
pub use template::PromptTemplate;
