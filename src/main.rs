mod demo;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};

use quipster::providers::OpenAiPlugin;
use quipster::{builtin_packages, server, PackageService, QuipsterConfig, TextGenerator};

#[derive(Parser, Debug)]
#[command(name = "quipster", version, about = "Prompt packages for compliments and insults")]
struct Cli
{   /// JSON config file; defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{   /// Serve every package at POST /{package}/generate
    Serve
    {   /// Address to listen on (overrides config)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Try a package interactively in the terminal
    Demo
    {   /// Package name: compliment or insult
        package: String,
    },
}

async fn shutdown_signal()
{   if tokio::signal::ctrl_c().await.is_ok()
    {   info!("Ctrl-C received, shutting down");
    }
}

#[tokio::main]
async fn main() -> Result<()>
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).init();

    let args = Cli::parse();
    let mut config = QuipsterConfig::load(args.config.as_deref())
      .context("failed to load configuration")?;

    let plugin = Arc::new(OpenAiPlugin::from_config(&config.plugin)?);
    let client: Arc<dyn TextGenerator> = plugin.clone();
    let services: Vec<PackageService> = builtin_packages()
      .into_iter()
      .map(|p| PackageService::new(p, Arc::clone(&client)))
      .collect();

    let outcome = match args.command
    {   Commands::Serve { bind } => {
          if let Some(bind) = bind
          {   config.server.bind = bind;
          }
          let listener = tokio::net::TcpListener::bind(&config.server.bind)
            .await
            .with_context(|| format!("cannot bind {}", config.server.bind))?;
          server::serve(listener, server::router(services), shutdown_signal())
            .await
            .map_err(anyhow::Error::from)
        }
      , Commands::Demo { package } => {
          let service = services
            .iter()
            .find(|s| s.package().name().eq_ignore_ascii_case(&package))
            .ok_or_else(|| {
              anyhow!("unknown package `{}` (try compliment or insult)", package)
            })?;
          demo::run(service).await
        }
    };

    if let Err(e) = plugin.shutdown()
    {   debug!("Plugin shutdown: {}", e);
    }
    outcome
}
