//! gptcall CLI - GPT-3 completions from the command line

use anyhow::Context;
use clap::{Parser, Subcommand};
use gptcall_core::completions::{CompletionClient, CompletionSettings, Engine};
use gptcall_core::config::Config;
use tracing::debug;

#[derive(Parser)]
#[command(name = "gptcall")]
#[command(author, version, about = "GPT-3 completions from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Quiet mode (completion text only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Request completions for a prompt
    Complete {
        /// The prompt to complete
        prompt: String,
        /// Engine to use (davinci, curie, babbage, ada)
        #[arg(short, long)]
        engine: Option<String>,
        /// Maximum tokens to generate
        #[arg(long)]
        max_tokens: Option<u32>,
        /// Sampling temperature (clamped to 0..=1)
        #[arg(short, long)]
        temperature: Option<f32>,
        /// Nucleus sampling parameter (clamped to 0..=1)
        #[arg(long)]
        top_p: Option<f32>,
        /// Number of completions to return
        #[arg(short, long)]
        num_completions: Option<u32>,
        /// Server-side candidates generated before selection
        #[arg(long)]
        best_of: Option<u32>,
        /// Prefix concatenated in front of the prompt
        #[arg(long)]
        start: Option<String>,
        /// Stop sequence
        #[arg(long)]
        stop: Option<String>,
        /// Presence penalty (omitted when zero)
        #[arg(long)]
        presence_penalty: Option<f32>,
        /// Frequency penalty (omitted when zero)
        #[arg(long)]
        frequency_penalty: Option<f32>,
    },

    /// List available engines
    Engines,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the current configuration (API key redacted)
    Show,
    /// Store an API key in the config file and select it as the source
    SetKey {
        /// The API key to store
        key: String,
    },
    /// Select the API key source: true = OPENAI_API_KEY, false = stored key
    UseEnv {
        #[arg(action = clap::ArgAction::Set, value_parser = clap::value_parser!(bool))]
        value: bool,
    },
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gptcall=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Complete {
            prompt,
            engine,
            max_tokens,
            temperature,
            top_p,
            num_completions,
            best_of,
            start,
            stop,
            presence_penalty,
            frequency_penalty,
        } => {
            let config = Config::load()?;

            let engine = match engine {
                Some(name) => name.parse::<Engine>()?,
                None => config.defaults.engine,
            };

            let mut settings = config.defaults.settings.clone();
            if let Some(v) = max_tokens {
                settings.max_tokens = v;
            }
            if let Some(v) = temperature {
                settings.temperature = v;
            }
            if let Some(v) = top_p {
                settings.top_p = v;
            }
            if let Some(v) = num_completions {
                settings.num_completions = v;
                // Keep best_of valid when only -n was raised
                if settings.best_of < v && best_of.is_none() {
                    settings.best_of = v;
                }
            }
            if let Some(v) = best_of {
                settings.best_of = v;
            }
            if let Some(v) = start {
                settings.start_sequence = v;
            }
            if let Some(v) = stop {
                settings.stop_sequence = v;
            }
            if let Some(v) = presence_penalty {
                settings.presence_penalty = v;
            }
            if let Some(v) = frequency_penalty {
                settings.frequency_penalty = v;
            }

            let api_key = config.api.resolved_api_key()?;
            let client = CompletionClient::builder()
                .api_key(api_key)
                .timeout_secs(config.api.timeout_secs)
                .build()?;

            debug!(engine = %engine, "Requesting completions");
            let completions = client.complete(engine, &prompt, &settings).await?;

            for (i, completion) in completions.iter().enumerate() {
                if cli.quiet {
                    println!("{}", completion.text);
                } else {
                    println!("[{}] {}", completion.index.unwrap_or(i), completion.text);
                    if let Some(reason) = completion.finish_reason {
                        println!("    finish_reason: {}", reason);
                    }
                }
            }
            Ok(())
        }

        Commands::Engines => {
            for engine in Engine::all() {
                println!("{:<10} {}", engine.as_path(), engine.display_name());
            }
            Ok(())
        }

        Commands::Config { action } => cmd_config(action),
    }
}

fn cmd_config(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!(
                "api_key:      {}",
                config.api.redacted_api_key().as_deref().unwrap_or("(not set)")
            );
            println!("use_env_key:  {}", config.api.use_env_key);
            println!("timeout_secs: {}", config.api.timeout_secs);
            println!("engine:       {}", config.defaults.engine);
            println!("max_tokens:   {}", config.defaults.settings.max_tokens);
            println!("temperature:  {}", config.defaults.settings.temperature);
            Ok(())
        }
        ConfigAction::SetKey { key } => {
            let mut config = Config::load()?;
            config.api.api_key = Some(key);
            config.api.use_env_key = false;
            config.save()?;
            println!("API key stored. Source set to the config file.");
            Ok(())
        }
        ConfigAction::UseEnv { value } => {
            let mut config = Config::load()?;
            config.api.use_env_key = value;
            config.save()?;
            println!("use_env_key set to {}", value);
            Ok(())
        }
        ConfigAction::Path => {
            let path = Config::config_path().context("Could not resolve config path")?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
