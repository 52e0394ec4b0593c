use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use toolchat::config::{EnvConfig, SessionConfig};
use toolchat::prompt::RustylinePrompt;
use toolchat::providers::configs::{OpenAiProviderConfig, DEFAULT_MODEL};
use toolchat::providers::openai::OpenAiProvider;
use toolchat::registry::ToolRegistry;
use toolchat::session::Session;
use toolchat::shell;
use toolchat::tools::container::{self, ContainerConfig, ContainerExecutor};
use toolchat::tools::weather;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Model to use
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Chat with a model that can run shell commands in a docker container (default)
    Container,
    /// Chat with a model that has a mock weather tool
    Weather,
    /// Run commands in the container yourself, without a model
    Shell,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Container) {
        Command::Container => {
            let executor = ContainerExecutor::new(ContainerConfig::from_env()?);
            let mut registry = ToolRegistry::new();
            registry.register(container::run_in_container_tool(executor))?;
            chat(&cli.model, registry, container::SYSTEM_PROMPT)
        }
        Command::Weather => {
            let mut registry = ToolRegistry::new();
            registry.register(weather::weather_tool())?;
            chat(&cli.model, registry, weather::SYSTEM_PROMPT)
        }
        Command::Shell => shell::run(&ContainerExecutor::new(ContainerConfig::from_env()?)),
    }
}

fn chat(model: &str, registry: ToolRegistry, system_prompt: &str) -> Result<()> {
    // Configuration problems are fatal before the first prompt
    let config = OpenAiProviderConfig::from_env()
        .context("Set OPENAI_API_KEY first")?
        .with_model(model);
    let session_config = SessionConfig::from_env()?;
    let provider = OpenAiProvider::new(config)?;
    let prompt = RustylinePrompt::new()?;

    println!(
        "toolchat {} {}",
        style(provider.model()).bold(),
        style("- type \"exit\" to end the session").dim()
    );
    println!();

    let mut session = Session::new(
        Box::new(provider),
        registry,
        system_prompt,
        Box::new(prompt),
        session_config,
    );
    session.start()
}
