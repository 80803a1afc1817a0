use std::path::PathBuf;

use clap::{Parser, Subcommand};
use quire_core::kernel::constants::ROOT_ENV_VAR;
use quire_core::{Application, KernelError};

/// Quire: a flat-file site engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Site root directory (contains `site/`)
    #[arg(long, env = ROOT_ENV_VAR, default_value = ".")]
    pub root: PathBuf,

    /// Read the site config from this file instead of `site/config/site.yaml`
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print "pong" and exit without booting
    #[arg(long)]
    pub ping: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Boot the site and print a summary
    Check,
    /// Read values from the site registry
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Inspect site plugins
    Plugins {
        #[command(subcommand)]
        command: PluginsCommand,
    },
    /// Print the source of a page
    Page {
        /// Page url; empty for the main page
        #[arg(default_value = "")]
        slug: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the value at a dotted path, e.g. `site.charset`
    Get { path: String },
    /// List the top-level registry keys
    Keys,
}

#[derive(Subcommand, Debug)]
pub enum PluginsCommand {
    /// List enabled plugins in load order, then disabled ones
    List,
}

/// Outcome of a command that ran against a booted site.
pub enum Outcome {
    Done,
    /// The command ran but found nothing; exit non-zero.
    NotFound(String),
}

pub async fn run(app: &Application, command: Option<Commands>) -> Result<Outcome, KernelError> {
    match command.unwrap_or(Commands::Check) {
        Commands::Check => {
            print_summary(app);
            Ok(Outcome::Done)
        }
        Commands::Config { command: ConfigCommand::Get { path } } => {
            let registry = app.registry().read().await;
            match registry.get(&path) {
                Some(serde_json::Value::String(s)) => println!("{}", s),
                Some(value) => println!("{}", serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())),
                None => return Ok(Outcome::NotFound(format!("'{}' is not set", path))),
            }
            Ok(Outcome::Done)
        }
        Commands::Config { command: ConfigCommand::Keys } => {
            for key in app.registry().read().await.keys() {
                println!("{}", key);
            }
            Ok(Outcome::Done)
        }
        Commands::Plugins { command: PluginsCommand::List } => {
            let plugins = app.plugins().plugins().await;
            let disabled = app.plugins().disabled().await;
            if plugins.is_empty() && disabled.is_empty() {
                println!("No plugins installed.");
            }
            for manifest in plugins {
                println!(
                    "  - {} ({}) v{} priority {} [enabled]",
                    manifest.name, manifest.id, manifest.version, manifest.priority
                );
            }
            for id in disabled {
                println!("  - {} [disabled]", id);
            }
            Ok(Outcome::Done)
        }
        Commands::Page { slug } => {
            let page = app.content().read_page(&slug)?;
            print!("{}", page.source);
            Ok(Outcome::Done)
        }
    }
}

fn print_summary(app: &Application) {
    let mode = if app.is_development() { "development" } else { "production" };
    println!("Site root:  {}", app.paths().root().display());
    println!("Charset:    {}", app.charset());
    println!("Timezone:   {}", app.timezone());
    println!("Mode:       {}", mode);
    println!("Theme:      {}", app.themes().current());
    println!("Components: {}", app.component_names().join(", "));
}
