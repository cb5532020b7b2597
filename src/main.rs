mod api;
mod commands;
mod config;
mod conversation;
mod download;
mod error;
mod events;
mod logging;
mod ui;

use anyhow::Result;
use api::HttpApi;
use clap::{Parser, Subcommand};
use config::Config;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "imgchat")]
#[command(version)]
#[command(about = "Chat assistant with inline image generation", long_about = None)]
struct Cli {
    /// Config file (default: ~/.imgchat/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the text-completion endpoint
    #[arg(long, global = true)]
    text_endpoint: Option<String>,

    /// Override the image-generation endpoint
    #[arg(long, global = true)]
    image_endpoint: Option<String>,

    /// Tracing filter, e.g. `debug` or `imgchat=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single prompt and print the reply
    Say {
        /// Download a generated image as well
        #[arg(long)]
        save: bool,
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Write the default config file
    Init,
    /// Print the resolved configuration
    Config,
}

impl Cli {
    fn apply_to(&self, config: &mut Config) {
        if let Some(url) = &self.text_endpoint {
            config.text_endpoint = url.clone();
        }
        if let Some(url) = &self.image_endpoint {
            config.image_endpoint = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    if let Err(err) = Config::log_path().and_then(|path| logging::init(&path, &config.log_level)) {
        eprintln!("Warning: logging to file is disabled: {:#}", err);
    }

    let mut stdout = std::io::stdout();
    match &cli.command {
        None => {
            let api = Arc::new(HttpApi::new(&config)?);
            ui::run(&config, api).await
        }
        Some(Commands::Say { save, prompt }) => {
            let api = HttpApi::new(&config)?;
            commands::say(&config, &api, &prompt.join(" "), *save, &mut stdout).await
        }
        Some(Commands::Init) => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => Config::default_path()?,
            };
            commands::init_config(&path, &mut stdout)
        }
        Some(Commands::Config) => commands::show_config(&config, &mut stdout),
    }
}
