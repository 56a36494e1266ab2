use anyhow::Result;
use clap::{Parser, Subcommand};
use menumap_common::observability::{init_logging, LogConfig};
use menumap_config::{MenumapConfig, MenumapConfigLoader};
use menumap_web::capture::FantocciniCapturer;
use std::path::PathBuf;

mod capture;
mod extract;

#[derive(Parser)]
#[command(
    name = "menumap",
    version,
    about = "Capture a web page and extract its navigation menu as structured JSON"
)]
struct Cli {
    /// Path to a YAML config file; a missing file falls back to defaults.
    #[arg(long, global = true, default_value = "menumap.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Capture a page: full-page screenshot, DOM dump, link coordinates.
    Capture {
        /// Override the configured target URL.
        #[arg(long)]
        url: Option<String>,
    },
    /// Extract the navigation menu from a saved DOM via the Gemini API.
    Extract {
        /// Override the configured DOM input file.
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging first so config problems are visible too.
    init_logging(LogConfig {
        emit_stderr: true,
        ..LogConfig::default()
    })?;

    let mut cfg: MenumapConfig = MenumapConfigLoader::new().with_file(&cli.config).load()?;

    match cli.command {
        Command::Capture { url } => {
            if let Some(url) = url {
                cfg.capture.url = url;
            }
            capture::run(&cfg.capture, &FantocciniCapturer).await
        }
        Command::Extract { input } => {
            if let Some(input) = input {
                cfg.extract.html_path = input;
            }
            extract::run(&cfg.extract).await
        }
    }
}
