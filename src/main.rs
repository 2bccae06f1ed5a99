use anyhow::Context;
use chat_widget::WidgetConfig;
use chat_widget::render::render_embed;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "chat-widget",
    about = "Render and inspect embeddable chat widget configurations"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a config file and write the embeddable snippet.
    Render {
        /// TOML file with widget overrides; defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output path; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Resolve a config file and print the effective configuration.
    Check {
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Render { config, out } => {
            let cfg = load_config(config.as_deref())?;
            let embed = render_embed(&cfg);
            match out {
                Some(path) => {
                    std::fs::write(&path, embed)
                        .with_context(|| format!("writing embed snippet to {}", path.display()))?;
                    tracing::info!(path = %path.display(), "embed snippet written");
                }
                None => print!("{embed}"),
            }
        }
        Command::Check { config } => {
            let cfg = load_config(Some(&config))?;
            println!("{cfg:#?}");
        }
    }
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<WidgetConfig> {
    match path {
        Some(path) => WidgetConfig::from_toml_file(path)
            .with_context(|| format!("resolving config {}", path.display())),
        None => Ok(WidgetConfig::default()),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
