//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use copymark_core::CopyPipeline;
use copymark_shared::{AppConfig, CopymarkError, init_config, init_config_in, load_config, load_config_from};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// copymark: add copy-to-clipboard targets to rendered markdown.
#[derive(Parser)]
#[command(
    name = "copymark",
    version,
    about = "Render markdown to HTML with copy targets on code, tables and math.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.copymark/copymark.toml.
    #[arg(long, env = "COPYMARK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Render a markdown file to annotated HTML.
    Annotate {
        /// Markdown file to read.
        file: PathBuf,

        /// Write the HTML here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the copy targets collected from a markdown file as JSON.
    Collect {
        /// Markdown file to read.
        file: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init {
        /// Directory to write into (defaults to ~/.copymark).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr so `annotate` and `collect` output stays clean.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "copymark=warn",
        1 => "copymark=debug",
        _ => "copymark=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Annotate { file, out } => cmd_annotate(config_path, &file, out.as_deref()),
        Command::Collect { file } => cmd_collect(config_path, &file),
        Command::Config { action } => match action {
            ConfigAction::Init { dir } => cmd_config_init(dir.as_deref()),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

fn read_markdown(file: &Path) -> Result<String> {
    let text = std::fs::read_to_string(file).map_err(|e| CopymarkError::io(file, e))?;
    Ok(text)
}

fn cmd_annotate(config_path: Option<&Path>, file: &Path, out: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let markdown = read_markdown(file)?;

    let document = CopyPipeline::from_app_config(&config).annotate(&markdown)?;

    match out {
        Some(out) => {
            std::fs::write(out, &document.html).map_err(|e| CopymarkError::io(out, e))?;
            info!(path = %out.display(), decorated = document.decorated, "annotated HTML written");
        }
        None => print!("{}", document.html),
    }
    Ok(())
}

fn cmd_collect(config_path: Option<&Path>, file: &Path) -> Result<()> {
    let config = resolve_config(config_path)?;
    let markdown = read_markdown(file)?;

    let buckets = CopyPipeline::from_app_config(&config).collect(&markdown);
    println!("{}", serde_json::to_string_pretty(&buckets)?);
    Ok(())
}

fn cmd_config_init(dir: Option<&Path>) -> Result<()> {
    let path = match dir {
        Some(dir) => init_config_in(dir)?,
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
