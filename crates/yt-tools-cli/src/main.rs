//! YouTube Tools: entry point.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use yt_tools::VideoQuality;
use yt_tools_cli::cli::{self, download_cmd::DownloadOptions, transcript_cmd::TranscriptOptions};
use yt_tools_cli::config::resolve_settings_path;

#[derive(Parser)]
#[command(
    name = "yt-tools",
    about = "YouTube Tools — copy video transcripts and fetch downloads via Cobalt",
    version,
    after_help = "Run 'yt-tools <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Path to the settings file.
    #[arg(long, global = true)]
    settings: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire a video's transcript
    Transcript {
        /// Watch page URL (https://www.youtube.com/watch?v=...)
        url: String,
        /// Copy to the clipboard instead of printing
        #[arg(long)]
        copy: bool,
        /// Read the static page only, never launching Chromium
        #[arg(long)]
        no_browser: bool,
        /// Wait after opening the transcript panel, in milliseconds
        #[arg(long, default_value = "2000")]
        wait_ms: u64,
        /// On Linux, seconds to keep serving a copied transcript (0 to exit at once)
        #[arg(long, default_value = "30")]
        hold_secs: u64,
    },
    /// Get a download link from Cobalt
    Download {
        /// Watch page URL
        url: String,
        /// Audio only
        #[arg(long)]
        audio: bool,
        /// Video quality (max, 2160, 1440, 1080, 720, 480, 360, 240, 144)
        #[arg(long, default_value = "max")]
        quality: VideoQuality,
        /// Use the Cobalt web tool instead of the API
        #[arg(long)]
        web: bool,
        /// Open the resulting link in the default browser
        #[arg(long)]
        open: bool,
        /// Cobalt API endpoint
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Check whether a newer version is published
    CheckUpdate {
        /// Check even if one ran in the last 24 hours
        #[arg(long)]
        force: bool,
        /// Skip the available version
        #[arg(long)]
        skip: bool,
    },
    /// Inspect or edit stored settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print one value
    Get { key: String },
    /// Store a value (parsed as JSON, else kept as a string)
    Set { key: String, value: String },
    /// Remove a value
    Remove { key: String },
    /// List all values
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var(cli::output::JSON_ENV, "1");
    }
    if cli.quiet {
        std::env::set_var(cli::output::QUIET_ENV, "1");
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings_path = resolve_settings_path(cli.settings.as_deref());

    let result = match cli.command {
        Commands::Transcript {
            url,
            copy,
            no_browser,
            wait_ms,
            hold_secs,
        } => {
            let opts = TranscriptOptions {
                copy,
                no_browser,
                wait_ms,
                hold_secs,
            };
            cli::transcript_cmd::run(&url, &opts).await
        }
        Commands::Download {
            url,
            audio,
            quality,
            web,
            open,
            endpoint,
        } => {
            let opts = DownloadOptions {
                audio,
                quality,
                web,
                open,
                endpoint,
            };
            cli::download_cmd::run(&url, &opts).await
        }
        Commands::CheckUpdate { force, skip } => {
            cli::update_cmd::run(&settings_path, force, skip).await
        }
        Commands::Settings { action } => match action {
            SettingsAction::Get { key } => cli::settings_cmd::run_get(&settings_path, &key),
            SettingsAction::Set { key, value } => {
                cli::settings_cmd::run_set(&settings_path, &key, &value)
            }
            SettingsAction::Remove { key } => cli::settings_cmd::run_remove(&settings_path, &key),
            SettingsAction::List => cli::settings_cmd::run_list(&settings_path),
        },
        Commands::Doctor => cli::doctor::run(&settings_path).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "yt-tools", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
