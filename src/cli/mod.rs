//! Command-line interface for deepseek-reader.
//!
//! Provides scriptable access to DeepSeek conversation exports:
//! - `list`: Filter and sort conversations
//! - `show`: Render one conversation along a chosen branch path
//! - `code`: List or save the code blocks on that path
//! - `tui`: Interactive reader

mod commands;

pub use commands::*;

use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};

use crate::config::{load_config, Config};
use crate::error::Result;
use crate::search::SortOrder;
use crate::util::time::parse_date;
use crate::util::Zone;

/// Reader for DeepSeek conversation exports with branch navigation.
#[derive(Debug, Parser)]
#[command(name = "dsread")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format for structured data.
    #[arg(short = 'o', long, global = true, default_value = "text", env = "DSREAD_OUTPUT")]
    pub output: OutputFormat,

    /// Output as JSON (shorthand for -o json).
    #[arg(long, global = true, env = "DSREAD_JSON")]
    pub json: bool,

    /// Enable colored output (auto-detected by default).
    #[arg(long, global = true, env = "DSREAD_COLOR")]
    pub color: Option<bool>,

    /// Time zone for timestamps and date filters.
    #[arg(long, global = true, env = "DSREAD_TIMEZONE")]
    pub timezone: Option<Zone>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn", env = "DSREAD_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log format (text, json, compact, pretty).
    #[arg(long, global = true, default_value = "text", env = "DSREAD_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Log output file (default: stderr; the TUI only logs to a file).
    #[arg(long, global = true, env = "DSREAD_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Number of threads for parallel filtering (default: number of CPUs).
    #[arg(short = 'j', long, global = true, env = "DSREAD_THREADS")]
    pub threads: Option<usize>,

    /// Path to custom configuration file.
    #[arg(long, global = true, env = "DSREAD_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Log level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Errors, warnings, and informational messages.
    Info,
    /// All of the above plus debug messages.
    Debug,
    /// All messages including trace-level details.
    Trace,
}

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// Structured JSON format for machine consumption.
    Json,
    /// Compact single-line format.
    Compact,
    /// Pretty format with full details.
    Pretty,
}

impl LogLevel {
    /// Convert to tracing filter level.
    #[must_use]
    pub fn to_filter_string(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl Cli {
    /// Get effective output format.
    #[must_use]
    pub fn effective_output(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.output
        }
    }

    /// Whether to emit ANSI colors.
    #[must_use]
    pub fn use_color(&self, config: &Config) -> bool {
        self.color
            .unwrap_or_else(|| config.theme.color && console::colors_enabled())
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List conversations, filtered and sorted.
    #[command(alias = "ls")]
    List(ListArgs),

    /// Render a conversation along its selected branches.
    #[command(alias = "view")]
    Show(ShowArgs),

    /// List or save the code blocks of a conversation.
    Code(CodeArgs),

    /// Launch the interactive reader.
    #[command(alias = "ui")]
    Tui(TuiArgs),

    /// View and modify configuration.
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// Tab-separated values.
    Tsv,
    /// Compact single-line output.
    Compact,
}

/// Arguments for the list command.
#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Export file (`-` for stdin).
    pub file: PathBuf,

    /// Keep conversations whose title or content contains this text.
    #[arg(short = 's', long)]
    pub search: Option<String>,

    /// Keep conversations started on or after this date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date_arg)]
    pub from: Option<NaiveDate>,

    /// Keep conversations started on or before this date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date_arg)]
    pub to: Option<NaiveDate>,

    /// Sort order (default from config).
    #[arg(long)]
    pub sort: Option<SortOrder>,

    /// Limit number of results.
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Export file (`-` for stdin).
    pub file: PathBuf,

    /// Conversation id or unique id prefix.
    pub id: String,

    /// Highlight this text.
    #[arg(short = 's', long)]
    pub search: Option<String>,

    /// One-based alternative to show at each branch point, from the top.
    #[arg(short = 'b', long = "branch", value_parser = clap::value_parser!(usize))]
    pub branches: Vec<usize>,
}

/// Arguments for the code command.
#[derive(Debug, Parser)]
pub struct CodeArgs {
    /// Export file (`-` for stdin).
    pub file: PathBuf,

    /// Conversation id or unique id prefix.
    pub id: String,

    /// One-based alternative to show at each branch point, from the top.
    #[arg(short = 'b', long = "branch")]
    pub branches: Vec<usize>,

    /// Only code blocks in this language.
    #[arg(short = 'l', long)]
    pub lang: Option<String>,

    /// Save each block as `code-<n>.<ext>` in this directory.
    #[arg(long, value_name = "DIR")]
    pub save: Option<PathBuf>,
}

/// Arguments for the tui command.
#[derive(Debug, Parser)]
pub struct TuiArgs {
    /// Export file to open on start.
    pub file: Option<PathBuf>,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Config action to perform.
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommand actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show all configuration values.
    Show,

    /// Get a specific configuration value.
    Get {
        /// Configuration key (e.g., "search.debounce_ms").
        key: String,
    },

    /// Set a configuration value.
    Set {
        /// Configuration key (e.g., "theme.name").
        key: String,
        /// Value to set.
        value: String,
    },

    /// Show configuration file path.
    Path,

    /// Initialize configuration file with defaults.
    Init,

    /// Reset configuration to defaults.
    Reset,
}

/// Arguments for the completions command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// PowerShell.
    Powershell,
    /// Elvish shell.
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::Powershell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

/// Generate shell completions and print to stdout.
pub fn generate_completions(shell: CompletionShell) {
    let mut cmd = Cli::command();
    let shell: Shell = shell.into();
    generate(shell, &mut cmd, "dsread", &mut io::stdout());
}

fn parse_date_arg(raw: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("'{raw}' is not a YYYY-MM-DD date"))
}

/// Initialize tracing/logging based on CLI options.
///
/// The TUI owns the terminal, so without `--log-file` its logs are dropped.
fn init_logging(cli: &Cli) {
    use std::sync::Mutex;
    use tracing_subscriber::{
        fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
        layer::SubscriberExt,
        util::SubscriberInitExt,
        EnvFilter,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_filter_string()));

    let writer = || -> BoxMakeWriter {
        if let Some(path) = &cli.log_file {
            match std::fs::OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => return BoxMakeWriter::new(Mutex::new(file)),
                Err(e) => eprintln!("Warning: Could not open log file {}: {e}", path.display()),
            }
        }
        if matches!(cli.command, Commands::Tui(_)) {
            BoxMakeWriter::new(io::sink)
        } else {
            BoxMakeWriter::new(io::stderr)
        }
    };

    // Build subscriber based on log format
    let result = match cli.log_format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(writer());
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(writer());
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(writer());
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_ansi(cli.log_file.is_none()).with_writer(writer());
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
    };

    if let Err(e) = result {
        eprintln!("Warning: Could not initialize logging: {e}");
    }
}

/// Initialize rayon thread pool with custom thread count if specified.
fn init_thread_pool(threads: Option<usize>) {
    if let Some(num_threads) = threads.filter(|n| *n > 0) {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_thread_pool(cli.threads);
    init_logging(&cli);

    // `config` subcommands must work even when the file is broken.
    if let Commands::Config(args) = &cli.command {
        return commands::config::run(&cli, args);
    }

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(zone) = cli.timezone {
        config.display.timezone = zone;
    }

    match &cli.command {
        Commands::List(args) => commands::list::run(&cli, &config, args),
        Commands::Show(args) => commands::show::run(&cli, &config, args),
        Commands::Code(args) => commands::code::run(&cli, &config, args),
        Commands::Tui(args) => commands::tui::run(&cli, &config, args),
        Commands::Config(args) => commands::config::run(&cli, args),
        Commands::Completions(args) => {
            generate_completions(args.shell);
            Ok(())
        }
    }
}
