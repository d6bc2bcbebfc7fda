//! Clap derive structures for the `erovinieta` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// erovinieta -- vignette and bridge-toll status from the eRovinieta portal
#[derive(Debug, Parser)]
#[command(
    name = "erovinieta",
    version,
    about = "Track Romanian road vignettes and bridge-toll crossings",
    long_about = "Polls the eRovinieta portal for your account's vehicles, vignette\n\
        validity, Fetesti-Cernavoda bridge crossings and purchase history.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "EROVINIETA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Portal username (overrides profile)
    #[arg(long, short = 'u', env = "EROVINIETA_USERNAME", global = true)]
    pub username: Option<String>,

    /// Portal application root (overrides profile)
    #[arg(long, env = "EROVINIETA_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Poll interval in seconds (300-86400)
    #[arg(long, global = true)]
    pub interval: Option<u64>,

    /// Years of transaction history to request (1-10)
    #[arg(long, global = true)]
    pub history_years: Option<u8>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "EROVINIETA_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "EROVINIETA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll continuously, printing values after every refresh (Ctrl-C stops)
    Run,

    /// Poll once and print every value
    #[command(alias = "st")]
    Status,

    /// Poll once and dump the raw snapshot
    Snapshot,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Store the active profile's password in the system keyring
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
