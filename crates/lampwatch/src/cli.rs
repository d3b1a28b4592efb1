//! Clap derive structures for the `lampwatch` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lampwatch -- watch and control a smart study lamp
#[derive(Debug, Parser)]
#[command(
    name = "lampwatch",
    version,
    about = "Monitor posture, eye use and mood from a smart study lamp",
    long_about = "Command-line client for the smart study-lamp backend.\n\n\
        Reads device, posture, eye and emotion telemetry, drives the light,\n\
        and controls the analysis dashboard server.",
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
    /// Lamp API root, e.g. http://lamp.local:5000/api (overrides config)
    #[arg(long, env = "LAMPWATCH_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Dashboard server root (overrides config)
    #[arg(long, env = "LAMPWATCH_DASHBOARD_URL", global = true)]
    pub dashboard_url: Option<String>,

    /// Output format [default: table, or `output` from the config file]
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in milliseconds (overrides config)
    #[arg(long, value_name = "MS", global = true)]
    pub timeout: Option<u64>,
}

// ── Output ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Device identity, status and light settings
    #[command(alias = "dev")]
    Device(DeviceArgs),

    /// Posture, eye and emotion telemetry
    #[command(alias = "mon")]
    Monitor(MonitorArgs),

    /// Drive the light directly
    Light(LightArgs),

    /// Trigger a voiced reminder on the lamp
    Remind(RemindArgs),

    /// Start, stop and inspect the analysis pipeline
    Analysis(AnalysisArgs),

    /// Generate an analysis report
    Report(ReportArgs),

    /// Stream realtime telemetry
    Watch(WatchArgs),

    /// Run the dashboard poll loop and print status changes
    Dashboard(DashboardArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DeviceArgs {
    #[command(subcommand)]
    pub command: DeviceCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// Device identity (model, firmware, MAC)
    Info,

    /// Online state, battery and charging
    Status,

    /// Current light settings
    Settings,

    /// Update light settings; only the given fields are sent
    Set(SettingsPatchArgs),
}

#[derive(Debug, Args)]
pub struct SettingsPatchArgs {
    /// Brightness in percent
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub brightness: Option<u8>,

    /// Colour temperature in kelvin
    #[arg(long, value_name = "KELVIN", value_parser = clap::value_parser!(u32).range(2700..=6500))]
    pub color_temperature: Option<u32>,

    /// Let the lamp adjust to ambient light
    #[arg(long, action = clap::ArgAction::Set)]
    pub auto_adjust: Option<bool>,

    /// Switch the light on or off
    #[arg(long, action = clap::ArgAction::Set)]
    pub power: Option<bool>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MONITOR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MonitorArgs {
    #[command(subcommand)]
    pub command: MonitorCommand,
}

#[derive(Debug, Subcommand)]
pub enum MonitorCommand {
    /// Current posture score and warnings
    Posture,

    /// Posture summary for a time window
    History {
        #[arg(long, short = 'r', value_enum, default_value = "day")]
        range: RangeArg,
    },

    /// Poor-posture counts per time bucket
    Distribution {
        #[arg(long, short = 'r', value_enum, default_value = "day")]
        range: RangeArg,
    },

    /// Captured posture frames
    Images {
        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, short = 'l', default_value = "12")]
        limit: u32,
    },

    /// Improvement advice
    Improvement,

    /// Eye distance and screen time
    Eye,

    /// Current emotion and recent history
    Emotion,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RangeArg {
    Day,
    Week,
    Month,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LIGHT / REMIND
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LightArgs {
    #[command(subcommand)]
    pub command: LightCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightCommand {
    /// Set brightness in percent
    Brightness {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percent: u8,
    },

    /// Set colour temperature in kelvin
    Color {
        #[arg(value_parser = clap::value_parser!(u32).range(2700..=6500))]
        kelvin: u32,
    },

    /// Switch the light on or off
    Power {
        #[arg(value_enum)]
        state: PowerState,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PowerState {
    On,
    Off,
}

#[derive(Debug, Args)]
pub struct RemindArgs {
    #[arg(value_enum)]
    pub kind: ReminderArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReminderArg {
    /// Take a break and rest the eyes
    Vision,
    /// Sit up straight
    Posture,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ANALYSIS / REPORT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AnalysisArgs {
    #[command(subcommand)]
    pub command: AnalysisCommand,
}

#[derive(Debug, Subcommand)]
pub enum AnalysisCommand {
    /// Start posture and emotion analysis
    Start,
    /// Stop analysis
    Stop,
    /// Poll the pipeline status once
    Status,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[arg(value_enum)]
    pub kind: ReportArg,

    /// Print the server-written summary instead of the rendered report
    #[arg(long)]
    pub summary: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportArg {
    Daily,
    Weekly,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH / DASHBOARD
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Exit after this many messages
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Also start analysis and live data collection
    #[arg(long)]
    pub monitor: bool,

    /// Exit after this many seconds
    #[arg(long, value_name = "SECS")]
    pub duration: Option<u64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
