use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use std::path::PathBuf;

use derfit_algo::VerdictFormat;

#[derive(Parser, Debug)]
#[command(
    name = "derfit",
    author,
    version,
    about = "Check solar kits against grid connection categories",
    long_about = None
)]
pub struct Cli {
    /// Set the logging level (defaults to the configured level, then info)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    /// Configuration file (defaults to ~/.derfit/config/derfit.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub tables: TableArgs,

    /// Project history log (CSV)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub history: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the reference table locations.
#[derive(Args, Debug, Clone, Default)]
pub struct TableArgs {
    /// Directory holding municipios.csv, disjuntores.csv and potencia_maxima.csv
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub tables_dir: Option<PathBuf>,

    /// Municipality to voltage table
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub municipalities: Option<PathBuf>,

    /// Category to installed load range table
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub categories: Option<PathBuf>,

    /// Category to maximum generation power table
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub ceilings: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether a kit fits the customer's connection category
    Analyze {
        /// Customer city
        #[arg(long)]
        city: String,
        /// Phase type (Monofásico, Bifásico, Trifásico or single/two/three)
        #[arg(long)]
        phase: String,
        /// Installed load in kW
        #[arg(long)]
        load: f64,
        /// Kit power, e.g. "5,5 kWp"
        #[arg(long)]
        kit: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Reference table utilities
    Tables {
        #[command(subcommand)]
        command: TablesCommands,
    },
    /// Project update log
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write to this file, or into this directory under the shell's conventional name
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TablesCommands {
    /// Load the reference tables and report counts and data-quality issues
    Check {
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Show a city's voltage and the category rows available there
    Lookup {
        #[arg(long)]
        city: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// Record a project update
    Add(HistoryAddArgs),
    /// List recorded updates
    List {
        /// Client name substring
        #[arg(long)]
        client: Option<String>,
        #[arg(long)]
        city: Option<String>,
        /// Earliest send date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest send date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Edit the follow-up fields of a recorded update
    Edit {
        /// Record index as shown by `history list`
        index: usize,
        /// Notion comment
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        observation: Option<String>,
        #[arg(long)]
        current_kit_power: Option<String>,
        #[arg(long)]
        current_kit_panels: Option<String>,
        #[arg(long)]
        current_kit_inverter: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct HistoryAddArgs {
    #[arg(long)]
    pub client: String,
    /// Send date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub phase: String,
    /// Installed load in kW
    #[arg(long)]
    pub load: f64,

    #[arg(long, default_value = "")]
    pub installed_kit_power: String,
    #[arg(long, default_value = "")]
    pub installed_kit_panels: String,
    #[arg(long, default_value = "")]
    pub installed_kit_inverter: String,

    #[arg(long, default_value = "")]
    pub shipped_kit_power: String,
    #[arg(long, default_value = "")]
    pub shipped_kit_panels: String,
    #[arg(long, default_value = "")]
    pub shipped_kit_inverter: String,

    /// Notion comment
    #[arg(long, default_value = "")]
    pub comment: String,

    #[arg(long, default_value = "")]
    pub current_kit_power: String,
    #[arg(long, default_value = "")]
    pub current_kit_panels: String,
    #[arg(long, default_value = "")]
    pub current_kit_inverter: String,

    #[arg(long, default_value = "")]
    pub observation: String,

    /// Fill the observation with the verdict for the shipped (or installed) kit
    #[arg(long)]
    pub analyze: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

impl From<OutputFormat> for VerdictFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Plain => VerdictFormat::Plain,
            OutputFormat::Json => VerdictFormat::Json,
        }
    }
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
