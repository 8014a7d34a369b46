pub mod cli;
pub mod config;

pub use cli::{
    build_cli_command, Cli, Commands, HistoryAddArgs, HistoryCommands, OutputFormat,
    TablesCommands,
};
pub use config::{load_config, DerfitConfig, Settings};
