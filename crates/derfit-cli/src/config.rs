//! Configuration for the derfit CLI
//! Default location: ~/.derfit/config/derfit.toml

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use derfit_core::EscalationMap;
use derfit_io::ReferenceSources;

use crate::cli::Cli;

/// Main derfit configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DerfitConfig {
    /// Reference table locations
    #[serde(default)]
    pub tables: TablesConfig,
    /// Project history log
    #[serde(default)]
    pub history: HistoryConfig,
    /// Category codes admitted by each phase type
    #[serde(default)]
    pub escalation: EscalationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesConfig {
    #[serde(default = "default_municipalities")]
    pub municipalities: PathBuf,
    #[serde(default = "default_categories")]
    pub categories: PathBuf,
    #[serde(default = "default_ceilings")]
    pub ceilings: PathBuf,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            municipalities: default_municipalities(),
            categories: default_categories(),
            ceilings: default_ceilings(),
        }
    }
}

fn default_municipalities() -> PathBuf {
    PathBuf::from("data/municipios.csv")
}

fn default_categories() -> PathBuf {
    PathBuf::from("data/disjuntores.csv")
}

fn default_ceilings() -> PathBuf {
    PathBuf::from("data/potencia_maxima.csv")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_history_path(),
        }
    }
}

fn default_history_path() -> PathBuf {
    PathBuf::from("atualizacoes_projetos.csv")
}

/// Codes or code prefixes per phase type. A prefix is a code ending in a letter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    #[serde(default = "default_single")]
    pub single: Vec<String>,
    #[serde(default = "default_two")]
    pub two: Vec<String>,
    #[serde(default = "default_three")]
    pub three: Vec<String>,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            single: default_single(),
            two: default_two(),
            three: default_three(),
        }
    }
}

impl EscalationConfig {
    pub fn to_map(&self) -> EscalationMap {
        EscalationMap::new(&self.single, &self.two, &self.three)
    }
}

fn default_single() -> Vec<String> {
    vec!["M".to_string()]
}

fn default_two() -> Vec<String> {
    vec!["B".to_string()]
}

fn default_three() -> Vec<String> {
    vec!["T".to_string()]
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DerfitConfig {
    /// Configured log level, if it names one.
    pub fn log_level(&self) -> Option<tracing::Level> {
        self.logging.level.trim().parse().ok()
    }
}

/// Get the derfit home directory (defaults to ~/.derfit)
pub fn derfit_home() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| anyhow!("Cannot determine home directory"))
        .map(|h| h.join(".derfit"))
}

/// Location: ~/.derfit/config/derfit.toml
pub fn derfit_config_path() -> Result<PathBuf> {
    Ok(derfit_home()?.join("config").join("derfit.toml"))
}

/// Load the configuration from an explicit path, or from the default location.
///
/// An explicit path must exist; a missing default file yields the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<DerfitConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = derfit_config_path()?;
            if !path.exists() {
                return Ok(DerfitConfig::default());
            }
            path
        }
    };
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("parsing config file {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<DerfitConfig> {
    Ok(toml::from_str(contents)?)
}

/// Effective settings after applying command-line overrides to the configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub sources: ReferenceSources,
    pub history: PathBuf,
    pub escalation: EscalationMap,
}

impl Settings {
    /// Individual file flags beat `--tables-dir`, which beats the config file.
    pub fn resolve(cli: &Cli, config: &DerfitConfig) -> Self {
        let base = match &cli.tables.tables_dir {
            Some(dir) => ReferenceSources::in_dir(dir),
            None => ReferenceSources::new(
                &config.tables.municipalities,
                &config.tables.categories,
                &config.tables.ceilings,
            ),
        };
        let sources = ReferenceSources {
            municipalities: cli
                .tables
                .municipalities
                .clone()
                .unwrap_or(base.municipalities),
            categories: cli.tables.categories.clone().unwrap_or(base.categories),
            ceilings: cli.tables.ceilings.clone().unwrap_or(base.ceilings),
        };
        Self {
            sources,
            history: cli
                .history
                .clone()
                .unwrap_or_else(|| config.history.path.clone()),
            escalation: config.escalation.to_map(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use derfit_core::PhaseType;

    #[test]
    fn test_config_path_under_derfit_home() {
        let path = derfit_config_path().unwrap();
        assert!(path.to_string_lossy().contains(".derfit/config"));
        assert!(path.to_string_lossy().ends_with("derfit.toml"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.tables.categories, PathBuf::from("data/disjuntores.csv"));
        assert_eq!(config.history.path, PathBuf::from("atualizacoes_projetos.csv"));
        assert_eq!(config.escalation.to_map(), EscalationMap::default());
        assert_eq!(config.log_level(), Some(tracing::Level::INFO));
    }

    #[test]
    fn test_partial_config() {
        let config = parse_config(
            r#"
[tables]
ceilings = "/srv/ref/potencia.csv"

[escalation]
two = ["B1", "B2"]

[logging]
level = "debug"
"#,
        )
        .unwrap();
        assert_eq!(config.tables.ceilings, PathBuf::from("/srv/ref/potencia.csv"));
        assert_eq!(config.tables.municipalities, PathBuf::from("data/municipios.csv"));
        let map = config.escalation.to_map();
        assert!(map.admits(PhaseType::Two, "B2"));
        assert!(!map.admits(PhaseType::Two, "B3"));
        assert!(map.admits(PhaseType::Single, "M4"));
        assert_eq!(config.log_level(), Some(tracing::Level::DEBUG));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(parse_config("[tables]\nceilings = 3").is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "derfit",
            "--tables-dir",
            "/ref",
            "--ceilings",
            "/other/ceilings.csv",
            "--history",
            "log.csv",
            "tables",
            "check",
        ])
        .unwrap();
        let settings = Settings::resolve(&cli, &DerfitConfig::default());
        assert_eq!(settings.sources.municipalities, PathBuf::from("/ref/municipios.csv"));
        assert_eq!(settings.sources.ceilings, PathBuf::from("/other/ceilings.csv"));
        assert_eq!(settings.history, PathBuf::from("log.csv"));
    }
}
