use clap::Parser;
use tracing::{error, warn, Level};
use tracing_subscriber::FmtSubscriber;

use derfit_cli::{load_config, Cli, Commands, DerfitConfig, Settings};

use crate::commands::analyze::AnalyzeArgs;
use crate::commands::{analyze, completions, history, tables};

mod commands;

fn run(cli: &Cli, config: &DerfitConfig) -> anyhow::Result<()> {
    let settings = Settings::resolve(cli, config);
    match &cli.command {
        Commands::Analyze {
            city,
            phase,
            load,
            kit,
            format,
        } => analyze::handle(
            &settings,
            &AnalyzeArgs {
                city,
                phase,
                load: *load,
                kit,
            },
            *format,
        ),
        Commands::Tables { command } => tables::handle(&settings, command),
        Commands::History { command } => history::handle(&settings, command),
        Commands::Completions { shell, out } => completions::handle(*shell, out.as_deref()),
    }
}

fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let configured = config.as_ref().ok().map(|config| config.log_level());
    let level = cli
        .log_level
        .or(configured.flatten())
        .unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if configured == Some(None) {
        warn!("ignoring unrecognized log level in config; using {level}");
    }

    if let Err(err) = config.and_then(|config| run(&cli, &config)) {
        error!("{err:#}");
        std::process::exit(1);
    }
}
