use std::{fs, io, path::Path};

use anyhow::{Context, Result};
use clap_complete::{generate, generate_to, Shell};
use tracing::info;

use derfit_cli::cli::build_cli_command;

/// Print the completion script, or write it to `out`.
///
/// An existing directory receives the script under the file name the shell expects
/// (`derfit.bash`, `_derfit`, ...); any other path is written as given.
pub fn handle(shell: Shell, out: Option<&Path>) -> Result<()> {
    let mut cmd = build_cli_command();
    let bin = cmd.get_name().to_string();

    let Some(out) = out else {
        generate(shell, &mut cmd, bin.as_str(), &mut io::stdout());
        return Ok(());
    };

    let written = if out.is_dir() {
        generate_to(shell, &mut cmd, bin.as_str(), out)
            .with_context(|| format!("writing {shell} completion into {}", out.display()))?
    } else {
        if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file =
            fs::File::create(out).with_context(|| format!("creating {}", out.display()))?;
        generate(shell, &mut cmd, bin.as_str(), &mut file);
        out.to_path_buf()
    };
    info!("generated {shell} completion for {bin}");
    println!("Wrote {shell} completion to {}", written.display());
    Ok(())
}
