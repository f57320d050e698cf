//! Config command - inspect configuration

use anyhow::Result;
use audiolens_core::Config;
use console::{style, Term};

pub fn show(config: &Config) -> Result<()> {
    let term = Term::stdout();
    term.write_line(&format!("{}", style("Current configuration:").bold()))?;
    term.write_line(&toml::to_string_pretty(config)?)?;
    Ok(())
}

pub fn show_path() -> Result<()> {
    let term = Term::stdout();
    let path = Config::default_config_path()?;
    term.write_line(&format!("{}", path.display()))?;
    if !path.exists() {
        term.write_line(&format!(
            "{} (not created yet, defaults are in effect)",
            style("note:").dim()
        ))?;
    }
    Ok(())
}
