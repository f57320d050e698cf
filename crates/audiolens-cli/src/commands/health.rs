//! Health command - ping the runtime daemon

use anyhow::Result;
use audiolens_core::{Config, InferenceBackend, RunnerBackend};
use console::{style, Term};

pub fn run(config: &Config, endpoint: Option<&str>) -> Result<()> {
    let term = Term::stdout();
    let backend = RunnerBackend::new(config, endpoint)?;

    match backend.health() {
        Ok(info) => {
            term.write_line(&format!(
                "{} Runtime at {} is up",
                style("✓").green(),
                backend.endpoint()
            ))?;
            term.write_line(&format!("  Model:  {}", style(&info.model).cyan()))?;
            term.write_line(&format!("  Device: {}", style(&info.device).cyan()))?;
            term.write_line(&format!("  Status: {}", info.status))?;
            Ok(())
        }
        Err(e) => {
            term.write_line(&format!(
                "{} Runtime at {} is not reachable",
                style("✗").red(),
                backend.endpoint()
            ))?;
            Err(e.into())
        }
    }
}
