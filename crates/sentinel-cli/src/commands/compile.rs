use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sentinel_circuit::artifact::write_circuit;
use sentinel_circuit::whistleblower;
use sentinel_sdk::SentinelConfig;

use crate::output;

pub fn run(config: Option<&Path>, out: Option<PathBuf>) -> Result<()> {
    let config = SentinelConfig::load(config)?;
    let out = out.unwrap_or(config.circuit_path);

    let program = whistleblower::compile().context("building whistleblower circuit")?;
    write_circuit(&out, &program)?;

    if output::is_json() {
        output::json_output(serde_json::json!({
            "path": out.display().to_string(),
            "circuit": program.name(),
            "signals": program.num_signals(),
            "public": program.public_signal_names(),
            "constraints": program.num_constraints(),
        }));
    } else {
        output::success(&format!("circuit written to {}", out.display()));
        output::label("constraints", &program.num_constraints().to_string());
        output::label("public", &program.public_signal_names().join(", "));
    }
    Ok(())
}
