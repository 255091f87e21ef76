use std::path::Path;

use anyhow::{Context, Result};
use sentinel_sdk::{ReportVerifier, SentinelConfig, VerifierPayload};

use crate::output;

pub fn run(config: Option<&Path>, payload: &Path) -> Result<()> {
    let data = std::fs::read_to_string(payload)
        .with_context(|| format!("reading {}", payload.display()))?;
    let payload: VerifierPayload = serde_json::from_str(&data).map_err(|e| {
        output::fail_with_hint(
            &format!("invalid payload JSON: {e}"),
            "expected {\"a\": [..], \"b\": [[..],[..]], \"c\": [..], \"input\": [..]}",
        )
    })?;

    let config = SentinelConfig::load(config)?;
    let verifier = ReportVerifier::load(&config)?;
    let valid = verifier.verify(&payload)?;

    if output::is_json() {
        output::json_output(serde_json::json!({ "valid": valid, "input": payload.input }));
    } else if valid {
        output::success("proof valid");
    } else {
        output::error_msg("proof rejected");
    }
    if !valid {
        std::process::exit(1);
    }
    Ok(())
}
