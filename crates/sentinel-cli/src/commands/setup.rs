use std::path::{Path, PathBuf};

use anyhow::Result;
use sentinel_circuit::artifact::{load_circuit, write_proving_key, write_verification_key};
use sentinel_sdk::client::proving_rng;
use sentinel_sdk::SentinelConfig;

use crate::output;

pub fn run(
    config: Option<&Path>,
    circuit: Option<PathBuf>,
    pk_out: Option<PathBuf>,
    vk_out: Option<PathBuf>,
) -> Result<()> {
    let config = SentinelConfig::load(config)?;
    let circuit = circuit.unwrap_or(config.circuit_path);
    let pk_out = pk_out.unwrap_or(config.proving_key_path);
    let vk_out = vk_out.unwrap_or(config.verification_key_path);

    let program = load_circuit(&circuit).map_err(|e| {
        output::fail_with_hint(&e.to_string(), "run `sentinel compile` first")
    })?;

    output::warn("development setup: keys are NOT from a trusted ceremony");
    let pb = output::spinner("running Groth16 setup...");
    let (pk, vk) = sentinel_circuit::setup(&program, &mut proving_rng())?;
    pb.finish_and_clear();

    write_proving_key(&pk_out, &pk)?;
    write_verification_key(&vk_out, &vk)?;

    if output::is_json() {
        output::json_output(serde_json::json!({
            "circuit": circuit.display().to_string(),
            "proving_key": pk_out.display().to_string(),
            "verification_key": vk_out.display().to_string(),
            "development_only": true,
        }));
    } else {
        output::success("keys written");
        output::label("proving_key", &pk_out.display().to_string());
        output::label("verification_key", &vk_out.display().to_string());
    }
    Ok(())
}
