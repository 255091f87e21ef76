use std::path::Path;

use anyhow::{Context, Result};
use sentinel_circuit::artifact::{
    decode_circuit, decode_proving_key, decode_verification_key, detect_kind, open_envelope,
    FORMAT_VERSION,
};
use sentinel_circuit::{ArtifactKind, ProofError};

use crate::output;

pub fn run(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let Some(kind) = detect_kind(&bytes) else {
        let reason = match open_envelope(ArtifactKind::Circuit, &bytes) {
            Err(reason) => reason.to_string(),
            Ok(_) => "unrecognized artifact".into(),
        };
        return Err(output::fail_with_hint(
            &format!("{} is not a sentinel artifact: {reason}", path.display()),
            "expected a file written by `sentinel compile` or `sentinel setup`",
        ));
    };

    let mut fields = vec![
        ("kind", kind.to_string()),
        ("version", FORMAT_VERSION.to_string()),
        ("bytes", bytes.len().to_string()),
    ];
    match kind {
        ArtifactKind::Circuit => {
            let program = decode_circuit(&bytes)?;
            fields.extend([
                ("circuit", program.name().to_string()),
                ("signals", program.num_signals().to_string()),
                ("public", program.public_signal_names().join(", ")),
                ("constraints", program.num_constraints().to_string()),
                ("instructions", program.instructions().len().to_string()),
            ]);
        }
        ArtifactKind::ProvingKey => {
            let pk = decode_proving_key(&bytes)?;
            fields.extend([
                ("signals", pk.a_query.len().to_string()),
                ("public_inputs", public_inputs(pk.vk.gamma_abc_g1.len())?),
                ("h_query", pk.h_query.len().to_string()),
            ]);
        }
        ArtifactKind::VerificationKey => {
            let vk = decode_verification_key(&bytes)?;
            fields.push(("public_inputs", public_inputs(vk.gamma_abc_g1.len())?));
        }
    }

    if output::is_json() {
        let map: serde_json::Map<String, serde_json::Value> = fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v)))
            .collect();
        output::json_output(serde_json::Value::Object(map));
    } else {
        for (key, value) in &fields {
            output::label(key, value);
        }
    }
    Ok(())
}

fn public_inputs(gamma_abc_len: usize) -> Result<String> {
    gamma_abc_len
        .checked_sub(1)
        .map(|n| n.to_string())
        .ok_or_else(|| ProofError::ProverInternalError("verification key has no IC terms".into()).into())
}
