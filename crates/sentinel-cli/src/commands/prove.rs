use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sentinel_sdk::calldata::encode_report_call_hex;
use sentinel_sdk::{ProveOptions, ReportProver, SentinelConfig};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use zeroize::Zeroizing;

use crate::output;

pub async fn run(
    config: Option<&Path>,
    secret: String,
    tag: Option<String>,
    out: Option<PathBuf>,
    calldata: bool,
) -> Result<()> {
    let secret = Zeroizing::new(if secret == "-" { read_stdin()? } else { secret });
    let config = SentinelConfig::load(config)?;
    let target = match (calldata, config.target_address.as_deref()) {
        (true, None) => {
            return Err(output::fail_with_hint(
                "no target address configured",
                "run `sentinel config set target_address 0x...`",
            ))
        }
        (true, Some(target)) => Some(target.to_string()),
        (false, _) => None,
    };

    let pb = output::spinner("loading artifacts...");
    let prover = ReportProver::load(&config)?;
    let tag = tag.unwrap_or_else(|| prover.report_tag().to_string());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let options = ProveOptions::default().with_progress(tx).with_cancel(cancel.clone());

    let progress = {
        let pb = pb.clone();
        tokio::spawn(async move {
            while let Some(stage) = rx.recv().await {
                tracing::debug!(%stage, "stage complete");
                pb.set_message(output::next_stage_message(stage));
            }
        })
    };
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    pb.set_message("encoding inputs...");
    let result = prover.prove_and_format(secret.trim(), &tag, options).await;
    ctrl_c.abort();
    let _ = progress.await;
    pb.finish_and_clear();
    let payload = result?;

    if let Some(path) = &out {
        let json = serde_json::to_string_pretty(&payload)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }
    let calldata = target
        .map(|target| encode_report_call_hex(&target, &payload))
        .transpose()?;

    if output::is_json() {
        let mut value = serde_json::json!({ "payload": payload });
        if let Some(data) = &calldata {
            value["calldata"] = serde_json::Value::String(data.clone());
        }
        output::json_output(value);
    } else {
        output::success("proof generated");
        output::label("tag", &tag);
        if let Some(path) = &out {
            output::label("saved", &path.display().to_string());
        }
        println!("{}", serde_json::to_string_pretty(&payload)?);
        if let Some(data) = &calldata {
            output::label("calldata", data);
        }
    }
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading secret from stdin")?;
    Ok(buf)
}
