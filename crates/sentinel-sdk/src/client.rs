// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Long-lived prover and verifier handles.
//!
//! Artifacts are loaded once at construction and shared read-only by every
//! request; each request owns its witness and proof.
//!
//! ```rust,no_run
//! use sentinel_sdk::client::ReportProver;
//! use sentinel_sdk::config::SentinelConfig;
//! use sentinel_sdk::progress::ProveOptions;
//!
//! # async fn example() -> sentinel_sdk::error::SentinelResult<()> {
//! let config = SentinelConfig::load(None)?;
//! let prover = ReportProver::load(&config)?;
//! let payload = prover.prove_report("998877", ProveOptions::default()).await?;
//! println!("{}", serde_json::to_string(&payload).unwrap());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::{rngs::StdRng, SeedableRng};
use sentinel_circuit::artifact::{load_circuit, load_proving_key, load_verification_key};
use sentinel_circuit::{Bn254, Groth16Prover, ProofError, Verifier, VerifyingKey};
use sentinel_types::VerifierPayload;
use tokio_util::sync::CancellationToken;
use zeroize::Zeroizing;

use crate::calldata::encode_report_call;
use crate::config::SentinelConfig;
use crate::error::{SentinelError, SentinelResult};
use crate::progress::{ChannelObserver, ProveOptions};

/// Fresh OS-seeded RNG for proof blinding.
pub fn proving_rng() -> StdRng {
    StdRng::from_entropy()
}

// ---------------------------------------------------------------------------
// Prover
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ReportProver {
    prover: Groth16Prover,
    report_tag: String,
    timeout: Duration,
}

impl ReportProver {
    /// Loads the circuit and proving key named by `config`. Any artifact
    /// error here means no proof can be served; callers should not retry
    /// with older files.
    pub fn load(config: &SentinelConfig) -> SentinelResult<Self> {
        config.validate()?;
        let program = load_circuit(&config.circuit_path)?;
        let pk = load_proving_key(&config.proving_key_path)?;
        let prover = Groth16Prover::new(Arc::new(program), Arc::new(pk))?;
        tracing::info!(
            circuit = prover.program().name(),
            constraints = prover.program().num_constraints(),
            msm = ?config.msm,
            "report prover ready"
        );
        Ok(Self::from_prover(prover, config))
    }

    pub fn from_prover(prover: Groth16Prover, config: &SentinelConfig) -> Self {
        Self {
            prover: prover.with_strategy(config.msm),
            report_tag: config.report_tag.clone(),
            timeout: config.prove_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn report_tag(&self) -> &str {
        &self.report_tag
    }

    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        self.prover.verifying_key()
    }

    /// [`Self::prove_and_format`] with the configured report tag.
    pub async fn prove_report(
        &self,
        secret: &str,
        options: ProveOptions,
    ) -> SentinelResult<VerifierPayload> {
        let tag = self.report_tag.clone();
        self.prove_and_format(secret, &tag, options).await
    }

    /// Runs the pipeline on the blocking pool. The caller's token and the
    /// configured timeout both abandon the request; the worker notices at
    /// its next stage boundary.
    pub async fn prove_and_format(
        &self,
        secret: &str,
        tag: &str,
        options: ProveOptions,
    ) -> SentinelResult<VerifierPayload> {
        let caller = options.cancel.unwrap_or_default();
        let worker_cancel = caller.child_token();
        let observer = ChannelObserver::new(options.progress, worker_cancel.clone());

        let secret = Zeroizing::new(secret.to_string());
        let tag = tag.to_string();
        let prover = self.prover.clone();
        let started = Instant::now();
        let task = tokio::task::spawn_blocking(move || {
            let mut rng = proving_rng();
            sentinel_circuit::prove_and_format(&prover, secret.as_str(), &tag, &mut rng, &observer)
        });

        let _abandon = worker_cancel.clone().drop_guard();
        let result = tokio::select! {
            joined = task => joined
                .map_err(|e| SentinelError::Worker(e.to_string()))?
                .map_err(SentinelError::from),
            _ = caller.cancelled() => Err(ProofError::Cancelled.into()),
            _ = tokio::time::sleep(self.timeout) => Err(SentinelError::TimedOut(self.timeout)),
        };

        match &result {
            Ok(_) => tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "report proof ready"),
            Err(SentinelError::Proof(ProofError::ProverInternalError(detail))) => {
                tracing::error!(%detail, "prover invariant violated")
            }
            Err(e) if e.is_caller_error() => tracing::debug!(error = %e, "report request rejected"),
            Err(e) => tracing::warn!(error = %e, "report proof failed"),
        }
        result.map(|out| out.payload)
    }

    /// Synchronous form for callers already off the async runtime.
    pub fn prove_blocking(&self, secret: &str, tag: &str) -> SentinelResult<VerifierPayload> {
        let mut rng = proving_rng();
        let observer = ChannelObserver::new(None, CancellationToken::new());
        let out = sentinel_circuit::prove_and_format(&self.prover, secret, tag, &mut rng, &observer)?;
        Ok(out.payload)
    }
}

// ---------------------------------------------------------------------------
// Verifier
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ReportVerifier {
    verifier: Verifier,
    target_address: Option<String>,
}

impl ReportVerifier {
    pub fn load(config: &SentinelConfig) -> SentinelResult<Self> {
        config.validate()?;
        let vk = load_verification_key(&config.verification_key_path)?;
        tracing::info!(public_inputs = vk.gamma_abc_g1.len().saturating_sub(1), "report verifier ready");
        Ok(Self {
            verifier: Verifier::new(Arc::new(vk)),
            target_address: config.target_address.clone(),
        })
    }

    pub fn new(vk: Arc<VerifyingKey<Bn254>>, target_address: Option<String>) -> Self {
        Self { verifier: Verifier::new(vk), target_address }
    }

    pub fn verify(&self, payload: &VerifierPayload) -> SentinelResult<bool> {
        Ok(self.verifier.verify(payload)?)
    }

    /// Calldata for submitting `payload` to the configured contract.
    pub fn report_call(&self, payload: &VerifierPayload) -> SentinelResult<Vec<u8>> {
        let target = self
            .target_address
            .as_deref()
            .ok_or_else(|| SentinelError::Config("target_address is not set".into()))?;
        encode_report_call(target, payload)
    }
}
