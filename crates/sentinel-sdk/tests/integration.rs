// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Integration test: drives the SDK the way a service would, from artifact
//! files on disk through to contract calldata.

use std::sync::OnceLock;
use std::time::Duration;

use ark_std::rand::{rngs::StdRng, SeedableRng};
use sentinel_circuit::artifact::{write_circuit, write_proving_key, write_verification_key};
use sentinel_circuit::whistleblower::compile;
use sentinel_circuit::{
    setup, ArtifactKind, Bn254, CircuitProgram, CorruptReason, Fr, ProvingKey, VerifyingKey,
};
use sentinel_sdk::calldata::{selector, REPORT_SIGNATURE};
use sentinel_sdk::{
    ProofError, ProofStage, ProveOptions, ReportProver, ReportVerifier, SentinelConfig,
    SentinelError,
};
use sentinel_types::to_decimal;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const TARGET: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

struct Keys {
    program: CircuitProgram,
    pk: ProvingKey<Bn254>,
    vk: VerifyingKey<Bn254>,
}

fn keys() -> &'static Keys {
    static KEYS: OnceLock<Keys> = OnceLock::new();
    KEYS.get_or_init(|| {
        let mut rng = StdRng::seed_from_u64(42);
        let program = compile().unwrap();
        let (pk, vk) = setup(&program, &mut rng).unwrap();
        Keys { program, pk, vk }
    })
}

/// Fresh artifact directory per test; tests are free to damage the files.
fn artifacts() -> (TempDir, SentinelConfig) {
    let dir = tempfile::tempdir().unwrap();
    let keys = keys();
    let config = SentinelConfig {
        circuit_path: dir.path().join("report.circuit"),
        proving_key_path: dir.path().join("report.pk"),
        verification_key_path: dir.path().join("report.vk"),
        target_address: Some(TARGET.into()),
        ..SentinelConfig::default()
    };
    write_circuit(&config.circuit_path, &keys.program).unwrap();
    write_proving_key(&config.proving_key_path, &keys.pk).unwrap();
    write_verification_key(&config.verification_key_path, &keys.vk).unwrap();
    (dir, config)
}

// ── prove → verify ──

#[tokio::test]
async fn prove_report_verifies() {
    let (_dir, config) = artifacts();
    let prover = ReportProver::load(&config).unwrap();
    let verifier = ReportVerifier::load(&config).unwrap();

    let payload = prover.prove_report("998877", ProveOptions::default()).await.unwrap();
    assert!(verifier.verify(&payload).unwrap());

    let expected = sentinel_poseidon::hash2(Fr::from(998877u64), Fr::from(404u64));
    assert_eq!(payload.input, vec![to_decimal(&expected), "404".to_string()]);
}

#[tokio::test]
async fn explicit_tag_is_bound() {
    let (_dir, config) = artifacts();
    let prover = ReportProver::load(&config).unwrap();
    let verifier = ReportVerifier::load(&config).unwrap();

    let payload = prover.prove_and_format("5", "77", ProveOptions::default()).await.unwrap();
    assert_eq!(payload.input[1], "77");
    assert!(verifier.verify(&payload).unwrap());
}

#[test]
fn prove_blocking_verifies() {
    let (_dir, config) = artifacts();
    let prover = ReportProver::load(&config).unwrap();
    let verifier = ReportVerifier::load(&config).unwrap();
    let payload = prover.prove_blocking("12345", prover.report_tag()).unwrap();
    assert!(verifier.verify(&payload).unwrap());
}

#[tokio::test]
async fn concurrent_requests_share_artifacts() {
    let (_dir, config) = artifacts();
    let prover = ReportProver::load(&config).unwrap();
    let verifier = ReportVerifier::load(&config).unwrap();

    let handles: Vec<_> = (1..=4u64)
        .map(|i| {
            let prover = prover.clone();
            tokio::spawn(async move {
                prover.prove_report(&i.to_string(), ProveOptions::default()).await
            })
        })
        .collect();
    for handle in handles {
        let payload = handle.await.unwrap().unwrap();
        assert!(verifier.verify(&payload).unwrap());
    }
}

// ── progress and cancellation ──

#[tokio::test]
async fn progress_reports_every_stage() {
    let (_dir, config) = artifacts();
    let prover = ReportProver::load(&config).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    prover.prove_report("42", ProveOptions::default().with_progress(tx)).await.unwrap();

    let mut stages = Vec::new();
    while let Some(stage) = rx.recv().await {
        stages.push(stage);
    }
    assert_eq!(
        stages,
        vec![
            ProofStage::InputsEncoded,
            ProofStage::WitnessCalculated,
            ProofStage::ProofComputed,
            ProofStage::PayloadFormatted,
        ]
    );
}

#[tokio::test]
async fn cancelled_request_returns_cancelled() {
    let (_dir, config) = artifacts();
    let prover = ReportProver::load(&config).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = prover
        .prove_report("42", ProveOptions::default().with_cancel(cancel))
        .await
        .unwrap_err();
    assert!(matches!(err, SentinelError::Proof(ProofError::Cancelled)));
}

#[tokio::test]
async fn timeout_abandons_request() {
    let (_dir, config) = artifacts();
    let prover = ReportProver::load(&config).unwrap().with_timeout(Duration::ZERO);

    let err = prover.prove_report("42", ProveOptions::default()).await.unwrap_err();
    assert!(matches!(err, SentinelError::TimedOut(_)));
    assert!(!err.is_caller_error());
}

// ── caller errors ──

#[tokio::test]
async fn out_of_range_secret_is_caller_error() {
    let (_dir, config) = artifacts();
    let prover = ReportProver::load(&config).unwrap();
    for bad in ["-1", "abc", "18446744073709551616"] {
        let err = prover.prove_report(bad, ProveOptions::default()).await.unwrap_err();
        assert!(err.is_caller_error(), "{bad}: {err}");
    }
}

#[tokio::test]
async fn tampered_payload_fails_verification() {
    let (_dir, config) = artifacts();
    let prover = ReportProver::load(&config).unwrap();
    let verifier = ReportVerifier::load(&config).unwrap();

    let mut payload = prover.prove_report("9", ProveOptions::default()).await.unwrap();
    payload.input[1] = "405".into();
    assert!(!verifier.verify(&payload).unwrap());
}

// ── artifacts ──

#[test]
fn html_artifact_fails_at_load() {
    let (_dir, config) = artifacts();
    std::fs::write(&config.proving_key_path, "<!DOCTYPE html><html>404</html>").unwrap();

    let err = ReportProver::load(&config).err().unwrap();
    assert!(matches!(
        err,
        SentinelError::Proof(ProofError::ArtifactCorrupt {
            kind: ArtifactKind::ProvingKey,
            reason: CorruptReason::NotBinary { .. },
        })
    ));
}

#[test]
fn missing_verification_key_fails_at_load() {
    let (_dir, config) = artifacts();
    std::fs::remove_file(&config.verification_key_path).unwrap();
    let err = ReportVerifier::load(&config).err().unwrap();
    assert!(matches!(
        err,
        SentinelError::Proof(ProofError::ArtifactNotFound { kind: ArtifactKind::VerificationKey, .. })
    ));
}

// ── calldata ──

#[tokio::test]
async fn report_call_carries_payload() {
    let (_dir, config) = artifacts();
    let prover = ReportProver::load(&config).unwrap();
    let verifier = ReportVerifier::load(&config).unwrap();

    let payload = prover.prove_report("31337", ProveOptions::default()).await.unwrap();
    let data = verifier.report_call(&payload).unwrap();
    assert_eq!(data.len(), 4 + 11 * 32);
    assert_eq!(data[..4], selector(REPORT_SIGNATURE));
}

#[test]
fn report_call_needs_target() {
    let (_dir, mut config) = artifacts();
    config.target_address = None;
    let verifier = ReportVerifier::load(&config).unwrap();
    let payload = sentinel_types::VerifierPayload {
        a: ["1".into(), "2".into()],
        b: [["3".into(), "4".into()], ["5".into(), "6".into()]],
        c: ["7".into(), "8".into()],
        input: vec!["9".into(), "404".into()],
    };
    assert!(matches!(verifier.report_call(&payload), Err(SentinelError::Config(_))));
}

#[test]
fn proving_rng_is_seeded_per_call() {
    use ark_std::rand::RngCore;
    use sentinel_sdk::client::proving_rng;
    let (mut first, mut second) = (proving_rng(), proving_rng());
    assert_ne!(
        (first.next_u64(), first.next_u64()),
        (second.next_u64(), second.next_u64())
    );
}
