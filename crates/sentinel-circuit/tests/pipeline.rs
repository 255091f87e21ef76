//! End-to-end tests for the report proof pipeline: prove, format, verify.

use std::sync::{Arc, Mutex, OnceLock};

use ark_bn254::Fr;
use ark_std::rand::{rngs::StdRng, SeedableRng};
use num_bigint::BigUint;
use sentinel_circuit::artifact::{
    encode_circuit, encode_proving_key, load_circuit, load_proving_key, load_verification_key,
    write_circuit, write_proving_key, write_verification_key,
};
use sentinel_circuit::whistleblower::compile;
use sentinel_circuit::{
    prove_and_format, setup, verify, ArtifactKind, CorruptReason, Groth16Prover, MsmStrategy,
    ProofError, ProofStage, StageObserver, Verifier, VerifyingKey,
};
use sentinel_circuit::Bn254;
use sentinel_types::{to_decimal, VerifierPayload};

struct Fixture {
    prover: Groth16Prover,
    verifier: Verifier,
}

fn fixture() -> &'static Fixture {
    static FIXTURE: OnceLock<Fixture> = OnceLock::new();
    FIXTURE.get_or_init(|| {
        let mut rng = StdRng::seed_from_u64(42);
        let program = Arc::new(compile().unwrap());
        let (pk, vk) = setup(&program, &mut rng).unwrap();
        Fixture {
            prover: Groth16Prover::new(program, Arc::new(pk)).unwrap(),
            verifier: Verifier::new(Arc::new(vk)),
        }
    })
}

fn vk() -> &'static VerifyingKey<Bn254> {
    fixture().verifier.verifying_key()
}

fn prove(secret: &str, seed: u64) -> VerifierPayload {
    let mut rng = StdRng::seed_from_u64(seed);
    prove_and_format(&fixture().prover, secret, "404", &mut rng, &())
        .unwrap()
        .payload
}

fn flip_low_bit(decimal: &str) -> String {
    let n: BigUint = decimal.parse().unwrap();
    (n ^ BigUint::from(1u8)).to_str_radix(10)
}

#[derive(Default)]
struct Recorder {
    stages: Mutex<Vec<ProofStage>>,
    cancel_after: Option<ProofStage>,
}

impl StageObserver for Recorder {
    fn on_stage(&self, stage: ProofStage) {
        self.stages.lock().unwrap().push(stage);
    }

    fn is_cancelled(&self) -> bool {
        let stages = self.stages.lock().unwrap();
        self.cancel_after.is_some_and(|stop| stages.contains(&stop))
    }
}

// ── Round trip ──

#[test]
fn test_valid_proofs_verify() {
    for (i, secret) in ["1", "998877", "18446744073709551615"].iter().enumerate() {
        let payload = prove(secret, i as u64);
        assert!(verify(vk(), &payload).unwrap(), "secret #{i}");
    }
}

#[test]
fn test_reference_scenario() {
    let payload = prove("998877", 7);

    assert_eq!(payload.input.len(), 2);
    assert_eq!(payload.input[1], "404");
    let commitment = sentinel_poseidon::hash2(Fr::from(998_877u64), Fr::from(404u64));
    assert_eq!(payload.input[0], to_decimal(&commitment));
    assert_ne!(payload.input[0], "998877");

    let json = serde_json::to_string(&payload).unwrap();
    assert!(!json.contains("998877"));
    assert!(fixture().verifier.verify(&payload).unwrap());
}

#[test]
fn test_proofs_are_randomized() {
    let mut rng = StdRng::seed_from_u64(11);
    let first = prove_and_format(&fixture().prover, "998877", "404", &mut rng, &()).unwrap();
    let second = prove_and_format(&fixture().prover, "998877", "404", &mut rng, &()).unwrap();

    assert_ne!(first.proof, second.proof);
    assert_ne!(first.payload.a, second.payload.a);
    assert_eq!(first.payload.input, second.payload.input);
    assert!(verify(vk(), &first.payload).unwrap());
    assert!(verify(vk(), &second.payload).unwrap());
}

#[test]
fn test_windowed_msm_payload_verifies() {
    let prover = fixture()
        .prover
        .clone()
        .with_strategy(MsmStrategy::Windowed { window_bits: 5 });
    let mut rng = StdRng::seed_from_u64(13);
    let out = prove_and_format(&prover, "424242", "404", &mut rng, &()).unwrap();
    assert!(verify(vk(), &out.payload).unwrap());
}

#[test]
fn test_concurrent_requests_share_keys() {
    let secrets = ["101", "202", "303", "404"];
    std::thread::scope(|scope| {
        let handles: Vec<_> = secrets
            .iter()
            .enumerate()
            .map(|(i, secret)| {
                scope.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(100 + i as u64);
                    prove_and_format(&fixture().prover, secret, "404", &mut rng, &())
                })
            })
            .collect();
        for handle in handles {
            let out = handle.join().unwrap().unwrap();
            assert!(verify(vk(), &out.payload).unwrap());
        }
    });
}

// ── Tampering ──

#[test]
fn test_tampered_public_input_rejected() {
    let payload = prove("998877", 21);
    for i in 0..payload.input.len() {
        let mut tampered = payload.clone();
        tampered.input[i] = flip_low_bit(&tampered.input[i]);
        assert!(!verify(vk(), &tampered).unwrap(), "input[{i}]");
    }
}

#[test]
fn test_other_tag_rejected() {
    let mut payload = prove("998877", 22);
    payload.input[1] = "405".into();
    assert!(!verify(vk(), &payload).unwrap());
}

#[test]
fn test_tampered_coordinates_rejected() {
    let payload = prove("998877", 23);
    let mut variants = Vec::new();
    for k in 0..2 {
        let mut p = payload.clone();
        p.a[k] = flip_low_bit(&p.a[k]);
        variants.push(p);
        let mut p = payload.clone();
        p.c[k] = flip_low_bit(&p.c[k]);
        variants.push(p);
        for j in 0..2 {
            let mut p = payload.clone();
            p.b[k][j] = flip_low_bit(&p.b[k][j]);
            variants.push(p);
        }
    }
    for (i, tampered) in variants.iter().enumerate() {
        // off-curve points fail to decode, on-curve ones fail the pairing
        assert!(!matches!(verify(vk(), tampered), Ok(true)), "variant {i}");
    }
}

#[test]
fn test_negated_a_fails_pairing() {
    let payload = prove("998877", 24);
    let q: BigUint = sentinel_circuit::format::base_field_modulus().parse().unwrap();
    let y: BigUint = payload.a[1].parse().unwrap();

    let mut tampered = payload.clone();
    tampered.a[1] = (q - y).to_str_radix(10);
    assert!(!verify(vk(), &tampered).unwrap());
}

#[test]
fn test_unswapped_b_fails() {
    let mut rng = StdRng::seed_from_u64(25);
    let out = prove_and_format(&fixture().prover, "998877", "404", &mut rng, &()).unwrap();
    assert!(verify(vk(), &out.payload).unwrap());

    let b = &out.proof.b;
    let mut unswapped = out.payload.clone();
    unswapped.b = [
        [to_decimal(&b.x.c0), to_decimal(&b.x.c1)],
        [to_decimal(&b.y.c0), to_decimal(&b.y.c1)],
    ];
    assert_ne!(unswapped.b, out.payload.b);
    assert!(!matches!(verify(vk(), &unswapped), Ok(true)));
}

#[test]
fn test_wrong_input_count_is_format_error() {
    let mut payload = prove("998877", 26);
    payload.input.push("1".into());
    assert!(matches!(verify(vk(), &payload), Err(ProofError::InvalidProofFormat(_))));
}

// ── Request errors ──

#[test]
fn test_secret_at_modulus_rejected_before_proving() {
    let modulus = "21888242871839275222246405745257275088548364400416034343698204186575808495617";
    let recorder = Recorder::default();
    let mut rng = StdRng::seed_from_u64(31);
    let err = prove_and_format(&fixture().prover, modulus, "404", &mut rng, &recorder).unwrap_err();

    assert!(matches!(err, ProofError::WitnessOutOfRange { ref signal, .. } if signal == "secret"));
    assert!(err.is_caller_error());
    assert!(recorder.stages.lock().unwrap().is_empty());
}

#[test]
fn test_secret_above_range_is_unsatisfiable() {
    let mut rng = StdRng::seed_from_u64(32);
    let err = prove_and_format(&fixture().prover, "18446744073709551616", "404", &mut rng, &())
        .unwrap_err();
    assert!(matches!(err, ProofError::UnsatisfiableWitness { .. }));
}

#[test]
fn test_stages_reported_in_order() {
    let recorder = Recorder::default();
    let mut rng = StdRng::seed_from_u64(33);
    prove_and_format(&fixture().prover, "998877", "404", &mut rng, &recorder).unwrap();
    assert_eq!(
        *recorder.stages.lock().unwrap(),
        vec![
            ProofStage::InputsEncoded,
            ProofStage::WitnessCalculated,
            ProofStage::ProofComputed,
            ProofStage::PayloadFormatted,
        ]
    );
}

#[test]
fn test_cancellation_between_stages() {
    let recorder = Recorder {
        cancel_after: Some(ProofStage::WitnessCalculated),
        ..Recorder::default()
    };
    let mut rng = StdRng::seed_from_u64(34);
    let err = prove_and_format(&fixture().prover, "998877", "404", &mut rng, &recorder).unwrap_err();
    assert!(matches!(err, ProofError::Cancelled));
    assert_eq!(recorder.stages.lock().unwrap().last(), Some(&ProofStage::WitnessCalculated));
}

// ── Artifacts ──

#[test]
fn test_artifacts_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let fx = fixture();
    let circuit = dir.path().join("report.circuit");
    let pk = dir.path().join("report.pk");
    let vk_path = dir.path().join("report.vk");
    write_circuit(&circuit, fx.prover.program()).unwrap();
    write_proving_key(&pk, fx.prover.proving_key()).unwrap();
    write_verification_key(&vk_path, vk()).unwrap();

    let prover = Groth16Prover::new(
        Arc::new(load_circuit(&circuit).unwrap()),
        Arc::new(load_proving_key(&pk).unwrap()),
    )
    .unwrap();
    let loaded_vk = load_verification_key(&vk_path).unwrap();

    let mut rng = StdRng::seed_from_u64(41);
    let out = prove_and_format(&prover, "998877", "404", &mut rng, &()).unwrap();
    assert!(verify(&loaded_vk, &out.payload).unwrap());
}

#[test]
fn test_html_in_place_of_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let page = "<html>\n<body><h1>502 Bad Gateway</h1></body>\n</html>\n";
    let path = dir.path().join("served.bin");
    std::fs::write(&path, page).unwrap();

    for (kind, result) in [
        (ArtifactKind::Circuit, load_circuit(&path).map(|_| ())),
        (ArtifactKind::ProvingKey, load_proving_key(&path).map(|_| ())),
        (ArtifactKind::VerificationKey, load_verification_key(&path).map(|_| ())),
    ] {
        match result {
            Err(ProofError::ArtifactCorrupt { kind: k, reason: CorruptReason::NotBinary { .. } }) => {
                assert_eq!(k, kind)
            }
            other => panic!("{kind}: unexpected result {other:?}"),
        }
    }
}

#[test]
fn test_empty_artifact_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.pk");
    std::fs::write(&path, b"").unwrap();
    assert!(matches!(
        load_proving_key(&path),
        Err(ProofError::ArtifactCorrupt { reason: CorruptReason::Empty, .. })
    ));
}

#[test]
fn test_circuit_bytes_are_stable() {
    let fx = fixture();
    assert_eq!(encode_circuit(fx.prover.program()), encode_circuit(&compile().unwrap()));
    let pk_bytes = encode_proving_key(fx.prover.proving_key()).unwrap();
    assert!(pk_bytes.starts_with(b"snpk"));
}
