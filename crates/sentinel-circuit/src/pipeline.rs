use std::fmt;

use ark_bn254::{Bn254, Fr};
use ark_groth16::Proof;
use ark_std::rand::{CryptoRng, RngCore};
use sentinel_types::VerifierPayload;

use crate::error::{ProofError, ProofResult};
use crate::format::format_payload;
use crate::prover::Groth16Prover;
use crate::witness::{build_inputs, calculate_witness};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProofStage {
    InputsEncoded,
    WitnessCalculated,
    ProofComputed,
    PayloadFormatted,
}

impl fmt::Display for ProofStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InputsEncoded => "inputs encoded",
            Self::WitnessCalculated => "witness calculated",
            Self::ProofComputed => "proof computed",
            Self::PayloadFormatted => "payload formatted",
        })
    }
}

/// Progress sink for [`prove_and_format`]. Cancellation is checked
/// between stages; a stage already running is not interrupted.
pub trait StageObserver {
    fn on_stage(&self, stage: ProofStage);

    fn is_cancelled(&self) -> bool {
        false
    }
}

impl StageObserver for () {
    fn on_stage(&self, _stage: ProofStage) {}
}

#[derive(Clone, Debug)]
pub struct ProofOutput {
    pub payload: VerifierPayload,
    pub proof: Proof<Bn254>,
    pub public_inputs: Vec<Fr>,
}

/// Receipt id and tag in, verifier payload out.
///
/// The witness exists only inside this call and is zeroized before it
/// returns, on success and on every error path.
pub fn prove_and_format<R: RngCore + CryptoRng>(
    prover: &Groth16Prover,
    secret: &str,
    tag: &str,
    rng: &mut R,
    observer: &dyn StageObserver,
) -> ProofResult<ProofOutput> {
    let checkpoint = |stage: ProofStage| {
        tracing::debug!(%stage, "proof pipeline");
        observer.on_stage(stage);
        if observer.is_cancelled() {
            Err(ProofError::Cancelled)
        } else {
            Ok(())
        }
    };
    if observer.is_cancelled() {
        return Err(ProofError::Cancelled);
    }

    let inputs = build_inputs(secret, tag)?;
    checkpoint(ProofStage::InputsEncoded)?;

    let assignment = calculate_witness(prover.program(), &inputs)?;
    drop(inputs);
    checkpoint(ProofStage::WitnessCalculated)?;

    let proof = prover.prove(&assignment, rng)?;
    let public_inputs = assignment.public_inputs();
    drop(assignment);
    checkpoint(ProofStage::ProofComputed)?;

    let payload = format_payload(&proof, &public_inputs);
    observer.on_stage(ProofStage::PayloadFormatted);
    Ok(ProofOutput { payload, proof, public_inputs })
}
