use std::sync::Arc;

use ark_bn254::{Bn254, Fr};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_groth16::{Proof, VerifyingKey};
use sentinel_types::VerifierPayload;

use crate::error::{ProofError, ProofResult};
use crate::format::parse_payload;
use crate::msm::MsmStrategy;

/// Checks proofs in the verifier wire layout, the same way the on-chain
/// contract does.
#[derive(Clone)]
pub struct Verifier {
    vk: Arc<VerifyingKey<Bn254>>,
}

impl Verifier {
    pub fn new(vk: Arc<VerifyingKey<Bn254>>) -> Self {
        Self { vk }
    }

    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.vk
    }

    /// `Ok(false)` for a well-formed proof that does not verify;
    /// `InvalidProofFormat` when the payload cannot be decoded at all.
    pub fn verify(&self, payload: &VerifierPayload) -> ProofResult<bool> {
        let (proof, inputs) = parse_payload(payload)?;
        self.verify_proof(&proof, &inputs)
    }

    /// `e(A,B) · e(-L,γ) · e(-C,δ) == e(α,β)` with `L = IC₀ + Σ xᵢ·ICᵢ`.
    pub fn verify_proof(&self, proof: &Proof<Bn254>, inputs: &[Fr]) -> ProofResult<bool> {
        let vk = &*self.vk;
        if inputs.len() + 1 != vk.gamma_abc_g1.len() {
            return Err(ProofError::InvalidProofFormat(format!(
                "expected {} public inputs, got {}",
                vk.gamma_abc_g1.len().saturating_sub(1),
                inputs.len()
            )));
        }

        let l = vk.gamma_abc_g1[0].into_group() + MsmStrategy::Pippenger.msm(&vk.gamma_abc_g1[1..], inputs);
        let lhs = Bn254::multi_pairing(
            [proof.a, (-l).into_affine(), -proof.c],
            [proof.b, vk.gamma_g2, vk.delta_g2],
        );
        let ok = lhs == Bn254::pairing(vk.alpha_g1, vk.beta_g2);
        tracing::debug!(verified = ok, "proof checked");
        Ok(ok)
    }
}

/// One-shot form of [`Verifier::verify`].
pub fn verify(vk: &VerifyingKey<Bn254>, payload: &VerifierPayload) -> ProofResult<bool> {
    Verifier::new(Arc::new(vk.clone())).verify(payload)
}
