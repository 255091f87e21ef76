use std::sync::Arc;

use ark_bn254::{Bn254, Fr, G1Affine, G2Affine};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::UniformRand;
use ark_groth16::r1cs_to_qap::{LibsnarkReduction, R1CSToQAP};
use ark_groth16::{Proof, ProvingKey, VerifyingKey};
use ark_poly::{EvaluationDomain, GeneralEvaluationDomain};
use ark_relations::r1cs::ConstraintMatrices;
use ark_std::rand::{CryptoRng, RngCore};

use crate::error::{ArtifactKind, CorruptReason, ProofError, ProofResult};
use crate::msm::{MsmStrategy, WindowTable};
use crate::program::CircuitProgram;
use crate::witness::Assignment;

/// Groth16 prover bound to one circuit and its proving key.
///
/// Read-only after construction; clone it or share it behind an `Arc`
/// across threads.
#[derive(Clone)]
pub struct Groth16Prover {
    program: Arc<CircuitProgram>,
    pk: Arc<ProvingKey<Bn254>>,
    matrices: Arc<ConstraintMatrices<Fr>>,
    strategy: MsmStrategy,
    tables: Option<Arc<QueryTables>>,
}

/// Window tables for every proving-key query, built once per strategy.
struct QueryTables {
    a: WindowTable<G1Affine>,
    b_g1: WindowTable<G1Affine>,
    b_g2: WindowTable<G2Affine>,
    l: WindowTable<G1Affine>,
    h: WindowTable<G1Affine>,
}

impl QueryTables {
    fn new(pk: &ProvingKey<Bn254>, window_bits: u8) -> Self {
        Self {
            a: WindowTable::new(&pk.a_query, window_bits),
            b_g1: WindowTable::new(&pk.b_g1_query, window_bits),
            b_g2: WindowTable::new(&pk.b_g2_query, window_bits),
            l: WindowTable::new(&pk.l_query, window_bits),
            h: WindowTable::new(&pk.h_query, window_bits),
        }
    }
}

impl Groth16Prover {
    /// Fails with `CircuitMismatch` when `pk` was generated for a circuit
    /// of a different shape.
    pub fn new(program: Arc<CircuitProgram>, pk: Arc<ProvingKey<Bn254>>) -> ProofResult<Self> {
        check_key_shape(&program, &pk).map_err(|detail| {
            ProofError::corrupt(ArtifactKind::ProvingKey, CorruptReason::CircuitMismatch(detail))
        })?;
        let matrices = Arc::new(program.to_matrices());
        Ok(Self { program, pk, matrices, strategy: MsmStrategy::default(), tables: None })
    }

    /// `Windowed` precomputes tables for every key query here, once.
    pub fn with_strategy(mut self, strategy: MsmStrategy) -> Self {
        if strategy != self.strategy {
            self.tables = match strategy {
                MsmStrategy::Pippenger => None,
                MsmStrategy::Windowed { window_bits } => {
                    let tables = QueryTables::new(&self.pk, window_bits);
                    tracing::debug!(window_bits, bases = tables.h.len(), "msm tables built");
                    Some(Arc::new(tables))
                }
            };
        }
        self.strategy = strategy;
        self
    }

    pub fn program(&self) -> &CircuitProgram {
        &self.program
    }

    pub fn proving_key(&self) -> &ProvingKey<Bn254> {
        &self.pk
    }

    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.pk.vk
    }

    pub fn strategy(&self) -> MsmStrategy {
        self.strategy
    }

    /// Fresh blinding from `rng` on every call, so two proofs of the same
    /// statement differ.
    pub fn prove<R: RngCore + CryptoRng>(
        &self,
        assignment: &Assignment,
        rng: &mut R,
    ) -> ProofResult<Proof<Bn254>> {
        let r = Fr::rand(rng);
        let s = Fr::rand(rng);
        self.prove_with_blinding(assignment, r, s)
    }

    fn prove_with_blinding(&self, assignment: &Assignment, r: Fr, s: Fr) -> ProofResult<Proof<Bn254>> {
        let w = assignment.as_slice();
        if w.len() != self.program.num_signals() {
            tracing::error!(
                got = w.len(),
                expected = self.program.num_signals(),
                "assignment does not fit the circuit"
            );
            return Err(ProofError::ProverInternalError(format!(
                "assignment has {} signals, circuit has {}",
                w.len(),
                self.program.num_signals()
            )));
        }

        let m = &*self.matrices;
        let h = LibsnarkReduction::witness_map_from_matrices::<Fr, GeneralEvaluationDomain<Fr>>(
            m,
            m.num_instance_variables,
            m.num_constraints,
            w,
        )
        .map_err(|e| ProofError::ProverInternalError(format!("QAP reduction failed: {e}")))?;

        let pk = &*self.pk;
        // h carries one more coefficient than h_query; it is zero for a satisfied witness
        if h.len() < pk.h_query.len() {
            tracing::error!(h = h.len(), h_query = pk.h_query.len(), "quotient does not fit the key");
            return Err(ProofError::ProverInternalError(format!(
                "quotient has {} coefficients, key has {} h_query points",
                h.len(),
                pk.h_query.len()
            )));
        }
        let aux = &w[m.num_instance_variables..];

        let (a_acc, b_g2_acc, b_g1_acc, l_acc, h_acc) = match &self.tables {
            Some(t) => (t.a.msm(w), t.b_g2.msm(w), t.b_g1.msm(w), t.l.msm(aux), t.h.msm(&h)),
            None => {
                let msm = MsmStrategy::Pippenger;
                (
                    msm.msm(&pk.a_query, w),
                    msm.msm(&pk.b_g2_query, w),
                    msm.msm(&pk.b_g1_query, w),
                    msm.msm(&pk.l_query, aux),
                    msm.msm(&pk.h_query, &h),
                )
            }
        };

        let a = pk.vk.alpha_g1.into_group() + a_acc + pk.delta_g1 * r;
        let b_g2 = pk.vk.beta_g2.into_group() + b_g2_acc + pk.vk.delta_g2 * s;
        let b_g1 = pk.beta_g1.into_group() + b_g1_acc + pk.delta_g1 * s;

        let mut c = l_acc + h_acc;
        c += a * s;
        c += b_g1 * r;
        c -= pk.delta_g1 * (r * s);

        tracing::debug!(circuit = self.program.name(), strategy = ?self.strategy, "proof computed");
        Ok(Proof { a: a.into_affine(), b: b_g2.into_affine(), c: c.into_affine() })
    }
}

fn check_key_shape(program: &CircuitProgram, pk: &ProvingKey<Bn254>) -> Result<(), String> {
    let signals = program.num_signals();
    let instance = program.num_public() + 1;
    let expect = |what: &str, got: usize, want: usize| {
        if got == want {
            Ok(())
        } else {
            Err(format!("{what} has {got} entries, circuit needs {want}"))
        }
    };
    expect("a_query", pk.a_query.len(), signals)?;
    expect("b_g1_query", pk.b_g1_query.len(), signals)?;
    expect("b_g2_query", pk.b_g2_query.len(), signals)?;
    expect("l_query", pk.l_query.len(), signals - instance)?;
    expect("gamma_abc_g1", pk.vk.gamma_abc_g1.len(), instance)?;

    let domain = GeneralEvaluationDomain::<Fr>::new(program.num_constraints() + instance)
        .ok_or_else(|| format!("{} constraints exceed the field's FFT domain", program.num_constraints()))?;
    expect("h_query", pk.h_query.len(), domain.size() - 1)
}
