use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, ProvingKey, VerifyingKey};
use ark_relations::r1cs::{
    ConstraintSynthesizer, ConstraintSystemRef, LinearCombination as ArkLc, SynthesisError,
    Variable,
};
use ark_snark::SNARK;
use ark_std::rand::{CryptoRng, RngCore};

use crate::error::{ProofError, ProofResult};
use crate::program::{CircuitProgram, LinearCombination};
use crate::witness::Assignment;

/// Replays a [`CircuitProgram`] into an arkworks constraint system.
pub struct ProgramCircuit<'a> {
    program: &'a CircuitProgram,
    assignment: Option<&'a [Fr]>,
}

impl<'a> ProgramCircuit<'a> {
    /// Shape only, for key generation.
    pub fn setup_mode(program: &'a CircuitProgram) -> Self {
        Self { program, assignment: None }
    }

    pub fn with_assignment(program: &'a CircuitProgram, assignment: &'a Assignment) -> Self {
        Self { program, assignment: Some(assignment.as_slice()) }
    }
}

impl ConstraintSynthesizer<Fr> for ProgramCircuit<'_> {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let num_public = self.program.num_public();
        let assignment = self.assignment;

        let mut vars = Vec::with_capacity(self.program.num_signals());
        vars.push(Variable::One);
        for i in 1..self.program.num_signals() {
            let value = move || {
                assignment
                    .and_then(|w| w.get(i).copied())
                    .ok_or(SynthesisError::AssignmentMissing)
            };
            let var = if i <= num_public {
                cs.new_input_variable(value)?
            } else {
                cs.new_witness_variable(value)?
            };
            vars.push(var);
        }

        for c in self.program.constraints() {
            cs.enforce_constraint(to_ark(&c.a, &vars), to_ark(&c.b, &vars), to_ark(&c.c, &vars))?;
        }
        Ok(())
    }
}

fn to_ark(lc: &LinearCombination, vars: &[Variable]) -> ArkLc<Fr> {
    ArkLc(lc.terms().iter().map(|&(s, coeff)| (coeff, vars[s as usize])).collect())
}

/// Circuit-specific Groth16 key generation. Development use only: whoever
/// holds `rng`'s output can forge proofs.
pub fn setup<R: RngCore + CryptoRng>(
    program: &CircuitProgram,
    rng: &mut R,
) -> ProofResult<(ProvingKey<Bn254>, VerifyingKey<Bn254>)> {
    let keys = Groth16::<Bn254>::circuit_specific_setup(ProgramCircuit::setup_mode(program), rng)
        .map_err(|e| ProofError::ProverInternalError(format!("setup failed: {e}")))?;
    tracing::info!(
        circuit = program.name(),
        constraints = program.num_constraints(),
        public = program.num_public(),
        "generated development keys"
    );
    Ok(keys)
}
