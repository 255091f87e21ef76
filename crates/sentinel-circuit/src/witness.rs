//! Witness construction: named inputs in, full signal assignment out.

use std::collections::BTreeMap;
use std::fmt;

use ark_bn254::Fr;
use ark_ff::{BigInteger, One, PrimeField, Zero};
use sentinel_types::{ReceiptSecret, ReportTag};
use zeroize::Zeroize;

use crate::error::{ProofError, ProofResult};
use crate::program::{CircuitProgram, Instruction, SignalId};
use crate::whistleblower::{REPORT_ID, SECRET};

/// Named input values for one proof request. Zeroized on drop.
#[derive(Default)]
pub struct SignalMap {
    values: BTreeMap<String, Fr>,
}

impl SignalMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: Fr) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<Fr> {
        self.values.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for SignalMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl Drop for SignalMap {
    fn drop(&mut self) {
        for value in self.values.values_mut() {
            value.zeroize();
        }
    }
}

/// Maps a receipt id and report tag to the report circuit's inputs.
///
/// Both values must be canonical field elements; nothing is reduced.
pub fn build_inputs(secret: &str, tag: &str) -> ProofResult<SignalMap> {
    let secret = ReceiptSecret::parse(secret).map_err(|reason| ProofError::WitnessOutOfRange {
        signal: SECRET.to_string(),
        reason,
    })?;
    let tag = ReportTag::parse(tag).map_err(|reason| ProofError::WitnessOutOfRange {
        signal: REPORT_ID.to_string(),
        reason,
    })?;
    tracing::debug!(%secret, %tag, "report inputs encoded");
    Ok(report_inputs(&secret, &tag))
}

pub fn report_inputs(secret: &ReceiptSecret, tag: &ReportTag) -> SignalMap {
    let mut inputs = SignalMap::new();
    inputs.insert(SECRET, *secret.as_fr());
    inputs.insert(REPORT_ID, *tag.as_fr());
    inputs
}

/// Full signal assignment, indexed by signal, with `[0] = 1`.
/// Zeroized on drop.
pub struct Assignment {
    values: Vec<Fr>,
    num_public: usize,
}

impl Assignment {
    pub fn as_slice(&self) -> &[Fr] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Public signals in declaration order: outputs, then public inputs.
    pub fn public_inputs(&self) -> Vec<Fr> {
        self.values[1..=self.num_public].to_vec()
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assignment")
            .field("signals", &self.values.len())
            .field("num_public", &self.num_public)
            .finish()
    }
}

impl Drop for Assignment {
    fn drop(&mut self) {
        self.values.zeroize();
    }
}

/// Runs the program's instructions over `inputs`, then checks every
/// constraint row.
pub fn calculate_witness(program: &CircuitProgram, inputs: &SignalMap) -> ProofResult<Assignment> {
    let n = program.num_signals();
    let mut assignment = Assignment {
        values: vec![Fr::zero(); n],
        num_public: program.num_public(),
    };
    let mut resolved = vec![false; n];
    assignment.values[0] = Fr::one();
    resolved[0] = true;

    if let Some(unknown) = inputs.names().find(|name| program.input(name).is_none()) {
        return Err(ProofError::ProverInternalError(format!(
            "circuit `{}` has no input `{unknown}`",
            program.name()
        )));
    }
    for input in program.inputs() {
        let value = inputs.get(&input.name).ok_or_else(|| {
            ProofError::ProverInternalError(format!("input `{}` was not supplied", input.name))
        })?;
        assignment.values[input.signal as usize] = value;
        resolved[input.signal as usize] = true;
    }

    let mut set = |values: &mut [Fr], signal: SignalId, value: Fr| {
        values[signal as usize] = value;
        resolved[signal as usize] = true;
    };
    for instruction in program.instructions() {
        let values = &mut assignment.values;
        match instruction {
            Instruction::Linear { out, lc } => {
                let v = lc.evaluate(values);
                set(values, *out, v);
            }
            Instruction::Product { out, left, right } => {
                let v = left.evaluate(values) * right.evaluate(values);
                set(values, *out, v);
            }
            Instruction::Decompose { source, bits } => {
                let v = source.evaluate(values).into_bigint();
                for (i, &bit) in bits.iter().enumerate() {
                    set(values, bit, Fr::from(v.get_bit(i)));
                }
            }
        }
    }

    if let Some(signal) = resolved.iter().position(|r| !r) {
        return Err(ProofError::ProverInternalError(format!(
            "signal {signal} was never assigned"
        )));
    }
    if let Some(row) = program.first_unsatisfied(&assignment.values) {
        tracing::debug!(circuit = program.name(), row, "witness rejected");
        return Err(ProofError::UnsatisfiableWitness { row });
    }

    tracing::debug!(
        circuit = program.name(),
        signals = n,
        constraints = program.num_constraints(),
        "witness calculated"
    );
    Ok(assignment)
}
