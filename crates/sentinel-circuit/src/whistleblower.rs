//! The anonymous report circuit.
//!
//! Proves knowledge of a receipt id `secret < 2^64` such that
//! `commitment = Poseidon(secret, reportId)`, exposing only
//! `[commitment, reportId]`.

use crate::builder::CircuitBuilder;
use crate::error::{ProofError, ProofResult};
use crate::poseidon_gadget::hash2_lc;
use crate::program::CircuitProgram;

pub const CIRCUIT_NAME: &str = "whistleblower";
pub const COMMITMENT: &str = "commitment";
pub const REPORT_ID: &str = "reportId";
pub const SECRET: &str = "secret";

/// Receipt ids are issued as 64-bit integers.
pub const SECRET_BITS: usize = 64;

pub fn compile() -> ProofResult<CircuitProgram> {
    let mut cs = CircuitBuilder::new(CIRCUIT_NAME);
    let commitment = cs.public_output(COMMITMENT);
    let report_id = cs.public_input(REPORT_ID);
    let secret = cs.private_input(SECRET);

    cs.to_bits(&secret, SECRET_BITS);
    let hash = hash2_lc(&mut cs, &secret, &report_id);
    cs.bind_output(commitment, &hash);

    cs.finish()
        .map_err(|e| ProofError::ProverInternalError(format!("report circuit is invalid: {e}")))
}
