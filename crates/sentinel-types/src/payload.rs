use serde::{Deserialize, Serialize};

/// Proof and public inputs in the layout the on-chain verifier takes.
///
/// Every value is a decimal string. `b` is already in verifier order,
/// `[[x.c1, x.c0], [y.c1, y.c0]]`, which is the reverse of the prover's
/// native coordinate order within each pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierPayload {
    pub a: [String; 2],
    pub b: [[String; 2]; 2],
    pub c: [String; 2],
    /// Public signals in circuit declaration order.
    pub input: Vec<String>,
}
