pub mod artifact;
pub mod builder;
pub mod error;
pub mod format;
pub mod msm;
pub mod pipeline;
pub mod poseidon_gadget;
pub mod program;
pub mod prover;
pub mod r1cs;
pub mod verifier;
pub mod whistleblower;
pub mod witness;

pub use error::{ArtifactKind, CorruptReason, ProofError, ProofResult};
pub use format::{format_payload, parse_payload};
pub use msm::MsmStrategy;
pub use pipeline::{prove_and_format, ProofOutput, ProofStage, StageObserver};
pub use program::CircuitProgram;
pub use prover::Groth16Prover;
pub use r1cs::setup;
pub use verifier::{verify, Verifier};
pub use witness::{build_inputs, calculate_witness, Assignment, SignalMap};

pub use ark_bn254::{Bn254, Fr};
pub use ark_groth16::{Proof, ProvingKey, VerifyingKey};
