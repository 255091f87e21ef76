use std::fmt;
use std::path::PathBuf;

use sentinel_types::FieldError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    Circuit,
    ProvingKey,
    VerificationKey,
}

impl ArtifactKind {
    pub fn magic(self) -> &'static [u8; 4] {
        match self {
            Self::Circuit => b"sncs",
            Self::ProvingKey => b"snpk",
            Self::VerificationKey => b"snvk",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Circuit => "circuit",
            Self::ProvingKey => "proving key",
            Self::VerificationKey => "verification key",
        })
    }
}

/// Why an artifact that was read successfully could not be used.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CorruptReason {
    #[error("file is empty")]
    Empty,
    /// Typically an HTML error page served in place of the artifact.
    #[error("content is text, not a binary artifact (starts with {preview:?})")]
    NotBinary { preview: String },
    #[error("bad magic: expected \"{expected}\", found \"{found}\"")]
    BadMagic { expected: String, found: String },
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u32),
    #[error("artifact was produced for a different field")]
    FieldMismatch,
    #[error("unexpected end of data")]
    Truncated,
    #[error("{0}")]
    Malformed(String),
    #[error("proving key does not match the circuit: {0}")]
    CircuitMismatch(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    #[error("{kind} artifact not found at {}", path.display())]
    ArtifactNotFound { kind: ArtifactKind, path: PathBuf },

    #[error("cannot access {kind} artifact at {}: {source}", path.display())]
    ArtifactIo {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} artifact is corrupt: {reason}")]
    ArtifactCorrupt { kind: ArtifactKind, reason: CorruptReason },

    #[error("input `{signal}` is not a valid field element: {reason}")]
    WitnessOutOfRange { signal: String, reason: FieldError },

    #[error("inputs do not satisfy the circuit (constraint {row} failed)")]
    UnsatisfiableWitness { row: usize },

    #[error("prover internal error: {0}")]
    ProverInternalError(String),

    #[error("invalid proof format: {0}")]
    InvalidProofFormat(String),

    #[error("proof request cancelled")]
    Cancelled,
}

impl ProofError {
    pub fn corrupt(kind: ArtifactKind, reason: CorruptReason) -> Self {
        Self::ArtifactCorrupt { kind, reason }
    }

    /// True when the request itself was bad, false when the system could
    /// not produce or check a proof.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::WitnessOutOfRange { .. }
                | Self::UnsatisfiableWitness { .. }
                | Self::InvalidProofFormat(_)
        )
    }
}

pub type ProofResult<T> = Result<T, ProofError>;
