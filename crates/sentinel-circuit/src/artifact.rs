//! On-disk artifacts: compiled circuit, proving key, verification key.
//!
//! Every artifact starts with the same envelope:
//!
//! | bytes | content                                  |
//! |-------|------------------------------------------|
//! | 4     | magic (`sncs`, `snpk`, `snvk`)           |
//! | 4     | format version, u32 LE                   |
//! | 4     | modulus length `n`, u32 LE               |
//! | n     | scalar field modulus, LE                 |
//!
//! Keys follow as arkworks uncompressed encoding, fully validated on load.
//! The circuit body is length-prefixed and described by `encode_circuit`.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use ark_bn254::{Bn254, Fr};
use ark_ff::{BigInteger, PrimeField};
use ark_groth16::{ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, SerializationError};

use crate::error::{ArtifactKind, CorruptReason, ProofError, ProofResult};
use crate::program::{
    CircuitProgram, Constraint, Instruction, LinearCombination, NamedSignal, SignalRole,
};

pub const FORMAT_VERSION: u32 = 1;

const SNIFF_LEN: usize = 512;
const PREVIEW_LEN: usize = 40;

const OP_LINEAR: u8 = 0;
const OP_PRODUCT: u8 = 1;
const OP_DECOMPOSE: u8 = 2;

fn modulus_bytes() -> Vec<u8> {
    Fr::MODULUS.to_bytes_le()
}

/// Kind of artifact `bytes` claims to be, judged by its magic alone.
pub fn detect_kind(bytes: &[u8]) -> Option<ArtifactKind> {
    [ArtifactKind::Circuit, ArtifactKind::ProvingKey, ArtifactKind::VerificationKey]
        .into_iter()
        .find(|kind| bytes.starts_with(kind.magic()))
}

fn header(kind: ArtifactKind) -> Vec<u8> {
    let modulus = modulus_bytes();
    let mut out = Vec::with_capacity(12 + modulus.len());
    out.extend_from_slice(kind.magic());
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&(modulus.len() as u32).to_le_bytes());
    out.extend_from_slice(&modulus);
    out
}

/// Validates the envelope and returns the body.
pub fn open_envelope(kind: ArtifactKind, bytes: &[u8]) -> Result<&[u8], CorruptReason> {
    if bytes.is_empty() {
        return Err(CorruptReason::Empty);
    }
    if let Some(preview) = sniff_text(bytes) {
        return Err(CorruptReason::NotBinary { preview });
    }
    if !bytes.starts_with(kind.magic()) {
        return Err(CorruptReason::BadMagic {
            expected: kind.magic().escape_ascii().to_string(),
            found: bytes[..bytes.len().min(4)].escape_ascii().to_string(),
        });
    }

    let mut reader = Reader::new(&bytes[4..]);
    let version = reader.u32()?;
    if version != FORMAT_VERSION {
        return Err(CorruptReason::UnsupportedVersion(version));
    }
    let len = reader.u32()? as usize;
    let modulus = reader.take(len)?;
    if modulus != modulus_bytes().as_slice() {
        return Err(CorruptReason::FieldMismatch);
    }
    Ok(reader.rest)
}

/// A preview when `bytes` is text (an HTML error page, JSON, a plain
/// message) rather than a binary artifact.
fn sniff_text(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    let first = head.iter().copied().find(|b| !b.is_ascii_whitespace());
    let markup = matches!(first, Some(b'<' | b'{' | b'[')) && !head.contains(&0);
    if !markup && !is_text(head) {
        return None;
    }

    let preview: String = String::from_utf8_lossy(&head[..head.len().min(PREVIEW_LEN)])
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    Some(preview.trim().to_string())
}

fn is_text(head: &[u8]) -> bool {
    let utf8 = match std::str::from_utf8(head) {
        Ok(_) => true,
        // a multi-byte char cut off by the sniff window
        Err(e) => e.error_len().is_none(),
    };
    utf8 && head
        .iter()
        .all(|&b| matches!(b, b'\t' | b'\n' | b'\r') || (b >= 0x20 && b != 0x7f))
}

struct Reader<'a> {
    rest: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { rest: bytes }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CorruptReason> {
        if self.rest.len() < n {
            return Err(CorruptReason::Truncated);
        }
        let (head, tail) = self.rest.split_at(n);
        self.rest = tail;
        Ok(head)
    }

    fn u8(&mut self) -> Result<u8, CorruptReason> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, CorruptReason> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// An item count. Every item takes at least one byte, so a count
    /// larger than what is left can only mean truncation.
    fn count(&mut self) -> Result<usize, CorruptReason> {
        let n = self.u32()? as usize;
        if n > self.rest.len() {
            return Err(CorruptReason::Truncated);
        }
        Ok(n)
    }

    fn string(&mut self) -> Result<String, CorruptReason> {
        let n = self.count()?;
        let bytes = self.take(n)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| CorruptReason::Malformed("signal name is not UTF-8".into()))
    }

    fn field(&mut self) -> Result<Fr, CorruptReason> {
        let bytes = self.take(32)?;
        Fr::deserialize_compressed(bytes)
            .map_err(|_| CorruptReason::Malformed("non-canonical field element".into()))
    }

    fn lc(&mut self) -> Result<LinearCombination, CorruptReason> {
        let n = self.count()?;
        let mut terms = Vec::with_capacity(n);
        for _ in 0..n {
            let signal = self.u32()?;
            let coeff = self.field()?;
            terms.push((signal, coeff));
        }
        Ok(LinearCombination::from_terms(terms))
    }

    fn finish(self) -> Result<(), CorruptReason> {
        if self.rest.is_empty() {
            Ok(())
        } else {
            Err(CorruptReason::Malformed(format!("{} trailing bytes", self.rest.len())))
        }
    }
}

struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn count(&mut self, n: usize) {
        self.u32(n as u32);
    }

    fn string(&mut self, s: &str) {
        self.count(s.len());
        self.buf.extend_from_slice(s.as_bytes());
    }

    fn field(&mut self, f: &Fr) {
        self.buf.extend_from_slice(&f.into_bigint().to_bytes_le());
    }

    fn lc(&mut self, lc: &LinearCombination) {
        self.count(lc.terms().len());
        for (signal, coeff) in lc.terms() {
            self.u32(*signal);
            self.field(coeff);
        }
    }
}

/// Circuit body, after the envelope:
///
/// ```text
/// name            string (u32 length + UTF-8)
/// num_signals     u32
/// num_public      u32
/// named signals   u32 count, then (u8 role, u32 signal, string name)
/// constraints     u32 count, then three linear combinations a, b, c
/// instructions    u32 count, then u8 opcode and operands
/// ```
///
/// A linear combination is a u32 term count followed by `(u32 signal,
/// 32-byte LE coefficient)` pairs.
pub fn encode_circuit(program: &CircuitProgram) -> Vec<u8> {
    let mut w = Writer { buf: header(ArtifactKind::Circuit) };
    w.string(program.name());
    w.count(program.num_signals());
    w.count(program.num_public());

    w.count(program.named_signals().len());
    for named in program.named_signals() {
        w.u8(named.role.code());
        w.u32(named.signal);
        w.string(&named.name);
    }

    w.count(program.constraints().len());
    for c in program.constraints() {
        w.lc(&c.a);
        w.lc(&c.b);
        w.lc(&c.c);
    }

    w.count(program.instructions().len());
    for instruction in program.instructions() {
        match instruction {
            Instruction::Linear { out, lc } => {
                w.u8(OP_LINEAR);
                w.u32(*out);
                w.lc(lc);
            }
            Instruction::Product { out, left, right } => {
                w.u8(OP_PRODUCT);
                w.u32(*out);
                w.lc(left);
                w.lc(right);
            }
            Instruction::Decompose { source, bits } => {
                w.u8(OP_DECOMPOSE);
                w.lc(source);
                w.count(bits.len());
                for bit in bits {
                    w.u32(*bit);
                }
            }
        }
    }
    w.buf
}

pub fn decode_circuit(bytes: &[u8]) -> ProofResult<CircuitProgram> {
    decode_circuit_body(bytes).map_err(|reason| ProofError::corrupt(ArtifactKind::Circuit, reason))
}

fn decode_circuit_body(bytes: &[u8]) -> Result<CircuitProgram, CorruptReason> {
    let mut r = Reader::new(open_envelope(ArtifactKind::Circuit, bytes)?);
    let name = r.string()?;
    let num_signals = r.u32()?;
    let num_public = r.u32()?;

    let named_count = r.count()?;
    let mut named = Vec::with_capacity(named_count);
    for _ in 0..named_count {
        let code = r.u8()?;
        let role = SignalRole::from_code(code)
            .ok_or_else(|| CorruptReason::Malformed(format!("unknown signal role {code}")))?;
        let signal = r.u32()?;
        let name = r.string()?;
        named.push(NamedSignal { name, signal, role });
    }

    let constraint_count = r.count()?;
    let mut constraints = Vec::with_capacity(constraint_count);
    for _ in 0..constraint_count {
        let a = r.lc()?;
        let b = r.lc()?;
        let c = r.lc()?;
        constraints.push(Constraint { a, b, c });
    }

    let instruction_count = r.count()?;
    let mut instructions = Vec::with_capacity(instruction_count);
    for _ in 0..instruction_count {
        let instruction = match r.u8()? {
            OP_LINEAR => Instruction::Linear { out: r.u32()?, lc: r.lc()? },
            OP_PRODUCT => {
                let out = r.u32()?;
                let left = r.lc()?;
                let right = r.lc()?;
                Instruction::Product { out, left, right }
            }
            OP_DECOMPOSE => {
                let source = r.lc()?;
                let n = r.count()?;
                let bits = (0..n).map(|_| r.u32()).collect::<Result<Vec<_>, _>>()?;
                Instruction::Decompose { source, bits }
            }
            op => return Err(CorruptReason::Malformed(format!("unknown opcode {op}"))),
        };
        instructions.push(instruction);
    }
    r.finish()?;

    CircuitProgram::new(name, num_signals, num_public, named, constraints, instructions)
        .map_err(CorruptReason::Malformed)
}

fn encode_key<T: CanonicalSerialize>(kind: ArtifactKind, key: &T) -> ProofResult<Vec<u8>> {
    let mut buf = header(kind);
    key.serialize_uncompressed(&mut buf)
        .map_err(|e| ProofError::ProverInternalError(format!("cannot encode {kind}: {e}")))?;
    Ok(buf)
}

fn decode_key<T: CanonicalDeserialize>(kind: ArtifactKind, bytes: &[u8]) -> ProofResult<T> {
    let corrupt = |reason| ProofError::corrupt(kind, reason);
    let mut body = open_envelope(kind, bytes).map_err(corrupt)?;
    let key = T::deserialize_uncompressed(&mut body).map_err(|e| corrupt(key_error(e)))?;
    Reader::new(body).finish().map_err(corrupt)?;
    Ok(key)
}

fn key_error(e: SerializationError) -> CorruptReason {
    match e {
        SerializationError::IoError(io) if io.kind() == ErrorKind::UnexpectedEof => {
            CorruptReason::Truncated
        }
        other => CorruptReason::Malformed(other.to_string()),
    }
}

pub fn encode_proving_key(pk: &ProvingKey<Bn254>) -> ProofResult<Vec<u8>> {
    encode_key(ArtifactKind::ProvingKey, pk)
}

pub fn decode_proving_key(bytes: &[u8]) -> ProofResult<ProvingKey<Bn254>> {
    decode_key(ArtifactKind::ProvingKey, bytes)
}

pub fn encode_verification_key(vk: &VerifyingKey<Bn254>) -> ProofResult<Vec<u8>> {
    encode_key(ArtifactKind::VerificationKey, vk)
}

pub fn decode_verification_key(bytes: &[u8]) -> ProofResult<VerifyingKey<Bn254>> {
    decode_key(ArtifactKind::VerificationKey, bytes)
}

pub fn read_artifact(kind: ArtifactKind, path: &Path) -> ProofResult<Vec<u8>> {
    fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ProofError::ArtifactNotFound { kind, path: path.to_path_buf() },
        _ => ProofError::ArtifactIo { kind, path: path.to_path_buf(), source },
    })
}

fn write_artifact(kind: ArtifactKind, path: &Path, bytes: &[u8]) -> ProofResult<()> {
    let io_err = |source| ProofError::ArtifactIo { kind, path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, bytes).map_err(io_err)?;
    tracing::info!(%kind, path = %path.display(), bytes = bytes.len(), "artifact written");
    Ok(())
}

pub fn load_circuit(path: &Path) -> ProofResult<CircuitProgram> {
    let program = decode_circuit(&read_artifact(ArtifactKind::Circuit, path)?)?;
    tracing::debug!(
        circuit = program.name(),
        path = %path.display(),
        constraints = program.num_constraints(),
        "circuit loaded"
    );
    Ok(program)
}

pub fn load_proving_key(path: &Path) -> ProofResult<ProvingKey<Bn254>> {
    let pk = decode_proving_key(&read_artifact(ArtifactKind::ProvingKey, path)?)?;
    tracing::debug!(path = %path.display(), "proving key loaded");
    Ok(pk)
}

pub fn load_verification_key(path: &Path) -> ProofResult<VerifyingKey<Bn254>> {
    let vk = decode_verification_key(&read_artifact(ArtifactKind::VerificationKey, path)?)?;
    tracing::debug!(path = %path.display(), "verification key loaded");
    Ok(vk)
}

pub fn write_circuit(path: &Path, program: &CircuitProgram) -> ProofResult<()> {
    write_artifact(ArtifactKind::Circuit, path, &encode_circuit(program))
}

pub fn write_proving_key(path: &Path, pk: &ProvingKey<Bn254>) -> ProofResult<()> {
    write_artifact(ArtifactKind::ProvingKey, path, &encode_proving_key(pk)?)
}

pub fn write_verification_key(path: &Path, vk: &VerifyingKey<Bn254>) -> ProofResult<()> {
    write_artifact(ArtifactKind::VerificationKey, path, &encode_verification_key(vk)?)
}
