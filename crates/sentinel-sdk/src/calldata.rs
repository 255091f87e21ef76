// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! ABI encoding of the verifier contract's report entry point.

use num_bigint::BigUint;
use sentinel_circuit::ProofError;
use sentinel_types::VerifierPayload;
use sha3::{Digest, Keccak256};

use crate::error::{SentinelError, SentinelResult};

pub const REPORT_SIGNATURE: &str =
    "reportViolationZK(address,uint256[2],uint256[2][2],uint256[2],uint256[2])";

/// Number of public inputs the entry point takes.
pub const REPORT_INPUTS: usize = 2;

const WORD: usize = 32;

pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// `0x`-prefixed, 20-byte hex address. Checksum casing is not enforced.
pub fn parse_address(s: &str) -> SentinelResult<[u8; 20]> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| SentinelError::Config(format!("address must start with 0x: {s}")))?;
    let bytes = hex::decode(digits)
        .map_err(|e| SentinelError::Config(format!("invalid address {s}: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| SentinelError::Config(format!("address must be 20 bytes: {s}")))
}

fn word_from_decimal(s: &str) -> SentinelResult<[u8; WORD]> {
    let value: BigUint = s
        .parse()
        .map_err(|_| ProofError::InvalidProofFormat(format!("not a decimal integer: {s}")))?;
    let bytes = value.to_bytes_be();
    if bytes.len() > WORD {
        return Err(ProofError::InvalidProofFormat(format!("value exceeds 256 bits: {s}")).into());
    }
    let mut word = [0u8; WORD];
    word[WORD - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

/// Calldata for `reportViolationZK(target, a, b, c, input)`: the selector
/// followed by eleven static words. `b` is copied as given, already in
/// verifier order.
pub fn encode_report_call(target: &str, payload: &VerifierPayload) -> SentinelResult<Vec<u8>> {
    if payload.input.len() != REPORT_INPUTS {
        return Err(ProofError::InvalidProofFormat(format!(
            "report call takes {REPORT_INPUTS} public inputs, payload has {}",
            payload.input.len()
        ))
        .into());
    }

    let mut out = Vec::with_capacity(4 + 11 * WORD);
    out.extend_from_slice(&selector(REPORT_SIGNATURE));

    let mut address = [0u8; WORD];
    address[WORD - 20..].copy_from_slice(&parse_address(target)?);
    out.extend_from_slice(&address);

    let words = payload
        .a
        .iter()
        .chain(payload.b.iter().flatten())
        .chain(payload.c.iter())
        .chain(payload.input.iter());
    for value in words {
        out.extend_from_slice(&word_from_decimal(value)?);
    }
    Ok(out)
}

pub fn encode_report_call_hex(target: &str, payload: &VerifierPayload) -> SentinelResult<String> {
    encode_report_call(target, payload).map(|data| format!("0x{}", hex::encode(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn payload() -> VerifierPayload {
        let s = |n: u32| n.to_string();
        VerifierPayload {
            a: [s(1), s(2)],
            b: [[s(3), s(4)], [s(5), s(6)]],
            c: [s(7), s(8)],
            input: vec![s(9), s(404)],
        }
    }

    fn word(data: &[u8], i: usize) -> &[u8] {
        &data[4 + i * WORD..4 + (i + 1) * WORD]
    }

    #[test]
    fn test_known_selector() {
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_layout() {
        let data = encode_report_call(TARGET, &payload()).unwrap();
        assert_eq!(data.len(), 4 + 11 * WORD);
        assert_eq!(data[..4], selector(REPORT_SIGNATURE));

        let address = word(&data, 0);
        assert!(address[..12].iter().all(|b| *b == 0));
        assert_eq!(hex::encode(&address[12..]), TARGET[2..].to_lowercase());

        for i in 1..=9u8 {
            let w = word(&data, i as usize);
            assert!(w[..31].iter().all(|b| *b == 0));
            assert_eq!(w[31], i);
        }
        assert_eq!(&word(&data, 10)[30..], &[0x01, 0x94]);
    }

    #[test]
    fn test_hex_form() {
        let hex = encode_report_call_hex(TARGET, &payload()).unwrap();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 2 + 2 * (4 + 11 * WORD));
    }

    #[test]
    fn test_bad_address() {
        for bad in ["5FbDB2315678afecb367f032d93F642f64180aa3", "0x1234", "0xzz"] {
            assert!(matches!(
                encode_report_call(bad, &payload()),
                Err(SentinelError::Config(_))
            ));
        }
    }

    #[test]
    fn test_wrong_input_count() {
        let mut p = payload();
        p.input.pop();
        let err = encode_report_call(TARGET, &p).unwrap_err();
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_oversized_value() {
        let mut p = payload();
        p.c[0] = "1".repeat(80);
        assert!(encode_report_call(TARGET, &p).is_err());
    }
}
