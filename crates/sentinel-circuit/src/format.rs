//! Conversion between arkworks proofs and the verifier wire layout.
//!
//! The verifier contract takes a G2 coordinate as `[c1, c0]`, the reverse
//! of the prover's `(c0, c1)`. The swap happens here and nowhere else.

use ark_bn254::{Bn254, Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ff::{PrimeField, Zero};
use ark_groth16::Proof;
use sentinel_types::{parse_canonical, to_decimal, VerifierPayload};

use crate::error::{ProofError, ProofResult};

pub fn format_payload(proof: &Proof<Bn254>, public_inputs: &[Fr]) -> VerifierPayload {
    VerifierPayload {
        a: g1_to_wire(&proof.a),
        b: g2_to_wire(&proof.b),
        c: g1_to_wire(&proof.c),
        input: public_inputs.iter().map(to_decimal).collect(),
    }
}

/// Inverse of [`format_payload`]. Every coordinate must be canonical and
/// every point on its curve and in the prime-order subgroup.
pub fn parse_payload(payload: &VerifierPayload) -> ProofResult<(Proof<Bn254>, Vec<Fr>)> {
    let proof = Proof {
        a: g1_from_wire(&payload.a, "a")?,
        b: g2_from_wire(&payload.b, "b")?,
        c: g1_from_wire(&payload.c, "c")?,
    };
    let inputs = payload
        .input
        .iter()
        .enumerate()
        .map(|(i, s)| {
            parse_canonical::<Fr>(s)
                .map_err(|e| ProofError::InvalidProofFormat(format!("input[{i}]: {e}")))
        })
        .collect::<ProofResult<Vec<_>>>()?;
    Ok((proof, inputs))
}

fn g1_to_wire(p: &G1Affine) -> [String; 2] {
    if p.infinity {
        return ["0".into(), "0".into()];
    }
    [to_decimal(&p.x), to_decimal(&p.y)]
}

fn g2_to_wire(p: &G2Affine) -> [[String; 2]; 2] {
    if p.infinity {
        return [["0".into(), "0".into()], ["0".into(), "0".into()]];
    }
    [
        [to_decimal(&p.x.c1), to_decimal(&p.x.c0)],
        [to_decimal(&p.y.c1), to_decimal(&p.y.c0)],
    ]
}

fn coordinate(s: &str, label: &str) -> ProofResult<Fq> {
    parse_canonical::<Fq>(s).map_err(|e| ProofError::InvalidProofFormat(format!("{label}: {e}")))
}

fn g1_from_wire(pair: &[String; 2], label: &str) -> ProofResult<G1Affine> {
    let x = coordinate(&pair[0], label)?;
    let y = coordinate(&pair[1], label)?;
    if x.is_zero() && y.is_zero() {
        return Ok(G1Affine::identity());
    }
    let p = G1Affine::new_unchecked(x, y);
    if !p.is_on_curve() || !p.is_in_correct_subgroup_assuming_on_curve() {
        return Err(ProofError::InvalidProofFormat(format!("{label} is not a G1 point")));
    }
    Ok(p)
}

fn g2_from_wire(pairs: &[[String; 2]; 2], label: &str) -> ProofResult<G2Affine> {
    let [x, y] = pairs;
    let x = Fq2::new(coordinate(&x[1], label)?, coordinate(&x[0], label)?);
    let y = Fq2::new(coordinate(&y[1], label)?, coordinate(&y[0], label)?);
    if x.is_zero() && y.is_zero() {
        return Ok(G2Affine::identity());
    }
    let p = G2Affine::new_unchecked(x, y);
    if !p.is_on_curve() || !p.is_in_correct_subgroup_assuming_on_curve() {
        return Err(ProofError::InvalidProofFormat(format!("{label} is not a G2 point")));
    }
    Ok(p)
}

/// Decimal modulus of the base field, the bound every coordinate must
/// stay under.
pub fn base_field_modulus() -> String {
    let modulus: num_bigint::BigUint = Fq::MODULUS.into();
    modulus.to_str_radix(10)
}
