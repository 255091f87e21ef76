use ark_ff::PrimeField;
use num_bigint::BigUint;

/// Scalar field of BN254. Every circuit signal holds one of these.
pub type FieldElement = ark_bn254::Fr;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("empty value")]
    Empty,
    /// The offending text is deliberately not echoed, it may be a secret.
    #[error("not a decimal or 0x-prefixed hex integer")]
    NotAnInteger,
    #[error("value is not below the field modulus")]
    OutOfRange,
}

fn parse_uint(s: &str) -> Result<BigUint, FieldError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(FieldError::Empty);
    }

    let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (s, 10),
    };
    let well_formed = !digits.is_empty()
        && digits.bytes().all(|b| match radix {
            16 => b.is_ascii_hexdigit(),
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(FieldError::NotAnInteger);
    }

    BigUint::parse_bytes(digits.as_bytes(), radix).ok_or(FieldError::NotAnInteger)
}

/// Parse an arbitrary-precision unsigned integer into `F`.
///
/// Unlike `F::from_str`, which silently reduces modulo the field order,
/// a value `>= F::MODULUS` is rejected: wrapping would change the
/// statement being proved.
pub fn parse_canonical<F: PrimeField>(s: &str) -> Result<F, FieldError> {
    let value = parse_uint(s)?;
    let modulus: BigUint = F::MODULUS.into();
    if value >= modulus {
        return Err(FieldError::OutOfRange);
    }
    Ok(F::from(value))
}

/// Canonical decimal form, `"0"` for zero.
pub fn to_decimal<F: PrimeField>(f: &F) -> String {
    let value: BigUint = f.into_bigint().into();
    value.to_str_radix(10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fq;

    const FR_MODULUS: &str =
        "21888242871839275222246405745257275088548364400416034343698204186575808495617";
    const FQ_MODULUS: &str =
        "21888242871839275222246405745257275088696311157297823662689037894645226208583";

    #[test]
    fn parses_small_decimal() {
        let f: FieldElement = parse_canonical("998877").unwrap();
        assert_eq!(f, FieldElement::from(998_877u64));
    }

    #[test]
    fn parses_hex() {
        let f: FieldElement = parse_canonical("0xff").unwrap();
        assert_eq!(f, FieldElement::from(255u64));
    }

    #[test]
    fn rejects_modulus_and_above() {
        assert_eq!(parse_canonical::<FieldElement>(FR_MODULUS), Err(FieldError::OutOfRange));

        let above = format!("{FR_MODULUS}0");
        assert_eq!(parse_canonical::<FieldElement>(&above), Err(FieldError::OutOfRange));
    }

    #[test]
    fn accepts_modulus_minus_one() {
        let max = "21888242871839275222246405745257275088548364400416034343698204186575808495616";
        let f: FieldElement = parse_canonical(max).unwrap();
        assert_eq!(f, -FieldElement::from(1u64));
    }

    #[test]
    fn base_field_uses_its_own_modulus() {
        // r < q, so r is a valid base-field coordinate
        assert!(parse_canonical::<Fq>(FR_MODULUS).is_ok());
        assert_eq!(parse_canonical::<Fq>(FQ_MODULUS), Err(FieldError::OutOfRange));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_canonical::<FieldElement>(""), Err(FieldError::Empty));
        assert_eq!(parse_canonical::<FieldElement>("-5"), Err(FieldError::NotAnInteger));
        assert_eq!(parse_canonical::<FieldElement>("12a"), Err(FieldError::NotAnInteger));
        assert_eq!(parse_canonical::<FieldElement>("0x"), Err(FieldError::NotAnInteger));
        assert_eq!(parse_canonical::<FieldElement>("1_000"), Err(FieldError::NotAnInteger));
    }

    #[test]
    fn decimal_of_zero_is_zero() {
        assert_eq!(to_decimal(&FieldElement::from(0u64)), "0");
        assert_eq!(to_decimal(&FieldElement::from(404u64)), "404");
    }
}
