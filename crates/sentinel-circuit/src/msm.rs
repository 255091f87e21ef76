use ark_ec::{AffineRepr, VariableBaseMSM};
use ark_ff::{BigInteger, PrimeField};
use ark_std::Zero;
use serde::{Deserialize, Serialize};

/// Multi-scalar multiplication backend used by the prover.
///
/// Every strategy computes the same group element; they differ only in
/// speed and memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MsmStrategy {
    /// Bucket method from `ark-ec`.
    #[default]
    Pippenger,
    /// Fixed-window with a per-base table of `2^window_bits` multiples.
    Windowed { window_bits: u8 },
}

impl MsmStrategy {
    pub const MAX_WINDOW_BITS: u8 = 8;

    /// `Σ bases[i]·scalars[i]` over the shorter of the two slices.
    ///
    /// `Windowed` builds its tables for this call only; callers that reuse
    /// the same bases should hold a [`WindowTable`] instead.
    pub fn msm<A: AffineRepr>(&self, bases: &[A], scalars: &[A::ScalarField]) -> A::Group {
        let len = bases.len().min(scalars.len());
        let (bases, scalars) = (&bases[..len], &scalars[..len]);
        match *self {
            Self::Pippenger => {
                let bigints: Vec<_> = scalars.iter().map(|s| s.into_bigint()).collect();
                <A::Group as VariableBaseMSM>::msm_bigint(bases, &bigints)
            }
            Self::Windowed { window_bits } => WindowTable::new(bases, window_bits).msm(scalars),
        }
    }
}

/// Per-base tables of `0, P, 2P, .., (2^c - 1)P` for fixed-window MSM over
/// a fixed set of bases.
#[derive(Clone, Debug)]
pub struct WindowTable<A: AffineRepr> {
    window_bits: usize,
    tables: Vec<Vec<A::Group>>,
}

impl<A: AffineRepr> WindowTable<A> {
    /// `window_bits` is clamped to `1..=MsmStrategy::MAX_WINDOW_BITS`.
    pub fn new(bases: &[A], window_bits: u8) -> Self {
        let c = window_bits.clamp(1, MsmStrategy::MAX_WINDOW_BITS) as usize;
        let tables = bases
            .iter()
            .map(|base| {
                let base = base.into_group();
                let mut table = Vec::with_capacity(1 << c);
                table.push(A::Group::zero());
                for i in 1..(1usize << c) {
                    let next = table[i - 1] + base;
                    table.push(next);
                }
                table
            })
            .collect();
        Self { window_bits: c, tables }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Same truncation rule as [`MsmStrategy::msm`].
    pub fn msm(&self, scalars: &[A::ScalarField]) -> A::Group {
        let c = self.window_bits;
        let digits: Vec<_> = scalars.iter().map(|s| s.into_bigint()).collect();

        let num_bits = A::ScalarField::MODULUS_BIT_SIZE as usize;
        let mut acc = A::Group::zero();
        for window in (0..num_bits.div_ceil(c)).rev() {
            for _ in 0..c {
                acc = acc + acc;
            }
            for (table, k) in self.tables.iter().zip(&digits) {
                let digit = window_digit(k, window * c, c);
                if digit != 0 {
                    acc += table[digit];
                }
            }
        }
        acc
    }
}

fn window_digit<B: BigInteger>(k: &B, start: usize, width: usize) -> usize {
    (0..width)
        .filter(|&i| k.get_bit(start + i))
        .fold(0, |digit, i| digit | (1 << i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::{Fr, G1Affine, G1Projective, G2Projective};
    use ark_ec::CurveGroup;
    use ark_ff::UniformRand;
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_strategies_agree() {
        let mut rng = StdRng::seed_from_u64(42);
        let bases: Vec<G1Affine> =
            (0..17).map(|_| G1Projective::rand(&mut rng).into_affine()).collect();
        let scalars: Vec<Fr> = (0..17).map(|_| Fr::rand(&mut rng)).collect();

        let naive = bases
            .iter()
            .zip(&scalars)
            .fold(G1Projective::zero(), |acc, (b, s)| acc + *b * s);

        let pippenger = MsmStrategy::Pippenger.msm(&bases, &scalars);
        assert_eq!(pippenger, naive);
        for window_bits in [1, 4, 7] {
            let windowed = MsmStrategy::Windowed { window_bits }.msm(&bases, &scalars);
            assert_eq!(windowed, naive, "window_bits = {window_bits}");
        }
    }

    #[test]
    fn test_g2_windowed() {
        let mut rng = StdRng::seed_from_u64(7);
        let bases: Vec<_> = (0..5).map(|_| G2Projective::rand(&mut rng).into_affine()).collect();
        let scalars: Vec<Fr> = (0..5).map(|_| Fr::rand(&mut rng)).collect();
        assert_eq!(
            MsmStrategy::Windowed { window_bits: 3 }.msm(&bases, &scalars),
            MsmStrategy::Pippenger.msm(&bases, &scalars),
        );
    }

    #[test]
    fn test_length_mismatch_uses_shorter() {
        let mut rng = StdRng::seed_from_u64(1);
        let bases: Vec<G1Affine> =
            (0..4).map(|_| G1Projective::rand(&mut rng).into_affine()).collect();
        let scalars = vec![Fr::from(2u64); 2];
        let expected = (bases[0].into_group() + bases[1].into_group()) * Fr::from(2u64);
        assert_eq!(MsmStrategy::Pippenger.msm(&bases, &scalars), expected);
        assert_eq!(
            MsmStrategy::Windowed { window_bits: 2 }.msm(&bases, &scalars),
            expected
        );
    }

    #[test]
    fn test_window_table_reused() {
        let mut rng = StdRng::seed_from_u64(9);
        let bases: Vec<G1Affine> =
            (0..6).map(|_| G1Projective::rand(&mut rng).into_affine()).collect();
        let table = WindowTable::new(&bases, 4);
        assert_eq!(table.len(), 6);
        for _ in 0..3 {
            let scalars: Vec<Fr> = (0..6).map(|_| Fr::rand(&mut rng)).collect();
            assert_eq!(table.msm(&scalars), MsmStrategy::Pippenger.msm(&bases, &scalars));
        }
    }

    #[test]
    fn test_window_is_clamped() {
        let mut rng = StdRng::seed_from_u64(10);
        let bases: Vec<G1Affine> =
            (0..2).map(|_| G1Projective::rand(&mut rng).into_affine()).collect();
        let table = WindowTable::new(&bases, 200);
        assert_eq!(table.tables[0].len(), 1usize << MsmStrategy::MAX_WINDOW_BITS);
        let scalars = vec![Fr::from(3u64), Fr::from(5u64)];
        assert_eq!(table.msm(&scalars), MsmStrategy::Pippenger.msm(&bases, &scalars));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(MsmStrategy::Windowed { window_bits: 5 }).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "windowed", "window_bits": 5 }));
        let back: MsmStrategy = serde_json::from_str(r#"{"kind":"pippenger"}"#).unwrap();
        assert_eq!(back, MsmStrategy::Pippenger);
    }
}
