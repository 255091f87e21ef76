use ark_bn254::Fr;
use ark_crypto_primitives::sponge::{
    poseidon::{PoseidonConfig, PoseidonSponge},
    CryptographicSponge, FieldBasedCryptographicSponge,
};
use ark_ff::PrimeField;
use sentinel_types::{ReceiptSecret, ReportTag};

pub const RATE: usize = 2;
pub const CAPACITY: usize = 1;
pub const FULL_ROUNDS: usize = 8;
pub const PARTIAL_ROUNDS: usize = 57;
pub const ALPHA: u64 = 5;

/// Width-3 Poseidon parameters for BN254 (x^5 S-box).
pub fn poseidon_config() -> PoseidonConfig<Fr> {
    let (ark, mds) =
        ark_crypto_primitives::sponge::poseidon::find_poseidon_ark_and_mds::<Fr>(
            Fr::MODULUS_BIT_SIZE as u64,
            RATE,
            FULL_ROUNDS as u64,
            PARTIAL_ROUNDS as u64,
            0,
        );
    PoseidonConfig::new(FULL_ROUNDS, PARTIAL_ROUNDS, ALPHA, mds, ark, RATE, CAPACITY)
}

pub fn poseidon_hash(inputs: &[Fr]) -> Fr {
    let config = poseidon_config();
    let mut sponge = PoseidonSponge::new(&config);
    sponge.absorb(&inputs);
    sponge.squeeze_native_field_elements(1)[0]
}

pub fn hash2(a: Fr, b: Fr) -> Fr {
    poseidon_hash(&[a, b])
}

/// Public commitment a report proof exposes in place of the receipt id.
pub fn report_commitment(secret: &ReceiptSecret, tag: &ReportTag) -> Fr {
    hash2(*secret.as_fr(), *tag.as_fr())
}
