use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use sentinel_poseidon::poseidon_config;

use crate::builder::CircuitBuilder;
use crate::program::LinearCombination;

/// In-circuit counterpart of `sentinel_poseidon::poseidon_hash`.
pub fn poseidon_hash_lc(cs: &mut CircuitBuilder, inputs: &[LinearCombination]) -> LinearCombination {
    let config = poseidon_config();
    let width = config.rate + config.capacity;
    let mut state = vec![LinearCombination::zero(); width];

    for (i, chunk) in inputs.chunks(config.rate).enumerate() {
        if i > 0 {
            permute(cs, &config, &mut state);
        }
        for (j, x) in chunk.iter().enumerate() {
            let slot = config.capacity + j;
            state[slot] = &state[slot] + x;
        }
    }
    permute(cs, &config, &mut state);
    state.swap_remove(config.capacity)
}

pub fn hash2_lc(
    cs: &mut CircuitBuilder,
    a: &LinearCombination,
    b: &LinearCombination,
) -> LinearCombination {
    poseidon_hash_lc(cs, &[a.clone(), b.clone()])
}

fn permute(cs: &mut CircuitBuilder, config: &PoseidonConfig<Fr>, state: &mut [LinearCombination]) {
    let half_full = config.full_rounds / 2;
    let total = config.full_rounds + config.partial_rounds;
    for round in 0..total {
        for (s, k) in state.iter_mut().zip(&config.ark[round]) {
            *s = &*s + *k;
        }
        let full = round < half_full || round >= half_full + config.partial_rounds;
        let sboxed = if full { state.len() } else { 1 };
        for s in state.iter_mut().take(sboxed) {
            *s = cs.pow(s, config.alpha);
        }
        let mixed: Vec<LinearCombination> = config
            .mds
            .iter()
            .map(|row| {
                row.iter()
                    .zip(state.iter())
                    .fold(LinearCombination::zero(), |acc, (m, s)| &acc + &s.scale(*m))
            })
            .collect();
        state.clone_from_slice(&mixed);
    }
}
