use ark_bn254::Fr;
use ark_ff::{Field, One};

use crate::program::{
    CircuitProgram, Constraint, Instruction, LinearCombination, NamedSignal, SignalId, SignalRole,
};

/// Emits constraints and the matching witness instructions side by side.
///
/// Declare public outputs, then public inputs, then private inputs; the
/// program is validated by [`CircuitBuilder::finish`].
pub struct CircuitBuilder {
    name: String,
    next_signal: SignalId,
    num_public: u32,
    named: Vec<NamedSignal>,
    constraints: Vec<Constraint>,
    instructions: Vec<Instruction>,
}

impl CircuitBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            next_signal: 1,
            num_public: 0,
            named: Vec::new(),
            constraints: Vec::new(),
            instructions: Vec::new(),
        }
    }

    fn alloc(&mut self) -> SignalId {
        let id = self.next_signal;
        self.next_signal += 1;
        id
    }

    fn declare(&mut self, name: &str, role: SignalRole) -> SignalId {
        let signal = self.alloc();
        if role.is_public() {
            self.num_public += 1;
        }
        self.named.push(NamedSignal { name: name.to_string(), signal, role });
        signal
    }

    /// Reserves a public output, assigned later with [`Self::bind_output`].
    pub fn public_output(&mut self, name: &str) -> SignalId {
        self.declare(name, SignalRole::PublicOutput)
    }

    pub fn public_input(&mut self, name: &str) -> LinearCombination {
        LinearCombination::signal(self.declare(name, SignalRole::PublicInput))
    }

    pub fn private_input(&mut self, name: &str) -> LinearCombination {
        LinearCombination::signal(self.declare(name, SignalRole::PrivateInput))
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// `left * right`. Products with a constant side stay linear and cost
    /// no constraint.
    pub fn mul(&mut self, left: &LinearCombination, right: &LinearCombination) -> LinearCombination {
        if let Some(k) = left.as_constant() {
            return right.scale(k);
        }
        if let Some(k) = right.as_constant() {
            return left.scale(k);
        }
        let out = self.alloc();
        self.instructions.push(Instruction::Product {
            out,
            left: left.clone(),
            right: right.clone(),
        });
        self.constraints.push(Constraint {
            a: left.clone(),
            b: right.clone(),
            c: LinearCombination::signal(out),
        });
        LinearCombination::signal(out)
    }

    /// `base^exp` by square-and-multiply.
    pub fn pow(&mut self, base: &LinearCombination, exp: u64) -> LinearCombination {
        if let Some(k) = base.as_constant() {
            return LinearCombination::constant(k.pow([exp]));
        }
        let mut acc: Option<LinearCombination> = None;
        for i in (0..u64::BITS - exp.leading_zeros()).rev() {
            if let Some(current) = acc.take() {
                acc = Some(self.mul(&current, &current));
            }
            if exp >> i & 1 == 1 {
                acc = Some(match acc.take() {
                    Some(current) => self.mul(&current, base),
                    None => base.clone(),
                });
            }
        }
        acc.unwrap_or_else(|| LinearCombination::constant(Fr::one()))
    }

    pub fn enforce_equal(&mut self, left: &LinearCombination, right: &LinearCombination) {
        self.constraints.push(Constraint {
            a: left - right,
            b: LinearCombination::constant(Fr::one()),
            c: LinearCombination::zero(),
        });
    }

    /// Little-endian bits of `value`, constrained boolean and to recompose
    /// to `value`. Forces `value < 2^width`.
    pub fn to_bits(&mut self, value: &LinearCombination, width: usize) -> Vec<LinearCombination> {
        let bits: Vec<SignalId> = (0..width).map(|_| self.alloc()).collect();
        self.instructions.push(Instruction::Decompose {
            source: value.clone(),
            bits: bits.clone(),
        });

        let mut recomposed = LinearCombination::zero();
        let mut weight = Fr::one();
        for &bit in &bits {
            let b = LinearCombination::signal(bit);
            // b * (b - 1) = 0
            self.constraints.push(Constraint {
                a: b.clone(),
                b: &b + -Fr::one(),
                c: LinearCombination::zero(),
            });
            recomposed = &recomposed + &b.scale(weight);
            weight = weight + weight;
        }
        self.enforce_equal(&recomposed, value);

        bits.into_iter().map(LinearCombination::signal).collect()
    }

    /// Assigns `value` to a reserved output and constrains it.
    pub fn bind_output(&mut self, out: SignalId, value: &LinearCombination) {
        self.instructions.push(Instruction::Linear { out, lc: value.clone() });
        self.constraints.push(Constraint {
            a: value.clone(),
            b: LinearCombination::constant(Fr::one()),
            c: LinearCombination::signal(out),
        });
    }

    pub fn finish(self) -> Result<CircuitProgram, String> {
        CircuitProgram::new(
            self.name,
            self.next_signal,
            self.num_public,
            self.named,
            self.constraints,
            self.instructions,
        )
    }
}

impl Default for CircuitBuilder {
    fn default() -> Self {
        Self::new("circuit")
    }
}
