//! Rank-1 constraint program with an explicit evaluation graph.
//!
//! Signal `0` is the constant one. Signals `1..=num_public` are public
//! (outputs first, then public inputs); the rest are private. This is the
//! Groth16 instance/witness layout, so an assignment indexed by signal is
//! directly the prover's full assignment.

use std::collections::HashSet;
use std::ops::{Add, Sub};

use ark_bn254::Fr;
use ark_ff::{One, PrimeField, Zero};
use ark_relations::r1cs::ConstraintMatrices;

pub type SignalId = u32;

/// The constant-one signal.
pub const ONE: SignalId = 0;

/// Sparse `Σ coeff·signal`, sorted by signal with no zero coefficients.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinearCombination {
    terms: Vec<(SignalId, Fr)>,
}

impl LinearCombination {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(c: Fr) -> Self {
        Self::from_terms(vec![(ONE, c)])
    }

    pub fn signal(id: SignalId) -> Self {
        Self { terms: vec![(id, Fr::one())] }
    }

    pub fn from_terms(mut terms: Vec<(SignalId, Fr)>) -> Self {
        terms.sort_unstable_by_key(|(s, _)| *s);
        let mut compact: Vec<(SignalId, Fr)> = Vec::with_capacity(terms.len());
        for (signal, coeff) in terms {
            match compact.last_mut() {
                Some((last, acc)) if *last == signal => *acc += coeff,
                _ => compact.push((signal, coeff)),
            }
        }
        compact.retain(|(_, c)| !c.is_zero());
        Self { terms: compact }
    }

    pub fn terms(&self) -> &[(SignalId, Fr)] {
        &self.terms
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// `Some(c)` when the combination does not depend on any signal.
    pub fn as_constant(&self) -> Option<Fr> {
        match self.terms.as_slice() {
            [] => Some(Fr::zero()),
            [(ONE, c)] => Some(*c),
            _ => None,
        }
    }

    pub fn scale(&self, k: Fr) -> Self {
        if k.is_zero() {
            return Self::zero();
        }
        Self { terms: self.terms.iter().map(|&(s, c)| (s, c * k)).collect() }
    }

    pub fn evaluate(&self, values: &[Fr]) -> Fr {
        self.terms
            .iter()
            .fold(Fr::zero(), |acc, &(s, c)| acc + c * values[s as usize])
    }

    pub fn signals(&self) -> impl Iterator<Item = SignalId> + '_ {
        self.terms.iter().map(|(s, _)| *s)
    }
}

impl Add for &LinearCombination {
    type Output = LinearCombination;

    fn add(self, rhs: Self) -> LinearCombination {
        let mut terms = self.terms.clone();
        terms.extend_from_slice(&rhs.terms);
        LinearCombination::from_terms(terms)
    }
}

impl Sub for &LinearCombination {
    type Output = LinearCombination;

    fn sub(self, rhs: Self) -> LinearCombination {
        self + &rhs.scale(-Fr::one())
    }
}

impl Add<Fr> for &LinearCombination {
    type Output = LinearCombination;

    fn add(self, rhs: Fr) -> LinearCombination {
        self + &LinearCombination::constant(rhs)
    }
}

/// One R1CS row: `<a,w> * <b,w> = <c,w>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub a: LinearCombination,
    pub b: LinearCombination,
    pub c: LinearCombination,
}

impl Constraint {
    pub fn is_satisfied(&self, values: &[Fr]) -> bool {
        self.a.evaluate(values) * self.b.evaluate(values) == self.c.evaluate(values)
    }

    fn signals(&self) -> impl Iterator<Item = SignalId> + '_ {
        self.a.signals().chain(self.b.signals()).chain(self.c.signals())
    }
}

/// A step of the witness computation graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// `w[out] = <lc,w>`
    Linear { out: SignalId, lc: LinearCombination },
    /// `w[out] = <left,w> * <right,w>`
    Product {
        out: SignalId,
        left: LinearCombination,
        right: LinearCombination,
    },
    /// `w[bits[i]] = bit i of <source,w>`, least significant first.
    Decompose {
        source: LinearCombination,
        bits: Vec<SignalId>,
    },
}

impl Instruction {
    fn reads(&self) -> Box<dyn Iterator<Item = SignalId> + '_> {
        match self {
            Self::Linear { lc, .. } => Box::new(lc.signals()),
            Self::Product { left, right, .. } => Box::new(left.signals().chain(right.signals())),
            Self::Decompose { source, .. } => Box::new(source.signals()),
        }
    }

    fn writes(&self) -> &[SignalId] {
        match self {
            Self::Linear { out, .. } | Self::Product { out, .. } => std::slice::from_ref(out),
            Self::Decompose { bits, .. } => bits,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalRole {
    PublicOutput,
    PublicInput,
    PrivateInput,
}

impl SignalRole {
    pub fn is_public(self) -> bool {
        !matches!(self, Self::PrivateInput)
    }

    pub fn is_input(self) -> bool {
        !matches!(self, Self::PublicOutput)
    }

    pub(crate) fn code(self) -> u8 {
        match self {
            Self::PublicOutput => 0,
            Self::PublicInput => 1,
            Self::PrivateInput => 2,
        }
    }

    pub(crate) fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::PublicOutput),
            1 => Some(Self::PublicInput),
            2 => Some(Self::PrivateInput),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedSignal {
    pub name: String,
    pub signal: SignalId,
    pub role: SignalRole,
}

/// A compiled circuit. Immutable once built; share it behind an `Arc`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CircuitProgram {
    name: String,
    num_signals: u32,
    num_public: u32,
    named: Vec<NamedSignal>,
    constraints: Vec<Constraint>,
    instructions: Vec<Instruction>,
}

impl CircuitProgram {
    /// Builds and validates a program.
    pub fn new(
        name: String,
        num_signals: u32,
        num_public: u32,
        named: Vec<NamedSignal>,
        constraints: Vec<Constraint>,
        instructions: Vec<Instruction>,
    ) -> Result<Self, String> {
        let program = Self { name, num_signals, num_public, named, constraints, instructions };
        program.validate()?;
        Ok(program)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signal count including the constant one.
    pub fn num_signals(&self) -> usize {
        self.num_signals as usize
    }

    pub fn num_public(&self) -> usize {
        self.num_public as usize
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn named_signals(&self) -> &[NamedSignal] {
        &self.named
    }

    pub fn inputs(&self) -> impl Iterator<Item = &NamedSignal> {
        self.named.iter().filter(|n| n.role.is_input())
    }

    pub fn input(&self, name: &str) -> Option<&NamedSignal> {
        self.inputs().find(|n| n.name == name)
    }

    /// Names of the public signals in assignment order.
    pub fn public_signal_names(&self) -> Vec<&str> {
        let mut public: Vec<&NamedSignal> = self.named.iter().filter(|n| n.role.is_public()).collect();
        public.sort_by_key(|n| n.signal);
        public.into_iter().map(|n| n.name.as_str()).collect()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Index of the first constraint row `values` violates.
    pub fn first_unsatisfied(&self, values: &[Fr]) -> Option<usize> {
        self.constraints.iter().position(|c| !c.is_satisfied(values))
    }

    pub fn validate(&self) -> Result<(), String> {
        let n = self.num_signals;
        if n == 0 || self.num_public >= n {
            return Err(format!("{} public signals do not fit in {n} signals", self.num_public));
        }

        let mut names = HashSet::new();
        let mut seen = HashSet::new();
        let mut public_count = 0u32;
        for named in &self.named {
            if named.signal == ONE || named.signal >= n {
                return Err(format!("signal `{}` has invalid index {}", named.name, named.signal));
            }
            if !names.insert(named.name.as_str()) || !seen.insert(named.signal) {
                return Err(format!("signal `{}` is declared twice", named.name));
            }
            let in_public_range = named.signal <= self.num_public;
            if named.role.is_public() != in_public_range {
                return Err(format!("signal `{}` is outside its visibility range", named.name));
            }
            if named.role.is_public() {
                public_count += 1;
            }
        }
        if public_count != self.num_public {
            return Err(format!(
                "{} public signals declared, header says {}",
                public_count, self.num_public
            ));
        }
        let last_output = self
            .named
            .iter()
            .filter(|s| s.role == SignalRole::PublicOutput)
            .map(|s| s.signal)
            .max();
        let first_public_input = self
            .named
            .iter()
            .filter(|s| s.role == SignalRole::PublicInput)
            .map(|s| s.signal)
            .min();
        if let (Some(out), Some(input)) = (last_output, first_public_input) {
            if out > input {
                return Err("public outputs must precede public inputs".into());
            }
        }

        let mut resolved = vec![false; n as usize];
        resolved[ONE as usize] = true;
        for input in self.inputs() {
            resolved[input.signal as usize] = true;
        }
        for (k, instruction) in self.instructions.iter().enumerate() {
            if let Some(s) = instruction.reads().find(|&s| s >= n || !resolved[s as usize]) {
                return Err(format!("instruction {k} reads signal {s} before it is assigned"));
            }
            if let Instruction::Decompose { bits, .. } = instruction {
                if bits.is_empty() || bits.len() >= Fr::MODULUS_BIT_SIZE as usize {
                    return Err(format!("instruction {k} decomposes into {} bits", bits.len()));
                }
            }
            for &out in instruction.writes() {
                if out >= n || resolved[out as usize] {
                    return Err(format!("instruction {k} assigns signal {out} twice"));
                }
                resolved[out as usize] = true;
            }
        }
        if let Some(s) = resolved.iter().position(|r| !r) {
            return Err(format!("signal {s} is never assigned"));
        }

        for (row, constraint) in self.constraints.iter().enumerate() {
            if let Some(s) = constraint.signals().find(|&s| s >= n) {
                return Err(format!("constraint {row} references unknown signal {s}"));
            }
        }
        Ok(())
    }

    /// The program's rows in arkworks' matrix form.
    pub fn to_matrices(&self) -> ConstraintMatrices<Fr> {
        let rows = |pick: fn(&Constraint) -> &LinearCombination| -> Vec<Vec<(Fr, usize)>> {
            self.constraints
                .iter()
                .map(|c| pick(c).terms().iter().map(|&(s, coeff)| (coeff, s as usize)).collect())
                .collect()
        };
        let a = rows(|c| &c.a);
        let b = rows(|c| &c.b);
        let c = rows(|c| &c.c);
        let non_zero = |m: &Vec<Vec<(Fr, usize)>>| -> usize { m.iter().map(Vec::len).sum() };

        ConstraintMatrices {
            num_instance_variables: self.num_public() + 1,
            num_witness_variables: self.num_signals() - self.num_public() - 1,
            num_constraints: self.constraints.len(),
            a_num_non_zero: non_zero(&a),
            b_num_non_zero: non_zero(&b),
            c_num_non_zero: non_zero(&c),
            a,
            b,
            c,
        }
    }
}
