use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::error::MatchError;
use crate::models::Side;

/// Uniform sampling without replacement, used to pick the proposer half
pub trait SideSampler {
    /// Choose `amount` distinct indices from `0..length`
    fn sample(&mut self, length: usize, amount: usize) -> Vec<usize>;
}

/// [`SideSampler`] backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RandomSampler<R> {
    rng: R,
}

impl<R: Rng> RandomSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomSampler<ChaCha8Rng> {
    /// Reproducible sampler; same seed, same split
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl RandomSampler<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> SideSampler for RandomSampler<R> {
    fn sample(&mut self, length: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.rng, length, amount).into_vec()
    }
}

/// Sampler that always returns the same proposer indices
#[derive(Debug, Clone)]
pub struct FixedSampler {
    proposers: Vec<usize>,
}

impl FixedSampler {
    pub fn new(proposers: Vec<usize>) -> Self {
        Self { proposers }
    }
}

impl SideSampler for FixedSampler {
    fn sample(&mut self, _length: usize, _amount: usize) -> Vec<usize> {
        self.proposers.clone()
    }
}

/// Disjoint, exhaustive split of `0..n` into proposers and receivers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidePartition {
    proposers: Vec<usize>,
    receivers: Vec<usize>,
    sides: Vec<Side>,
}

impl SidePartition {
    /// Split `0..n` by drawing `n / 2` proposers from `sampler`
    ///
    /// With odd `n` the receivers are the larger half.
    pub fn sample<S: SideSampler + ?Sized>(n: usize, sampler: &mut S) -> Result<Self, MatchError> {
        let amount = n / 2;
        let proposers = sampler.sample(n, amount);
        if proposers.len() != amount {
            return Err(MatchError::InvalidPartition(format!(
                "sampler returned {} proposers, expected {} for {} participants",
                proposers.len(),
                amount,
                n
            )));
        }
        Self::from_proposers(n, proposers)
    }

    /// Pin the split explicitly; everything not listed becomes a receiver
    ///
    /// Proposer order is kept and seeds the engine's free queue.
    pub fn from_proposers(n: usize, proposers: Vec<usize>) -> Result<Self, MatchError> {
        let mut sides = vec![Side::Receiver; n];
        for &p in &proposers {
            if p >= n {
                return Err(MatchError::InvalidPartition(format!(
                    "proposer index {} out of range for {} participants",
                    p, n
                )));
            }
            if sides[p] == Side::Proposer {
                return Err(MatchError::InvalidPartition(format!(
                    "proposer index {} listed twice",
                    p
                )));
            }
            sides[p] = Side::Proposer;
        }

        let receivers = (0..n).filter(|&i| sides[i] == Side::Receiver).collect();

        Ok(Self {
            proposers,
            receivers,
            sides,
        })
    }

    pub fn proposers(&self) -> &[usize] {
        &self.proposers
    }

    pub fn receivers(&self) -> &[usize] {
        &self.receivers
    }

    pub fn len(&self) -> usize {
        self.sides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sides.is_empty()
    }

    #[inline]
    pub fn side_of(&self, index: usize) -> Side {
        self.sides[index]
    }

    /// True when either side has nobody on it
    pub fn is_degenerate(&self) -> bool {
        self.proposers.is_empty() || self.receivers.is_empty()
    }
}
