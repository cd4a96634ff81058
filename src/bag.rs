use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::EngineError;

/// Shuffle bag over `0..size`: every value is dealt once per cycle.
#[derive(Clone, Debug)]
pub struct RandomBag {
    /// One permutation of `0..size`, never empty.
    bag: Vec<usize>,
    /// Index of the next value to deal, always `< bag.len()`.
    cursor: usize,
    rng: StdRng,
}

impl RandomBag {
    pub fn new(size: usize) -> Result<Self, EngineError> {
        Self::from_rng(size, StdRng::from_entropy())
    }

    pub fn with_seed(size: usize, seed: u64) -> Result<Self, EngineError> {
        Self::from_rng(size, StdRng::seed_from_u64(seed))
    }

    fn from_rng(size: usize, rng: StdRng) -> Result<Self, EngineError> {
        if size == 0 {
            return Err(EngineError::EmptyBag);
        }
        let mut bag = Self {
            bag: (0..size).collect(),
            cursor: 0,
            rng,
        };
        bag.reset_bag();
        Ok(bag)
    }

    /// Values left in the current cycle.
    pub fn remaining(&self) -> usize {
        self.bag.len() - self.cursor
    }

    pub fn next(&mut self) -> usize {
        let value = self.bag[self.cursor];
        self.cursor += 1;
        if self.cursor == self.bag.len() {
            self.reset_bag();
        }
        value
    }

    pub fn reset_bag(&mut self) {
        self.bag.shuffle(&mut self.rng);
        self.cursor = 0;
    }
}
