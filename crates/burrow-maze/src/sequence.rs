//! Deterministic pseudo-random sequence for carving and room identifiers.
//!
//! A 32-bit Galois LFSR: the same seed always yields the same sequence, the
//! state never reaches zero, and values do not repeat within a period far
//! larger than any maze this server produces. Room identifiers are drawn
//! straight from the sequence, which is what makes them stable for a given
//! `(width, height, seed)` triple.

use burrow_core::AppError;

/// Feedback mask for the 32-bit LFSR.
const MASK: u32 = 0xD000_0001;

/// Deterministic pseudo-random `u32` sequence.
#[derive(Debug, Clone)]
pub struct IdentifierSequence {
    state: u32,
}

impl IdentifierSequence {
    /// Creates a sequence from a nonzero seed.
    pub fn new(seed: u32) -> Result<Self, AppError> {
        if seed == 0 {
            return Err(AppError::validation("seed must be nonzero"));
        }
        Ok(Self { state: seed })
    }

    /// Advances the sequence and returns the next value.
    pub fn next_value(&mut self) -> u32 {
        self.state = (self.state >> 1) ^ ((self.state & 1).wrapping_neg() & MASK);
        self.state
    }

    /// Returns a value in `0..max`. `max` must be nonzero.
    pub fn below(&mut self, max: usize) -> usize {
        debug_assert!(max > 0);
        self.next_value() as usize % max
    }
}

impl Iterator for IdentifierSequence {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        Some(self.next_value())
    }
}
