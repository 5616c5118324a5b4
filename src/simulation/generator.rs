// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Pseudo-random register value generator
//!
//! Every cycle produces one value per register, uniformly drawn in
//! `[0, RANDOM_UPPER_BOUND)`. The last two registers are then overwritten with
//! the two 16-bit halves of the IEEE-754 single precision value `1.0`, so a
//! Modbus client reading them as a float always gets `1.0`.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Exclusive upper bound of the random register values
pub const RANDOM_UPPER_BOUND: u16 = 100;

/// High word of `1.0f32` (`0x3F80_0000`), stored in the last register
pub const FLOAT_HIGH_WORD: u16 = 0x3F80;

/// Low word of `1.0f32`, stored in the second to last register
pub const FLOAT_LOW_WORD: u16 = 0x0000;

/// Source of register snapshots for the bridge loop.
///
/// The production implementation is [`ValueGenerator`]; tests drive the loop
/// with scripted values.
pub trait SnapshotSource: Send {
    /// Produce the values to write into `count` registers for the next cycle
    fn next_values(&mut self, count: usize) -> Vec<u16>;
}

/// Random register values with the fixed float encoding in the last two cells
#[derive(Debug)]
pub struct ValueGenerator<R: Rng = StdRng> {
    rng: R,
}

impl ValueGenerator<StdRng> {
    /// Generator seeded from the operating system
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible generator, same seed gives the same sequence of snapshots
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for ValueGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ValueGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate `count` register values.
    ///
    /// With fewer than two registers there is no room for the float pair and
    /// the values stay fully random.
    pub fn generate(&mut self, count: usize) -> Vec<u16> {
        let mut values: Vec<u16> = (0..count)
            .map(|_| self.rng.random_range(0..RANDOM_UPPER_BOUND))
            .collect();
        apply_float_encoding(&mut values);
        values
    }
}

impl<R: Rng + Send> SnapshotSource for ValueGenerator<R> {
    fn next_values(&mut self, count: usize) -> Vec<u16> {
        self.generate(count)
    }
}

/// Overwrite the last two cells with the encoding of `1.0f32`.
pub fn apply_float_encoding(values: &mut [u16]) {
    let n = values.len();
    if n < 2 {
        return;
    }
    values[n - 1] = FLOAT_HIGH_WORD;
    values[n - 2] = FLOAT_LOW_WORD;
}

/// Reassemble an IEEE-754 single precision float from its two register halves
pub fn decode_float(low: u16, high: u16) -> f32 {
    f32::from_bits(((high as u32) << 16) | low as u32)
}
