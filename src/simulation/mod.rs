// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Register simulation: value generation and change detection

pub mod detector;
pub mod generator;

pub use detector::{ChangeDetector, ChangeMessage, PriorState, Snapshot, TIMESTAMP_FORMAT};
pub use generator::{
    apply_float_encoding, decode_float, SnapshotSource, ValueGenerator, FLOAT_HIGH_WORD,
    FLOAT_LOW_WORD,
};
