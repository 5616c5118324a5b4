// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Register snapshot change detection
//!
//! The detector keeps the last successfully delivered snapshot and compares
//! each new read against it, element by element. It only moves forward when
//! the caller commits a snapshot, so a failed delivery leaves the previous
//! state in place and the next differing read is reported again.

use std::fmt;

use chrono::{DateTime, Local};

/// Timestamp format appended to change messages
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One full read of the simulated registers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Vec<u16>);

impl Snapshot {
    pub fn new(values: Vec<u16>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[u16] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u16>> for Snapshot {
    fn from(values: Vec<u16>) -> Self {
        Self(values)
    }
}

/// Renders as a bracketed list, e.g. `[12, 7, 0, 16256]`
impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// The last delivered snapshot, or nothing yet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PriorState {
    #[default]
    Empty,
    Delivered(Snapshot),
}

impl PriorState {
    /// `true` when `snapshot` equals the delivered one. `Empty` matches nothing.
    pub fn matches(&self, snapshot: &Snapshot) -> bool {
        match self {
            PriorState::Empty => false,
            PriorState::Delivered(prior) => prior == snapshot,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            PriorState::Empty => None,
            PriorState::Delivered(prior) => Some(prior),
        }
    }
}

/// Text sent to the remote store for a detected change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeMessage {
    snapshot: Snapshot,
    text: String,
}

impl ChangeMessage {
    /// Build the message `"{snapshot}_{timestamp}"`
    pub fn new(snapshot: Snapshot, at: DateTime<Local>) -> Self {
        let text = format!("{}_{}", snapshot, at.format(TIMESTAMP_FORMAT));
        Self { snapshot, text }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }
}

impl fmt::Display for ChangeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Default)]
pub struct ChangeDetector {
    prior: PriorState,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prior(&self) -> &PriorState {
        &self.prior
    }

    /// Compare `current` with the prior state, stamping a message on change.
    pub fn detect(&self, current: &Snapshot) -> Option<ChangeMessage> {
        self.detect_at(current, Local::now())
    }

    pub fn detect_at(&self, current: &Snapshot, at: DateTime<Local>) -> Option<ChangeMessage> {
        if self.prior.matches(current) {
            None
        } else {
            Some(ChangeMessage::new(current.clone(), at))
        }
    }

    /// Record `snapshot` as delivered.
    pub fn commit(&mut self, snapshot: Snapshot) {
        self.prior = PriorState::Delivered(snapshot);
    }
}
