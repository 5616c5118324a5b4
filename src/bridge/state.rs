// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Bridge lifecycle states
//!
//! ```text
//! Starting ──► HealthChecking ──► Running ──► ShuttingDown ──► Stopped
//!                    │                                            ▲
//!                    └────────────── (remote unavailable) ────────┘
//! ```

use std::fmt;

use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Starting,
    HealthChecking,
    Running,
    ShuttingDown,
    Stopped,
}

impl BridgeState {
    /// Whether `next` is a legal successor of `self`
    pub fn can_transition_to(self, next: BridgeState) -> bool {
        use BridgeState::*;
        matches!(
            (self, next),
            (Starting, HealthChecking)
                | (Starting, Stopped)
                | (HealthChecking, Running)
                | (HealthChecking, Stopped)
                | (Running, ShuttingDown)
                | (ShuttingDown, Stopped)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == BridgeState::Stopped
    }
}

impl fmt::Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BridgeState::Starting => "STARTING",
            BridgeState::HealthChecking => "HEALTH_CHECKING",
            BridgeState::Running => "RUNNING",
            BridgeState::ShuttingDown => "SHUTTING_DOWN",
            BridgeState::Stopped => "STOPPED",
        };
        f.write_str(name)
    }
}

/// Tracks the current state and logs every transition
#[derive(Debug)]
pub struct Lifecycle {
    state: BridgeState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: BridgeState::Starting,
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn advance(&mut self, next: BridgeState) {
        if !self.state.can_transition_to(next) {
            warn!("Unexpected bridge transition {} -> {}", self.state, next);
        }
        info!("Bridge state {} -> {}", self.state, next);
        self.state = next;
    }
}
