//! Dwell timeout and link health tracking
//!
//! The exhibition runs unattended, so every screen that waits on a
//! visitor must eventually time out on its own. `DwellMonitor` maps
//! the current state to its configured timeout and fires the matching
//! expiry event exactly once per dwell. `LinkMonitor` watches the
//! render host heartbeat.

use crate::config::TimeoutConfig;
use crate::state::{ErrorKind, Event, State};

/// Render host heartbeat interval budget
pub const HEARTBEAT_TIMEOUT_MS: u32 = 3000;
/// Missed heartbeats before the link is declared lost
pub const MAX_MISSED_HEARTBEATS: u8 = 3;

/// Tracks how long the machine has dwelled in the current state
#[derive(Debug, Clone)]
pub struct DwellMonitor {
    timeouts: TimeoutConfig,
    dwell_ms: u32,
    /// Set once the expiry event for this dwell has been emitted
    fired: bool,
}

impl DwellMonitor {
    /// Create a new dwell monitor with the given timeouts
    pub fn new(timeouts: TimeoutConfig) -> Self {
        Self {
            timeouts,
            dwell_ms: 0,
            fired: false,
        }
    }

    /// Reset the dwell clock, called on every state change
    pub fn state_entered(&mut self) {
        self.dwell_ms = 0;
        self.fired = false;
    }

    /// A visitor interacted; the idle clock starts over
    ///
    /// Only meaningful for states whose timeout measures inactivity.
    pub fn activity(&mut self) {
        self.dwell_ms = 0;
    }

    /// Milliseconds spent in the current state
    pub fn dwell_ms(&self) -> u32 {
        self.dwell_ms
    }

    /// Timeout for a state, if it has one
    fn timeout_ms(&self, state: State) -> Option<u32> {
        let seconds = match state {
            State::FetchConfirm => self.timeouts.confirm_s,
            State::WaitingInteraction => self.timeouts.idle_s,
            State::Error(_) => self.timeouts.error_s,
            State::ResultDisplay => self.timeouts.result_hold_s,
            _ => return None,
        };
        Some(u32::from(seconds) * 1000)
    }

    /// Advance time and report an expiry event if the dwell ran out
    ///
    /// # Arguments
    /// - `state`: Current machine state
    /// - `delta_ms`: Time elapsed since last update
    pub fn update_time(&mut self, state: State, delta_ms: u32) -> Option<Event> {
        self.dwell_ms = self.dwell_ms.saturating_add(delta_ms);

        let timeout_ms = self.timeout_ms(state)?;
        if self.fired || self.dwell_ms < timeout_ms {
            return None;
        }
        self.fired = true;

        let event = match state {
            State::FetchConfirm => Event::ConfirmExpired,
            State::WaitingInteraction => Event::IdleExpired,
            State::Error(_) => Event::ErrorExpired,
            State::ResultDisplay => Event::ResultHoldExpired,
            _ => return None,
        };
        Some(event)
    }
}

/// Render host link health
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    missed_heartbeats: u8,
    time_since_heartbeat_ms: u32,
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkMonitor {
    /// Create a new link monitor
    pub fn new() -> Self {
        Self {
            missed_heartbeats: 0,
            time_since_heartbeat_ms: 0,
        }
    }

    /// Record a heartbeat received from the render host
    pub fn heartbeat_received(&mut self) {
        self.missed_heartbeats = 0;
        self.time_since_heartbeat_ms = 0;
    }

    /// Update time tracking
    pub fn update_time(&mut self, delta_ms: u32) {
        self.time_since_heartbeat_ms = self.time_since_heartbeat_ms.saturating_add(delta_ms);

        if self.time_since_heartbeat_ms >= HEARTBEAT_TIMEOUT_MS {
            self.missed_heartbeats = self.missed_heartbeats.saturating_add(1);
            self.time_since_heartbeat_ms = 0;
        }
    }

    /// Check link health, returning the fault if the link is down
    pub fn check(&self) -> Option<ErrorKind> {
        if self.missed_heartbeats >= MAX_MISSED_HEARTBEATS {
            Some(ErrorKind::LinkLost)
        } else {
            None
        }
    }

    /// Check if link is healthy
    pub fn is_link_healthy(&self) -> bool {
        self.missed_heartbeats < MAX_MISSED_HEARTBEATS
    }

    /// Get number of missed heartbeats
    pub fn get_missed_heartbeats(&self) -> u8 {
        self.missed_heartbeats
    }
}
