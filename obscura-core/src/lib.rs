//! Board-agnostic core logic for the Obscura No.7 exhibition controller
//!
//! This crate contains all installation logic that does not depend on
//! specific hardware implementations:
//!
//! - Exhibition session state machine and events
//! - Per-visitor session record and parameter clamping
//! - Input conditioning (quadrature decoding, dial tracking, heading math)
//! - Dwell/timeout policy and link health monitoring
//! - Generation workflow sequencing and target projection
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod dwell;
pub mod input;
pub mod session;
pub mod state;
pub mod workflow;
