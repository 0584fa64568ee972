//! Hardware drivers for the Obscura No.7 telescope rig
//!
//! Drivers for the peripherals wired to the controller board: the two
//! Adafruit Seesaw rotary dials and the QMC5883L magnetometer in the
//! telescope barrel. All drivers speak through `embedded_hal` traits
//! and surface every bus failure as a typed error; degradation policy
//! belongs to the caller.

#![no_std]
#![deny(unsafe_code)]

pub mod compass;
pub mod seesaw;

#[cfg(test)]
pub(crate) mod mock;

pub use compass::{CompassError, Qmc5883l, RawField};
pub use seesaw::{SeesawEncoder, SeesawError};
