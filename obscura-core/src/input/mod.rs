//! Input decoding and conditioning
//!
//! Hardware-independent processing between raw sensor values and
//! session events: quadrature decoding for the fallback GPIO dials,
//! detent tracking for the Seesaw hardware counters, and heading math
//! for the magnetometer.

pub mod compass;
pub mod dial;
pub mod quadrature;

pub use compass::{heading_centideg, HeadingFilter, WindRose, WIND_NAMES};
pub use dial::DialTracker;
pub use quadrature::QuadratureDecoder;
