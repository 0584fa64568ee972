//! Generation workflow sequencing
//!
//! The controller owns the order and pacing of the artwork workflow;
//! the render host executes the heavy steps and reports back. `geo`
//! holds the one step that runs locally, the target projection.

pub mod geo;
pub mod pipeline;

pub use geo::project_target;
pub use pipeline::{Advance, Pipeline, StepState};
