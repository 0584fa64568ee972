//! Exhibition state machine
//!
//! All caption, input, and workflow behavior is a function of the
//! current state and an event.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{ErrorKind, State};
