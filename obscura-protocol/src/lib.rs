//! Wire protocol between the Obscura controller and the render host
//!
//! The controller (this firmware) owns the physical inputs and the
//! exhibition state machine. The render host owns the HyperPixel
//! touchscreen and runs the network-bound workflow steps (weather
//! fetch, style prediction, artwork generation, archive sync). The two
//! halves exchange framed messages over a UART link; neither side ever
//! touches the other's state directly.
//!
//! This crate is `no_std` and host-testable. It defines:
//! - the byte-level frame format ([`frame`])
//! - message encode/decode for both directions ([`messages`])
//! - touch-zone wire values ([`zones`])
//! - domain types shared across the link ([`types`])

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;
pub mod types;
pub mod zones;

pub use frame::{Frame, FrameError, FrameParser, MAX_FRAME_LEN, MAX_PAYLOAD_LEN};
pub use messages::{ControllerMessage, HostCommand, CAPTION_COLS, CAPTION_ROWS};
pub use types::{
    EnvSummary, ExposureParams, GeoPoint, StepReport, WeatherCode, WorkflowRequest, WorkflowStep,
};
pub use zones::TouchZone;
