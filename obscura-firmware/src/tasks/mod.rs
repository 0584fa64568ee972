//! Embassy tasks for the exhibition controller
//!
//! Task inventory:
//! - input: polls the dials and the compass over I2C
//! - link_rx: receives frames from the render host
//! - link_tx: sends frames to the render host
//! - controller: central coordination loop, including the periodic tick

pub mod controller;
pub mod input;
pub mod link_rx;
pub mod link_tx;

pub use controller::controller_task;
pub use input::input_task;
pub use link_rx::link_rx_task;
pub use link_tx::link_tx_task;
