//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy
//! tasks. All coordination between the input poller, the link tasks,
//! and the controller goes through these; no task shares mutable state
//! with another.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use obscura_core::state::ErrorKind;
use obscura_protocol::{ControllerMessage, HostCommand};

/// Channel capacity for dial/compass input events
const INPUT_CHANNEL_SIZE: usize = 8;

/// Channel capacity for commands from the render host
const HOST_CHANNEL_SIZE: usize = 8;

/// Channel capacity for outbound link messages
const LINK_TX_SIZE: usize = 16;

/// Conditioned input from the telescope hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    /// City dial moved by signed detents
    CityDial { detents: i32 },
    /// Parameter dial moved by signed detents
    ParamDial { detents: i32 },
    /// City dial shaft switch pressed
    CityPress,
    /// Parameter dial shaft switch pressed
    ParamPress,
    /// Smoothed telescope bearing changed
    Heading { centideg: u16 },
    /// An input device stopped responding
    SensorFault(ErrorKind),
}

/// Input events from the input poll task
pub static INPUT_CHANNEL: Channel<CriticalSectionRawMutex, InputEvent, INPUT_CHANNEL_SIZE> =
    Channel::new();

/// Parsed commands from the render host
pub static HOST_CHANNEL: Channel<CriticalSectionRawMutex, HostCommand, HOST_CHANNEL_SIZE> =
    Channel::new();

/// Outbound messages for the link TX task
pub static LINK_TX: Channel<CriticalSectionRawMutex, ControllerMessage, LINK_TX_SIZE> =
    Channel::new();

/// Signal that a heartbeat (PING) was received from the render host
pub static HEARTBEAT_RECEIVED: Signal<CriticalSectionRawMutex, ()> = Signal::new();
