//! Message types for the render-host link
//!
//! Two directions:
//! - Controller → host: state/caption/progress updates, workflow control
//! - Host → controller: touch zones, workflow step reports, heartbeats
//!
//! Small fixed payloads are hand-packed; structured payloads
//! (status, workflow request, environment summary) are postcard-encoded.

use heapless::{String, Vec};
use postcard::{from_bytes, to_slice};
use serde::{Deserialize, Serialize};

use crate::frame::{Frame, FrameError, MAX_PAYLOAD_LEN};
use crate::types::{EnvSummary, ExposureParams, StepReport, WorkflowRequest, WorkflowStep};
use crate::zones::TouchZone;

// Message type IDs: host → controller
pub const MSG_ZONE: u8 = 0x01;
pub const MSG_PING: u8 = 0x03;
pub const MSG_STEP_DONE: u8 = 0x04;
pub const MSG_ENV: u8 = 0x05;
pub const MSG_WORKFLOW_COMPLETE: u8 = 0x06;
pub const MSG_WORKFLOW_FAILED: u8 = 0x07;

// Message type IDs: controller → host
pub const MSG_STATUS: u8 = 0x20;
pub const MSG_CAPTION: u8 = 0x21;
pub const MSG_CLEAR_CAPTIONS: u8 = 0x22;
pub const MSG_PROGRESS: u8 = 0x23;
pub const MSG_START_WORKFLOW: u8 = 0x24;
pub const MSG_ABORT_SESSION: u8 = 0x25;
pub const MSG_PONG: u8 = 0x26;

/// Caption overlay geometry on the render host
pub const CAPTION_ROWS: u8 = 6;
pub const CAPTION_COLS: usize = 32;

/// Postcard body of a [`ControllerMessage::Status`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct StatusBody {
    state_code: u8,
    city_index: u8,
    params: ExposureParams,
}

/// Messages from the controller to the render host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerMessage {
    /// Current state machine position plus the live exposure
    Status {
        /// Wire code of the exhibition state (see `obscura-core`)
        state_code: u8,
        city_index: u8,
        params: ExposureParams,
    },
    /// One row of caption overlay text
    Caption {
        row: u8,
        text: String<CAPTION_COLS>,
    },
    /// Remove all caption rows
    ClearCaptions,
    /// Workflow progress for the processing screen
    Progress { step: WorkflowStep, percent: u8 },
    /// Kick off a generation workflow on the render host
    StartWorkflow(WorkflowRequest),
    /// Abandon the in-flight session (reset, error)
    AbortSession,
    /// Heartbeat response
    Pong,
}

impl ControllerMessage {
    /// Encode this message into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            ControllerMessage::Status {
                state_code,
                city_index,
                params,
            } => {
                let body = StatusBody {
                    state_code: *state_code,
                    city_index: *city_index,
                    params: *params,
                };
                encode_postcard(MSG_STATUS, &body)
            }
            ControllerMessage::Caption { row, text } => {
                let bytes = text.as_bytes();
                let mut payload = Vec::<u8, MAX_PAYLOAD_LEN>::new();
                payload.push(*row).map_err(|_| FrameError::PayloadTooLarge)?;
                payload
                    .push(bytes.len() as u8)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                payload
                    .extend_from_slice(bytes)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                Frame::new(MSG_CAPTION, &payload)
            }
            ControllerMessage::ClearCaptions => Ok(Frame::empty(MSG_CLEAR_CAPTIONS)),
            ControllerMessage::Progress { step, percent } => {
                Frame::new(MSG_PROGRESS, &[step.to_byte(), *percent])
            }
            ControllerMessage::StartWorkflow(request) => {
                encode_postcard(MSG_START_WORKFLOW, request)
            }
            ControllerMessage::AbortSession => Ok(Frame::empty(MSG_ABORT_SESSION)),
            ControllerMessage::Pong => Ok(Frame::empty(MSG_PONG)),
        }
    }

    /// Parse a controller message from a frame (used by the host-side
    /// simulator and in tests)
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_STATUS => {
                let body: StatusBody =
                    from_bytes(&frame.payload).map_err(|_| FrameError::Malformed)?;
                Ok(ControllerMessage::Status {
                    state_code: body.state_code,
                    city_index: body.city_index,
                    params: body.params,
                })
            }
            MSG_CAPTION => {
                if frame.payload.len() < 2 {
                    return Err(FrameError::Malformed);
                }
                let row = frame.payload[0];
                let len = frame.payload[1] as usize;
                if frame.payload.len() != 2 + len || len > CAPTION_COLS {
                    return Err(FrameError::Malformed);
                }
                let text = core::str::from_utf8(&frame.payload[2..2 + len])
                    .map_err(|_| FrameError::Malformed)?;
                let mut out = String::new();
                out.push_str(text).map_err(|_| FrameError::Malformed)?;
                Ok(ControllerMessage::Caption { row, text: out })
            }
            MSG_CLEAR_CAPTIONS => Ok(ControllerMessage::ClearCaptions),
            MSG_PROGRESS => {
                if frame.payload.len() != 2 {
                    return Err(FrameError::Malformed);
                }
                let step =
                    WorkflowStep::from_byte(frame.payload[0]).ok_or(FrameError::Malformed)?;
                Ok(ControllerMessage::Progress {
                    step,
                    percent: frame.payload[1].min(100),
                })
            }
            MSG_START_WORKFLOW => {
                let request: WorkflowRequest =
                    from_bytes(&frame.payload).map_err(|_| FrameError::Malformed)?;
                Ok(ControllerMessage::StartWorkflow(request))
            }
            MSG_ABORT_SESSION => Ok(ControllerMessage::AbortSession),
            MSG_PONG => Ok(ControllerMessage::Pong),
            _ => Err(FrameError::Malformed),
        }
    }
}

/// Commands from the render host to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostCommand {
    /// Touch resolved to an on-screen zone
    Zone(TouchZone),
    /// Heartbeat request
    Ping,
    /// One workflow step finished on the host
    StepDone { step: WorkflowStep, report: StepReport },
    /// Environment summary for the confirmation captions
    Env(EnvSummary),
    /// Workflow finished; the artwork is on screen
    WorkflowComplete { artwork_id: u32 },
    /// A critical workflow step failed with no fallback
    WorkflowFailed { step: WorkflowStep },
}

impl HostCommand {
    /// Parse a command from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_ZONE => {
                if frame.payload.len() != 1 {
                    return Err(FrameError::Malformed);
                }
                let zone = TouchZone::from_byte(frame.payload[0]).ok_or(FrameError::Malformed)?;
                Ok(HostCommand::Zone(zone))
            }
            MSG_PING => Ok(HostCommand::Ping),
            MSG_STEP_DONE => {
                if frame.payload.len() != 2 {
                    return Err(FrameError::Malformed);
                }
                let step =
                    WorkflowStep::from_byte(frame.payload[0]).ok_or(FrameError::Malformed)?;
                let report =
                    StepReport::from_byte(frame.payload[1]).ok_or(FrameError::Malformed)?;
                Ok(HostCommand::StepDone { step, report })
            }
            MSG_ENV => {
                let env: EnvSummary =
                    from_bytes(&frame.payload).map_err(|_| FrameError::Malformed)?;
                Ok(HostCommand::Env(env))
            }
            MSG_WORKFLOW_COMPLETE => {
                if frame.payload.len() != 4 {
                    return Err(FrameError::Malformed);
                }
                let mut id = [0u8; 4];
                id.copy_from_slice(&frame.payload);
                Ok(HostCommand::WorkflowComplete {
                    artwork_id: u32::from_le_bytes(id),
                })
            }
            MSG_WORKFLOW_FAILED => {
                if frame.payload.len() != 1 {
                    return Err(FrameError::Malformed);
                }
                let step =
                    WorkflowStep::from_byte(frame.payload[0]).ok_or(FrameError::Malformed)?;
                Ok(HostCommand::WorkflowFailed { step })
            }
            _ => Err(FrameError::Malformed),
        }
    }

    /// Encode this command into a frame (used by the host-side
    /// simulator and in tests)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            HostCommand::Zone(zone) => Frame::new(MSG_ZONE, &[zone.to_byte()]),
            HostCommand::Ping => Ok(Frame::empty(MSG_PING)),
            HostCommand::StepDone { step, report } => {
                Frame::new(MSG_STEP_DONE, &[step.to_byte(), report.to_byte()])
            }
            HostCommand::Env(env) => encode_postcard(MSG_ENV, env),
            HostCommand::WorkflowComplete { artwork_id } => {
                Frame::new(MSG_WORKFLOW_COMPLETE, &artwork_id.to_le_bytes())
            }
            HostCommand::WorkflowFailed { step } => {
                Frame::new(MSG_WORKFLOW_FAILED, &[step.to_byte()])
            }
        }
    }
}

/// Postcard-encode a value into a frame payload
fn encode_postcard<T: Serialize>(msg_type: u8, value: &T) -> Result<Frame, FrameError> {
    let mut buf = [0u8; MAX_PAYLOAD_LEN];
    let used = to_slice(value, &mut buf).map_err(|_| FrameError::PayloadTooLarge)?;
    Frame::new(msg_type, used)
}
