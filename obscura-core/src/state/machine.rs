//! State machine definition
//!
//! A visitor session moves one way through the exhibition flow:
//! city selection, parameter dialling, fetch confirmation, processing,
//! result display, then waiting. Resets are the only way back to the
//! start; faults drop into `Error` from anywhere mid-session.

use super::events::Event;

/// Exhibition states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Power-on initialization, hardware probes, config loading
    Boot,
    /// Attract loop; visitor browses the city carousel
    CitySelection,
    /// Visitor dials distance, time offset, and bearing
    ParameterInput,
    /// "Fetch live data for this place?" confirmation screen
    FetchConfirm,
    /// Generation workflow running on the render host
    Processing,
    /// Finished artwork on screen
    ResultDisplay,
    /// Artwork still up, waiting for the next visitor
    WaitingInteraction,
    /// Session teardown; render host clearing the screen
    Resetting,
    /// Fault detected; captions show the staff notice
    Error(ErrorKind),
}

/// Types of faults that can occur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// A rotary dial stopped answering on I2C
    EncoderFault,
    /// Magnetometer unreachable or persistently overflowing
    CompassFault,
    /// A critical workflow step failed on the render host
    WorkflowFailed,
    /// Render host heartbeat lost
    LinkLost,
    /// Configuration error
    ConfigError,
    /// Unknown/generic error
    Unknown,
}

impl State {
    /// Check if this state reacts to dial rotation
    pub fn accepts_dial_input(&self) -> bool {
        matches!(self, State::CitySelection | State::ParameterInput)
    }

    /// Check if this is the attract loop
    pub fn is_attract(&self) -> bool {
        matches!(self, State::CitySelection)
    }

    /// Check if a generation workflow is in flight
    pub fn workflow_active(&self) -> bool {
        matches!(self, State::Processing)
    }

    /// Check if this is an error state
    pub fn is_error(&self) -> bool {
        matches!(self, State::Error(_))
    }

    /// Check if a visitor session is in progress
    pub fn in_session(&self) -> bool {
        matches!(
            self,
            State::ParameterInput
                | State::FetchConfirm
                | State::Processing
                | State::ResultDisplay
                | State::WaitingInteraction
        )
    }

    /// Wire code for status messages to the render host
    pub fn wire_code(&self) -> u8 {
        match self {
            State::Boot => 0,
            State::CitySelection => 1,
            State::ParameterInput => 2,
            State::FetchConfirm => 3,
            State::Processing => 4,
            State::ResultDisplay => 5,
            State::WaitingInteraction => 6,
            State::Resetting => 7,
            State::Error(_) => 8,
        }
    }

    /// Process an event and return the next state
    ///
    /// This is the core state transition logic. Every `(state, event)`
    /// pair resolves; unmatched pairs stay put, so a stale or repeated
    /// event can never corrupt the flow.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            // Boot transitions
            (Boot, BootComplete) => CitySelection,
            (Boot, ErrorDetected(kind)) => Error(kind),

            // CitySelection transitions
            (CitySelection, CityChosen) => ParameterInput,
            (CitySelection, ResetRequested) => Resetting,
            (CitySelection, ErrorDetected(kind)) => Error(kind),

            // ParameterInput transitions
            (ParameterInput, ParametersLocked) => FetchConfirm,
            (ParameterInput, ResetRequested) => Resetting,
            (ParameterInput, ErrorDetected(kind)) => Error(kind),

            // FetchConfirm transitions
            (FetchConfirm, FetchConfirmed) => Processing,
            (FetchConfirm, FetchDeclined) => ParameterInput,
            (FetchConfirm, ConfirmExpired) => ParameterInput,
            (FetchConfirm, ResetRequested) => Resetting,
            (FetchConfirm, ErrorDetected(kind)) => Error(kind),

            // Processing transitions
            (Processing, WorkflowComplete) => ResultDisplay,
            (Processing, ResetRequested) => Resetting,
            (Processing, ErrorDetected(kind)) => Error(kind),

            // ResultDisplay transitions
            (ResultDisplay, ResultAcknowledged) => WaitingInteraction,
            (ResultDisplay, ResultHoldExpired) => WaitingInteraction,
            (ResultDisplay, ResetRequested) => Resetting,
            (ResultDisplay, ErrorDetected(kind)) => Error(kind),

            // WaitingInteraction transitions
            (WaitingInteraction, NewSessionRequested) => Resetting,
            (WaitingInteraction, IdleExpired) => Resetting,
            (WaitingInteraction, ResetRequested) => Resetting,
            (WaitingInteraction, ErrorDetected(kind)) => Error(kind),

            // Resetting transitions; faults are ignored here, the reset
            // itself is the recovery path
            (Resetting, ResetComplete) => CitySelection,

            // Error transitions
            (Error(_), ErrorExpired) => Resetting,
            (Error(_), ResetRequested) => Resetting,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_to_attract() {
        let state = State::Boot;
        assert_eq!(state.transition(Event::BootComplete), State::CitySelection);
    }

    #[test]
    fn happy_path_session() {
        let mut state = State::Boot;
        let flow = [
            (Event::BootComplete, State::CitySelection),
            (Event::CityChosen, State::ParameterInput),
            (Event::ParametersLocked, State::FetchConfirm),
            (Event::FetchConfirmed, State::Processing),
            (Event::WorkflowComplete, State::ResultDisplay),
            (Event::ResultAcknowledged, State::WaitingInteraction),
            (Event::IdleExpired, State::Resetting),
            (Event::ResetComplete, State::CitySelection),
        ];
        for (event, expected) in flow {
            state = state.transition(event);
            assert_eq!(state, expected);
        }
    }

    #[test]
    fn error_from_any_active_state() {
        let states = [
            State::Boot,
            State::CitySelection,
            State::ParameterInput,
            State::FetchConfirm,
            State::Processing,
            State::ResultDisplay,
            State::WaitingInteraction,
        ];

        for state in states {
            let next = state.transition(Event::ErrorDetected(ErrorKind::LinkLost));
            assert!(matches!(next, State::Error(ErrorKind::LinkLost)));
        }
    }

    #[test]
    fn resetting_ignores_faults() {
        let state = State::Resetting;
        assert_eq!(
            state.transition(Event::ErrorDetected(ErrorKind::EncoderFault)),
            State::Resetting
        );
        assert_eq!(state.transition(Event::ResetComplete), State::CitySelection);
    }

    #[test]
    fn confirm_timeout_reverts_to_dialling() {
        let state = State::FetchConfirm;
        assert_eq!(state.transition(Event::ConfirmExpired), State::ParameterInput);
        assert_eq!(state.transition(Event::FetchDeclined), State::ParameterInput);
    }

    #[test]
    fn error_recovers_through_reset() {
        let state = State::Error(ErrorKind::WorkflowFailed);
        let resetting = state.transition(Event::ErrorExpired);
        assert_eq!(resetting, State::Resetting);
        assert_eq!(resetting.transition(Event::ResetComplete), State::CitySelection);
    }

    #[test]
    fn stale_events_are_no_ops() {
        // A workflow completion arriving after a staff reset must not
        // drag the machine back into the session flow.
        let state = State::Resetting;
        assert_eq!(state.transition(Event::WorkflowComplete), State::Resetting);

        let state = State::CitySelection;
        assert_eq!(state.transition(Event::FetchConfirmed), State::CitySelection);
    }

    #[test]
    fn flow_is_one_directional() {
        // No event may move ResultDisplay back to Processing
        let state = State::ResultDisplay;
        for event in [
            Event::FetchConfirmed,
            Event::ParametersLocked,
            Event::CityChosen,
        ] {
            assert_eq!(state.transition(event), State::ResultDisplay);
        }
    }

    #[test]
    fn dial_input_states() {
        assert!(State::CitySelection.accepts_dial_input());
        assert!(State::ParameterInput.accepts_dial_input());
        assert!(!State::Processing.accepts_dial_input());
        assert!(!State::Error(ErrorKind::Unknown).accepts_dial_input());
    }

    #[test]
    fn wire_codes_are_distinct() {
        let states = [
            State::Boot,
            State::CitySelection,
            State::ParameterInput,
            State::FetchConfirm,
            State::Processing,
            State::ResultDisplay,
            State::WaitingInteraction,
            State::Resetting,
            State::Error(ErrorKind::Unknown),
        ];
        for (i, a) in states.iter().enumerate() {
            for b in &states[i + 1..] {
                assert_ne!(a.wire_code(), b.wire_code());
            }
        }
    }
}
