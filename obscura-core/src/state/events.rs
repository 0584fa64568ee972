//! Events that drive state transitions

use super::machine::ErrorKind;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Hardware probes passed and config loaded
    BootComplete,
    /// Visitor pressed the city dial to pick the highlighted city
    CityChosen,
    /// Visitor locked in distance, time offset, and bearing
    ParametersLocked,
    /// Visitor accepted the live-data fetch
    FetchConfirmed,
    /// Visitor declined the live-data fetch
    FetchDeclined,
    /// Confirmation screen dwelled past its timeout
    ConfirmExpired,
    /// Render host reported the workflow finished
    WorkflowComplete,
    /// Visitor touched the artwork to release it
    ResultAcknowledged,
    /// Result screen dwelled past its hold timeout
    ResultHoldExpired,
    /// A new visitor interacted while the old artwork was up
    NewSessionRequested,
    /// Nobody interacted for the idle timeout
    IdleExpired,
    /// Staff requested a reset
    ResetRequested,
    /// Render host acknowledged the screen clear
    ResetComplete,
    /// A fault was detected
    ErrorDetected(ErrorKind),
    /// Error screen dwelled past its display timeout
    ErrorExpired,
}

impl Event {
    /// Check if this event came from a visitor action
    pub fn is_user_event(&self) -> bool {
        matches!(
            self,
            Event::CityChosen
                | Event::ParametersLocked
                | Event::FetchConfirmed
                | Event::FetchDeclined
                | Event::ResultAcknowledged
                | Event::NewSessionRequested
        )
    }

    /// Check if this event was raised by a dwell timeout
    pub fn is_timeout_event(&self) -> bool {
        matches!(
            self,
            Event::ConfirmExpired
                | Event::ResultHoldExpired
                | Event::IdleExpired
                | Event::ErrorExpired
        )
    }

    /// Check if this event reports a fault
    pub fn is_error_event(&self) -> bool {
        matches!(self, Event::ErrorDetected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_event_classification() {
        assert!(Event::CityChosen.is_user_event());
        assert!(Event::FetchDeclined.is_user_event());
        assert!(!Event::IdleExpired.is_user_event());
        assert!(!Event::BootComplete.is_user_event());
    }

    #[test]
    fn timeout_event_classification() {
        assert!(Event::ConfirmExpired.is_timeout_event());
        assert!(Event::IdleExpired.is_timeout_event());
        assert!(!Event::ResetRequested.is_timeout_event());
        assert!(!Event::ErrorDetected(ErrorKind::LinkLost).is_timeout_event());
    }

    #[test]
    fn error_event_classification() {
        assert!(Event::ErrorDetected(ErrorKind::CompassFault).is_error_event());
        assert!(!Event::ErrorExpired.is_error_event());
    }

    #[test]
    fn classes_are_disjoint() {
        let all = [
            Event::BootComplete,
            Event::CityChosen,
            Event::ParametersLocked,
            Event::FetchConfirmed,
            Event::FetchDeclined,
            Event::ConfirmExpired,
            Event::WorkflowComplete,
            Event::ResultAcknowledged,
            Event::ResultHoldExpired,
            Event::NewSessionRequested,
            Event::IdleExpired,
            Event::ResetRequested,
            Event::ResetComplete,
            Event::ErrorDetected(ErrorKind::Unknown),
            Event::ErrorExpired,
        ];
        for event in all {
            let classes = [
                event.is_user_event(),
                event.is_timeout_event(),
                event.is_error_event(),
            ];
            assert!(classes.iter().filter(|c| **c).count() <= 1, "{event:?}");
        }
    }
}
