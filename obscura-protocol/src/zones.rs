//! Touch-zone wire values
//!
//! The render host does its own hit-testing against the on-screen
//! buttons and reports only the resolved zone, so the controller never
//! needs to know the screen layout.

/// A touch zone resolved by the render host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchZone {
    /// "Begin" on the attract screen / city carousel advance
    CityNext,
    /// Confirm the selected city
    CitySelect,
    /// Lock the dialled parameters and move to confirmation
    LockParameters,
    /// Confirm the data fetch and start the workflow
    ConfirmFetch,
    /// Decline the fetch, back to dialling
    DeclineFetch,
    /// Tap anywhere on the finished artwork
    Artwork,
    /// Hidden staff reset corner (long press on the host side)
    StaffReset,
}

// Wire format values
const ZONE_CITY_NEXT: u8 = 0x01;
const ZONE_CITY_SELECT: u8 = 0x02;
const ZONE_LOCK_PARAMETERS: u8 = 0x03;
const ZONE_CONFIRM_FETCH: u8 = 0x04;
const ZONE_DECLINE_FETCH: u8 = 0x05;
const ZONE_ARTWORK: u8 = 0x10;
const ZONE_STAFF_RESET: u8 = 0x7F;

impl TouchZone {
    /// Parse a zone from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            ZONE_CITY_NEXT => Some(TouchZone::CityNext),
            ZONE_CITY_SELECT => Some(TouchZone::CitySelect),
            ZONE_LOCK_PARAMETERS => Some(TouchZone::LockParameters),
            ZONE_CONFIRM_FETCH => Some(TouchZone::ConfirmFetch),
            ZONE_DECLINE_FETCH => Some(TouchZone::DeclineFetch),
            ZONE_ARTWORK => Some(TouchZone::Artwork),
            ZONE_STAFF_RESET => Some(TouchZone::StaffReset),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            TouchZone::CityNext => ZONE_CITY_NEXT,
            TouchZone::CitySelect => ZONE_CITY_SELECT,
            TouchZone::LockParameters => ZONE_LOCK_PARAMETERS,
            TouchZone::ConfirmFetch => ZONE_CONFIRM_FETCH,
            TouchZone::DeclineFetch => ZONE_DECLINE_FETCH,
            TouchZone::Artwork => ZONE_ARTWORK,
            TouchZone::StaffReset => ZONE_STAFF_RESET,
        }
    }

    /// Returns true for zones that only exist inside an active session
    pub fn is_session_zone(&self) -> bool {
        !matches!(self, TouchZone::StaffReset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TouchZone; 7] = [
        TouchZone::CityNext,
        TouchZone::CitySelect,
        TouchZone::LockParameters,
        TouchZone::ConfirmFetch,
        TouchZone::DeclineFetch,
        TouchZone::Artwork,
        TouchZone::StaffReset,
    ];

    #[test]
    fn zone_wire_roundtrip() {
        for zone in ALL {
            assert_eq!(TouchZone::from_byte(zone.to_byte()), Some(zone));
        }
    }

    #[test]
    fn unknown_zone_rejected() {
        assert!(TouchZone::from_byte(0x00).is_none());
        assert!(TouchZone::from_byte(0xFF).is_none());
    }

    #[test]
    fn staff_reset_is_not_a_session_zone() {
        assert!(!TouchZone::StaffReset.is_session_zone());
        assert!(TouchZone::Artwork.is_session_zone());
    }
}
