//! Configuration type definitions
//!
//! These types represent the installation configuration. The gallery
//! build embeds the config as TOML; defaults below match the touring
//! exhibit so the controller still runs if parsing fails.

use heapless::{String, Vec};

use obscura_protocol::GeoPoint;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum city name length
pub const MAX_CITY_NAME_LEN: usize = 24;

/// Maximum cities in the carousel
pub const MAX_CITIES: usize = 12;

/// One city in the selection carousel
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CityConfig {
    /// Display name
    pub name: String<MAX_CITY_NAME_LEN>,
    /// Anchor coordinate
    pub origin: GeoPoint,
}

/// Dial ranges and step sizes for parameter input
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DialConfig {
    /// Minimum viewing distance (metres)
    pub distance_min_m: u32,
    /// Maximum viewing distance (metres)
    pub distance_max_m: u32,
    /// Distance change per detent (metres)
    pub distance_step_m: u32,
    /// Time offset range, symmetric around now (years)
    pub time_span_years: i16,
    /// Time offset change per detent (years)
    pub time_step_years: i16,
}

impl Default for DialConfig {
    fn default() -> Self {
        Self {
            distance_min_m: 1_000,
            distance_max_m: 50_000,
            distance_step_m: 500,
            time_span_years: 50,
            time_step_years: 1,
        }
    }
}

/// Fixed hardware wiring: I2C addresses and sensor calibration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HardwareConfig {
    /// Seesaw address of the city/selection dial
    pub city_dial_addr: u8,
    /// Seesaw address of the parameter dial
    pub param_dial_addr: u8,
    /// Hardware counter counts per physical detent
    pub counts_per_detent: i32,
    /// Magnetometer hard-iron offset, raw x counts
    pub compass_offset_x: i16,
    /// Magnetometer hard-iron offset, raw y counts
    pub compass_offset_y: i16,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            city_dial_addr: 0x36,
            param_dial_addr: 0x37,
            counts_per_detent: 1,
            compass_offset_x: 0,
            compass_offset_y: 0,
        }
    }
}

/// Dwell timeouts, in seconds of wall-clock time
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeoutConfig {
    /// FetchConfirm reverts to ParameterInput after this long
    pub confirm_s: u16,
    /// WaitingInteraction resets after this long with no touch
    pub idle_s: u16,
    /// Error screen holds this long before self-resetting
    pub error_s: u16,
    /// ResultDisplay releases the artwork after this long
    pub result_hold_s: u16,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            confirm_s: 60,
            idle_s: 300,
            error_s: 30,
            result_hold_s: 120,
        }
    }
}

/// Complete installation configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InstallationConfig {
    /// City carousel, in display order
    pub cities: Vec<CityConfig, MAX_CITIES>,
    /// Dial ranges
    pub dials: DialConfig,
    /// Hardware wiring and calibration
    pub hardware: HardwareConfig,
    /// Dwell timeouts
    pub timeouts: TimeoutConfig,
}

impl Default for InstallationConfig {
    fn default() -> Self {
        let mut cities = Vec::new();
        for (name, lat_e6, lon_e6) in [
            ("London", 51_507_400, -127_800),
            ("Manchester", 53_480_800, -2_242_600),
            ("Edinburgh", 55_953_300, -3_188_300),
        ] {
            let mut city = CityConfig {
                name: String::new(),
                origin: GeoPoint { lat_e6, lon_e6 },
            };
            // Names fit MAX_CITY_NAME_LEN, and the carousel has room
            let _ = city.name.push_str(name);
            let _ = cities.push(city);
        }

        Self {
            cities,
            dials: DialConfig::default(),
            hardware: HardwareConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl InstallationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cities.is_empty() {
            return Err(ConfigError::NoCities);
        }
        if self.dials.distance_min_m >= self.dials.distance_max_m {
            return Err(ConfigError::BadDistanceRange);
        }
        if self.dials.distance_step_m == 0 || self.dials.time_step_years <= 0 {
            return Err(ConfigError::BadDialStep);
        }
        if self.hardware.city_dial_addr == self.hardware.param_dial_addr
            || self.hardware.counts_per_detent <= 0
        {
            return Err(ConfigError::BadHardware);
        }
        if self.timeouts.confirm_s == 0
            || self.timeouts.idle_s == 0
            || self.timeouts.error_s == 0
            || self.timeouts.result_hold_s == 0
        {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// City carousel is empty
    NoCities,
    /// distance_min_m must be below distance_max_m
    BadDistanceRange,
    /// Dial steps must be positive
    BadDialStep,
    /// Dial addresses must differ and detent scaling must be positive
    BadHardware,
    /// All dwell timeouts must be nonzero
    ZeroTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = InstallationConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.cities.len(), 3);
        assert_eq!(config.cities[0].name.as_str(), "London");
    }

    #[test]
    fn rejects_empty_carousel() {
        let mut config = InstallationConfig::default();
        config.cities.clear();
        assert_eq!(config.validate(), Err(ConfigError::NoCities));
    }

    #[test]
    fn rejects_inverted_distance_range() {
        let mut config = InstallationConfig::default();
        config.dials.distance_min_m = 60_000;
        assert_eq!(config.validate(), Err(ConfigError::BadDistanceRange));
    }

    #[test]
    fn rejects_zero_step() {
        let mut config = InstallationConfig::default();
        config.dials.distance_step_m = 0;
        assert_eq!(config.validate(), Err(ConfigError::BadDialStep));
    }

    #[test]
    fn rejects_clashing_dial_addresses() {
        let mut config = InstallationConfig::default();
        config.hardware.param_dial_addr = config.hardware.city_dial_addr;
        assert_eq!(config.validate(), Err(ConfigError::BadHardware));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = InstallationConfig::default();
        config.timeouts.idle_s = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
    }
}
