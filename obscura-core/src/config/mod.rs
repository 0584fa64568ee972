//! Installation configuration
//!
//! Types for the exhibition config loaded at boot. The firmware crate
//! parses the embedded TOML into these structures.

pub mod types;

pub use types::{
    CityConfig, ConfigError, DialConfig, HardwareConfig, InstallationConfig, TimeoutConfig,
    MAX_CITIES, MAX_CITY_NAME_LEN,
};
