//! Configuration loading and parsing
//!
//! The installation config is embedded into the firmware image as
//! TOML and parsed at boot by a custom no_std parser.

pub mod toml;

pub use toml::parse_config;
