//! Simple TOML parser for the installation configuration
//!
//! This is a minimal TOML parser that handles only the subset needed
//! for the installation config. It does NOT support the full TOML
//! spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer)
//! - [section] headers
//! - [city.name] subsection headers
//! - Hex integers (0x36) for I2C addresses
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings
//! - Datetime values
//! - Arrays and inline tables

use heapless::String as HString;

use obscura_core::config::{CityConfig, InstallationConfig, MAX_CITY_NAME_LEN};

/// Parse error
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Value outside the range of its field
    ValueOutOfRange,
    /// Too many cities (exceeded heapless capacity)
    TooManyCities,
}

/// Current parsing context
#[derive(Debug, Clone)]
enum Section {
    Root,
    Dials,
    Hardware,
    Timeouts,
    City,
}

/// Parse TOML configuration into InstallationConfig
///
/// Starts from the built-in defaults; every key present in the input
/// overrides its default. Semantic checks (dial ranges, timeout
/// floors) are left to [`InstallationConfig::validate`].
pub fn parse_config(input: &str) -> Result<InstallationConfig, ParseError> {
    let mut config = InstallationConfig::default();
    config.cities.clear();

    let mut section = Section::Root;
    let mut current_city: Option<CityConfig> = None;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Check for section header
        if line.starts_with('[') && line.ends_with(']') {
            save_city(&mut config, &mut current_city)?;
            section = parse_section_header(&line[1..line.len() - 1])?;
            if matches!(section, Section::City) {
                current_city = Some(CityConfig::default());
            }
            continue;
        }

        // Parse key = value
        if let Some((key, value)) = parse_key_value(line) {
            apply_value(&section, key, value, &mut config, &mut current_city)?;
        }
    }

    save_city(&mut config, &mut current_city)?;

    Ok(config)
}

/// Parse section header like "dials" or "city.london"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let header = header.trim();

    if let Some(rest) = header.strip_prefix("city.") {
        if rest.is_empty() || rest.contains('.') {
            return Err(ParseError::InvalidSection);
        }
        // The subsection key is only a TOML handle; the display name
        // comes from the name key inside
        return Ok(Section::City);
    }

    match header {
        "dials" => Ok(Section::Dials),
        "hardware" => Ok(Section::Hardware),
        "timeouts" => Ok(Section::Timeouts),
        _ => Err(ParseError::InvalidSection),
    }
}

fn save_city(
    config: &mut InstallationConfig,
    current: &mut Option<CityConfig>,
) -> Result<(), ParseError> {
    if let Some(city) = current.take() {
        config
            .cities
            .push(city)
            .map_err(|_| ParseError::TooManyCities)?;
    }
    Ok(())
}

fn apply_value(
    section: &Section,
    key: &str,
    value: &str,
    config: &mut InstallationConfig,
    current_city: &mut Option<CityConfig>,
) -> Result<(), ParseError> {
    match section {
        // Unknown keys are ignored so a newer config can still boot an
        // older firmware
        Section::Root => Ok(()),
        Section::Dials => {
            let dials = &mut config.dials;
            match key {
                "distance_min_m" => dials.distance_min_m = parse_int(value)?,
                "distance_max_m" => dials.distance_max_m = parse_int(value)?,
                "distance_step_m" => dials.distance_step_m = parse_int(value)?,
                "time_span_years" => dials.time_span_years = parse_int(value)?,
                "time_step_years" => dials.time_step_years = parse_int(value)?,
                _ => {}
            }
            Ok(())
        }
        Section::Hardware => {
            let hw = &mut config.hardware;
            match key {
                "city_dial_addr" => hw.city_dial_addr = parse_int(value)?,
                "param_dial_addr" => hw.param_dial_addr = parse_int(value)?,
                "counts_per_detent" => hw.counts_per_detent = parse_int(value)?,
                "compass_offset_x" => hw.compass_offset_x = parse_int(value)?,
                "compass_offset_y" => hw.compass_offset_y = parse_int(value)?,
                _ => {}
            }
            Ok(())
        }
        Section::Timeouts => {
            let timeouts = &mut config.timeouts;
            match key {
                "confirm_s" => timeouts.confirm_s = parse_int(value)?,
                "idle_s" => timeouts.idle_s = parse_int(value)?,
                "error_s" => timeouts.error_s = parse_int(value)?,
                "result_hold_s" => timeouts.result_hold_s = parse_int(value)?,
                _ => {}
            }
            Ok(())
        }
        Section::City => {
            let city = current_city.as_mut().ok_or(ParseError::InvalidSection)?;
            match key {
                "name" => {
                    let name = parse_string(value)?;
                    city.name = HString::<MAX_CITY_NAME_LEN>::try_from(name)
                        .map_err(|_| ParseError::ValueOutOfRange)?;
                }
                "lat_e6" => city.origin.lat_e6 = parse_int(value)?,
                "lon_e6" => city.origin.lon_e6 = parse_int(value)?,
                _ => {}
            }
            Ok(())
        }
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseError> {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        Ok(&value[1..value.len() - 1])
    } else {
        // Allow unquoted strings for simple values
        Ok(value)
    }
}

/// Parse an integer value, decimal or 0x-prefixed hex
fn parse_int<T>(value: &str) -> Result<T, ParseError>
where
    T: TryFrom<i64>,
{
    let raw = if let Some(hex) = value.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).map_err(|_| ParseError::InvalidValue)?
    } else {
        value.parse().map_err(|_| ParseError::InvalidValue)?
    };
    T::try_from(raw).map_err(|_| ParseError::ValueOutOfRange)
}
