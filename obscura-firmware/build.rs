//! Build script for obscura-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates installation.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate installation.toml at compile time
///
/// A gallery build with a broken config should fail loudly here, not
/// fall back silently on the exhibition floor.
fn validate_config() {
    println!("cargo:rerun-if-changed=installation.toml");

    let config_path = Path::new("installation.toml");
    if !config_path.exists() {
        panic!("installation.toml not found - the firmware requires an embedded installation config");
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => panic!("failed to read installation.toml: {e}"),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => panic!("invalid TOML syntax in installation.toml:\n{e}"),
    };

    let mut errors = Vec::new();

    validate_cities(&config, &mut errors);
    validate_dials(&config, &mut errors);
    validate_timeouts(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "invalid installation.toml:\n{}",
            errors
                .iter()
                .map(|e| format!("  - {e}"))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=installation.toml validated successfully");
}

fn validate_cities(config: &toml::Value, errors: &mut Vec<String>) {
    let cities = match config.get("city") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[city.*] must be tables".into());
            return;
        }
        None => {
            errors.push("missing [city.*] sections - at least one city is required".into());
            return;
        }
    };

    if cities.is_empty() {
        errors.push("at least one [city.*] section is required".into());
    }

    for (key, city) in cities {
        let city = match city {
            toml::Value::Table(t) => t,
            _ => {
                errors.push(format!("[city.{key}] must be a table"));
                continue;
            }
        };

        match city.get("name") {
            Some(toml::Value::String(name)) if name.len() <= 24 => {}
            Some(toml::Value::String(_)) => {
                errors.push(format!("[city.{key}] name longer than 24 characters"))
            }
            _ => errors.push(format!("[city.{key}] missing string 'name'")),
        }

        match city.get("lat_e6") {
            Some(toml::Value::Integer(lat)) if (-90_000_000..=90_000_000).contains(lat) => {}
            _ => errors.push(format!("[city.{key}] lat_e6 must be within +/-90000000")),
        }
        match city.get("lon_e6") {
            Some(toml::Value::Integer(lon)) if (-180_000_000..=180_000_000).contains(lon) => {}
            _ => errors.push(format!("[city.{key}] lon_e6 must be within +/-180000000")),
        }
    }
}

fn validate_dials(config: &toml::Value, errors: &mut Vec<String>) {
    let dials = match config.get("dials").and_then(|d| d.as_table()) {
        Some(t) => t,
        None => return, // optional, firmware defaults apply
    };

    let get_int = |key: &str| dials.get(key).and_then(|v| v.as_integer());

    if let (Some(min), Some(max)) = (get_int("distance_min_m"), get_int("distance_max_m")) {
        if min >= max {
            errors.push("[dials] distance_min_m must be below distance_max_m".into());
        }
    }
    if let Some(step) = get_int("distance_step_m") {
        if step <= 0 {
            errors.push("[dials] distance_step_m must be positive".into());
        }
    }
    if let Some(step) = get_int("time_step_years") {
        if step <= 0 {
            errors.push("[dials] time_step_years must be positive".into());
        }
    }
}

fn validate_timeouts(config: &toml::Value, errors: &mut Vec<String>) {
    let timeouts = match config.get("timeouts").and_then(|t| t.as_table()) {
        Some(t) => t,
        None => return,
    };

    for key in ["confirm_s", "idle_s", "error_s", "result_hold_s"] {
        if let Some(value) = timeouts.get(key).and_then(|v| v.as_integer()) {
            if value <= 0 || value > u16::MAX as i64 {
                errors.push(format!("[timeouts] {key} must be 1-65535 seconds"));
            }
        }
    }
}
