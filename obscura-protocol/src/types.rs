//! Domain types shared across the link
//!
//! Everything a visitor dials in on the telescope, and everything the
//! render host reports back, crosses the wire as one of these types.
//! Structured payloads are postcard-encoded; angles are integer
//! centidegrees and coordinates are integer micro-degrees so that no
//! float ever crosses the link.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate in 1e-6 degree units
///
/// i32 micro-degrees cover the full ±180° range with ~11 cm resolution,
/// far beyond what the installation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GeoPoint {
    /// Latitude in micro-degrees (positive north)
    pub lat_e6: i32,
    /// Longitude in micro-degrees (positive east)
    pub lon_e6: i32,
}

/// The three-axis exposure a visitor has dialled in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExposureParams {
    /// Viewing distance from the city origin, in metres
    pub distance_m: u32,
    /// Temporal offset in whole years (negative = past)
    pub time_offset_years: i16,
    /// Viewing bearing in centidegrees clockwise from north (0..36000)
    pub bearing_cd: u16,
}

impl Default for ExposureParams {
    fn default() -> Self {
        Self {
            distance_m: 10_000,
            time_offset_years: 10,
            bearing_cd: 0,
        }
    }
}

/// Coarse weather classification from the render host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WeatherCode {
    Clear,
    PartlyCloudy,
    Overcast,
    Fog,
    Rain,
    Snow,
    Storm,
    #[default]
    Unknown,
}

/// Environmental snapshot fetched by the render host for the target
/// coordinate, echoed back so the controller can show it on the
/// confirmation captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnvSummary {
    /// Air temperature in 0.1 °C units
    pub temperature_c_x10: i16,
    /// Relative humidity, percent
    pub humidity_pct: u8,
    /// Surface pressure in hPa
    pub pressure_hpa: u16,
    /// Wind speed in 0.1 m/s units
    pub wind_speed_ms_x10: u16,
    /// Coarse sky condition
    pub condition: WeatherCode,
}

/// Steps of the generation workflow, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WorkflowStep {
    /// Project the dialled distance/bearing from the city origin (local)
    ComputeTarget,
    /// Fetch weather/environment data for the target (render host)
    FetchEnvironment,
    /// Assemble the model feature vector (render host)
    PrepareFeatures,
    /// Run the style prediction model (render host)
    PredictStyle,
    /// Render the locator map overlay (render host, best effort)
    RenderMap,
    /// Generate the artwork image (render host)
    GenerateArtwork,
    /// Sync the session record to the archive (render host, best effort)
    SyncArchive,
}

impl WorkflowStep {
    /// All steps in execution order
    pub const SEQUENCE: [Self; 7] = [
        Self::ComputeTarget,
        Self::FetchEnvironment,
        Self::PrepareFeatures,
        Self::PredictStyle,
        Self::RenderMap,
        Self::GenerateArtwork,
        Self::SyncArchive,
    ];

    /// Position of this step in [`Self::SEQUENCE`]
    pub fn index(self) -> usize {
        match self {
            Self::ComputeTarget => 0,
            Self::FetchEnvironment => 1,
            Self::PrepareFeatures => 2,
            Self::PredictStyle => 3,
            Self::RenderMap => 4,
            Self::GenerateArtwork => 5,
            Self::SyncArchive => 6,
        }
    }

    /// Parse a step from its wire byte (= sequence index)
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::SEQUENCE.get(byte as usize).copied()
    }

    /// Wire byte for this step
    pub fn to_byte(self) -> u8 {
        self.index() as u8
    }

    /// Short name for captions and logs
    pub fn label(self) -> &'static str {
        match self {
            Self::ComputeTarget => "locating",
            Self::FetchEnvironment => "reading the air",
            Self::PrepareFeatures => "measuring",
            Self::PredictStyle => "imagining",
            Self::RenderMap => "charting",
            Self::GenerateArtwork => "developing",
            Self::SyncArchive => "archiving",
        }
    }
}

/// Per-step completion report from the render host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepReport {
    /// Step finished normally
    Ok,
    /// Step failed but produced a usable fallback (synthetic data,
    /// cached imagery); the workflow may continue
    Degraded,
    /// Step failed with nothing to show for it
    Failed,
}

impl StepReport {
    /// Parse a report from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Ok),
            1 => Some(Self::Degraded),
            2 => Some(Self::Failed),
            _ => None,
        }
    }

    /// Wire byte for this report
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Degraded => 1,
            Self::Failed => 2,
        }
    }
}

/// Everything the render host needs to run one generation workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WorkflowRequest {
    /// Index into the configured city table
    pub city_index: u8,
    /// The dialled exposure
    pub params: ExposureParams,
    /// Target coordinate projected by the controller
    pub target: GeoPoint,
}
