//! Per-visitor session record
//!
//! One `Session` lives inside the controller for the duration of a
//! visit. It owns the selected city and the dialled exposure
//! parameters; everything else about a visit is carried by states and
//! events rather than flags.

use crate::config::{DialConfig, InstallationConfig};
use obscura_protocol::{EnvSummary, ExposureParams, GeoPoint, WorkflowRequest};

/// Session context for a single visitor
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Index into the city carousel
    city_index: u8,
    /// Dialled exposure parameters
    params: ExposureParams,
    /// Live environment data, once fetched by the render host
    env: Option<EnvSummary>,
    /// Artwork identifier reported on workflow completion
    artwork_id: Option<u32>,
}

impl Session {
    /// Create a fresh session with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear everything back to defaults for the next visitor
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Currently highlighted city index
    pub fn city_index(&self) -> u8 {
        self.city_index
    }

    /// Current exposure parameters
    pub fn params(&self) -> ExposureParams {
        self.params
    }

    /// Environment summary, if fetched
    pub fn env(&self) -> Option<&EnvSummary> {
        self.env.as_ref()
    }

    /// Artwork identifier, if the workflow finished
    pub fn artwork_id(&self) -> Option<u32> {
        self.artwork_id
    }

    /// Step the city carousel by signed detents, wrapping at both ends
    pub fn step_city(&mut self, detents: i32, city_count: usize) {
        if city_count == 0 {
            return;
        }
        let count = city_count as i32;
        let next = (i32::from(self.city_index) + detents).rem_euclid(count);
        self.city_index = next as u8;
    }

    /// Adjust viewing distance by signed detents, clamped to the dial range
    pub fn adjust_distance(&mut self, detents: i32, dials: &DialConfig) {
        let step = dials.distance_step_m as i64;
        let current = self.params.distance_m as i64;
        let next = current + i64::from(detents) * step;
        self.params.distance_m =
            next.clamp(i64::from(dials.distance_min_m), i64::from(dials.distance_max_m)) as u32;
    }

    /// Adjust time offset by signed detents, clamped to the dial span
    pub fn adjust_time_offset(&mut self, detents: i32, dials: &DialConfig) {
        let step = i32::from(dials.time_step_years);
        let span = i32::from(dials.time_span_years);
        let next = i32::from(self.params.time_offset_years) + detents * step;
        self.params.time_offset_years = next.clamp(-span, span) as i16;
    }

    /// Record the latest smoothed compass bearing (centidegrees, 0..36000)
    pub fn set_bearing_cd(&mut self, bearing_cd: u16) {
        self.params.bearing_cd = bearing_cd % 36_000;
    }

    /// Record the fetched environment summary
    pub fn set_env(&mut self, env: EnvSummary) {
        self.env = Some(env);
    }

    /// Record the finished artwork identifier
    pub fn set_artwork_id(&mut self, id: u32) {
        self.artwork_id = Some(id);
    }

    /// Origin coordinate of the selected city
    pub fn origin(&self, config: &InstallationConfig) -> GeoPoint {
        config
            .cities
            .get(usize::from(self.city_index))
            .map(|city| city.origin)
            .unwrap_or_default()
    }

    /// Build the workflow request for the render host
    pub fn workflow_request(&self, target: GeoPoint) -> WorkflowRequest {
        WorkflowRequest {
            city_index: self.city_index,
            params: self.params,
            target,
        }
    }
}
