//! Per-state caption screens
//!
//! The render host draws the artwork and the touch layout; the
//! controller owns the words. Each render produces a ClearCaptions
//! followed by up to six rows of overlay text for the current state.

use core::fmt::Write;

use heapless::{String, Vec};

use obscura_core::input::compass::WindRose;
use obscura_core::state::{ErrorKind, State};
use obscura_protocol::{ControllerMessage, ExposureParams, CAPTION_COLS, CAPTION_ROWS};

use crate::controller::Controller;

/// One rendered caption screen
pub type CaptionSet = Vec<ControllerMessage, { CAPTION_ROWS as usize + 1 }>;

/// Builds caption screens from controller state
pub struct Renderer {
    /// Hysteresis-banded wind name for the bearing row
    rose: WindRose,
}

impl Renderer {
    /// Create a new renderer
    pub fn new() -> Self {
        Self {
            rose: WindRose::new(),
        }
    }

    /// Render the captions for the controller's current state
    pub fn render(&mut self, controller: &Controller<'_>) -> CaptionSet {
        let mut out = CaptionSet::new();
        let _ = out.push(ControllerMessage::ClearCaptions);

        match controller.state() {
            State::Boot => {
                push_row(&mut out, 0, "OBSCURA No.7");
                push_row(&mut out, 2, "warming the lens...");
            }
            State::CitySelection => {
                push_row(&mut out, 0, "choose a city");
                let mut row = String::new();
                let _ = write!(row, "> {}", self.city_name(controller));
                push_string(&mut out, 2, row);
                push_row(&mut out, 5, "press the brass dial to look");
            }
            State::ParameterInput => {
                let params = controller.session().params();
                push_string(&mut out, 0, self.city_row(controller));
                push_string(&mut out, 1, distance_row(&params));
                push_string(&mut out, 2, time_row(&params));
                push_string(&mut out, 3, self.bearing_row(&params));
                push_row(&mut out, 5, "press the small dial to expose");
            }
            State::FetchConfirm => {
                push_row(&mut out, 0, "fetch the living weather?");
                push_string(&mut out, 1, self.city_row(controller));
                push_row(&mut out, 4, "touch YES to expose the plate");
                push_row(&mut out, 5, "touch NO to keep dialling");
            }
            State::Processing => {
                if let Some(step) = controller.pipeline().current_step() {
                    let mut row = String::new();
                    let _ = write!(row, "{}...", step.label());
                    push_string(&mut out, 1, row);
                }
                push_string(&mut out, 3, progress_row(controller.pipeline().percent()));
                if let Some(env) = controller.session().env() {
                    let mut row = String::new();
                    let _ = write!(
                        row,
                        "{}.{} C  {}%",
                        env.temperature_c_x10 / 10,
                        (env.temperature_c_x10 % 10).abs(),
                        env.humidity_pct
                    );
                    push_string(&mut out, 5, row);
                }
            }
            State::ResultDisplay => {
                if let Some(id) = controller.session().artwork_id() {
                    let mut row = String::new();
                    let _ = write!(row, "plate no. {id}");
                    push_string(&mut out, 0, row);
                }
                push_row(&mut out, 5, "touch the image to release it");
            }
            State::WaitingInteraction => {
                push_row(&mut out, 5, "turn either dial to begin again");
            }
            State::Resetting => {
                push_row(&mut out, 2, "clearing the plate...");
            }
            State::Error(kind) => {
                push_row(&mut out, 0, "the telescope needs a moment");
                push_row(&mut out, 2, error_text(kind));
                push_row(&mut out, 5, "it will recover on its own");
            }
        }

        out
    }

    fn city_name<'a>(&self, controller: &'a Controller<'_>) -> &'a str {
        let index = usize::from(controller.session().city_index());
        controller
            .config()
            .cities
            .get(index)
            .map(|city| city.name.as_str())
            .unwrap_or("?")
    }

    fn city_row(&self, controller: &Controller<'_>) -> String<CAPTION_COLS> {
        let mut row = String::new();
        let _ = row.push_str(self.city_name(controller));
        row
    }

    fn bearing_row(&mut self, params: &ExposureParams) -> String<CAPTION_COLS> {
        let sector = self.rose.update(params.bearing_cd);
        let name = obscura_core::input::WIND_NAMES[sector];
        let mut row = String::new();
        let _ = write!(row, "bearing   {} ({} deg)", name, params.bearing_cd / 100);
        row
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn distance_row(params: &ExposureParams) -> String<CAPTION_COLS> {
    let mut row = String::new();
    let km = params.distance_m / 1000;
    let tenths = (params.distance_m % 1000) / 100;
    let _ = write!(row, "distance  {km}.{tenths} km");
    row
}

fn time_row(params: &ExposureParams) -> String<CAPTION_COLS> {
    let mut row = String::new();
    let years = params.time_offset_years;
    if years == 0 {
        let _ = row.push_str("time      now");
    } else if years > 0 {
        let _ = write!(row, "time      {years} years hence");
    } else {
        let _ = write!(row, "time      {} years ago", -i32::from(years));
    }
    row
}

/// Text progress bar, 20 cells wide
fn progress_row(percent: u8) -> String<CAPTION_COLS> {
    let filled = usize::from(percent.min(100)) / 5;
    let mut row = String::new();
    let _ = row.push('[');
    for i in 0..20 {
        let _ = row.push(if i < filled { '#' } else { ' ' });
    }
    let _ = row.push(']');
    row
}

fn error_text(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::EncoderFault => "a dial is not answering",
        ErrorKind::CompassFault => "the compass is not answering",
        ErrorKind::WorkflowFailed => "the exposure did not take",
        ErrorKind::LinkLost => "the screen link went quiet",
        ErrorKind::ConfigError => "the city book is unreadable",
        ErrorKind::Unknown => "something unexpected happened",
    }
}

fn push_row(out: &mut CaptionSet, row: u8, text: &str) {
    let mut s: String<CAPTION_COLS> = String::new();
    let _ = s.push_str(text);
    push_string(out, row, s);
}

fn push_string(out: &mut CaptionSet, row: u8, text: String<CAPTION_COLS>) {
    let _ = out.push(ControllerMessage::Caption { row, text });
}
