//! Telescope input poll task
//!
//! Polls the two Seesaw dial encoders and the QMC5883L compass over
//! their I2C buses and turns raw readings into conditioned input
//! events for the controller: whole detents, debounced press edges,
//! and a smoothed bearing. A device that stops answering is latched
//! out and reported once as a sensor fault.

use defmt::*;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::{I2C0, I2C1};
use embassy_time::{Delay, Duration, Ticker};

use obscura_core::config::HardwareConfig;
use obscura_core::input::{heading_centideg, DialTracker, HeadingFilter};
use obscura_core::state::ErrorKind;
use obscura_drivers::{CompassError, Qmc5883l, SeesawEncoder};

use crate::channels::{InputEvent, INPUT_CHANNEL};

/// Poll interval in milliseconds
const POLL_INTERVAL_MS: u64 = 20;

/// Consecutive bus failures before a device is declared dead
const FAULT_THRESHOLD: u8 = 5;

/// Minimum bearing change worth reporting, in centidegrees
const HEADING_REPORT_DELTA_CD: u16 = 50;

/// Consecutive-failure counter that latches a device out after
/// FAULT_THRESHOLD misses in a row
struct FaultLatch {
    failures: u8,
    latched: bool,
}

impl FaultLatch {
    const fn new() -> Self {
        Self {
            failures: 0,
            latched: false,
        }
    }

    fn ok(&mut self) {
        self.failures = 0;
    }

    /// Latch without counting; used when the boot probe fails outright
    fn trip(&mut self) {
        self.latched = true;
    }

    /// Returns true exactly once, when the latch trips
    fn fail(&mut self) -> bool {
        if self.latched {
            return false;
        }
        self.failures = self.failures.saturating_add(1);
        if self.failures >= FAULT_THRESHOLD {
            self.latched = true;
            return true;
        }
        false
    }

    fn alive(&self) -> bool {
        !self.latched
    }
}

/// Two-sample debounce for the dial shaft switches
///
/// The first sample seeds the baseline, so a switch already held at
/// power-on does not fire a phantom press.
struct Debounce {
    stable: Option<bool>,
    count: u8,
}

impl Debounce {
    const fn new() -> Self {
        Self {
            stable: None,
            count: 0,
        }
    }

    /// Returns true on a debounced release-to-press edge
    fn pressed_edge(&mut self, sample: bool) -> bool {
        let Some(stable) = self.stable else {
            self.stable = Some(sample);
            return false;
        };
        if sample == stable {
            self.count = 0;
            return false;
        }
        self.count += 1;
        if self.count >= 2 {
            self.stable = Some(sample);
            self.count = 0;
            return sample;
        }
        false
    }
}

/// Input task - polls dials and compass, emits conditioned events
#[embassy_executor::task]
pub async fn input_task(
    mut dial_bus: I2c<'static, I2C0, Blocking>,
    mut compass_bus: I2c<'static, I2C1, Blocking>,
    hardware: &'static HardwareConfig,
) {
    info!("Input task started");

    let mut delay = Delay;

    let city_dial = SeesawEncoder::new(hardware.city_dial_addr);
    let param_dial = SeesawEncoder::new(hardware.param_dial_addr);
    let compass = Qmc5883l::new();

    let mut city_fault = FaultLatch::new();
    let mut param_fault = FaultLatch::new();
    let mut compass_fault = FaultLatch::new();

    // A dial that fails its boot probe faults the installation
    // immediately; there is no exhibit without the dials
    if let Err(e) = city_dial.init(&mut dial_bus, &mut delay) {
        warn!("City dial init failed: {:?}", e);
        city_fault.trip();
        send(InputEvent::SensorFault(ErrorKind::EncoderFault));
    }
    if let Err(e) = param_dial.init(&mut dial_bus, &mut delay) {
        warn!("Param dial init failed: {:?}", e);
        param_fault.trip();
        send(InputEvent::SensorFault(ErrorKind::EncoderFault));
    }
    if let Err(e) = compass.init(&mut compass_bus, &mut delay) {
        warn!("Compass init failed: {:?}", e);
        compass_fault.trip();
        send(InputEvent::SensorFault(ErrorKind::CompassFault));
    }

    let city_start = if city_fault.alive() {
        city_dial.position(&mut dial_bus, &mut delay).unwrap_or(0)
    } else {
        0
    };
    let param_start = if param_fault.alive() {
        param_dial.position(&mut dial_bus, &mut delay).unwrap_or(0)
    } else {
        0
    };

    let mut city_tracker = DialTracker::new(city_start, hardware.counts_per_detent);
    let mut param_tracker = DialTracker::new(param_start, hardware.counts_per_detent);
    let mut city_button = Debounce::new();
    let mut param_button = Debounce::new();
    let mut heading_filter = HeadingFilter::new();
    let mut last_sent_heading: Option<u16> = None;

    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));

    loop {
        ticker.next().await;

        if city_fault.alive() {
            poll_dial(
                &city_dial,
                &mut dial_bus,
                &mut delay,
                &mut city_tracker,
                &mut city_button,
                &mut city_fault,
                |detents| InputEvent::CityDial { detents },
                InputEvent::CityPress,
            );
        }

        if param_fault.alive() {
            poll_dial(
                &param_dial,
                &mut dial_bus,
                &mut delay,
                &mut param_tracker,
                &mut param_button,
                &mut param_fault,
                |detents| InputEvent::ParamDial { detents },
                InputEvent::ParamPress,
            );
        }

        if compass_fault.alive() {
            poll_compass(
                &compass,
                &mut compass_bus,
                hardware,
                &mut heading_filter,
                &mut last_sent_heading,
                &mut compass_fault,
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn poll_dial<I, D>(
    dial: &SeesawEncoder,
    bus: &mut I,
    delay: &mut D,
    tracker: &mut DialTracker,
    button: &mut Debounce,
    fault: &mut FaultLatch,
    turn_event: impl Fn(i32) -> InputEvent,
    press_event: InputEvent,
) where
    I: embedded_hal::i2c::I2c,
    D: embedded_hal::delay::DelayNs,
{
    match dial.position(bus, delay) {
        Ok(count) => {
            fault.ok();
            let detents = tracker.update(count);
            if detents != 0 {
                send(turn_event(detents));
            }
        }
        Err(_) => {
            if fault.fail() {
                warn!("Dial 0x{:02x} stopped answering", dial.addr());
                send(InputEvent::SensorFault(ErrorKind::EncoderFault));
            }
            return;
        }
    }

    match dial.button_pressed(bus, delay) {
        Ok(pressed) => {
            fault.ok();
            if button.pressed_edge(pressed) {
                send(press_event);
            }
        }
        Err(_) => {
            if fault.fail() {
                warn!("Dial 0x{:02x} stopped answering", dial.addr());
                send(InputEvent::SensorFault(ErrorKind::EncoderFault));
            }
        }
    }
}

fn poll_compass<I>(
    compass: &Qmc5883l,
    bus: &mut I,
    hardware: &HardwareConfig,
    filter: &mut HeadingFilter,
    last_sent: &mut Option<u16>,
    fault: &mut FaultLatch,
) where
    I: embedded_hal::i2c::I2c,
{
    match compass.read_raw(bus) {
        Ok(raw) => {
            fault.ok();
            let x = i32::from(raw.x) - i32::from(hardware.compass_offset_x);
            let y = i32::from(raw.y) - i32::from(hardware.compass_offset_y);
            let heading = filter.update(heading_centideg(x, y));

            if heading_moved(*last_sent, heading) {
                *last_sent = Some(heading);
                send(InputEvent::Heading { centideg: heading });
            }
        }
        // A not-ready status just means we out-polled the 10 Hz output
        // rate; try again next time
        Err(CompassError::NotReady) => {}
        Err(_) => {
            if fault.fail() {
                warn!("Compass stopped answering");
                send(InputEvent::SensorFault(ErrorKind::CompassFault));
            }
        }
    }
}

/// True when the heading has moved far enough from the last report,
/// measured the short way round the circle
fn heading_moved(last: Option<u16>, heading: u16) -> bool {
    match last {
        None => true,
        Some(prev) => {
            let diff = (i32::from(heading) - i32::from(prev)).rem_euclid(36_000);
            let dist = diff.min(36_000 - diff);
            dist >= i32::from(HEADING_REPORT_DELTA_CD)
        }
    }
}

fn send(event: InputEvent) {
    if INPUT_CHANNEL.try_send(event).is_err() {
        warn!("Input channel full, dropping event");
    }
}
