//! Obscura No.7 - Exhibition Controller Firmware
//!
//! Control half of the telescope installation: reads the brass city
//! dial, the parameter dial, and the tube compass; runs the exhibition
//! state machine; and drives the render host over a framed UART link.
//! The render host owns the touchscreen and the network-bound workflow
//! steps; this firmware owns everything a visitor touches.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use obscura_core::config::InstallationConfig;

use crate::config::parse_config;

/// Embedded installation configuration (compiled into firmware)
/// Edit installation.toml and rebuild to retune the piece
const EMBEDDED_CONFIG: &str = include_str!("../installation.toml");

mod channels;
mod config;
mod controller;
mod display;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// Static cell for configuration (tasks hold references for the
// program duration)
static INSTALLATION_CONFIG: StaticCell<InstallationConfig> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Obscura firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static InstallationConfig = INSTALLATION_CONFIG.init(load_config());
    info!("Configuration loaded: {} cities", config.cities.len());

    // UART0 to the render host
    let uart_config = UartConfig::default(); // 115200 baud default
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for render host link");

    // I2C0 carries both Seesaw dials at jumpered addresses; I2C1 is
    // the compass alone, which lets its 10 Hz cadence run undisturbed
    let dial_bus = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c::Config::default());
    let compass_bus = I2c::new_blocking(p.I2C1, p.PIN_3, p.PIN_2, i2c::Config::default());

    info!("I2C buses initialized");

    // Spawn tasks
    spawner.spawn(tasks::link_rx_task(rx)).unwrap();
    spawner.spawn(tasks::link_tx_task(tx)).unwrap();
    spawner
        .spawn(tasks::input_task(dial_bus, compass_bus, &config.hardware))
        .unwrap();
    spawner.spawn(tasks::controller_task(config)).unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned
    // tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Parse and validate the embedded installation config
///
/// build.rs already validated the TOML on the host, so a failure here
/// means the firmware image itself is damaged. The built-in city list
/// keeps the piece running rather than bricking the exhibit.
fn load_config() -> InstallationConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using built-in fallback configuration");
            return InstallationConfig::default();
        }
    };

    match config.validate() {
        Ok(()) => {
            info!("Embedded configuration validated");
            config
        }
        Err(e) => {
            error!("Embedded config invalid: {:?}", e);
            error!("Using built-in fallback configuration");
            InstallationConfig::default()
        }
    }
}
