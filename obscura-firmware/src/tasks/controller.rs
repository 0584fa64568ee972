//! Main controller task
//!
//! Coordinates the state machine, the visitor session, and the
//! workflow sequencer. Receives input events and host commands, and
//! owns the periodic tick that drives timeouts and step budgets;
//! pushes link messages and caption updates back out.

use defmt::*;
use embassy_futures::select::{select3, Either3};
use embassy_time::{Duration, Instant, Ticker};

use obscura_core::config::InstallationConfig;

use crate::channels::{HEARTBEAT_RECEIVED, HOST_CHANNEL, INPUT_CHANNEL, LINK_TX};
use crate::controller::Controller;
use crate::display::Renderer;

/// Tick interval for dwell timeouts, link health, and step budgets
pub const TICK_INTERVAL_MS: u32 = 100;

/// Controller task - main coordination loop
#[embassy_executor::task]
pub async fn controller_task(config: &'static InstallationConfig) {
    info!("Controller task started");

    let mut controller = Controller::new(config);
    let mut renderer = Renderer::new();
    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS as u64));
    let start = Instant::now();

    // The input task has probed the hardware by now; any boot-time
    // fault arrives as the first input event and lands in Error
    controller.boot_complete();
    flush(&mut controller, &mut renderer).await;

    loop {
        match select3(
            INPUT_CHANNEL.receive(),
            HOST_CHANNEL.receive(),
            ticker.next(),
        )
        .await
        {
            Either3::First(input) => {
                debug!("Input: {:?}", input);
                controller.process_input(input);
            }

            Either3::Second(cmd) => {
                debug!("Host command: {:?}", cmd);
                controller.process_host(cmd);
            }

            Either3::Third(()) => {
                // Heartbeats are answered in the RX task; here they
                // only feed the link health monitor
                if HEARTBEAT_RECEIVED.signaled() {
                    HEARTBEAT_RECEIVED.reset();
                    controller.heartbeat_received();
                    trace!("Heartbeat received, link health updated");
                }

                let now_ms = start.elapsed().as_millis() as u32;
                controller.tick(now_ms);
            }
        }

        flush(&mut controller, &mut renderer).await;
    }
}

/// Push queued link messages and, when needed, a fresh caption screen
async fn flush(controller: &mut Controller<'_>, renderer: &mut Renderer) {
    for msg in controller.drain_outbox() {
        LINK_TX.send(msg).await;
    }

    if controller.take_dirty() {
        for msg in renderer.render(controller) {
            LINK_TX.send(msg).await;
        }
    }
}
