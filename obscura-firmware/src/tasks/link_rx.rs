//! Render host UART receive task
//!
//! Receives frames from the render host, answers heartbeats, and
//! forwards everything else to the controller.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use obscura_protocol::{ControllerMessage, FrameParser, HostCommand};

use crate::channels::{HEARTBEAT_RECEIVED, HOST_CHANNEL, LINK_TX};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Link RX task - receives and parses frames from the render host
#[embassy_executor::task]
pub async fn link_rx_task(mut rx: BufferedUartRx<'static>) {
    info!("Link RX task started");

    let mut parser = FrameParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(frame)) => match HostCommand::from_frame(&frame) {
                            Ok(cmd) => handle_host_command(cmd).await,
                            Err(e) => {
                                warn!("Failed to parse host command: {:?}", e);
                            }
                        },
                        Ok(None) => {
                            // Need more bytes
                        }
                        Err(e) => {
                            warn!("Frame parse error: {:?}", e);
                        }
                    }
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

/// Handle a parsed host command
async fn handle_host_command(cmd: HostCommand) {
    match cmd {
        HostCommand::Ping => {
            trace!("PING received");
            HEARTBEAT_RECEIVED.signal(());
            // Answer directly; the controller only needs to know the
            // link is alive
            if LINK_TX.try_send(ControllerMessage::Pong).is_err() {
                warn!("Link TX queue full, dropping PONG");
            }
        }
        other => {
            if HOST_CHANNEL.try_send(other).is_err() {
                warn!("Host channel full, dropping command");
            }
        }
    }
}
