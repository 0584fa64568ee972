//! Render host UART transmit task
//!
//! Drains the outbound message queue, frames each message, and writes
//! it to the link.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use obscura_protocol::MAX_FRAME_LEN;

use crate::channels::LINK_TX;

/// Link TX task - sends frames to the render host
#[embassy_executor::task]
pub async fn link_tx_task(mut tx: BufferedUartTx<'static>) {
    info!("Link TX task started");

    let mut buf = [0u8; MAX_FRAME_LEN];

    loop {
        let msg = LINK_TX.receive().await;

        let frame = match msg.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                // Payload too large for the wire format; nothing the
                // link can do about it
                warn!("Failed to encode message: {:?}", e);
                continue;
            }
        };

        match frame.encode(&mut buf) {
            Ok(len) => {
                if let Err(e) = tx.write_all(&buf[..len]).await {
                    warn!("UART write error: {:?}", e);
                }
            }
            Err(e) => {
                warn!("Frame encode error: {:?}", e);
            }
        }
    }
}
