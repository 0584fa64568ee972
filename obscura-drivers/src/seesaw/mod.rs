//! Adafruit Seesaw rotary dial driver
//!
//! The telescope dials are Adafruit rotary encoder breakouts: an
//! ATSAMD09/ATtiny co-processor ("Seesaw") that counts quadrature
//! edges in hardware and exposes a register file over I2C. Registers
//! are addressed as (module base, function); a read is a register
//! write followed by a settle delay and the data read. Both dials sit
//! on one bus at jumpered addresses, so the driver borrows the bus per
//! call instead of owning it.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// Status module
const STATUS_BASE: u8 = 0x00;
const STATUS_HW_ID: u8 = 0x01;
const STATUS_SWRST: u8 = 0x7F;

/// GPIO module
const GPIO_BASE: u8 = 0x01;
const GPIO_DIRCLR_BULK: u8 = 0x03;
const GPIO_BULK: u8 = 0x04;
const GPIO_BULK_SET: u8 = 0x05;
const GPIO_PULLENSET: u8 = 0x0B;

/// Encoder module
const ENCODER_BASE: u8 = 0x11;
const ENCODER_POSITION: u8 = 0x30;
const ENCODER_DELTA: u8 = 0x40;

/// Hardware IDs for the chips Adafruit ships on these boards
const HW_ID_SAMD09: u8 = 0x55;
const HW_ID_ATTINY: u8 = 0x87;

/// The push switch on the encoder shaft
const BUTTON_PIN: u8 = 24;

/// Registers need this long to latch before the data read
const SETTLE_DELAY_US: u32 = 250;

/// Co-processor restart time after a software reset
const RESET_DELAY_MS: u32 = 10;

/// Seesaw driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SeesawError<E> {
    /// I2C bus error
    Bus(E),
    /// A device answered, but its hardware ID is not a Seesaw
    WrongChip(u8),
}

impl<E> From<E> for SeesawError<E> {
    fn from(err: E) -> Self {
        SeesawError::Bus(err)
    }
}

/// One Seesaw rotary dial at a fixed address
#[derive(Debug, Clone, Copy)]
pub struct SeesawEncoder {
    addr: u8,
}

impl SeesawEncoder {
    /// Create a handle for the dial at `addr` (0x36..0x3D per jumpers)
    pub fn new(addr: u8) -> Self {
        Self { addr }
    }

    /// I2C address of this dial
    pub fn addr(&self) -> u8 {
        self.addr
    }

    /// Write a register: (base, function, payload)
    fn write_reg<I: I2c>(
        &self,
        bus: &mut I,
        base: u8,
        func: u8,
        payload: &[u8],
    ) -> Result<(), SeesawError<I::Error>> {
        let mut frame = [0u8; 8];
        frame[0] = base;
        frame[1] = func;
        frame[2..2 + payload.len()].copy_from_slice(payload);
        bus.write(self.addr, &frame[..2 + payload.len()])?;
        Ok(())
    }

    /// Read a register: address it, settle, then read `buf.len()` bytes
    fn read_reg<I: I2c, D: DelayNs>(
        &self,
        bus: &mut I,
        delay: &mut D,
        base: u8,
        func: u8,
        buf: &mut [u8],
    ) -> Result<(), SeesawError<I::Error>> {
        bus.write(self.addr, &[base, func])?;
        delay.delay_us(SETTLE_DELAY_US);
        bus.read(self.addr, buf)?;
        Ok(())
    }

    /// Reset the co-processor and verify it is a Seesaw
    ///
    /// Configures the shaft switch pin as a pulled-up input. Call once
    /// at boot before any position reads.
    pub fn init<I: I2c, D: DelayNs>(
        &self,
        bus: &mut I,
        delay: &mut D,
    ) -> Result<(), SeesawError<I::Error>> {
        self.write_reg(bus, STATUS_BASE, STATUS_SWRST, &[0xFF])?;
        delay.delay_ms(RESET_DELAY_MS);

        let mut id = [0u8; 1];
        self.read_reg(bus, delay, STATUS_BASE, STATUS_HW_ID, &mut id)?;
        if id[0] != HW_ID_SAMD09 && id[0] != HW_ID_ATTINY {
            return Err(SeesawError::WrongChip(id[0]));
        }

        let mask = (1u32 << BUTTON_PIN).to_be_bytes();
        self.write_reg(bus, GPIO_BASE, GPIO_DIRCLR_BULK, &mask)?;
        self.write_reg(bus, GPIO_BASE, GPIO_PULLENSET, &mask)?;
        self.write_reg(bus, GPIO_BASE, GPIO_BULK_SET, &mask)?;
        Ok(())
    }

    /// Absolute hardware counter, signed, free-running
    pub fn position<I: I2c, D: DelayNs>(
        &self,
        bus: &mut I,
        delay: &mut D,
    ) -> Result<i32, SeesawError<I::Error>> {
        let mut buf = [0u8; 4];
        self.read_reg(bus, delay, ENCODER_BASE, ENCODER_POSITION, &mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    /// Counts moved since the previous delta read
    pub fn delta<I: I2c, D: DelayNs>(
        &self,
        bus: &mut I,
        delay: &mut D,
    ) -> Result<i32, SeesawError<I::Error>> {
        let mut buf = [0u8; 4];
        self.read_reg(bus, delay, ENCODER_BASE, ENCODER_DELTA, &mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    /// Shaft switch state; true while pressed (pin pulled low)
    pub fn button_pressed<I: I2c, D: DelayNs>(
        &self,
        bus: &mut I,
        delay: &mut D,
    ) -> Result<bool, SeesawError<I::Error>> {
        let mut buf = [0u8; 4];
        self.read_reg(bus, delay, GPIO_BASE, GPIO_BULK, &mut buf)?;
        let levels = u32::from_be_bytes(buf);
        Ok(levels & (1 << BUTTON_PIN) == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBus, MockDelay, MockError, Step};

    const ADDR: u8 = 0x36;

    fn init_script() -> [Step; 6] {
        [
            Step::Write { addr: ADDR, data: &[0x00, 0x7F, 0xFF] },
            Step::Write { addr: ADDR, data: &[0x00, 0x01] },
            Step::Read { addr: ADDR, response: &[0x55] },
            Step::Write { addr: ADDR, data: &[0x01, 0x03, 0x01, 0x00, 0x00, 0x00] },
            Step::Write { addr: ADDR, data: &[0x01, 0x0B, 0x01, 0x00, 0x00, 0x00] },
            Step::Write { addr: ADDR, data: &[0x01, 0x05, 0x01, 0x00, 0x00, 0x00] },
        ]
    }

    #[test]
    fn init_resets_probes_and_configures_button() {
        let mut bus = MockBus::new(init_script());
        let dial = SeesawEncoder::new(ADDR);
        dial.init(&mut bus, &mut MockDelay).unwrap();
        bus.done();
    }

    #[test]
    fn init_accepts_attiny_hardware_id() {
        let mut script = init_script();
        script[2] = Step::Read { addr: ADDR, response: &[0x87] };
        let mut bus = MockBus::new(script);
        SeesawEncoder::new(ADDR).init(&mut bus, &mut MockDelay).unwrap();
    }

    #[test]
    fn init_rejects_foreign_chip() {
        let mut bus = MockBus::new([
            Step::Write { addr: ADDR, data: &[0x00, 0x7F, 0xFF] },
            Step::Write { addr: ADDR, data: &[0x00, 0x01] },
            Step::Read { addr: ADDR, response: &[0x42] },
        ]);
        let result = SeesawEncoder::new(ADDR).init(&mut bus, &mut MockDelay);
        assert_eq!(result, Err(SeesawError::WrongChip(0x42)));
    }

    #[test]
    fn position_is_big_endian_signed() {
        let mut bus = MockBus::new([
            Step::Write { addr: ADDR, data: &[0x11, 0x30] },
            Step::Read { addr: ADDR, response: &[0xFF, 0xFF, 0xFF, 0xFE] },
        ]);
        let pos = SeesawEncoder::new(ADDR)
            .position(&mut bus, &mut MockDelay)
            .unwrap();
        assert_eq!(pos, -2);
        bus.done();
    }

    #[test]
    fn delta_reads_its_own_register() {
        let mut bus = MockBus::new([
            Step::Write { addr: ADDR, data: &[0x11, 0x40] },
            Step::Read { addr: ADDR, response: &[0x00, 0x00, 0x00, 0x03] },
        ]);
        let delta = SeesawEncoder::new(ADDR)
            .delta(&mut bus, &mut MockDelay)
            .unwrap();
        assert_eq!(delta, 3);
    }

    #[test]
    fn button_is_active_low() {
        // Bit 24 low = pressed
        let mut bus = MockBus::new([
            Step::Write { addr: ADDR, data: &[0x01, 0x04] },
            Step::Read { addr: ADDR, response: &[0xFE, 0xFF, 0xFF, 0xFF] },
        ]);
        let pressed = SeesawEncoder::new(ADDR)
            .button_pressed(&mut bus, &mut MockDelay)
            .unwrap();
        assert!(pressed);

        let mut bus = MockBus::new([
            Step::Write { addr: ADDR, data: &[0x01, 0x04] },
            Step::Read { addr: ADDR, response: &[0xFF, 0xFF, 0xFF, 0xFF] },
        ]);
        let pressed = SeesawEncoder::new(ADDR)
            .button_pressed(&mut bus, &mut MockDelay)
            .unwrap();
        assert!(!pressed);
    }

    #[test]
    fn bus_failure_is_surfaced() {
        let mut bus = MockBus::new([Step::Nack]);
        let result = SeesawEncoder::new(ADDR).position(&mut bus, &mut MockDelay);
        assert_eq!(result, Err(SeesawError::Bus(MockError::Nack)));
    }
}
