//! QMC5883L magnetometer driver
//!
//! Three-axis magnetometer in the telescope barrel, used to derive the
//! viewing bearing. Runs in continuous measurement mode; reads are
//! gated on the DRDY flag and a saturated measurement comes back as a
//! typed overflow error rather than a bogus heading.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// Fixed I2C address of the QMC5883L
pub const QMC5883L_ADDR: u8 = 0x0D;

/// Output registers, x/y/z LSB first
const REG_DATA: u8 = 0x00;
const REG_STATUS: u8 = 0x06;
const REG_CTRL1: u8 = 0x09;
const REG_CTRL2: u8 = 0x0A;
const REG_SET_RESET: u8 = 0x0B;

/// Status flags
const STATUS_DRDY: u8 = 0x01;
const STATUS_OVL: u8 = 0x02;

/// Continuous mode, 200 Hz, 8 gauss range, OSR 512
const CTRL1_CONFIG: u8 = 0x1D;

/// Soft reset bit in CTRL2
const CTRL2_SOFT_RST: u8 = 0x80;

/// Recommended SET/RESET period value from the datasheet
const SET_RESET_PERIOD: u8 = 0x01;

/// Restart time after soft reset
const RESET_DELAY_MS: u32 = 5;

/// Compass driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompassError<E> {
    /// I2C bus error
    Bus(E),
    /// Field strength saturated the sensor
    Overflow,
    /// No fresh sample since the last read
    NotReady,
}

impl<E> From<E> for CompassError<E> {
    fn from(err: E) -> Self {
        CompassError::Bus(err)
    }
}

/// One raw field sample, sensor counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawField {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

/// QMC5883L at its fixed address, owning nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct Qmc5883l;

impl Qmc5883l {
    /// Create a driver handle
    pub fn new() -> Self {
        Self
    }

    /// Soft-reset and enter continuous measurement mode
    pub fn init<I: I2c, D: DelayNs>(
        &self,
        bus: &mut I,
        delay: &mut D,
    ) -> Result<(), CompassError<I::Error>> {
        bus.write(QMC5883L_ADDR, &[REG_CTRL2, CTRL2_SOFT_RST])?;
        delay.delay_ms(RESET_DELAY_MS);
        bus.write(QMC5883L_ADDR, &[REG_SET_RESET, SET_RESET_PERIOD])?;
        bus.write(QMC5883L_ADDR, &[REG_CTRL1, CTRL1_CONFIG])?;
        Ok(())
    }

    /// Read one sample if the sensor has a fresh one
    pub fn read_raw<I: I2c>(&self, bus: &mut I) -> Result<RawField, CompassError<I::Error>> {
        let mut status = [0u8; 1];
        bus.write_read(QMC5883L_ADDR, &[REG_STATUS], &mut status)?;

        if status[0] & STATUS_OVL != 0 {
            return Err(CompassError::Overflow);
        }
        if status[0] & STATUS_DRDY == 0 {
            return Err(CompassError::NotReady);
        }

        let mut data = [0u8; 6];
        bus.write_read(QMC5883L_ADDR, &[REG_DATA], &mut data)?;

        Ok(RawField {
            x: i16::from_le_bytes([data[0], data[1]]),
            y: i16::from_le_bytes([data[2], data[3]]),
            z: i16::from_le_bytes([data[4], data[5]]),
        })
    }
}
