//! Scripted I2C bus for driver tests

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
use heapless::Deque;

/// One expected bus operation
#[derive(Debug)]
pub enum Step {
    /// Expect a write of exactly these bytes
    Write { addr: u8, data: &'static [u8] },
    /// Expect a read; fill the buffer with this response
    Read { addr: u8, response: &'static [u8] },
    /// Fail the next operation with a NACK
    Nack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// Injected failure
    Nack,
    /// The driver did something the script did not expect
    UnexpectedOp,
}

impl embedded_hal::i2c::Error for MockError {
    fn kind(&self) -> ErrorKind {
        match self {
            MockError::Nack => ErrorKind::NoAcknowledge(embedded_hal::i2c::NoAcknowledgeSource::Address),
            MockError::UnexpectedOp => ErrorKind::Other,
        }
    }
}

/// Bus double that replays a fixed script of operations
pub struct MockBus {
    script: Deque<Step, 32>,
}

impl MockBus {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        let mut script = Deque::new();
        for step in steps {
            script.push_back(step).ok();
        }
        Self { script }
    }

    /// Assert the driver consumed the whole script
    pub fn done(&self) {
        assert!(self.script.is_empty(), "unconsumed script steps");
    }
}

impl ErrorType for MockBus {
    type Error = MockError;
}

impl I2c for MockBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            let step = self.script.pop_front().ok_or(MockError::UnexpectedOp)?;
            match (op, step) {
                (Operation::Write(data), Step::Write { addr, data: expected }) => {
                    if address != addr || *data != expected {
                        return Err(MockError::UnexpectedOp);
                    }
                }
                (Operation::Read(buffer), Step::Read { addr, response }) => {
                    if address != addr || buffer.len() != response.len() {
                        return Err(MockError::UnexpectedOp);
                    }
                    buffer.copy_from_slice(response);
                }
                (_, Step::Nack) => return Err(MockError::Nack),
                _ => return Err(MockError::UnexpectedOp),
            }
        }
        Ok(())
    }
}

/// No-op delay for tests
pub struct MockDelay;

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
