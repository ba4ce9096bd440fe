//! Recording bus doubles shared by the unit tests.
//!
//! One [`BusLog`] hands out an SPI device, a D/C pin, a reset pin and a
//! delay that all append to the same event list, so tests can assert the
//! exact byte stream together with the D/C level it was sent under.
use core::convert::Infallible;
use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, ErrorKind, Operation, SpiDevice};

use crate::driver::St7789;
use crate::rotation::Rotation;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Event {
    Write { dc_high: bool, bytes: Vec<u8> },
    Delay(u32),
}

#[derive(Default)]
struct Bus {
    dc_high: bool,
    fail: bool,
    fail_after: Option<usize>,
    events: Vec<Event>,
    reset_levels: Vec<bool>,
}

/// Decoded view of the traffic. Consecutive data writes are merged, so a
/// frame does not depend on how the payload was split into transactions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    Command(u8),
    Data(Vec<u8>),
    Delay(u32),
}

impl Frame {
    pub fn data(bytes: &[u8]) -> Frame {
        Frame::Data(bytes.to_vec())
    }
}

#[derive(Clone, Default)]
pub struct BusLog(Rc<RefCell<Bus>>);

impl BusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spi(&self) -> MockSpi {
        MockSpi(self.clone())
    }

    pub fn dc(&self) -> MockPin {
        MockPin {
            log: self.clone(),
            role: PinRole::DataCommand,
        }
    }

    pub fn rst(&self) -> MockPin {
        MockPin {
            log: self.clone(),
            role: PinRole::Reset,
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.0.borrow_mut().fail = fail;
    }

    /// Let the next `n` transactions through, then fail every one after.
    pub fn fail_after(&self, n: usize) {
        self.0.borrow_mut().fail_after = Some(n);
    }

    pub fn clear(&self) {
        let mut bus = self.0.borrow_mut();
        bus.events.clear();
        bus.reset_levels.clear();
    }

    pub fn dc_high(&self) -> bool {
        self.0.borrow().dc_high
    }

    pub fn reset_levels(&self) -> Vec<bool> {
        self.0.borrow().reset_levels.clone()
    }

    /// Raw SPI writes with the D/C level each was sent under.
    pub fn writes(&self) -> Vec<(bool, Vec<u8>)> {
        self.0
            .borrow()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Write { dc_high, bytes } => Some((*dc_high, bytes.clone())),
                Event::Delay(_) => None,
            })
            .collect()
    }

    pub fn transaction_count(&self) -> usize {
        self.writes().len()
    }

    pub fn data_byte_count(&self) -> usize {
        self.writes()
            .iter()
            .filter(|(dc_high, _)| *dc_high)
            .map(|(_, bytes)| bytes.len())
            .sum()
    }

    pub fn commands(&self) -> Vec<u8> {
        self.frames()
            .into_iter()
            .filter_map(|f| match f {
                Frame::Command(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    pub fn frames(&self) -> Vec<Frame> {
        let mut frames: Vec<Frame> = Vec::new();
        for event in self.0.borrow().events.iter() {
            match event {
                Event::Write {
                    dc_high: false,
                    bytes,
                } => frames.extend(bytes.iter().map(|b| Frame::Command(*b))),
                Event::Write {
                    dc_high: true,
                    bytes,
                } => match frames.last_mut() {
                    Some(Frame::Data(prev)) => prev.extend_from_slice(bytes),
                    _ => frames.push(Frame::Data(bytes.clone())),
                },
                Event::Delay(ms) => frames.push(Frame::Delay(*ms)),
            }
        }
        frames
    }

    /// Pixels written after each memory-write command, as (column, row)
    /// pairs decoded from the address window that preceded it. Only
    /// single-pixel windows are expanded; wider windows yield every cell.
    pub fn pixels(&self) -> Vec<(u16, u16, u16)> {
        let mut out = Vec::new();
        let frames = self.frames();
        let mut cols = (0u16, 0u16);
        let mut rows = (0u16, 0u16);
        let mut i = 0;
        while i < frames.len() {
            match (&frames[i], frames.get(i + 1)) {
                (Frame::Command(0x2A), Some(Frame::Data(d))) if d.len() == 4 => {
                    cols = (be(d[0], d[1]), be(d[2], d[3]));
                    i += 2;
                }
                (Frame::Command(0x2B), Some(Frame::Data(d))) if d.len() == 4 => {
                    rows = (be(d[0], d[1]), be(d[2], d[3]));
                    i += 2;
                }
                (Frame::Command(0x2C), Some(Frame::Data(d))) => {
                    let mut words = d.chunks(2).map(|w| be(w[0], w[1]));
                    'fill: for y in rows.0..=rows.1 {
                        for x in cols.0..=cols.1 {
                            match words.next() {
                                Some(c) => out.push((x, y, c)),
                                None => break 'fill,
                            }
                        }
                    }
                    i += 2;
                }
                _ => i += 1,
            }
        }
        out
    }

    fn push(&self, event: Event) {
        self.0.borrow_mut().events.push(event);
    }
}

fn be(hi: u8, lo: u8) -> u16 {
    u16::from_be_bytes([hi, lo])
}

pub struct MockSpi(BusLog);

impl spi::ErrorType for MockSpi {
    type Error = ErrorKind;
}

impl SpiDevice for MockSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        {
            let mut bus = self.0 .0.borrow_mut();
            match bus.fail_after {
                Some(0) => bus.fail = true,
                Some(n) => bus.fail_after = Some(n - 1),
                None => {}
            }
            if bus.fail {
                return Err(ErrorKind::Other);
            }
        }
        for op in operations.iter() {
            if let Operation::Write(bytes) = op {
                let dc_high = self.0.dc_high();
                self.0.push(Event::Write {
                    dc_high,
                    bytes: bytes.to_vec(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum PinRole {
    DataCommand,
    Reset,
}

pub struct MockPin {
    log: BusLog,
    role: PinRole,
}

impl MockPin {
    fn set(&mut self, high: bool) {
        let mut bus = self.log.0.borrow_mut();
        match self.role {
            PinRole::DataCommand => bus.dc_high = high,
            PinRole::Reset => bus.reset_levels.push(high),
        }
    }
}

impl digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}

/// Display initialized against `log`, with the init traffic cleared.
pub fn ready_display(
    log: &BusLog,
    height: u16,
    width: u16,
    rotation: Rotation,
) -> St7789<'static, MockSpi, MockPin, MockPin> {
    let mut display = St7789::new(log.spi(), log.dc(), None);
    display
        .init(height, width, rotation, &mut MockDelay::new(log))
        .unwrap();
    log.clear();
    display
}

pub struct MockDelay(BusLog);

impl MockDelay {
    pub fn new(log: &BusLog) -> Self {
        MockDelay(log.clone())
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.0.push(Event::Delay(ms));
    }
}
