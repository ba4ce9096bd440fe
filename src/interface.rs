//! SPI transport with a command/data select line
//!
//! The ST7789 tells opcodes and parameters apart only by the level of the
//! D/C line while the byte is clocked in, so every write here sets the
//! line first and then hands the bytes to the [`SpiDevice`].
use display_interface::DisplayError;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

use log::{debug, trace, warn};

/// State of the bus-exclusive bracket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusState {
    /// No addressing-window sequence in flight
    Idle,
    /// An addressing window plus pixel stream is being written
    Acquired,
}

/// Hardware interface: SPI device, D/C line and an optional reset line.
pub struct SpiDisplayInterface<SPI, DC, RST> {
    spi: SPI,
    dc: DC,
    rst: Option<RST>,
    state: BusState,
}

impl<SPI, DC, RST> SpiDisplayInterface<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Wrap the bus device and control lines.
    pub fn new(spi: SPI, dc: DC, rst: Option<RST>) -> Self {
        SpiDisplayInterface {
            spi,
            dc,
            rst,
            state: BusState::Idle,
        }
    }

    /// Pulse the reset line if one is wired. Without one this is a no-op and
    /// the software reset in the init sequence does the job.
    pub fn hard_reset(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        if let Some(rst) = self.rst.as_mut() {
            debug!("hard reset");
            rst.set_high().map_err(|_| DisplayError::RSError)?;
            delay.delay_ms(10);
            rst.set_low().map_err(|_| DisplayError::RSError)?;
            delay.delay_ms(10);
            rst.set_high().map_err(|_| DisplayError::RSError)?;
            delay.delay_ms(120);
        }
        Ok(())
    }

    /// Send a bare opcode with D/C low.
    pub fn cmd(&mut self, command: u8) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;
        self.write(&[command])
    }

    /// Send an opcode followed by its parameters.
    ///
    /// D/C goes high right after the opcode even when there are no
    /// parameters, leaving the line in data mode for a following pixel stream.
    pub fn cmd_with_data(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.cmd(command)?;
        self.data(data)
    }

    /// Send an already framed payload with D/C held high.
    pub fn data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        if data.is_empty() {
            return Ok(());
        }
        self.write(data)
    }

    /// Send the same two-byte word `repeat` times, one transaction each.
    pub fn data_x_times(&mut self, word: [u8; 2], repeat: u32) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        for _ in 0..repeat {
            self.write(&word)?;
        }
        Ok(())
    }

    /// Enter the bus-exclusive bracket. Nesting is a caller bug and is
    /// reported as a chip-select error without touching the bus.
    pub fn acquire(&mut self) -> Result<(), DisplayError> {
        if self.state == BusState::Acquired {
            warn!("bus already acquired, rejecting nested bracket");
            return Err(DisplayError::CSError);
        }
        trace!("bus acquired");
        self.state = BusState::Acquired;
        Ok(())
    }

    /// Leave the bus-exclusive bracket.
    pub fn release(&mut self) {
        trace!("bus released");
        self.state = BusState::Idle;
    }

    /// Current bracket state
    pub fn state(&self) -> BusState {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.spi
            .write(bytes)
            .map_err(|_| DisplayError::BusWriteError)
    }
}
