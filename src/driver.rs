//! Driver for interacting with the ST7789 display controller
pub use display_interface::DisplayError;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Mode, SpiDevice, MODE_0};

use crate::cmd::Cmd;
use crate::color::{self, Rgb565};
use crate::flag::Flag;
use crate::interface::{BusState, SpiDisplayInterface};
use crate::rotation::Rotation;

use log::{debug, trace, warn};

/// SPI mode the controller expects
pub const SPI_MODE: Mode = MODE_0;

/// Bus clock the default sequence was validated with
pub const DEFAULT_BUS_SPEED_HZ: u32 = 1_000_000;

/// Positive voltage gamma curve
#[rustfmt::skip]
pub const POSITIVE_GAMMA: [u8; 14] = [
    0xD0, 0x04, 0x0D, 0x11, 0x13, 0x2B, 0x3F, 0x54, 0x4C, 0x18, 0x0D, 0x0B, 0x1F, 0x23,
];

/// Negative voltage gamma curve
#[rustfmt::skip]
pub const NEGATIVE_GAMMA: [u8; 14] = [
    0xD0, 0x04, 0x0C, 0x11, 0x13, 0x2C, 0x3F, 0x44, 0x51, 0x2F, 0x1F, 0x1F, 0x20, 0x23,
];

/// Default init sequence if none is provided. Order and delays are part of
/// the controller's power-up contract.
pub const DEFAULT_INIT_SEQUENCE: &[InitStep] = &[
    // harmless memory write before reset
    InitStep::Cmd(Cmd::MEMORY_WRITE),
    InitStep::DelayMs(10),
    InitStep::Cmd(Cmd::SW_RESET),
    InitStep::DelayMs(20),
    InitStep::Cmd(Cmd::SLEEP_OUT),
    InitStep::DelayMs(120),
    InitStep::Cmd(Cmd::DISPLAY_ON),
    InitStep::DelayMs(10),
    InitStep::Cmd(Cmd::NORMAL_ON),
    InitStep::DelayMs(10),
    InitStep::CmdData(Cmd::RAM_CTRL, &[0x00, 0xF0]),
    InitStep::Rotation,
    InitStep::CmdData(Cmd::COLOR_MODE, &[Flag::COLOR_MODE_16BIT]),
    InitStep::CmdData(Cmd::FRAME_RATE_CTRL2, &[Flag::FRAME_RATE_60HZ]),
    InitStep::CmdData(Cmd::PORCH_CTRL, &[0x0C, 0x0C, 0x00, 0x33, 0x33]),
    // internal voltage generator
    InitStep::CmdData(Cmd::GATE_CTRL, &[0x35]),
    InitStep::CmdData(Cmd::VCOM_SET, &[0x1F]),
    InitStep::CmdData(Cmd::LCM_CTRL, &[0x2C]),
    InitStep::CmdData(Cmd::VDV_VRH_ENABLE, &[0x01, 0xC3]),
    InitStep::CmdData(Cmd::VDV_SET, &[0x20]),
    InitStep::CmdData(Cmd::POWER_CTRL1, &[0xA4, 0xA1]),
    InitStep::CmdData(Cmd::POSITIVE_GAMMA, &POSITIVE_GAMMA),
    InitStep::CmdData(Cmd::NEGATIVE_GAMMA, &NEGATIVE_GAMMA),
    InitStep::Cmd(Cmd::INVERSION_ON),
    InitStep::CmdData(Cmd::TEARING_ON, &[Flag::TEARING_MODE_VBLANK]),
    InitStep::Cmd(Cmd::DISPLAY_ON),
    InitStep::DelayMs(100),
    InitStep::ClearScreen,
];

/// Pixels staged per transaction by [`St7789::write_pixel_iter`] when no
/// scratch buffer is set
pub const STACK_STAGING_PIXELS: usize = 32;

/// Inclusive far edge of a run of `extent` pixels starting at `start`, or
/// `None` if it does not fit in `i32`.
pub(crate) fn far_edge(start: i32, extent: u16) -> Option<i32> {
    start.checked_add(i32::from(extent) - 1)
}

/// Steps that an init sequence can contain.
/// Keep variants minimal so sequences stay plain static arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitStep {
    /// Send a bare command byte
    Cmd(u8),
    /// Send a command with a static data slice
    CmdData(u8, &'static [u8]),
    /// Wait before the next step
    DelayMs(u8),
    /// Write the memory access control register for the session rotation
    Rotation,
    /// Fill the whole frame with [`color::BACKGROUND`]
    ClearScreen,
}

/// What a drawing call did with the pixels it was asked to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Every requested pixel was written
    Drawn,
    /// Some pixels were written, the rest fell outside the screen or the
    /// request was clamped
    Clipped,
    /// Nothing was written and no bus traffic was issued
    OutOfRange,
}

impl Outcome {
    /// True if at least one pixel reached the controller
    pub fn wrote_pixels(self) -> bool {
        !matches!(self, Outcome::OutOfRange)
    }
}

/// Folds the outcomes of the pieces of a composite shape.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Tally {
    drawn: u32,
    dropped: u32,
}

impl Tally {
    pub(crate) fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Drawn => self.drawn += 1,
            Outcome::OutOfRange => self.dropped += 1,
            Outcome::Clipped => {
                self.drawn += 1;
                self.dropped += 1;
            }
        }
    }

    pub(crate) fn outcome(&self) -> Outcome {
        if self.dropped == 0 {
            Outcome::Drawn
        } else if self.drawn == 0 {
            Outcome::OutOfRange
        } else {
            Outcome::Clipped
        }
    }
}

/// Controller lifecycle as seen by the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    /// Constructed, init sequence not run yet
    Reset,
    /// Initialized and idle
    Ready,
    /// Inside a bus-exclusive addressing-window sequence
    Drawing,
}

/// A configured display with a hardware interface.
///
/// `'buf` is the lifetime of the optional scratch buffer used for bulk fills.
pub struct St7789<'buf, SPI, DC, RST> {
    interface: SpiDisplayInterface<SPI, DC, RST>,
    width: u16,
    height: u16,
    rotation: Rotation,
    state: ControllerState,
    init_sequence: &'static [InitStep],
    scratch: Option<&'buf mut [u8]>,
}

impl<SPI, DC, RST> St7789<'static, SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Create the display driver from a concrete SPI device and pins.
    pub fn new(spi: SPI, dc: DC, rst: Option<RST>) -> Self {
        Self::with_init_sequence(spi, dc, rst, DEFAULT_INIT_SEQUENCE)
    }

    /// Create with a custom init sequence.
    pub fn with_init_sequence(
        spi: SPI,
        dc: DC,
        rst: Option<RST>,
        init_sequence: &'static [InitStep],
    ) -> Self {
        debug!("creating new St7789 instance");
        St7789 {
            interface: SpiDisplayInterface::new(spi, dc, rst),
            width: 0,
            height: 0,
            rotation: Rotation::default(),
            state: ControllerState::Reset,
            init_sequence,
            scratch: None,
        }
    }
}

impl<'buf, SPI, DC, RST> St7789<'buf, SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Switch to bulk transfers staged in `buffer`.
    ///
    /// Fills then go out in buffer-sized transactions, a single one when the
    /// buffer holds `width * height * 2` bytes. The buffer must be non-empty
    /// and hold whole pixels.
    pub fn with_scratch_buffer<'b>(
        self,
        buffer: &'b mut [u8],
    ) -> Result<St7789<'b, SPI, DC, RST>, DisplayError> {
        if buffer.is_empty() || buffer.len() % 2 != 0 {
            warn!("unusable scratch buffer of {} bytes", buffer.len());
            return Err(DisplayError::OutOfBoundsError);
        }
        debug!("using {} byte scratch buffer", buffer.len());
        Ok(St7789 {
            interface: self.interface,
            width: self.width,
            height: self.height,
            rotation: self.rotation,
            state: self.state,
            init_sequence: self.init_sequence,
            scratch: Some(buffer),
        })
    }

    /// Run the init sequence and clear the screen.
    ///
    /// `height` and `width` describe the panel as mounted; they are swapped
    /// when `rotation` exchanges rows and columns.
    pub fn init(
        &mut self,
        height: u16,
        width: u16,
        rotation: Rotation,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        if height == 0 || width == 0 {
            return Err(DisplayError::OutOfBoundsError);
        }
        let (width, height) = rotation.dimensions(height, width);
        debug!("initializing st7789 {}x{} {:?}", width, height, rotation);
        self.width = width;
        self.height = height;
        self.rotation = rotation;

        self.interface.hard_reset(delay)?;
        for step in self.init_sequence {
            debug!("init step: {:?}", step);
            self.run_step(*step, delay)?;
        }
        debug!("init sequence complete");
        self.state = ControllerState::Ready;
        Ok(())
    }

    fn run_step(&mut self, step: InitStep, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        match step {
            InitStep::Cmd(c) => self.with_bus(|d| d.interface.cmd_with_data(c, &[])),
            InitStep::CmdData(c, data) => self.with_bus(|d| d.interface.cmd_with_data(c, data)),
            InitStep::DelayMs(ms) => {
                delay.delay_ms(u32::from(ms));
                Ok(())
            }
            InitStep::Rotation => self.with_bus(|d| d.write_rotation()),
            InitStep::ClearScreen => self.fill_screen(color::BACKGROUND).map(|_| ()),
        }
    }

    /// Pulse the reset line, if one was supplied.
    pub fn hard_reset(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        self.interface.hard_reset(delay)
    }

    /// Logical width after rotation, 0 before `init`
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Logical height after rotation, 0 before `init`
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Current orientation
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Lifecycle state
    pub fn state(&self) -> ControllerState {
        match self.interface.state() {
            BusState::Acquired => ControllerState::Drawing,
            BusState::Idle => self.state,
        }
    }

    /// Re-orient the panel after `init`.
    ///
    /// Only the register is rewritten: width and height keep the values
    /// derived at `init`, even when the new orientation transposes.
    pub fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError> {
        debug!("set rotation {:?}", rotation);
        if rotation.is_transposed() != self.rotation.is_transposed() {
            warn!(
                "rotation {:?} transposes differently, dimensions stay {}x{}",
                rotation, self.width, self.height
            );
        }
        self.rotation = rotation;
        self.with_bus(|d| d.write_rotation())
    }

    fn write_rotation(&mut self) -> Result<(), DisplayError> {
        self.interface
            .cmd_with_data(Cmd::MEMORY_ACCESS_CTRL, &[self.rotation.madctl()])
    }

    /// Run `f` inside the bus-exclusive bracket.
    ///
    /// The bracket is released even when `f` fails. Calling `with_bus` from
    /// inside `f` fails with [`DisplayError::CSError`].
    pub fn with_bus<F>(&mut self, f: F) -> Result<(), DisplayError>
    where
        F: FnOnce(&mut Self) -> Result<(), DisplayError>,
    {
        self.interface.acquire()?;
        let result = f(self);
        self.interface.release();
        result
    }

    /// Point the controller's write cursor at the inclusive window
    /// `(x0, y0)..=(x1, y1)` and start a memory write.
    ///
    /// No range checking happens here; the drawing calls validate first.
    pub fn set_address_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<(), DisplayError> {
        trace!("set_address_window: x {}-{}, y {}-{}", x0, x1, y0, y1);
        let [x0_hi, x0_lo] = x0.to_be_bytes();
        let [x1_hi, x1_lo] = x1.to_be_bytes();
        self.interface
            .cmd_with_data(Cmd::COLUMN_ADDRESS_SET, &[x0_hi, x0_lo, x1_hi, x1_lo])?;

        let [y0_hi, y0_lo] = y0.to_be_bytes();
        let [y1_hi, y1_lo] = y1.to_be_bytes();
        self.interface
            .cmd_with_data(Cmd::ROW_ADDRESS_SET, &[y0_hi, y0_lo, y1_hi, y1_lo])?;

        self.interface.cmd_with_data(Cmd::MEMORY_WRITE, &[])
    }

    /// Stream colors into the current window.
    pub fn write_pixels(&mut self, colors: &[Rgb565]) -> Result<(), DisplayError> {
        match self.scratch.as_deref_mut() {
            Some(buf) => {
                for chunk in colors.chunks(buf.len() / 2) {
                    let staged = &mut buf[..chunk.len() * 2];
                    for (dst, c) in staged.chunks_exact_mut(2).zip(chunk) {
                        dst.copy_from_slice(&color::to_bytes(*c));
                    }
                    self.interface.data(staged)?;
                }
                Ok(())
            }
            None => {
                for c in colors {
                    self.interface.data(&color::to_bytes(*c))?;
                }
                Ok(())
            }
        }
    }

    /// Stream colors from an iterator into the current window.
    ///
    /// Colors are staged into the scratch buffer when one is set, otherwise
    /// into a small stack buffer, and sent one staging buffer at a time.
    pub fn write_pixel_iter<I>(&mut self, colors: I) -> Result<(), DisplayError>
    where
        I: IntoIterator<Item = Rgb565>,
    {
        let mut colors = colors.into_iter();
        let mut stack = [0u8; STACK_STAGING_PIXELS * 2];
        let staging = match self.scratch.as_deref_mut() {
            Some(buf) => buf,
            None => &mut stack[..],
        };
        loop {
            let mut n = 0;
            for (dst, c) in staging.chunks_exact_mut(2).zip(&mut colors) {
                dst.copy_from_slice(&color::to_bytes(c));
                n += 2;
            }
            if n > 0 {
                self.interface.data(&staging[..n])?;
            }
            if n < staging.len() {
                return Ok(());
            }
        }
    }

    /// Stream one color `count` times into the current window.
    pub fn write_pixel_repeated(&mut self, color: Rgb565, count: u32) -> Result<(), DisplayError> {
        let word = color::to_bytes(color);
        match self.scratch.as_deref_mut() {
            Some(buf) => {
                let total = count as usize * 2;
                let staged_len = buf.len().min(total);
                let staged = &mut buf[..staged_len];
                for dst in staged.chunks_exact_mut(2) {
                    dst.copy_from_slice(&word);
                }
                let mut remaining = total;
                while remaining > 0 {
                    let n = remaining.min(staged_len);
                    self.interface.data(&staged[..n])?;
                    remaining -= n;
                }
                Ok(())
            }
            None => self.interface.data_x_times(word, count),
        }
    }

    /// True when `(x, y)` lies on the screen
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < i32::from(self.width) && y < i32::from(self.height)
    }

    /// Set a single pixel.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb565) -> Result<Outcome, DisplayError> {
        if !self.contains(x, y) {
            return Ok(Outcome::OutOfRange);
        }
        let (x, y) = (x as u16, y as u16);
        self.with_bus(|d| {
            d.set_address_window(x, y, x, y)?;
            d.write_pixels(&[color])
        })?;
        Ok(Outcome::Drawn)
    }

    /// Fill the inclusive rectangle `(x_start, y_start)..=(x_end, y_end)`.
    pub fn fill_rect(
        &mut self,
        x_start: i32,
        y_start: i32,
        x_end: i32,
        y_end: i32,
        color: Rgb565,
    ) -> Result<Outcome, DisplayError> {
        if !self.contains(x_start, y_start)
            || !self.contains(x_end, y_end)
            || x_start > x_end
            || y_start > y_end
        {
            return Ok(Outcome::OutOfRange);
        }
        let count = (x_end - x_start + 1) as u32 * (y_end - y_start + 1) as u32;
        self.with_bus(|d| {
            d.set_address_window(x_start as u16, y_start as u16, x_end as u16, y_end as u16)?;
            d.write_pixel_repeated(color, count)
        })?;
        Ok(Outcome::Drawn)
    }

    /// Fill the whole frame.
    pub fn fill_screen(&mut self, color: Rgb565) -> Result<Outcome, DisplayError> {
        if self.width == 0 || self.height == 0 {
            return Ok(Outcome::OutOfRange);
        }
        debug!("fill screen with {:#06x}", color);
        let (w, h) = (self.width, self.height);
        self.with_bus(|d| {
            d.set_address_window(0, 0, w - 1, h - 1)?;
            d.write_pixel_repeated(color, u32::from(w) * u32::from(h))
        })?;
        Ok(Outcome::Drawn)
    }

    /// Draw a 3x3 block centered on `(x, y)`.
    pub fn draw_big_pixel(&mut self, x: i32, y: i32, color: Rgb565) -> Result<Outcome, DisplayError> {
        match (x.checked_sub(1), y.checked_sub(1), x.checked_add(1), y.checked_add(1)) {
            (Some(x0), Some(y0), Some(x1), Some(y1)) => self.fill_rect(x0, y0, x1, y1, color),
            _ => Ok(Outcome::OutOfRange),
        }
    }

    /// Blit a `w` x `h` image given as big-endian RGB565 bytes.
    ///
    /// `data` must hold exactly `2 * w * h` bytes.
    pub fn draw_image(
        &mut self,
        x: i32,
        y: i32,
        w: u16,
        h: u16,
        data: &[u8],
    ) -> Result<Outcome, DisplayError> {
        if w == 0 || h == 0 {
            return Ok(Outcome::OutOfRange);
        }
        let (Some(x_end), Some(y_end)) = (far_edge(x, w), far_edge(y, h)) else {
            return Ok(Outcome::OutOfRange);
        };
        if !self.contains(x, y) || !self.contains(x_end, y_end) {
            return Ok(Outcome::OutOfRange);
        }
        let expected = 2 * usize::from(w) * usize::from(h);
        if data.len() != expected {
            warn!("image data is {} bytes, expected {}", data.len(), expected);
            return Err(DisplayError::InvalidFormatError);
        }
        self.with_bus(|d| {
            d.set_address_window(x as u16, y as u16, x_end as u16, y_end as u16)?;
            d.interface.data(data)
        })?;
        Ok(Outcome::Drawn)
    }

    /// Turn display inversion on or off.
    pub fn invert_colors(&mut self, invert: bool) -> Result<(), DisplayError> {
        let c = if invert {
            Cmd::INVERSION_ON
        } else {
            Cmd::INVERSION_OFF
        };
        self.with_bus(|d| d.interface.cmd(c))
    }

    /// Turn the tearing effect output line on or off.
    pub fn tear_effect(&mut self, enable: bool) -> Result<(), DisplayError> {
        let c = if enable {
            Cmd::TEARING_ON
        } else {
            Cmd::TEARING_OFF
        };
        self.with_bus(|d| d.interface.cmd(c))
    }

    /// Define the vertical scroll area in controller lines: a fixed top
    /// band, the scrolling band and a fixed bottom band.
    pub fn set_scroll_area(
        &mut self,
        top_fixed: u16,
        scroll_height: u16,
        bottom_fixed: u16,
    ) -> Result<(), DisplayError> {
        let [t_hi, t_lo] = top_fixed.to_be_bytes();
        let [s_hi, s_lo] = scroll_height.to_be_bytes();
        let [b_hi, b_lo] = bottom_fixed.to_be_bytes();
        self.with_bus(|d| {
            d.interface.cmd_with_data(
                Cmd::VSCROLL_DEFINE,
                &[t_hi, t_lo, s_hi, s_lo, b_hi, b_lo],
            )
        })
    }

    /// Set the line shown at the top of the scroll area.
    pub fn scroll_to(&mut self, line: u16) -> Result<(), DisplayError> {
        self.with_bus(|d| {
            d.interface
                .cmd_with_data(Cmd::VSCROLL_START, &line.to_be_bytes())
        })
    }
}
