//! ST7789 TFT Display Driver
//!
//! Drives Sitronix ST7789 panels (240x240, 240x135, 320x240 and similar)
//! over 4-wire SPI with a separate data/command line, using the
//! `embedded-hal` 1.0 traits.
//!
//! ## Architecture
//!
//! The driver talks to the controller directly and keeps no frame buffer:
//! - **[`interface::SpiDisplayInterface`]** frames commands and data with
//!   the D/C line and guards each addressing-window sequence with a
//!   bus-exclusive bracket
//! - **[`driver::St7789`]** owns the session: init sequence, logical size
//!   and rotation, address windows, fills, images and the control toggles
//! - **Shapes and text** (lines, rectangles, circles, triangles, glyphs)
//!   rasterize into single pixels or horizontal runs on top of the session
//!
//! Every drawing call returns an [`driver::Outcome`] telling whether all,
//! some or none of the pixels landed on the screen. Requests that are
//! entirely off screen produce no bus traffic at all.
//!
//! ## Usage
//!
//! ```rust, ignore
//! use st7789::prelude::*;
//! use embedded_graphics::{prelude::*, primitives::*, pixelcolor::Rgb565 as EgRgb565};
//!
//! // 1. Create the driver from an SpiDevice and the control pins
//! let mut display = St7789::new(spi, dc, Some(rst));
//!
//! // 2. Run the init sequence (panel height, panel width, orientation)
//! display.init(240, 135, Rotation::Portrait, &mut delay)?;
//!
//! // 3. Draw with the native primitives
//! display.fill_screen(color::WHITE)?;
//! display.draw_circle(60, 60, 20, color::RED)?;
//! let font = Font::new(11, 18, &FONT_11X18_ROWS);
//! display.draw_string(10, 10, "Hello!", &font, color::BLACK, color::WHITE)?;
//!
//! // 4. Or through embedded-graphics
//! Rectangle::new(Point::new(10, 100), Size::new(50, 30))
//!     .into_styled(PrimitiveStyle::with_fill(EgRgb565::BLUE))
//!     .draw(&mut display)?;
//! ```
//!
//! Fills are sent one pixel per SPI transaction by default. Hand the driver
//! a scratch buffer with [`driver::St7789::with_scratch_buffer`] to send
//! them in bulk.
//!
#![no_std]
#![deny(missing_docs)]
#![allow(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

#[cfg(test)]
extern crate std;

mod cmd;
pub mod color;
pub mod driver;
#[cfg(feature = "graphics")]
mod graphics;
mod shapes;
pub mod text;

mod flag;

pub mod interface;
pub mod rotation;

#[cfg(test)]
mod mock;

/// Useful exports
pub mod prelude {
    pub use crate::color::{self, Rgb565};
    pub use crate::driver::{ControllerState, DisplayError, InitStep, Outcome, St7789};
    pub use crate::rotation::Rotation;
    pub use crate::shapes::TRIANGLE_VERTEX_MARGIN;
    pub use crate::text::Font;
}
