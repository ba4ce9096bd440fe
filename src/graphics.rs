//! embedded-graphics integration
//!
//! The session itself is the draw target. There is no frame buffer: pixels
//! go to the controller as they are drawn, and off-screen pixels are
//! dropped the same way the native primitives drop them.
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

use crate::driver::{DisplayError, St7789};

impl<SPI, DC, RST> OriginDimensions for St7789<'_, SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    fn size(&self) -> Size {
        Size::new(self.width().into(), self.height().into())
    }
}

impl<SPI, DC, RST> DrawTarget for St7789<'_, SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    type Color = Rgb565;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.into_storage())?;
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let bottom_right = match area.bottom_right() {
            Some(p) => p,
            None => return Ok(()),
        };
        if !self.contains(area.top_left.x, area.top_left.y)
            || !self.contains(bottom_right.x, bottom_right.y)
        {
            // partly off screen: clip pixel by pixel
            return self.draw_iter(
                area.points()
                    .zip(colors)
                    .map(|(point, color)| Pixel(point, color)),
            );
        }

        let total = area.size.width as usize * area.size.height as usize;
        self.with_bus(|d| {
            d.set_address_window(
                area.top_left.x as u16,
                area.top_left.y as u16,
                bottom_right.x as u16,
                bottom_right.y as u16,
            )?;
            d.write_pixel_iter(colors.into_iter().take(total).map(|c| c.into_storage()))
        })
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        if let Some(bottom_right) = area.bottom_right() {
            self.fill_rect(
                area.top_left.x,
                area.top_left.y,
                bottom_right.x,
                bottom_right.y,
                color.into_storage(),
            )?;
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_screen(color.into_storage()).map(|_| ())
    }
}
