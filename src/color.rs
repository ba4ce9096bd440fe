//! RGB565 colors
//!
//! The controller runs in its 16 bit per pixel mode only. A color is a
//! plain `u16` (5 bits red, 6 bits green, 5 bits blue) and is sent most
//! significant byte first.

// Palette names follow the common ST7789 demo code.
#![allow(missing_docs)]

/// Packed RGB565 color value. Every 16 bit value is a valid color.
pub type Rgb565 = u16;

pub const WHITE: Rgb565 = 0xFFFF;
pub const BLACK: Rgb565 = 0x0000;
pub const BLUE: Rgb565 = 0x001F;
pub const RED: Rgb565 = 0xF800;
pub const MAGENTA: Rgb565 = 0xF81F;
pub const GREEN: Rgb565 = 0x07E0;
pub const CYAN: Rgb565 = 0x7FFF;
pub const YELLOW: Rgb565 = 0xFFE0;
pub const GRAY: Rgb565 = 0x8430;
pub const BRED: Rgb565 = 0xF81F;
pub const GRED: Rgb565 = 0xFFE0;
pub const GBLUE: Rgb565 = 0x07FF;
pub const BROWN: Rgb565 = 0xBC40;
pub const BRRED: Rgb565 = 0xFC07;
pub const DARKBLUE: Rgb565 = 0x01CF;
pub const LIGHTBLUE: Rgb565 = 0x7D7C;
pub const GRAYBLUE: Rgb565 = 0x5458;
pub const LIGHTGREEN: Rgb565 = 0x841F;
pub const LGRAY: Rgb565 = 0xC618;
pub const LGRAYBLUE: Rgb565 = 0xA651;
pub const LBBLUE: Rgb565 = 0x2B12;

/// Background color the screen is cleared to at the end of initialization
pub const BACKGROUND: Rgb565 = BLACK;

/// Pack 8 bit channels into RGB565, dropping the low bits of each channel
pub const fn rgb565(r: u8, g: u8, b: u8) -> Rgb565 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

/// Wire representation of a color
#[inline]
pub const fn to_bytes(color: Rgb565) -> [u8; 2] {
    color.to_be_bytes()
}
