//! Fixed-width bitmap text
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

use crate::color::Rgb565;
use crate::driver::{far_edge, DisplayError, Outcome, St7789, Tally};

use log::warn;

/// Widest glyph a font row can describe
pub const MAX_GLYPH_WIDTH: u8 = 16;

/// A fixed-width bitmap font.
///
/// Glyphs start at `' '` and are stored back to back, `height` rows each.
/// A row is a `u16` whose most significant bit is the leftmost column.
#[derive(Clone, Copy, Debug)]
pub struct Font {
    width: u8,
    height: u8,
    data: &'static [u16],
}

impl Font {
    /// Describe a glyph table
    pub const fn new(width: u8, height: u8, data: &'static [u16]) -> Self {
        Font {
            width,
            height,
            data,
        }
    }

    /// Glyph width in pixels
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Glyph height in pixels
    pub const fn height(&self) -> u8 {
        self.height
    }

    /// Rows of the glyph for `ch`, if the table has one.
    pub fn glyph(&self, ch: char) -> Option<&'static [u16]> {
        let code = u32::from(ch).checked_sub(u32::from(b' '))? as usize;
        let start = code.checked_mul(usize::from(self.height))?;
        self.data.get(start..start + usize::from(self.height))
    }

    fn is_usable(&self) -> bool {
        self.width > 0 && self.height > 0 && self.width <= MAX_GLYPH_WIDTH
    }
}

impl<SPI, DC, RST> St7789<'_, SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Draw one character cell with its top-left corner at `(x, y)`.
    ///
    /// Set bits are drawn in `color`, clear bits in `background`. The whole
    /// cell must fit on screen.
    pub fn draw_char(
        &mut self,
        x: i32,
        y: i32,
        ch: char,
        font: &Font,
        color: Rgb565,
        background: Rgb565,
    ) -> Result<Outcome, DisplayError> {
        if !font.is_usable() {
            warn!("unusable font {}x{}", font.width, font.height);
            return Err(DisplayError::InvalidFormatError);
        }
        let glyph = match font.glyph(ch) {
            Some(glyph) => glyph,
            None => {
                warn!("no glyph for {:?}", ch);
                return Ok(Outcome::OutOfRange);
            }
        };
        let x_end = far_edge(x, font.width.into());
        let y_end = far_edge(y, font.height.into());
        let (Some(x_end), Some(y_end)) = (x_end, y_end) else {
            return Ok(Outcome::OutOfRange);
        };
        if !self.contains(x, y) || !self.contains(x_end, y_end) {
            return Ok(Outcome::OutOfRange);
        }

        let width = usize::from(font.width);
        self.with_bus(|d| {
            d.set_address_window(x as u16, y as u16, x_end as u16, y_end as u16)?;
            let mut row = [background; MAX_GLYPH_WIDTH as usize];
            for bits in glyph {
                for (j, px) in row[..width].iter_mut().enumerate() {
                    *px = if bits & (0x8000 >> j) != 0 {
                        color
                    } else {
                        background
                    };
                }
                d.write_pixels(&row[..width])?;
            }
            Ok(())
        })?;
        Ok(Outcome::Drawn)
    }

    /// Draw a string starting at `(x, y)`, wrapping to the next text line
    /// when a glyph would run past the right edge.
    ///
    /// A space that lands at the start of a wrapped line is skipped. Output
    /// stops quietly once a line would run past the bottom edge.
    pub fn draw_string(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        font: &Font,
        color: Rgb565,
        background: Rgb565,
    ) -> Result<Outcome, DisplayError> {
        let (fw, fh) = (i64::from(font.width), i64::from(font.height));
        let (width, height) = (i64::from(self.width()), i64::from(self.height()));
        let (mut x, mut y) = (i64::from(x), i64::from(y));
        let mut tally = Tally::default();

        for ch in text.chars() {
            if x + fw > width {
                x = 0;
                y += fh;
                if y + fh > height {
                    tally.record(Outcome::OutOfRange);
                    break;
                }
                if ch == ' ' {
                    continue;
                }
            }
            let outcome = match (i32::try_from(x), i32::try_from(y)) {
                (Ok(cx), Ok(cy)) => self.draw_char(cx, cy, ch, font, color, background)?,
                _ => Outcome::OutOfRange,
            };
            tally.record(outcome);
            x += fw;
        }
        Ok(tally.outcome())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLACK, WHITE};
    use crate::mock::{ready_display, BusLog, Frame};
    use crate::rotation::Rotation;
    use std::vec;
    use std::vec::Vec;

    // 11 columns lit in every row
    static SOLID: [u16; 4 * 96] = [0xFFE0; 4 * 96];

    fn block_font() -> Font {
        Font::new(11, 4, &SOLID)
    }

    /// Column ranges of every address window in the traffic.
    fn windows(log: &BusLog) -> Vec<(Vec<u8>, Vec<u8>)> {
        let frames = log.frames();
        frames
            .windows(4)
            .filter_map(|w| match w {
                [Frame::Command(0x2A), Frame::Data(cols), Frame::Command(0x2B), Frame::Data(rows)] => {
                    Some((cols.clone(), rows.clone()))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn glyph_lookup_starts_at_space() {
        static DATA: [u16; 6] = [1, 2, 3, 4, 5, 6];
        let font = Font::new(3, 2, &DATA);

        assert_eq!(font.glyph(' '), Some(&DATA[0..2]));
        assert_eq!(font.glyph('"'), Some(&DATA[4..6]));
        assert_eq!(font.glyph('#'), None);
        assert_eq!(font.glyph('\n'), None);
    }

    #[test]
    fn rows_are_read_from_the_most_significant_bit() {
        static DATA: [u16; 4] = [0, 0, 0b101 << 13, 0b010 << 13];
        let font = Font::new(3, 2, &DATA);
        let log = BusLog::new();
        let mut display = ready_display(&log, 240, 135, Rotation::Portrait);

        let outcome = display.draw_char(4, 6, '!', &font, WHITE, BLACK).unwrap();

        assert_eq!(outcome, Outcome::Drawn);
        assert_eq!(
            log.pixels(),
            vec![
                (4, 6, WHITE),
                (5, 6, BLACK),
                (6, 6, WHITE),
                (4, 7, BLACK),
                (5, 7, WHITE),
                (6, 7, BLACK),
            ]
        );
        // one window for the whole cell
        assert_eq!(log.commands(), vec![0x2A, 0x2B, 0x2C]);
    }

    #[test]
    fn char_must_fit_entirely() {
        let log = BusLog::new();
        let mut display = ready_display(&log, 240, 135, Rotation::Portrait);
        let font = block_font();

        assert_eq!(
            display.draw_char(125, 0, 'A', &font, WHITE, BLACK).unwrap(),
            Outcome::OutOfRange
        );
        assert_eq!(
            display.draw_char(0, 237, 'A', &font, WHITE, BLACK).unwrap(),
            Outcome::OutOfRange
        );
        assert_eq!(
            display.draw_char(0, 0, '\u{7f}', &font, WHITE, BLACK).unwrap(),
            Outcome::Drawn
        );
        log.clear();
        assert_eq!(
            display.draw_char(0, 0, 'é', &font, WHITE, BLACK).unwrap(),
            Outcome::OutOfRange
        );
        assert_eq!(log.transaction_count(), 0);
    }

    #[test]
    fn oversized_font_is_rejected() {
        static DATA: [u16; 1] = [0];
        let log = BusLog::new();
        let mut display = ready_display(&log, 240, 135, Rotation::Portrait);

        let result = display.draw_char(0, 0, ' ', &Font::new(17, 1, &DATA), WHITE, BLACK);

        assert!(matches!(result, Err(DisplayError::InvalidFormatError)));
    }

    #[test]
    fn string_advances_by_glyph_width() {
        let log = BusLog::new();
        let mut display = ready_display(&log, 160, 128, Rotation::Portrait);

        let outcome = display
            .draw_string(0, 0, "AB", &block_font(), WHITE, BLACK)
            .unwrap();

        assert_eq!(outcome, Outcome::Drawn);
        assert_eq!(
            windows(&log),
            vec![
                (vec![0, 0, 0, 10], vec![0, 0, 0, 3]),
                (vec![0, 11, 0, 21], vec![0, 0, 0, 3]),
            ]
        );
    }

    #[test]
    fn first_glyph_wraps_when_it_does_not_fit() {
        let log = BusLog::new();
        let mut display = ready_display(&log, 160, 128, Rotation::Portrait);

        let outcome = display
            .draw_string(120, 0, "AB", &block_font(), WHITE, BLACK)
            .unwrap();

        // 120 + 11 runs past 128, so both cells move to the next line
        assert_eq!(outcome, Outcome::Drawn);
        assert_eq!(
            windows(&log),
            vec![
                (vec![0, 0, 0, 10], vec![0, 4, 0, 7]),
                (vec![0, 11, 0, 21], vec![0, 4, 0, 7]),
            ]
        );
        assert_eq!(log.pixels().len(), 2 * 11 * 4);
    }

    #[test]
    fn extreme_text_origins_do_not_overflow() {
        let log = BusLog::new();
        let mut display = ready_display(&log, 160, 128, Rotation::Portrait);
        let font = block_font();

        for (x, y) in [(i32::MAX, 0), (0, i32::MAX), (i32::MIN, 0), (i32::MIN, i32::MIN)] {
            assert_eq!(
                display.draw_char(x, y, 'A', &font, WHITE, BLACK).unwrap(),
                Outcome::OutOfRange
            );
        }
        for (x, y) in [(0, i32::MAX), (0, i32::MIN), (i32::MIN, i32::MAX)] {
            assert_eq!(
                display.draw_string(x, y, "ABC", &font, WHITE, BLACK).unwrap(),
                Outcome::OutOfRange
            );
        }
        assert_eq!(log.transaction_count(), 0);

        // a far-right origin wraps straight to the second line
        let outcome = display
            .draw_string(i32::MAX, 0, "AB", &font, WHITE, BLACK)
            .unwrap();
        assert_eq!(outcome, Outcome::Drawn);
        let origins: Vec<(u8, u8)> = windows(&log).iter().map(|(c, r)| (c[1], r[1])).collect();
        assert_eq!(origins, vec![(0, 4), (11, 4)]);
    }

    #[test]
    fn space_after_wrap_is_skipped() {
        let log = BusLog::new();
        let mut display = ready_display(&log, 40, 22, Rotation::Portrait);

        display
            .draw_string(0, 0, "AB CD", &block_font(), WHITE, BLACK)
            .unwrap();

        let origins: Vec<(u8, u8)> = windows(&log).iter().map(|(c, r)| (c[1], r[1])).collect();
        assert_eq!(origins, vec![(0, 0), (11, 0), (0, 4), (11, 4)]);
    }

    #[test]
    fn string_stops_at_bottom_edge() {
        let log = BusLog::new();
        let mut display = ready_display(&log, 8, 22, Rotation::Portrait);

        let outcome = display
            .draw_string(0, 0, "ABCDEF", &block_font(), WHITE, BLACK)
            .unwrap();

        assert_eq!(outcome, Outcome::Clipped);
        assert_eq!(windows(&log).len(), 4);
    }
}
