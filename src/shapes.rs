//! Line, rectangle, circle and triangle rasterization
//!
//! Every shape is decomposed into single pixels or horizontal lines and
//! written through [`St7789::set_pixel`], so each point gets its own
//! addressing window and off-screen points are clipped individually.
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

use crate::color::Rgb565;
use crate::driver::{DisplayError, Outcome, St7789, Tally};

use log::trace;

/// How far outside the screen a filled-triangle vertex may lie. The fill
/// walks one fan line per pixel of its first edge, so the walk is bounded
/// by rejecting vertices beyond this margin.
pub const TRIANGLE_VERTEX_MARGIN: i32 = 1 << 16;

impl<SPI, DC, RST> St7789<'_, SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Draw a line between two points, both ends included.
    pub fn draw_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: Rgb565,
    ) -> Result<Outcome, DisplayError> {
        let mut tally = Tally::default();
        self.line_into(&mut tally, x0.into(), y0.into(), x1.into(), y1.into(), color)?;
        Ok(tally.outcome())
    }

    fn plot(&mut self, x: i64, y: i64, color: Rgb565) -> Result<Outcome, DisplayError> {
        match (i32::try_from(x), i32::try_from(y)) {
            (Ok(x), Ok(y)) => self.set_pixel(x, y, color),
            _ => Ok(Outcome::OutOfRange),
        }
    }

    /// Bresenham walk along the major axis. Steps before the first and
    /// after the last on-screen column (or row, for steep lines) are skipped
    /// in one go, with the error term advanced to match.
    #[allow(clippy::too_many_arguments)]
    fn line_into(
        &mut self,
        tally: &mut Tally,
        mut x0: i64,
        mut y0: i64,
        mut x1: i64,
        mut y1: i64,
        color: Rgb565,
    ) -> Result<(), DisplayError> {
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            core::mem::swap(&mut x0, &mut y0);
            core::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            core::mem::swap(&mut x0, &mut x1);
            core::mem::swap(&mut y0, &mut y1);
        }

        let dx = x1 - x0;
        let dy = (y1 - y0).abs();
        let mut err = dx / 2;
        let ystep = if y0 < y1 { 1 } else { -1 };

        let major_len = i64::from(if steep { self.height() } else { self.width() });
        let first = x0.max(0);
        let last = x1.min(major_len - 1);
        if first > last {
            tally.record(Outcome::OutOfRange);
            return Ok(());
        }

        let mut y = y0;
        let skipped = first - x0;
        if skipped > 0 {
            // err - skipped*dy + carries*dx must land back in 0..dx
            let owed = i128::from(skipped) * i128::from(dy) - i128::from(err);
            let carries = if owed > 0 {
                (owed + i128::from(dx) - 1) / i128::from(dx)
            } else {
                0
            };
            err = (carries * i128::from(dx) - owed) as i64;
            y += carries as i64 * ystep;
            tally.record(Outcome::OutOfRange);
        }
        if last < x1 {
            tally.record(Outcome::OutOfRange);
        }

        for x in first..=last {
            let outcome = if steep {
                self.plot(y, x, color)?
            } else {
                self.plot(x, y, color)?
            };
            tally.record(outcome);
            err -= dy;
            if err < 0 {
                y += ystep;
                err += dx;
            }
        }
        Ok(())
    }

    /// Draw a rectangle outline with corners `(x1, y1)` and `(x2, y2)`.
    pub fn draw_rect(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Rgb565,
    ) -> Result<Outcome, DisplayError> {
        let (x1, y1, x2, y2) = (i64::from(x1), i64::from(y1), i64::from(x2), i64::from(y2));
        let mut tally = Tally::default();
        self.line_into(&mut tally, x1, y1, x2, y1, color)?;
        self.line_into(&mut tally, x1, y1, x1, y2, color)?;
        self.line_into(&mut tally, x1, y2, x2, y2, color)?;
        self.line_into(&mut tally, x2, y1, x2, y2, color)?;
        Ok(tally.outcome())
    }

    /// Fill the rectangle spanning `(x, y)` to `(x + w, y + h)` inclusive,
    /// one horizontal line per row.
    ///
    /// The origin must be on screen. A far edge past the screen is pulled
    /// back to the last column or row and the result reports `Clipped`.
    pub fn draw_filled_rect(
        &mut self,
        x: i32,
        y: i32,
        w: u16,
        h: u16,
        color: Rgb565,
    ) -> Result<Outcome, DisplayError> {
        if !self.contains(x, y) {
            return Ok(Outcome::OutOfRange);
        }
        let (x, y) = (i64::from(x), i64::from(y));
        let max_w = i64::from(self.width()) - 1 - x;
        let max_h = i64::from(self.height()) - 1 - y;
        let (w, h) = (i64::from(w), i64::from(h));
        let clamped = w > max_w || h > max_h;
        let (w, h) = (w.min(max_w), h.min(max_h));
        if clamped {
            trace!("filled rect clamped to {}x{} at ({}, {})", w + 1, h + 1, x, y);
        }

        let mut tally = Tally::default();
        for row in y..=y + h {
            self.line_into(&mut tally, x, row, x + w, row, color)?;
        }
        if clamped {
            tally.record(Outcome::OutOfRange);
        }
        Ok(tally.outcome())
    }

    /// Draw a circle outline with the midpoint algorithm.
    pub fn draw_circle(
        &mut self,
        x0: i32,
        y0: i32,
        r: u16,
        color: Rgb565,
    ) -> Result<Outcome, DisplayError> {
        let (x0, y0, r) = (i64::from(x0), i64::from(y0), i64::from(r));
        let mut tally = Tally::default();

        for (px, py) in [(x0, y0 + r), (x0, y0 - r), (x0 + r, y0), (x0 - r, y0)] {
            tally.record(self.plot(px, py, color)?);
        }

        for (x, y) in MidpointCircle::new(r) {
            for (px, py) in [
                (x0 + x, y0 + y),
                (x0 - x, y0 + y),
                (x0 + x, y0 - y),
                (x0 - x, y0 - y),
                (x0 + y, y0 + x),
                (x0 - y, y0 + x),
                (x0 + y, y0 - x),
                (x0 - y, y0 - x),
            ] {
                tally.record(self.plot(px, py, color)?);
            }
        }
        Ok(tally.outcome())
    }

    /// Draw a filled circle: the horizontal diameter plus one line per
    /// symmetric point pair.
    pub fn draw_filled_circle(
        &mut self,
        x0: i32,
        y0: i32,
        r: u16,
        color: Rgb565,
    ) -> Result<Outcome, DisplayError> {
        let (x0, y0, r) = (i64::from(x0), i64::from(y0), i64::from(r));
        let mut tally = Tally::default();

        for (px, py) in [(x0, y0 + r), (x0, y0 - r), (x0 + r, y0), (x0 - r, y0)] {
            tally.record(self.plot(px, py, color)?);
        }
        self.line_into(&mut tally, x0 - r, y0, x0 + r, y0, color)?;

        for (x, y) in MidpointCircle::new(r) {
            self.line_into(&mut tally, x0 - x, y0 + y, x0 + x, y0 + y, color)?;
            self.line_into(&mut tally, x0 + x, y0 - y, x0 - x, y0 - y, color)?;
            self.line_into(&mut tally, x0 + y, y0 + x, x0 - y, y0 + x, color)?;
            self.line_into(&mut tally, x0 + y, y0 - x, x0 - y, y0 - x, color)?;
        }
        Ok(tally.outcome())
    }

    /// Draw a triangle outline.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_triangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        x3: i32,
        y3: i32,
        color: Rgb565,
    ) -> Result<Outcome, DisplayError> {
        let (x1, y1, x2, y2) = (i64::from(x1), i64::from(y1), i64::from(x2), i64::from(y2));
        let (x3, y3) = (i64::from(x3), i64::from(y3));
        let mut tally = Tally::default();
        self.line_into(&mut tally, x1, y1, x2, y2, color)?;
        self.line_into(&mut tally, x2, y2, x3, y3, color)?;
        self.line_into(&mut tally, x3, y3, x1, y1, color)?;
        Ok(tally.outcome())
    }

    /// Draw a filled triangle by walking the edge from the first vertex to
    /// the second and drawing a line from every walked point to the third.
    ///
    /// This is an approximation, not a scanline fill: thin or steep
    /// triangles can show gaps between neighbouring fan lines. A vertex more
    /// than [`TRIANGLE_VERTEX_MARGIN`] pixels outside the screen makes the
    /// whole call `OutOfRange`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_filled_triangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        x3: i32,
        y3: i32,
        color: Rgb565,
    ) -> Result<Outcome, DisplayError> {
        if [(x1, y1), (x2, y2), (x3, y3)]
            .iter()
            .any(|&(x, y)| !self.near_screen(x, y))
        {
            return Ok(Outcome::OutOfRange);
        }
        let (x1, y1, x2, y2) = (i64::from(x1), i64::from(y1), i64::from(x2), i64::from(y2));
        let (x3, y3) = (i64::from(x3), i64::from(y3));

        let delta_x = (x2 - x1).abs();
        let delta_y = (y2 - y1).abs();
        let step_x = if x2 >= x1 { 1 } else { -1 };
        let step_y = if y2 >= y1 { 1 } else { -1 };

        // (minor-axis step, major-axis step) for x and y
        let (x_minor, x_major, y_minor, y_major, den, numadd, steps) = if delta_x >= delta_y {
            (0, step_x, step_y, 0, delta_x, delta_y, delta_x)
        } else {
            (step_x, 0, 0, step_y, delta_y, delta_x, delta_y)
        };

        let mut tally = Tally::default();
        let (mut x, mut y) = (x1, y1);
        let mut num = den / 2;
        for _ in 0..=steps {
            self.line_into(&mut tally, x, y, x3, y3, color)?;
            num += numadd;
            if num >= den {
                num -= den;
                x += x_minor;
                y += y_minor;
            }
            x += x_major;
            y += y_major;
        }
        Ok(tally.outcome())
    }

    fn near_screen(&self, x: i32, y: i32) -> bool {
        let margin = i64::from(TRIANGLE_VERTEX_MARGIN);
        let (x, y) = (i64::from(x), i64::from(y));
        x >= -margin
            && y >= -margin
            && x < i64::from(self.width()) + margin
            && y < i64::from(self.height()) + margin
    }
}

/// Octant walk of the midpoint circle algorithm, yielding `(x, y)` offsets
/// with `x` growing from 1 until it meets `y`.
struct MidpointCircle {
    f: i64,
    dd_f_x: i64,
    dd_f_y: i64,
    x: i64,
    y: i64,
}

impl MidpointCircle {
    fn new(r: i64) -> Self {
        MidpointCircle {
            f: 1 - r,
            dd_f_x: 1,
            dd_f_y: -2 * r,
            x: 0,
            y: r,
        }
    }
}

impl Iterator for MidpointCircle {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.x >= self.y {
            return None;
        }
        if self.f >= 0 {
            self.y -= 1;
            self.dd_f_y += 2;
            self.f += self.dd_f_y;
        }
        self.x += 1;
        self.dd_f_x += 2;
        self.f += self.dd_f_x;
        Some((self.x, self.y))
    }
}
