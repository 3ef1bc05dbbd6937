//! Raster surface shown with half-block characters.
//!
//! Each terminal cell covers two vertically stacked pixels: the upper one is
//! the foreground of '▀', the lower one the background.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::Widget,
};

use tonescope::visual::Canvas;

const UPPER_HALF: &str = "▀";

/// Pixel dimensions of a surface filling `area`.
pub fn pixel_size(area: Rect) -> (u32, u32) {
    (area.width as u32, area.height as u32 * 2)
}

pub struct SurfaceView<'a> {
    canvas: &'a Canvas,
}

impl<'a> SurfaceView<'a> {
    pub fn new(canvas: &'a Canvas) -> Self {
        Self { canvas }
    }
}

impl Widget for SurfaceView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        for row in 0..area.height {
            for col in 0..area.width {
                let x = col as u32;
                let y = row as u32 * 2;
                let (Some(top), Some(bottom)) =
                    (self.canvas.pixel(x, y), self.canvas.pixel(x, y + 1))
                else {
                    continue;
                };
                buf[(area.x + col, area.y + row)]
                    .set_symbol(UPPER_HALF)
                    .set_fg(rgb(top))
                    .set_bg(rgb(bottom));
            }
        }
    }
}

fn rgb(pixel: [u8; 4]) -> Color {
    Color::Rgb(pixel[0], pixel[1], pixel[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonescope::visual::Color as Rgba;

    #[test]
    fn cell_takes_two_pixel_rows() {
        let mut canvas = Canvas::new(2, 4);
        canvas.clear(Rgba::rgb(10, 20, 30));
        canvas.fill_rect(0.0, 1.0, 2.0, 1.0, Rgba::rgb(200, 0, 0));

        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);
        SurfaceView::new(&canvas).render(area, &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), UPPER_HALF);
        assert_eq!(cell.fg, Color::Rgb(10, 20, 30));
        assert_eq!(cell.bg, Color::Rgb(200, 0, 0));
        assert_eq!(buf[(1, 1)].bg, Color::Rgb(10, 20, 30));
    }

    #[test]
    fn pixel_size_doubles_rows() {
        assert_eq!(pixel_size(Rect::new(3, 4, 80, 20)), (80, 40));
    }
}
