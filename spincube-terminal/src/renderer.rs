/// Half-block presenter for terminal rendering
///
/// Each terminal cell shows two vertically stacked pixels: the upper one as
/// the foreground of `▀`, the lower one as the cell background.
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use spincube_core::{Framebuffer, Surface, SurfaceError};

const UPPER_HALF_BLOCK: char = '▀';

/// Frame buffer size for a terminal of `columns` x `rows` cells, keeping
/// `reserved_rows` free at the top for the status line
pub fn frame_size(columns: u16, rows: u16, reserved_rows: u16) -> (u32, u32) {
    let rows = rows.saturating_sub(reserved_rows);
    (columns as u32, rows as u32 * 2)
}

/// Writes frames as 24-bit colored half blocks
pub struct HalfBlockSurface<W: Write> {
    writer: W,
    top_row: u16,
}

impl<W: Write> HalfBlockSurface<W> {
    pub fn new(writer: W, top_row: u16) -> Self {
        Self { writer, top_row }
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn draw(&mut self, frame: &Framebuffer) -> std::io::Result<()> {
        let mut current: Option<(Color, Color)> = None;

        for row in 0..frame.height() / 2 {
            self.writer
                .queue(cursor::MoveTo(0, self.top_row + row as u16))?;
            for x in 0..frame.width() {
                let upper = rgb(frame.pixel(x, row * 2));
                let lower = rgb(frame.pixel(x, row * 2 + 1));

                if current != Some((upper, lower)) {
                    self.writer.queue(SetForegroundColor(upper))?;
                    self.writer.queue(SetBackgroundColor(lower))?;
                    current = Some((upper, lower));
                }
                self.writer.queue(Print(UPPER_HALF_BLOCK))?;
            }
        }
        self.writer.queue(ResetColor)?;
        self.writer.flush()
    }
}

impl<W: Write> Surface for HalfBlockSurface<W> {
    fn present(&mut self, frame: &Framebuffer) -> Result<(), SurfaceError> {
        self.draw(frame)
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::BrokenPipe => SurfaceError::Detached,
                _ => SurfaceError::Backend(err.to_string()),
            })
    }
}

fn rgb(px: [u8; 4]) -> Color {
    Color::Rgb {
        r: px[0],
        g: px[1],
        b: px[2],
    }
}
