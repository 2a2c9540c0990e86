use crate::color::Rgba;
use crate::raster::PixelCanvas;
use anyhow::{Context, Result};
use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Stdout, Write};

// Braille: each terminal cell is 2x4 subpixels.
pub(crate) const SUB_X: usize = 2;
pub(crate) const SUB_Y: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Cell {
    fn blank() -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
            bg: Color::Reset,
        }
    }
}

fn braille_bit(dx: usize, dy: usize) -> u8 {
    match (dx, dy) {
        (0, 0) => 0x01, // dot 1
        (0, 1) => 0x02, // dot 2
        (0, 2) => 0x04, // dot 3
        (1, 0) => 0x08, // dot 4
        (1, 1) => 0x10, // dot 5
        (1, 2) => 0x20, // dot 6
        (0, 3) => 0x40, // dot 7
        (1, 3) => 0x80, // dot 8
        _ => 0,
    }
}

fn braille_char(mask: u8) -> char {
    char::from_u32(0x2800 + mask as u32).unwrap_or(' ')
}

fn luma(p: Rgba) -> f32 {
    0.2126 * p.r as f32 + 0.7152 * p.g as f32 + 0.0722 * p.b as f32
}

#[derive(Default)]
struct ColorSum {
    r: u32,
    g: u32,
    b: u32,
    n: u32,
}

impl ColorSum {
    fn add(&mut self, p: Rgba) {
        self.r += p.r as u32;
        self.g += p.g as u32;
        self.b += p.b as u32;
        self.n += 1;
    }

    fn average(&self) -> Color {
        let n = self.n.max(1);
        Color::Rgb {
            r: (self.r / n) as u8,
            g: (self.g / n) as u8,
            b: (self.b / n) as u8,
        }
    }
}

/// Two-colour braille approximation of one 2x4 block: dots are the
/// subpixels noticeably brighter than the block's mean.
pub(crate) fn braille_cell(canvas: &PixelCanvas, tx: usize, ty: usize) -> Cell {
    const CONTRAST: f32 = 6.0;

    let mut block = [Rgba::default(); SUB_X * SUB_Y];
    let mut mean = 0.0;
    for dy in 0..SUB_Y {
        for dx in 0..SUB_X {
            let p = canvas.get(tx * SUB_X + dx, ty * SUB_Y + dy);
            block[dy * SUB_X + dx] = p;
            mean += luma(p);
        }
    }
    mean /= (SUB_X * SUB_Y) as f32;

    let mut mask = 0u8;
    let mut lit = ColorSum::default();
    let mut dark = ColorSum::default();
    for dy in 0..SUB_Y {
        for dx in 0..SUB_X {
            let p = block[dy * SUB_X + dx];
            if luma(p) > mean + CONTRAST {
                mask |= braille_bit(dx, dy);
                lit.add(p);
            } else {
                dark.add(p);
            }
        }
    }

    Cell {
        ch: if mask == 0 { ' ' } else { braille_char(mask) },
        fg: if mask == 0 { Color::Reset } else { lit.average() },
        bg: dark.average(),
    }
}

/// Double-buffered cell grid; only changed cells are written.
pub(crate) struct Renderer {
    w: u16,
    h: u16,
    front: Vec<Cell>,
    back: Vec<Cell>,
    full_redraw: bool,
    last_fg: Color,
    last_bg: Color,
}

impl Renderer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        let n = (w as usize) * (h as usize);
        Self {
            w,
            h,
            front: vec![Cell::blank(); n],
            back: vec![Cell::blank(); n],
            full_redraw: true,
            last_fg: Color::Reset,
            last_bg: Color::Reset,
        }
    }

    /// Converts the canvas into the back buffer. The canvas must be
    /// `w*SUB_X` by `h*SUB_Y` pixels.
    pub(crate) fn compose(&mut self, canvas: &PixelCanvas) {
        let w = self.w as usize;
        let cols = w.min(canvas.width() / SUB_X);
        let rows = (self.h as usize).min(canvas.height() / SUB_Y);
        for ty in 0..rows {
            for tx in 0..cols {
                self.back[ty * w + tx] = braille_cell(canvas, tx, ty);
            }
        }
    }

    pub(crate) fn flush(&mut self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, BeginSynchronizedUpdate)?;

        let w = self.w as usize;
        let h = self.h as usize;

        for y in 0..h {
            for x in 0..w {
                let i = y * w + x;
                let b = self.back[i];
                let f = self.front[i];

                if !self.full_redraw && b == f {
                    continue;
                }

                if b.bg != self.last_bg {
                    queue!(out, SetBackgroundColor(b.bg))?;
                    self.last_bg = b.bg;
                }
                if b.fg != self.last_fg {
                    queue!(out, SetForegroundColor(b.fg))?;
                    self.last_fg = b.fg;
                }

                queue!(out, cursor::MoveTo(x as u16, y as u16), Print(b.ch))?;
                self.front[i] = b;
            }
        }

        self.full_redraw = false;

        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        self.last_fg = Color::Reset;
        self.last_bg = Color::Reset;
        out.flush()?;
        Ok(())
    }
}

/// Raw-mode alternate screen; restored on drop, including on unwind.
pub(crate) struct Terminal {
    out: Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    renderer: Renderer,
}

impl Terminal {
    pub(crate) fn begin() -> Result<Self> {
        let (cols, rows) = terminal::size().context("could not read terminal size")?;
        let mut out = io::stdout();
        terminal::enable_raw_mode().context("could not enable raw mode")?;
        queue!(out, EnterAlternateScreen, DisableLineWrap, cursor::Hide)?;
        out.flush()?;
        Ok(Self {
            out,
            cols,
            rows,
            renderer: Renderer::new(cols, rows),
        })
    }

    pub(crate) fn present(&mut self, canvas: &PixelCanvas) -> Result<()> {
        self.renderer.compose(canvas);
        self.renderer.flush(&mut self.out)?;
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = queue!(
            self.out,
            EndSynchronizedUpdate,
            ResetColor,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = self.out.flush();
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterSurface;
    use crate::surface::Surface;

    #[test]
    fn flat_block_is_a_blank_with_that_background() {
        let mut s = RasterSurface::new(2, 4, 1.0);
        s.set_fill_color(Rgba::from_hex(0x00204AFF));
        s.fill_rect(0.0, 0.0, 2.0, 4.0);
        let cell = braille_cell(s.canvas(), 0, 0);
        assert_eq!(cell.ch, ' ');
        assert_eq!(cell.bg, Color::Rgb { r: 0, g: 0x20, b: 0x4A });
    }

    #[test]
    fn bright_column_becomes_left_dots() {
        let mut s = RasterSurface::new(2, 4, 1.0);
        s.set_fill_color(Rgba::from_hex(0xFFFFFFFF));
        s.fill_rect(0.0, 0.0, 1.0, 4.0);
        let cell = braille_cell(s.canvas(), 0, 0);
        assert_eq!(cell.ch, braille_char(0x01 | 0x02 | 0x04 | 0x40));
        assert_eq!(cell.fg, Color::Rgb { r: 255, g: 255, b: 255 });
        assert_eq!(cell.bg, Color::Rgb { r: 0, g: 0, b: 0 });
    }

    #[test]
    fn flush_writes_only_changed_cells() {
        let mut s = RasterSurface::new(4, 4, 1.0);
        let mut r = Renderer::new(2, 1);
        r.compose(s.canvas());
        let mut first = Vec::new();
        r.flush(&mut first).unwrap();

        let mut unchanged = Vec::new();
        r.compose(s.canvas());
        r.flush(&mut unchanged).unwrap();
        assert!(unchanged.len() < first.len());
        assert!(!String::from_utf8_lossy(&unchanged).contains(' '));

        s.set_fill_color(Rgba::from_hex(0xFFFFFFFF));
        s.fill_rect(2.0, 0.0, 1.0, 1.0);
        let mut changed = Vec::new();
        r.compose(s.canvas());
        r.flush(&mut changed).unwrap();
        assert!(String::from_utf8_lossy(&changed).contains(braille_char(0x01)));
    }
}
