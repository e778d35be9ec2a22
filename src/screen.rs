//! Terminal presenter. The canvas is downscaled by an integer factor and
//! shown with half-block characters, so every cell carries two pixels; the
//! same factor maps mouse cells back onto the canvas.

use std::io::{self, Write};

use anyhow::{Context, Result, anyhow};
use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
    terminal,
};

use crate::canvas::{Canvas, HEIGHT, Rgb, WIDTH};

const MIN_SCALE: i32 = 4;
const MAX_SCALE: i32 = 16;
const MIN_COLS: i32 = WIDTH / MAX_SCALE;
const MIN_ROWS: i32 = HEIGHT / (2 * MAX_SCALE);

pub struct Screen {
    scale: i32,
    term_cols: u16,
    term_rows: u16,
}

/// Smallest downscale factor whose view fits the terminal.
fn fit_scale(cols: u16, rows: u16) -> Option<i32> {
    (MIN_SCALE..=MAX_SCALE)
        .find(|s| WIDTH / s <= cols as i32 && HEIGHT / (2 * s) <= rows as i32)
}

impl Screen {
    pub fn new() -> Result<Self> {
        let (cols, rows) = terminal::size().context("querying terminal size")?;
        let scale = fit_scale(cols, rows).ok_or_else(|| {
            anyhow!("terminal is {cols}x{rows} cells; need at least {MIN_COLS}x{MIN_ROWS}")
        })?;
        tracing::info!(cols, rows, scale, "terminal sized");
        Ok(Screen {
            scale,
            term_cols: cols,
            term_rows: rows,
        })
    }

    /// Re-pick the scale after a resize. If the terminal has shrunk below
    /// the coarsest fit the view is clipped rather than abandoned.
    pub fn rescale(&mut self, cols: u16, rows: u16) {
        self.scale = fit_scale(cols, rows).unwrap_or(MAX_SCALE);
        self.term_cols = cols;
        self.term_rows = rows;
    }

    fn view_cols(&self) -> i32 {
        (WIDTH / self.scale).min(self.term_cols as i32)
    }

    fn view_rows(&self) -> i32 {
        (HEIGHT / (2 * self.scale)).min(self.term_rows as i32)
    }

    /// Canvas point at the center of a terminal cell.
    pub fn cell_to_canvas(&self, col: u16, row: u16) -> (i32, i32) {
        (
            col as i32 * self.scale + self.scale / 2,
            row as i32 * 2 * self.scale + self.scale,
        )
    }

    pub fn present(&self, canvas: &Canvas, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.view_rows();
        let cols = self.view_cols();
        let half = self.scale / 2;
        let mut prev_fg = Rgb(0, 0, 0);
        let mut prev_bg = Rgb(0, 0, 0);
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..cols {
                let x = col * self.scale + half;
                let top = canvas.get(x, row * 2 * self.scale + half);
                let bot = canvas.get(x, (row * 2 + 1) * self.scale + half);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(
                            out,
                            style::SetBackgroundColor(CColor::Rgb {
                                r: top.0,
                                g: top.1,
                                b: top.2
                            })
                        )?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(
                            out,
                            style::SetForegroundColor(CColor::Rgb {
                                r: top.0,
                                g: top.1,
                                b: top.2
                            })
                        )?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(
                            out,
                            style::SetBackgroundColor(CColor::Rgb {
                                r: bot.0,
                                g: bot.1,
                                b: bot.2
                            })
                        )?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row < rows - 1 {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

#[cfg(test)]
pub(crate) fn test_screen(scale: i32) -> Screen {
    Screen {
        scale,
        term_cols: 160,
        term_rows: 60,
    }
}
