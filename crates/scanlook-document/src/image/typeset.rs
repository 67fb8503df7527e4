// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain text onto a white page bitmap, drawn with the 8x8 bitmap glyph set.

use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, instrument};

/// A4 portrait at 96 dpi.
pub const A4_PX: (u32, u32) = (794, 1123);

const PAPER: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([28, 28, 28]);
const GLYPH_CELLS: u32 = 8;

/// Lays text out top to bottom on a single page.
///
/// Glyphs are 8x8 cells magnified by `glyph_scale`. Lines that do not fit on
/// the page are dropped and counted.
#[derive(Debug, Clone, Copy)]
pub struct PageTypesetter {
    width: u32,
    height: u32,
    margin: u32,
    glyph_scale: u32,
    leading: u32,
}

impl Default for PageTypesetter {
    fn default() -> Self {
        Self {
            width: A4_PX.0,
            height: A4_PX.1,
            margin: 72,
            glyph_scale: 2,
            leading: 22,
        }
    }
}

impl PageTypesetter {
    pub fn page_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Characters per line.
    pub fn columns(&self) -> usize {
        let usable = self.width.saturating_sub(2 * self.margin);
        (usable / (GLYPH_CELLS * self.glyph_scale)).max(1) as usize
    }

    /// Lines per page.
    pub fn rows(&self) -> usize {
        let usable = self.height.saturating_sub(2 * self.margin);
        (usable / self.leading).max(1) as usize
    }

    /// Draw `text` and return the page with the number of lines that did not
    /// fit.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn render(&self, text: &str) -> (RgbImage, usize) {
        let mut page = RgbImage::from_pixel(self.width, self.height, PAPER);
        let lines = wrap_text(text, self.columns());
        let overflow = lines.len().saturating_sub(self.rows());

        for (row, line) in lines.iter().take(self.rows()).enumerate() {
            let top = self.margin + row as u32 * self.leading;
            for (column, ch) in line.chars().enumerate() {
                let left = self.margin + column as u32 * GLYPH_CELLS * self.glyph_scale;
                self.draw_glyph(&mut page, ch, left, top);
            }
        }

        debug!(lines = lines.len(), overflow, "Text typeset");
        (page, overflow)
    }

    fn draw_glyph(&self, page: &mut RgbImage, ch: char, left: u32, top: u32) {
        let Some(glyph) = glyph_for(ch) else {
            return;
        };
        let cell = self.glyph_scale;

        // Bit 0 of each row byte is the leftmost pixel.
        for (y, bits) in glyph.iter().enumerate() {
            for x in 0..GLYPH_CELLS {
                if bits & (1 << x) != 0 {
                    let dot = Rect::at((left + x * cell) as i32, (top + y as u32 * cell) as i32)
                        .of_size(cell, cell);
                    draw_filled_rect_mut(page, dot, INK);
                }
            }
        }
    }
}

/// Glyph for `ch`, falling back to `?` outside Basic Latin and Latin-1.
fn glyph_for(ch: char) -> Option<[u8; 8]> {
    if ch.is_whitespace() {
        return None;
    }
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
}

/// Break `text` into lines of at most `width` characters.
///
/// Every input line is wrapped on its own, so blank lines survive as empty
/// strings. Words wider than `width` are cut on char boundaries.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for source in text.lines() {
        let mut line = String::new();
        let mut used = 0usize;

        for word in source.split_whitespace() {
            let mut rest: Vec<char> = word.chars().collect();

            if used > 0 && used + 1 + rest.len() > width {
                lines.push(std::mem::take(&mut line));
                used = 0;
            }
            while rest.len() > width {
                let tail = rest.split_off(width);
                lines.push(rest.into_iter().collect());
                rest = tail;
            }
            if used > 0 {
                line.push(' ');
                used += 1;
            }
            used += rest.len();
            line.extend(rest);
        }

        lines.push(line);
    }

    lines
}
