// SPDX-License-Identifier: GPL-3.0-only

//! 5x7 bitmap font for the date stamp
//!
//! Covers exactly the characters a `YYYY-MM-DD HH:MM` stamp needs. Each row
//! is five bits wide, most significant bit on the left.

/// Glyph cell width in font units
pub const GLYPH_WIDTH: u32 = 5;
/// Glyph cell height in font units
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal distance between glyph origins in font units
pub const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

type Glyph = [u8; GLYPH_HEIGHT as usize];

const BLANK: Glyph = [0; 7];

/// Rows for a character; anything outside the stamp alphabet renders blank
pub fn glyph(ch: char) -> Glyph {
    match ch {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '-' => [0, 0, 0, 0b11111, 0, 0, 0],
        ':' => [0, 0b01100, 0b01100, 0, 0b01100, 0b01100, 0],
        _ => BLANK,
    }
}

/// Whether font unit (`col`, `row`) of `ch` is inked
#[inline]
pub fn is_set(ch: char, col: u32, row: u32) -> bool {
    if col >= GLYPH_WIDTH || row >= GLYPH_HEIGHT {
        return false;
    }
    glyph(ch)[row as usize] & (1 << (GLYPH_WIDTH - 1 - col)) != 0
}

/// Rendered size in pixels of `text` at integer `scale`, saturating at `u32::MAX`
pub fn text_size(text: &str, scale: u32) -> (u32, u32) {
    let count = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    if count == 0 {
        return (0, 0);
    }
    let width = (count - 1)
        .saturating_mul(GLYPH_ADVANCE)
        .saturating_add(GLYPH_WIDTH);
    (
        width.saturating_mul(scale),
        GLYPH_HEIGHT.saturating_mul(scale),
    )
}
