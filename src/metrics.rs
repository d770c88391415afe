//! Font metrics for the built-in Helvetica faces
//!
//! The base-14 fonts are not embedded, so widths come from the standard AFM
//! tables instead of the font program.

use crate::styles::FontFace;

/// Advance widths for ' '..='~' in Helvetica, 1/1000 em
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Advance widths for ' '..='~' in Helvetica-Bold, 1/1000 em
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const FALLBACK_WIDTH: u16 = 556;

/// Cap height as a fraction of the font size, used to center glyph lines
pub const CAP_HEIGHT: f32 = 0.718;

fn advance(c: char, face: FontFace) -> u16 {
    let table = match face {
        FontFace::Bold => &HELVETICA_BOLD,
        FontFace::Regular | FontFace::Oblique => &HELVETICA,
    };
    match c {
        ' '..='~' => table[c as usize - 0x20],
        _ => FALLBACK_WIDTH,
    }
}

/// ASCII stand-in for a typographic character the built-in fonts cannot encode
fn substitute(c: char) -> Option<&'static str> {
    match c {
        '\u{2194}' => Some("<->"),
        '\u{2192}' => Some("->"),
        '\u{2190}' => Some("<-"),
        '\u{2022}' | '\u{2013}' | '\u{2014}' => Some("-"),
        '\u{2018}' | '\u{2019}' => Some("'"),
        '\u{201c}' | '\u{201d}' => Some("\""),
        '\u{2026}' => Some("..."),
        '\u{00a0}' => Some(" "),
        _ => None,
    }
}

fn is_ascii_text(c: char) -> bool {
    c == '\n' || (' '..='~').contains(&c)
}

/// Replace characters the built-in fonts cannot encode with ASCII stand-ins.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if is_ascii_text(c) {
            out.push(c);
        } else {
            out.push_str(substitute(c).unwrap_or("?"));
        }
    }
    out
}

/// True when `normalize` keeps the character's meaning
pub fn is_renderable(c: char) -> bool {
    is_ascii_text(c) || substitute(c).is_some()
}

/// Width of a single line of text in points
pub fn text_width(text: &str, face: FontFace, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| advance(c, face) as u32).sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap. Explicit `\n` always breaks; a word wider than
/// `max_width` is kept whole on its own line.
pub fn wrap(text: &str, face: FontFace, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{} {}", current, word);
            if text_width(&candidate, face, size) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        lines.push(current);
    }

    lines
}
