use pdf_writer::{Name, Pdf, Ref};

use crate::layout::widths::helvetica_advance;

/// A standard Type1 font referenced by name (never embedded).
pub(crate) struct StdFont {
    pub(crate) pdf_name: &'static str,
    pub(crate) font_ref: Ref,
    widths_1000: Vec<f32>,
}

impl StdFont {
    pub(crate) fn helvetica(pdf: &mut Pdf, font_ref: Ref) -> Self {
        register(pdf, font_ref, b"Helvetica");
        Self {
            pdf_name: "F1",
            font_ref,
            widths_1000: helvetica_widths(),
        }
    }

    pub(crate) fn helvetica_bold(pdf: &mut Pdf, font_ref: Ref) -> Self {
        register(pdf, font_ref, b"Helvetica-Bold");
        Self {
            pdf_name: "F2",
            font_ref,
            widths_1000: helvetica_bold_widths(),
        }
    }

    /// Width of a single character in 1000-units (WinAnsi lookup).
    pub(crate) fn char_width_1000(&self, ch: char) -> f32 {
        let byte = char_to_winansi(ch);
        if byte >= 32 {
            self.widths_1000[(byte - 32) as usize]
        } else {
            0.0
        }
    }

    pub(crate) fn word_width(&self, word: &str, font_size: f32) -> f32 {
        word.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    pub(crate) fn space_width(&self, font_size: f32) -> f32 {
        self.char_width_1000(' ') * font_size / 1000.0
    }
}

fn register(pdf: &mut Pdf, font_ref: Ref, base_font: &[u8]) {
    pdf.type1_font(font_ref)
        .base_font(Name(base_font))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
}

/// Map a single Unicode char to its WinAnsi byte; unmappable chars become `?`.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => b'?',
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .filter(|c| !c.is_control())
        .map(char_to_winansi)
        .collect()
}

/// Helvetica widths at 1000 units/em for WinAnsi chars 32..=255. The wrapper's
/// alphabet uses the same table the planner measures with; other bytes get
/// approximate class widths.
fn helvetica_widths() -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| {
            let ch = b as char;
            if ch.is_ascii() && let Some(w) = helvetica_advance(ch) {
                return w;
            }
            match b {
                44 | 47 | 58 | 59 => 278.0,  // , / : ;
                33..=47 => 333.0,            // punctuation
                60..=62 => 584.0,            // < = >
                63 => 556.0,                 // ?
                64 => 1015.0,                // @
                91..=96 => 278.0,            // brackets etc.
                _ => 556.0,
            }
        })
        .collect()
}

/// Helvetica-Bold is wider in lowercase and punctuation; scale where it matters.
fn helvetica_bold_widths() -> Vec<f32> {
    helvetica_widths()
        .into_iter()
        .enumerate()
        .map(|(i, w)| match i as u8 + 32 {
            97..=122 => (w * 1.1).min(889.0),
            33..=47 | 58..=64 => w.max(333.0),
            _ => w,
        })
        .collect()
}
