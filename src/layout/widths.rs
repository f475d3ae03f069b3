use std::collections::HashMap;

use crate::error::Error;

/// Helvetica/Arial advance widths at 1000 units/em for the restricted
/// alphabet the wrapper accepts (letters, digits, space, `-`, `.`, `(`, `)`).
const HELVETICA_1000: &[(char, u16)] = &[
    ('A', 667), ('B', 667), ('C', 722), ('D', 722), ('E', 667), ('F', 611),
    ('G', 778), ('H', 722), ('I', 278), ('J', 500), ('K', 667), ('L', 556),
    ('M', 833), ('N', 722), ('O', 778), ('P', 667), ('Q', 778), ('R', 722),
    ('S', 667), ('T', 611), ('U', 722), ('V', 667), ('W', 944), ('X', 667),
    ('Y', 667), ('Z', 611),
    ('a', 556), ('b', 556), ('c', 500), ('d', 556), ('e', 556), ('f', 278),
    ('g', 556), ('h', 556), ('i', 222), ('j', 222), ('k', 500), ('l', 222),
    ('m', 833), ('n', 556), ('o', 556), ('p', 556), ('q', 556), ('r', 333),
    ('s', 500), ('t', 278), ('u', 556), ('v', 500), ('w', 722), ('x', 500),
    ('y', 500), ('z', 500),
    ('0', 556), ('1', 556), ('2', 556), ('3', 556), ('4', 556), ('5', 556),
    ('6', 556), ('7', 556), ('8', 556), ('9', 556),
    (' ', 278), ('-', 333), ('.', 278), ('(', 333), (')', 333),
];

/// Glyph every relative width is measured against.
const HELVETICA_REFERENCE: char = 'A';

/// Helvetica advance of `ch` at 1000 units/em, if it is in the alphabet.
/// The renderer's font metrics come from here too.
pub(crate) fn helvetica_advance(ch: char) -> Option<f32> {
    HELVETICA_1000
        .iter()
        .find(|&&(c, _)| c == ch)
        .map(|&(_, w)| f32::from(w))
}

/// Per-character relative widths, normalized to one reference glyph.
#[derive(Clone, Debug)]
pub struct WidthModel {
    widths: HashMap<char, f32>,
}

impl WidthModel {
    /// Build from absolute advances; every width is divided by the advance of `reference`.
    /// Returns `None` when the reference glyph is missing or has no width.
    pub fn from_advances(
        reference: char,
        advances: impl IntoIterator<Item = (char, f32)>,
    ) -> Option<Self> {
        let advances: HashMap<char, f32> = advances.into_iter().collect();
        let reference_w = *advances.get(&reference)?;
        if reference_w <= 0.0 {
            return None;
        }
        let widths = advances
            .into_iter()
            .filter(|&(_, w)| w > 0.0)
            .map(|(c, w)| (c, w / reference_w))
            .collect();
        Some(Self { widths })
    }

    /// Helvetica metrics calibrated against `A`.
    pub fn helvetica() -> Self {
        let reference = helvetica_advance(HELVETICA_REFERENCE).unwrap_or(1.0);
        let widths = HELVETICA_1000
            .iter()
            .map(|&(c, w)| (c, f32::from(w) / reference))
            .collect();
        Self { widths }
    }

    pub fn width(&self, ch: char) -> Result<f32, Error> {
        self.widths
            .get(&ch)
            .copied()
            .ok_or(Error::MissingGlyphWidth { ch, location: None })
    }

    pub fn text_width(&self, text: &str) -> Result<f32, Error> {
        text.chars().try_fold(0.0, |acc, ch| Ok(acc + self.width(ch)?))
    }

    pub fn contains(&self, ch: char) -> bool {
        self.widths.contains_key(&ch)
    }
}

impl Default for WidthModel {
    fn default() -> Self {
        Self::helvetica()
    }
}
