use std::collections::{HashMap, HashSet};

use crate::model::{FootnoteReference, Row, slugify};

/// True for identifiers in footnote syntax: `5.xxx` (Radio Regulations) or `ECAxx`.
pub fn is_footnote_id(s: &str) -> bool {
    let s = s.trim();
    (s.starts_with("5.") && s.len() > 2) || (s.starts_with("ECA") && s.len() > 3)
}

/// Anchor slug of a footnote's appendix row.
pub fn footnote_anchor(id: &str) -> String {
    format!("fn_{}", slugify(id))
}

/// Footnote identifier → text, built from the footnote-text sections.
#[derive(Clone, Debug, Default)]
pub struct FootnoteGlossary {
    texts: HashMap<String, String>,
}

impl FootnoteGlossary {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a Row>) -> Self {
        let mut texts = HashMap::new();
        for row in rows {
            let key = row.glossary_key();
            if key.is_empty() {
                continue;
            }
            if texts.contains_key(key) {
                log::warn!("Duplicate footnote {key} in glossary; keeping the first text");
                continue;
            }
            texts.insert(key.to_string(), row.glossary_text());
        }
        Self { texts }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.texts.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.texts.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Footnote identifiers referenced by the main table (the ReferencedFootnoteSet).
///
/// Filled while the main table is wrapped; the appendix only renders footnotes
/// for which [`FootnoteTracker::contains`] is true.
#[derive(Clone, Debug, Default)]
pub struct FootnoteTracker {
    seen: HashSet<String>,
    references: Vec<FootnoteReference>,
}

impl FootnoteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reference. Returns `false` when the id was already recorded.
    pub fn record(&mut self, id: &str, glossary: &FootnoteGlossary) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        self.seen.insert(id.to_string());
        self.references.push(FootnoteReference {
            id: id.to_string(),
            text: glossary.get(id).map(str::to_string),
        });
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// References in first-encounter order.
    pub fn references(&self) -> &[FootnoteReference] {
        &self.references
    }

    pub fn into_references(self) -> Vec<FootnoteReference> {
        self.references
    }
}
