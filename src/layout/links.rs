use std::collections::HashMap;

use crate::model::{Line, Span, Target, WrappedText};

/// Immutable identifier → URL mapping.
#[derive(Clone, Debug, Default)]
pub struct Lookup {
    urls: HashMap<String, String>,
}

impl Lookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys are trimmed; the first URL for a key wins.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut urls = HashMap::new();
        for (k, v) in pairs {
            let k: String = k.into();
            urls.entry(k.trim().to_string()).or_insert_with(|| v.into());
        }
        Self { urls }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.urls.get(id.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// The lookups a document build resolves against.
#[derive(Clone, Debug, Default)]
pub struct Lookups {
    pub documents: Lookup,
    pub standards: Lookup,
    pub receive_only_standards: Lookup,
}

impl Lookups {
    /// Receive-only standards resolve through the harmonised standards lookup.
    pub fn new(documents: Lookup, standards: Lookup) -> Self {
        Self {
            documents,
            receive_only_standards: standards.clone(),
            standards,
        }
    }

    pub fn with_receive_only(mut self, lookup: Lookup) -> Self {
        self.receive_only_standards = lookup;
        self
    }
}

/// Link one identifier; unknown ids come back as plain text.
pub fn link_identifier(id: &str, lookup: &Lookup, kind: &str) -> Span {
    match lookup.get(id) {
        Some(url) => Span {
            text: id.to_string(),
            target: Some(Target::Url(url.to_string())),
        },
        None => {
            log::warn!("Unresolved {kind} reference {id:?}; rendering without link");
            Span::plain(id)
        }
    }
}

/// Resolve a comma-separated list of document or standard identifiers.
/// One identifier per line; every line but the last keeps its comma.
pub fn link_list(text: &str, lookup: &Lookup, kind: &str) -> WrappedText {
    let ids: Vec<&str> = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let last = ids.len().saturating_sub(1);
    let lines = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let mut spans = vec![link_identifier(id, lookup, kind)];
            if i < last {
                spans.push(Span::plain(","));
            }
            Line {
                indent: false,
                spans,
            }
        })
        .collect();
    WrappedText::new(lines)
}
