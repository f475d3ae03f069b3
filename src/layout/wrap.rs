use crate::config::LayoutConfig;
use crate::error::Error;
use crate::model::{Line, Span, Target, WrappedText};

use super::footnotes::{FootnoteGlossary, FootnoteTracker, footnote_anchor, is_footnote_id};
use super::widths::WidthModel;

/// Split an allocation string on top-level commas. Commas inside parentheses
/// belong to a footnote list and do not separate groups.
pub fn split_groups(text: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                groups.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    groups.push(text[start..].trim());
    groups.retain(|g| !g.is_empty());
    groups
}

/// One "service(footnote, footnote, …)" group of an allocation entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceGroup {
    pub service: String,
    pub footnotes: Vec<String>,
}

impl ServiceGroup {
    /// Separate the service name from a trailing parenthesised footnote list.
    /// A trailing parenthesis whose content is not footnote ids stays part of the name.
    pub fn parse(group: &str) -> ServiceGroup {
        let group = group.trim();
        if let Some(open) = trailing_paren_start(group) {
            let inner = &group[open + 1..group.len() - 1];
            let ids: Vec<&str> = inner
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .collect();
            if !ids.is_empty() && ids.iter().all(|id| is_footnote_id(id)) {
                return ServiceGroup {
                    service: group[..open].trim().replace(',', ""),
                    footnotes: ids.into_iter().map(str::to_string).collect(),
                };
            }
        }
        ServiceGroup {
            service: group.replace(',', ""),
            footnotes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.service.is_empty() && self.footnotes.is_empty()
    }
}

/// Byte index of the `(` matching a final `)`.
fn trailing_paren_start(s: &str) -> Option<usize> {
    if !s.ends_with(')') {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in s.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Joiner {
    /// Separated from the previous token by a space.
    Space,
    /// Glued to the previous token (after a hyphen, or first on the line).
    Direct,
}

struct Token<'a> {
    text: &'a str,
    joiner: Joiner,
}

/// Split on spaces and hyphens. A hyphen stays at the end of its token so a
/// break after it keeps the hyphen on the upper line.
fn tokenize(s: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut joiner = Joiner::Direct;
    for (i, c) in s.char_indices() {
        if c.is_whitespace() {
            if let Some(st) = start.take() {
                tokens.push(Token {
                    text: &s[st..i],
                    joiner,
                });
            }
            joiner = Joiner::Space;
        } else if c == '-' {
            let st = start.take().unwrap_or(i);
            tokens.push(Token {
                text: &s[st..i + c.len_utf8()],
                joiner,
            });
            joiner = Joiner::Direct;
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(st) = start {
        tokens.push(Token {
            text: &s[st..],
            joiner,
        });
    }
    tokens
}

struct LineBuilder<'w> {
    widths: &'w WidthModel,
    max_width: f32,
    indent: f32,
    lines: Vec<Line>,
    current: Line,
    used: f32,
}

impl<'w> LineBuilder<'w> {
    fn new(widths: &'w WidthModel, max_width: f32, indent: f32) -> Self {
        Self {
            widths,
            max_width,
            indent,
            lines: Vec::new(),
            current: Line::default(),
            used: 0.0,
        }
    }

    /// Append an unbreakable unit made of `parts`, breaking before it when it overflows.
    fn push(&mut self, parts: Vec<Span>, joiner: Joiner) -> Result<(), Error> {
        let mut w = 0.0f32;
        for part in &parts {
            w += self.widths.text_width(&part.text)?;
        }
        let line_empty = self.current.spans.is_empty();
        let gap = if !line_empty && joiner == Joiner::Space {
            self.widths.width(' ')?
        } else {
            0.0
        };

        if !line_empty && self.used + gap + w > self.max_width {
            let full = std::mem::replace(
                &mut self.current,
                Line {
                    indent: true,
                    spans: Vec::new(),
                },
            );
            self.lines.push(full);
            self.used = self.indent;
        } else if gap > 0.0 {
            self.append(Span::plain(" "));
            self.used += gap;
        }

        for part in parts {
            self.append(part);
        }
        self.used += w;
        Ok(())
    }

    fn append(&mut self, span: Span) {
        if let Some(last) = self.current.spans.last_mut()
            && last.target == span.target
            && span.target.is_none()
        {
            last.text.push_str(&span.text);
            return;
        }
        self.current.spans.push(span);
    }

    fn finish(mut self) -> Vec<Line> {
        if !self.current.spans.is_empty() {
            self.lines.push(self.current);
        }
        self.lines
    }
}

/// Breaks allocation and footnote-list cells into lines using the width model.
pub struct Wrapper<'a> {
    widths: &'a WidthModel,
    max_width: f32,
    indent: f32,
}

impl<'a> Wrapper<'a> {
    pub fn new(widths: &'a WidthModel, config: &LayoutConfig) -> Self {
        Self {
            widths,
            max_width: config.max_line_width,
            indent: config.continuation_indent,
        }
    }

    /// Wrap a service allocation entry. Every group starts on a new line;
    /// continuation lines carry the indent marker. Footnote ids are recorded
    /// in `tracker` and linked to their appendix row when the glossary knows them.
    pub fn wrap_allocation(
        &self,
        text: &str,
        glossary: &FootnoteGlossary,
        tracker: &mut FootnoteTracker,
    ) -> Result<WrappedText, Error> {
        let mut lines = Vec::new();
        for raw in split_groups(text) {
            let group = ServiceGroup::parse(raw);
            if group.is_empty() {
                continue;
            }
            let mut builder = LineBuilder::new(self.widths, self.max_width, self.indent);
            for token in tokenize(&group.service) {
                builder.push(vec![Span::plain(token.text)], token.joiner)?;
            }

            // The first footnote opens the parenthesis, the one whose 1-based
            // index equals the list length closes it.
            let n = group.footnotes.len();
            for (i, id) in group.footnotes.iter().enumerate() {
                let k = i + 1;
                let mut parts = Vec::with_capacity(3);
                if k == 1 {
                    parts.push(Span::plain("("));
                }
                parts.push(footnote_span(id, glossary, tracker));
                if k == n {
                    parts.push(Span::plain(")"));
                }
                builder.push(parts, Joiner::Space)?;
            }
            lines.extend(builder.finish());
        }
        Ok(WrappedText::new(lines))
    }

    /// Wrap a per-row footnote list (`"5.149, 5.150"`): commas dropped, ids
    /// space separated and linked.
    pub fn wrap_footnote_list(
        &self,
        text: &str,
        glossary: &FootnoteGlossary,
        tracker: &mut FootnoteTracker,
    ) -> Result<WrappedText, Error> {
        let mut builder = LineBuilder::new(self.widths, self.max_width, self.indent);
        for id in text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
        {
            builder.push(vec![footnote_span(id, glossary, tracker)], Joiner::Space)?;
        }
        Ok(WrappedText::new(builder.finish()))
    }
}

fn footnote_span(id: &str, glossary: &FootnoteGlossary, tracker: &mut FootnoteTracker) -> Span {
    let first_seen = tracker.record(id, glossary);
    if glossary.contains(id) {
        Span {
            text: id.to_string(),
            target: Some(Target::Internal(footnote_anchor(id))),
        }
    } else {
        if first_seen {
            log::warn!("Unresolved footnote reference {id}; rendering without link");
        }
        Span::plain(id)
    }
}
