use pdf_writer::{Content, Name, Rect, Str};

use crate::fonts::{StdFont, to_winansi_bytes};
use crate::model::{Target, WrappedText};

/// Spaces drawn in front of a continuation line.
const INDENT_SPACES: f32 = 3.0;

const LINK_RGB: [f32; 3] = [0.0, 0.2, 0.6];

pub(super) struct WordChunk {
    pub(super) text: String,
    pub(super) x_offset: f32, // x relative to cell text start
    pub(super) width: f32,
    pub(super) target: Option<Target>,
}

pub(super) struct TextLine {
    pub(super) chunks: Vec<WordChunk>,
}

pub(super) struct LinkAnnotation {
    pub(super) rect: Rect,
    pub(super) target: Target,
}

/// Re-flow planned lines so each fits `max_width` points. Planned breaks are
/// kept; a planned line that is still too wide breaks again between words.
/// No space is inserted between spans unless one side carries whitespace,
/// so `(` + `5.149` + `)` stays glued.
pub(super) fn build_cell_lines(
    text: &WrappedText,
    font: &StdFont,
    font_size: f32,
    max_width: f32,
) -> Vec<TextLine> {
    let space_w = font.space_width(font_size);
    let mut lines = Vec::new();

    for planned in text.lines() {
        let start_x = if planned.indent {
            space_w * INDENT_SPACES
        } else {
            0.0
        };
        let mut chunks: Vec<WordChunk> = Vec::new();
        let mut current_x = start_x;
        let mut prev_ended_with_ws = false;

        for span in &planned.spans {
            let starts_with_ws = span.text.starts_with(char::is_whitespace);
            for (i, word) in span.text.split_whitespace().enumerate() {
                let ww = font.word_width(word, font_size);
                let need_space =
                    !chunks.is_empty() && (i > 0 || starts_with_ws || prev_ended_with_ws);
                let proposed_x = if need_space {
                    current_x + space_w
                } else {
                    current_x
                };

                if !chunks.is_empty() && proposed_x + ww > max_width {
                    lines.push(TextLine {
                        chunks: std::mem::take(&mut chunks),
                    });
                    current_x = start_x;
                } else {
                    current_x = proposed_x;
                }

                chunks.push(WordChunk {
                    text: word.to_string(),
                    x_offset: current_x,
                    width: ww,
                    target: span.target.clone(),
                });
                current_x += ww;
            }
            if !span.text.is_empty() {
                prev_ended_with_ws = span.text.ends_with(char::is_whitespace);
            }
        }

        if !chunks.is_empty() {
            lines.push(TextLine { chunks });
        }
    }
    lines
}

/// Draw pre-built lines top-down from `first_baseline_y`, collecting link rects.
pub(super) fn render_lines(
    content: &mut Content,
    lines: &[TextLine],
    font: &StdFont,
    font_size: f32,
    x: f32,
    first_baseline_y: f32,
    line_pitch: f32,
    links: &mut Vec<LinkAnnotation>,
) {
    if lines.iter().all(|l| l.chunks.is_empty()) {
        return;
    }
    content.begin_text();
    content.set_font(Name(font.pdf_name.as_bytes()), font_size);
    let mut td_x = 0.0f32;
    let mut td_y = 0.0f32;
    let mut linked_color = false;

    for (line_num, line) in lines.iter().enumerate() {
        let y = first_baseline_y - line_num as f32 * line_pitch;
        for chunk in &line.chunks {
            let cx = x + chunk.x_offset;
            let is_link = chunk.target.is_some();
            if is_link != linked_color {
                if is_link {
                    content.set_fill_rgb(LINK_RGB[0], LINK_RGB[1], LINK_RGB[2]);
                } else {
                    content.set_fill_gray(0.0);
                }
                linked_color = is_link;
            }

            content.next_line(cx - td_x, y - td_y);
            td_x = cx;
            td_y = y;
            content.show(Str(&to_winansi_bytes(&chunk.text)));

            if let Some(ref target) = chunk.target {
                let bottom = y - font_size * 0.2;
                let top = y + font_size * 0.8;
                let merged = links.last_mut().filter(|prev| {
                    prev.target == *target && (prev.rect.y1 - bottom).abs() < 1.0
                });
                if let Some(prev) = merged {
                    prev.rect.x2 = cx + chunk.width;
                } else {
                    links.push(LinkAnnotation {
                        rect: Rect::new(cx, bottom, cx + chunk.width, top),
                        target: target.clone(),
                    });
                }
            }
        }
    }
    if linked_color {
        content.set_fill_gray(0.0);
    }
    content.end_text();
}
