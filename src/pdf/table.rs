use crate::fonts::StdFont;
use crate::model::{Section, TableBlock, TableKind};

use super::Canvas;
use super::layout::{TextLine, build_cell_lines, render_lines};

pub(super) const FONT_SIZE: f32 = 8.0;
pub(super) const LINE_PITCH: f32 = 10.0;
const CELL_PAD: f32 = 3.0;
const BORDER_WIDTH: f32 = 0.5;
const HEADER_GRAY: f32 = 0.85;

/// Relative column widths; scaled to the usable page width.
const MAIN_WIDTHS: [f32; 6] = [150.0, 150.0, 130.0, 95.0, 60.0, 200.0];
const GLOSSARY_WIDTHS: [f32; 2] = [120.0, 665.0];

fn column_widths(section: Section) -> Vec<f32> {
    let base: &[f32] = match section {
        Section::MainTable => &MAIN_WIDTHS,
        _ => &GLOSSARY_WIDTHS,
    };
    let total: f32 = base.iter().sum();
    let scale = Canvas::usable_width() / total;
    base.iter().map(|w| w * scale).collect()
}

struct RowLayout {
    cells: Vec<Vec<TextLine>>,
    height: f32,
    anchor: Option<String>,
}

fn row_height(cells: &[Vec<TextLine>]) -> f32 {
    let lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
    lines as f32 * LINE_PITCH + 2.0 * CELL_PAD
}

fn layout_rows(block: &TableBlock, font: &StdFont, widths: &[f32]) -> Vec<RowLayout> {
    block
        .rows
        .iter()
        .map(|row| {
            let cells: Vec<Vec<TextLine>> = widths
                .iter()
                .enumerate()
                .map(|(ci, w)| match row.cells.get(ci) {
                    Some(text) => build_cell_lines(text, font, FONT_SIZE, w - 2.0 * CELL_PAD),
                    None => Vec::new(),
                })
                .collect();
            RowLayout {
                height: row_height(&cells),
                cells,
                anchor: row.anchor.clone(),
            }
        })
        .collect()
}

fn block_font<'f>(canvas: &Canvas<'f>, block: &TableBlock) -> &'f StdFont {
    match block.kind {
        TableKind::ColumnHeader => canvas.bold,
        TableKind::Band | TableKind::Glossary => canvas.regular,
    }
}

/// Rendered height of a block in points, ignoring page splits.
pub(super) fn block_height(canvas: &Canvas<'_>, block: &TableBlock) -> f32 {
    let widths = column_widths(block.section);
    let font = block_font(canvas, block);
    let rows = layout_rows(block, font, &widths);
    spanned_height(&rows, block.span_columns)
}

/// A band's spanned columns belong to row 0 but may be taller than it.
fn spanned_height(rows: &[RowLayout], span_columns: usize) -> f32 {
    let rows_total: f32 = rows.iter().map(|r| r.height).sum();
    match rows.first() {
        Some(first) if span_columns > 0 => {
            let spanned = row_height(&first.cells[..span_columns.min(first.cells.len())]);
            rows_total.max(spanned)
        }
        _ => rows_total,
    }
}

/// Draw a table block at the canvas cursor. A block that does not fit moves
/// to a fresh page; rows that still overflow spill onto following pages.
pub(super) fn draw_block(canvas: &mut Canvas<'_>, block: &TableBlock) {
    let widths = column_widths(block.section);
    let font = block_font(canvas, block);
    let mut rows = layout_rows(block, font, &widths);
    if rows.is_empty() {
        return;
    }

    let span = if block.kind == TableKind::Band {
        block.span_columns.min(widths.len())
    } else {
        0
    };
    if span > 0 {
        // Spanned text is drawn once; the rows underneath grow to hold it.
        let needed = spanned_height(&rows, span);
        let have: f32 = rows.iter().map(|r| r.height).sum();
        if let Some(last) = rows.last_mut() {
            last.height += needed - have;
        }
    }

    let total = spanned_height(&rows, span);
    canvas.ensure_space(total);

    let left = Canvas::left();
    let mut segment_top = canvas.y;
    let mut spanned_drawn = false;

    for (ri, row) in rows.iter().enumerate() {
        if canvas.y - row.height < Canvas::bottom() && !canvas.at_page_top() {
            close_spanned_columns(canvas, &widths, span, segment_top);
            canvas.new_page();
            segment_top = canvas.y;
        }
        let row_top = canvas.y;
        if let Some(slug) = &row.anchor {
            canvas.mark_anchor(slug, row_top);
        }

        if block.kind == TableKind::ColumnHeader {
            let width: f32 = widths.iter().sum();
            canvas
                .content
                .set_fill_gray(HEADER_GRAY)
                .rect(left, row_top - row.height, width, row.height)
                .fill_nonzero()
                .set_fill_gray(0.0);
        }

        let mut x = left;
        for (ci, lines) in row.cells.iter().enumerate() {
            let width = widths[ci];
            let draw_text = ci >= span || (ri == 0 && !spanned_drawn);
            if draw_text {
                render_lines(
                    &mut canvas.content,
                    lines,
                    font,
                    FONT_SIZE,
                    x + CELL_PAD,
                    row_top - CELL_PAD - FONT_SIZE * 0.8,
                    LINE_PITCH,
                    &mut canvas.links,
                );
            }
            if ci >= span {
                stroke_cell(canvas, x, row_top - row.height, width, row.height);
            }
            x += width;
        }
        spanned_drawn = true;
        canvas.y = row_top - row.height;
    }
    close_spanned_columns(canvas, &widths, span, segment_top);
}

fn close_spanned_columns(canvas: &mut Canvas<'_>, widths: &[f32], span: usize, top: f32) {
    let bottom = canvas.y;
    let height = top - bottom;
    if span == 0 || height <= 0.0 {
        return;
    }
    let mut x = Canvas::left();
    for &width in &widths[..span] {
        stroke_cell(canvas, x, bottom, width, height);
        x += width;
    }
}

fn stroke_cell(canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32, height: f32) {
    canvas
        .content
        .set_line_width(BORDER_WIDTH)
        .rect(x, y, width, height)
        .stroke();
}
