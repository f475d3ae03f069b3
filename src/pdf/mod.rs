mod layout;
mod table;

use std::collections::HashMap;

use pdf_writer::types::{ActionType, AnnotationType};
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::error::Error;
use crate::fonts::{StdFont, to_winansi_bytes};
use crate::model::{Bookmark, Heading, Instruction, Plan, Target};

use layout::LinkAnnotation;
use table::{block_height, draw_block};

/// Landscape A4 in points.
const PAGE_WIDTH: f32 = 841.89;
const PAGE_HEIGHT: f32 = 595.28;
/// 1 cm.
const MARGIN: f32 = 28.35;
const FOOTER_SIZE: f32 = 8.0;
const FOOTER_GAP: f32 = 14.0;

struct OutlineEntry {
    title: String,
    level: u8,
    page: usize,
    y: f32,
}

struct FinishedPage {
    content: Content,
    links: Vec<LinkAnnotation>,
}

/// Drawing cursor over a growing list of pages.
struct Canvas<'f> {
    regular: &'f StdFont,
    bold: &'f StdFont,
    content: Content,
    links: Vec<LinkAnnotation>,
    /// Top of the free area on the current page.
    y: f32,
    pages: Vec<FinishedPage>,
    anchors: HashMap<String, (usize, f32)>,
    pending_bookmarks: Vec<Bookmark>,
    outline: Vec<OutlineEntry>,
}

impl<'f> Canvas<'f> {
    fn new(regular: &'f StdFont, bold: &'f StdFont) -> Self {
        Self {
            regular,
            bold,
            content: Content::new(),
            links: Vec::new(),
            y: Self::top(),
            pages: Vec::new(),
            anchors: HashMap::new(),
            pending_bookmarks: Vec::new(),
            outline: Vec::new(),
        }
    }

    fn top() -> f32 {
        PAGE_HEIGHT - MARGIN
    }

    fn bottom() -> f32 {
        MARGIN + FOOTER_GAP
    }

    fn left() -> f32 {
        MARGIN
    }

    fn usable_width() -> f32 {
        PAGE_WIDTH - 2.0 * MARGIN
    }

    fn page_index(&self) -> usize {
        self.pages.len()
    }

    fn at_page_top(&self) -> bool {
        (self.y - Self::top()).abs() < 0.5
    }

    /// Break unless `height` fits below the cursor or the page is still empty.
    fn ensure_space(&mut self, height: f32) {
        if !self.at_page_top() && self.y - height < Self::bottom() {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        self.draw_footer();
        self.pages.push(FinishedPage {
            content: std::mem::replace(&mut self.content, Content::new()),
            links: std::mem::take(&mut self.links),
        });
        self.y = Self::top();
    }

    /// First registration of a slug wins.
    fn mark_anchor(&mut self, slug: &str, y: f32) {
        let page = self.page_index();
        self.anchors.entry(slug.to_string()).or_insert((page, y));
    }

    /// Pin queued bookmarks to the cursor position.
    fn flush_bookmarks(&mut self) {
        let page = self.page_index();
        for b in self.pending_bookmarks.drain(..) {
            self.outline.push(OutlineEntry {
                title: b.title,
                level: b.level,
                page,
                y: self.y,
            });
        }
    }

    fn draw_footer(&mut self) {
        let text = format!("Page {}", self.page_index() + 1);
        let width = self.regular.word_width(&text, FOOTER_SIZE);
        self.content
            .begin_text()
            .set_font(Name(self.regular.pdf_name.as_bytes()), FOOTER_SIZE)
            .next_line(PAGE_WIDTH - MARGIN - width, MARGIN)
            .show(Str(&to_winansi_bytes(&text)))
            .end_text();
    }

    fn heading(&mut self, heading: &Heading, keep_with: f32) {
        let (size, height) = match heading.level {
            0 => (16.0, 28.0),
            _ => (11.0, 18.0),
        };
        let room = Self::top() - Self::bottom();
        self.ensure_space((height + keep_with).min(room));
        self.flush_bookmarks();
        self.mark_anchor(&heading.slug, self.y);
        let font = self.bold;
        self.content
            .begin_text()
            .set_font(Name(font.pdf_name.as_bytes()), size)
            .next_line(Self::left(), self.y - size)
            .show(Str(&to_winansi_bytes(&heading.text)))
            .end_text();
        self.y -= height;
    }

    fn finish(mut self) -> (Vec<FinishedPage>, HashMap<String, (usize, f32)>, Vec<OutlineEntry>) {
        self.flush_bookmarks();
        self.new_page();
        (self.pages, self.anchors, self.outline)
    }
}

/// Render a layout plan to PDF bytes.
pub(crate) fn render(plan: &Plan) -> Result<Vec<u8>, Error> {
    if plan.instructions.is_empty() {
        return Err(Error::Pdf("plan has no instructions".into()));
    }
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let regular = StdFont::helvetica(&mut pdf, alloc());
    let bold = StdFont::helvetica_bold(&mut pdf, alloc());

    // Phase 1: lay out instructions onto pages
    let mut canvas = Canvas::new(&regular, &bold);
    for (i, instruction) in plan.instructions.iter().enumerate() {
        match instruction {
            Instruction::AddBookmark(b) => canvas.pending_bookmarks.push(b.clone()),
            Instruction::AddHeading(h) => {
                let keep_with = match plan.instructions.get(i + 1) {
                    Some(Instruction::AddTableBlock(next)) => block_height(&canvas, next),
                    _ => 0.0,
                };
                canvas.heading(h, keep_with);
            }
            Instruction::AddTableBlock(block) => {
                canvas.flush_bookmarks();
                draw_block(&mut canvas, block);
            }
            Instruction::AddPageBreak => {
                if !canvas.at_page_top() {
                    canvas.new_page();
                }
            }
        }
    }
    let (pages, anchors, outline) = canvas.finish();
    let t_layout = t0.elapsed();

    // Phase 2: allocate page and content IDs now that page count is known
    let n = pages.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    let mut unresolved = 0usize;
    let page_annot_refs: Vec<Vec<Ref>> = pages
        .iter()
        .map(|page| {
            page.links
                .iter()
                .filter_map(|link| {
                    let internal = match &link.target {
                        Target::Internal(slug) => match anchors.get(slug) {
                            Some(&found) => Some(found),
                            None => {
                                unresolved += 1;
                                return None;
                            }
                        },
                        Target::Url(_) => None,
                    };
                    let annot_ref = alloc();
                    let mut annot = pdf.annotation(annot_ref);
                    annot
                        .subtype(AnnotationType::Link)
                        .rect(link.rect)
                        .border(0.0, 0.0, 0.0, None);
                    match (&link.target, internal) {
                        (Target::Url(url), _) => {
                            annot
                                .action()
                                .action_type(ActionType::Uri)
                                .uri(Str(url.as_bytes()));
                        }
                        (Target::Internal(_), Some((page, y))) => {
                            annot
                                .action()
                                .action_type(ActionType::GoTo)
                                .destination()
                                .page(page_ids[page])
                                .xyz(MARGIN, y, None);
                        }
                        (Target::Internal(_), None) => {}
                    }
                    Some(annot_ref)
                })
                .collect()
        })
        .collect();
    if unresolved > 0 {
        log::warn!("{unresolved} internal links point at missing anchors and were dropped");
    }

    // Phase 3: document outline
    let outline_id = write_outline(&mut pdf, &mut alloc, &outline, &page_ids);
    let t_links = t0.elapsed();

    for (i, page) in pages.into_iter().enumerate() {
        let raw = page.content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
    }

    {
        let mut catalog = pdf.catalog(catalog_id);
        catalog.pages(pages_id);
        if let Some(id) = outline_id {
            catalog.outlines(id);
        }
    }
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    let font_pairs = [
        (regular.pdf_name, regular.font_ref),
        (bold.pdf_name, bold.font_ref),
    ];
    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
            .parent(pages_id)
            .contents(content_ids[i]);
        if !page_annot_refs[i].is_empty() {
            page.annotations(page_annot_refs[i].iter().copied());
        }
        let mut resources = page.resources();
        let mut fonts = resources.fonts();
        for (name, font_ref) in &font_pairs {
            fonts.pair(Name(name.as_bytes()), *font_ref);
        }
    }
    let t_assembly = t0.elapsed();

    log::info!(
        "Render phases: layout={:.1}ms, links={:.1}ms, assembly={:.1}ms ({} pages, {} outline entries)",
        t_layout.as_secs_f64() * 1000.0,
        (t_links - t_layout).as_secs_f64() * 1000.0,
        (t_assembly - t_links).as_secs_f64() * 1000.0,
        n,
        outline.len(),
    );

    Ok(pdf.finish())
}

/// Write a two-level outline: level-0 entries are roots, level-1 entries
/// nest under the nearest preceding root. Returns `None` when empty.
fn write_outline(
    pdf: &mut Pdf,
    alloc: &mut dyn FnMut() -> Ref,
    entries: &[OutlineEntry],
    page_ids: &[Ref],
) -> Option<Ref> {
    if entries.is_empty() {
        return None;
    }
    let outline_id = alloc();
    let item_ids: Vec<Ref> = entries.iter().map(|_| alloc()).collect();

    let mut parents: Vec<Option<usize>> = Vec::with_capacity(entries.len());
    let mut last_root: Option<usize> = None;
    for (i, entry) in entries.iter().enumerate() {
        if entry.level == 0 {
            last_root = Some(i);
            parents.push(None);
        } else {
            parents.push(last_root);
        }
    }

    let roots: Vec<usize> = (0..entries.len()).filter(|&i| parents[i].is_none()).collect();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); entries.len()];
    for (i, parent) in parents.iter().enumerate() {
        if let Some(p) = parent {
            children[*p].push(i);
        }
    }

    let write_siblings = |pdf: &mut Pdf, siblings: &[usize], parent: Ref| {
        for (k, &i) in siblings.iter().enumerate() {
            let entry = &entries[i];
            let mut item = pdf.outline_item(item_ids[i]);
            item.title(TextStr(&entry.title)).parent(parent);
            if k > 0 {
                item.prev(item_ids[siblings[k - 1]]);
            }
            if let Some(&next) = siblings.get(k + 1) {
                item.next(item_ids[next]);
            }
            let kids = &children[i];
            if let (Some(&first), Some(&last)) = (kids.first(), kids.last()) {
                // Negative count: closed by default.
                item.first(item_ids[first])
                    .last(item_ids[last])
                    .count(-(kids.len() as i32));
            }
            let page = page_ids[entry.page.min(page_ids.len() - 1)];
            item.dest().page(page).xyz(MARGIN, entry.y, None);
        }
    };

    write_siblings(pdf, &roots, outline_id);
    for &root in &roots {
        write_siblings(pdf, &children[root], item_ids[root]);
    }

    let first = item_ids[roots[0]];
    let last = item_ids[roots[roots.len() - 1]];
    pdf.outline(outline_id)
        .first(first)
        .last(last)
        .count(roots.len() as i32);
    Some(outline_id)
}
