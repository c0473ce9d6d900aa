use anyhow::{Context, Result};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Polygon,
    Rgb,
};
use std::io::{BufWriter, Cursor};

use super::DocumentBackend;
use super::font::{FontMetrics, measure_text_width};
use super::layout::{BRAILLE_HEADING, Block, Layout, ORIGINAL_HEADING, SectionTable, TextStyle};
use crate::braille::BLANK_CELL;

pub const PDF_MIME: &str = "application/pdf";

// US Letter in points.
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const CONTENT_BOTTOM: f32 = PAGE_HEIGHT - MARGIN;

const TABLE_INSET: f32 = 12.0;
const CELL_PADDING_X: f32 = 6.0;
const CELL_PADDING_Y: f32 = 3.0;
const HEADER_PADDING_BOTTOM: f32 = 8.0;

const HEADER_GREY: f32 = 0.83;
const SHADE_GREY: f32 = 0.96;
const GRID_GREY: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FontSlot {
    Regular,
    Bold,
    Braille,
}

#[derive(Debug, Clone, Copy)]
struct Style {
    size: f32,
    leading: f32,
    space_after: f32,
    font: FontSlot,
}

const TITLE: Style = Style {
    size: 18.0,
    leading: 22.0,
    space_after: 6.0,
    font: FontSlot::Bold,
};
const HEADING: Style = Style {
    size: 14.0,
    leading: 17.0,
    space_after: 6.0,
    font: FontSlot::Bold,
};
const BODY: Style = Style {
    size: 10.0,
    leading: 12.0,
    space_after: 0.0,
    font: FontSlot::Regular,
};
const BRAILLE: Style = Style {
    size: 14.0,
    leading: 18.0,
    space_after: 12.0,
    font: FontSlot::Braille,
};
const CELL: Style = BODY;
const CELL_BRAILLE: Style = Style {
    font: FontSlot::Braille,
    ..BODY
};
const HEADER_CELL: Style = Style {
    size: 12.0,
    leading: 14.4,
    space_after: 0.0,
    font: FontSlot::Bold,
};

/// One drawing instruction in page coordinates: points, origin at the top-left.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawOp {
    Text {
        text: String,
        x: f32,
        baseline: f32,
        size: f32,
        font: FontSlot,
    },
    Fill {
        x: f32,
        top: f32,
        width: f32,
        height: f32,
        grey: f32,
    },
    Stroke {
        from: (f32, f32),
        to: (f32, f32),
        thickness: f32,
        grey: f32,
    },
}

pub(crate) type Page = Vec<DrawOp>;

#[derive(Debug, Clone, Default)]
pub struct PdfBackend {
    font: Option<FontMetrics>,
}

impl PdfBackend {
    pub fn new(font: Option<FontMetrics>) -> Self {
        Self { font }
    }
}

impl DocumentBackend for PdfBackend {
    fn mime(&self) -> &'static str {
        PDF_MIME
    }

    fn render(&self, layout: &Layout) -> Result<Vec<u8>> {
        let pages = plan(layout, self.font.as_ref());
        emit(&layout.title, &pages, self.font.as_ref())
    }
}

pub(crate) fn plan(layout: &Layout, font: Option<&FontMetrics>) -> Vec<Page> {
    let mut planner = Planner::new(font);
    for block in &layout.blocks {
        match block {
            Block::Title { text } => {
                let style = if text.is_ascii() {
                    TITLE
                } else {
                    Style {
                        font: FontSlot::Braille,
                        ..TITLE
                    }
                };
                planner.paragraph(text, style, true);
            }
            Block::Heading { text } => {
                planner.ensure(HEADING.leading + 2.0 * BODY.leading);
                planner.paragraph(text, HEADING, false);
            }
            Block::Paragraph { text, style } => {
                let style = match style {
                    TextStyle::Body => BODY,
                    TextStyle::Braille => BRAILLE,
                };
                planner.paragraph(text, style, false);
            }
            Block::Spacer { height } => planner.spacer(*height),
            Block::Table { table } => planner.table(table),
        }
    }
    planner.finish()
}

struct Planner<'a> {
    font: Option<&'a FontMetrics>,
    finished: Vec<Page>,
    current: Page,
    y: f32,
}

impl<'a> Planner<'a> {
    fn new(font: Option<&'a FontMetrics>) -> Self {
        Self {
            font,
            finished: Vec::new(),
            current: Vec::new(),
            y: MARGIN,
        }
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.is_empty() || self.finished.is_empty() {
            self.finished.push(self.current);
        }
        self.finished
    }

    fn break_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.finished.push(page);
        self.y = MARGIN;
    }

    fn remaining(&self) -> f32 {
        CONTENT_BOTTOM - self.y
    }

    fn at_page_top(&self) -> bool {
        self.y <= MARGIN
    }

    fn ensure(&mut self, height: f32) {
        if height > self.remaining() && !self.at_page_top() {
            self.break_page();
        }
    }

    fn measure(&self, text: &str, style: Style) -> f32 {
        let font = match style.font {
            FontSlot::Regular | FontSlot::Bold => None,
            FontSlot::Braille => self.font,
        };
        measure_text_width(text, style.size, font)
    }

    fn lines(&self, text: &str, style: Style, max_width: f32) -> Vec<String> {
        fit_lines(text, max_width, |candidate| self.measure(candidate, style))
    }

    fn paragraph(&mut self, text: &str, style: Style, centered: bool) {
        for line in self.lines(text, style, CONTENT_WIDTH) {
            self.ensure(style.leading);
            let x = if centered {
                MARGIN + (CONTENT_WIDTH - self.measure(&line, style)).max(0.0) / 2.0
            } else {
                MARGIN
            };
            self.current.push(DrawOp::Text {
                text: line,
                x,
                baseline: self.y + style.size,
                size: style.size,
                font: style.font,
            });
            self.y += style.leading;
        }
        self.spacer(style.space_after);
    }

    fn spacer(&mut self, height: f32) {
        if height <= 0.0 || self.at_page_top() {
            return;
        }
        if height >= self.remaining() {
            self.break_page();
        } else {
            self.y += height;
        }
    }

    fn table(&mut self, table: &SectionTable) {
        let column = (CONTENT_WIDTH - 2.0 * TABLE_INSET) / 2.0;
        let left = MARGIN + TABLE_INSET;
        let text_width = column - 2.0 * CELL_PADDING_X;
        let header_height = CELL_PADDING_Y + HEADER_CELL.leading + HEADER_PADDING_BOTTOM;
        let row_height = 2.0 * CELL_PADDING_Y + CELL.leading;

        self.ensure(header_height + row_height);
        let mut segment_top = self.y;
        self.table_header(left, column, header_height);

        for (index, row) in table.rows.iter().enumerate() {
            let original = self.lines(&row.original, CELL, text_width);
            let braille = self.lines(&row.braille, CELL_BRAILLE, text_width);
            let total = original.len().max(braille.len());
            let mut start = 0;
            while start < total {
                let fit = ((self.remaining() - 2.0 * CELL_PADDING_Y) / CELL.leading).floor();
                if fit < 1.0 {
                    self.close_segment(left, column, segment_top);
                    self.break_page();
                    segment_top = self.y;
                    self.table_header(left, column, header_height);
                    continue;
                }
                let take = (fit as usize).min(total - start);
                let height = 2.0 * CELL_PADDING_Y + take as f32 * CELL.leading;
                if index % 2 == 1 {
                    self.current.push(DrawOp::Fill {
                        x: left,
                        top: self.y,
                        width: 2.0 * column,
                        height,
                        grey: SHADE_GREY,
                    });
                }
                for offset in 0..take {
                    let baseline =
                        self.y + CELL_PADDING_Y + offset as f32 * CELL.leading + CELL.size;
                    let cells = [
                        (original.get(start + offset), left, CELL),
                        (braille.get(start + offset), left + column, CELL_BRAILLE),
                    ];
                    for (text, x, style) in cells {
                        if let Some(text) = text.filter(|text| !text.is_empty()) {
                            self.current.push(DrawOp::Text {
                                text: text.clone(),
                                x: x + CELL_PADDING_X,
                                baseline,
                                size: style.size,
                                font: style.font,
                            });
                        }
                    }
                }
                self.grid(left, column, height);
                self.y += height;
                start += take;
            }
        }
        self.close_segment(left, column, segment_top);
    }

    fn table_header(&mut self, left: f32, column: f32, height: f32) {
        self.current.push(DrawOp::Fill {
            x: left,
            top: self.y,
            width: 2.0 * column,
            height,
            grey: HEADER_GREY,
        });
        for (offset, label) in [(0.0, ORIGINAL_HEADING), (column, BRAILLE_HEADING)] {
            let width = self.measure(label, HEADER_CELL);
            self.current.push(DrawOp::Text {
                text: label.to_string(),
                x: left + offset + (column - width).max(0.0) / 2.0,
                baseline: self.y + CELL_PADDING_Y + HEADER_CELL.size,
                size: HEADER_CELL.size,
                font: HEADER_CELL.font,
            });
        }
        self.grid(left, column, height);
        self.y += height;
    }

    fn grid(&mut self, left: f32, column: f32, height: f32) {
        let bottom = self.y + height;
        self.current.push(DrawOp::Stroke {
            from: (left + column, self.y),
            to: (left + column, bottom),
            thickness: 0.5,
            grey: GRID_GREY,
        });
        self.current.push(DrawOp::Stroke {
            from: (left, bottom),
            to: (left + 2.0 * column, bottom),
            thickness: 0.5,
            grey: GRID_GREY,
        });
    }

    fn close_segment(&mut self, left: f32, column: f32, top: f32) {
        let right = left + 2.0 * column;
        let bottom = self.y;
        let edges = [
            ((left, top), (right, top)),
            ((right, top), (right, bottom)),
            ((right, bottom), (left, bottom)),
            ((left, bottom), (left, top)),
        ];
        for (from, to) in edges {
            self.current.push(DrawOp::Stroke {
                from,
                to,
                thickness: 1.0,
                grey: 0.0,
            });
        }
    }
}

fn is_break(ch: char) -> bool {
    ch == ' ' || ch == BLANK_CELL
}

/// Greedy line filling by measured width. Breaks after spaces or blank cells;
/// a word wider than the line is split between characters.
fn fit_lines(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for chunk in text.split_inclusive(is_break) {
        let candidate = format!("{}{}", current, chunk);
        if measure(candidate.trim_end_matches(is_break)) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(current.trim_end_matches(is_break).to_string());
            current.clear();
        }
        if measure(chunk.trim_end_matches(is_break)) <= max_width {
            current.push_str(chunk);
            continue;
        }
        for ch in chunk.chars() {
            current.push(ch);
            if current.chars().count() > 1 && measure(current.trim_end_matches(is_break)) > max_width
            {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(ch);
            }
        }
    }
    let last = current.trim_end_matches(is_break);
    if !last.is_empty() || lines.is_empty() {
        lines.push(last.to_string());
    }
    lines
}

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

fn grey(level: f32) -> Color {
    Color::Rgb(Rgb::new(level, level, level, None))
}

fn point(x: f32, y: f32) -> Point {
    Point::new(mm(x), mm(PAGE_HEIGHT - y))
}

/// Where a slot's glyphs come from. Latin text always stays on the built-in
/// Helvetica faces; only Braille runs use the embedded font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FontFace {
    Helvetica,
    HelveticaBold,
    Embedded,
}

fn face_for(slot: FontSlot, embedded: bool) -> FontFace {
    match slot {
        FontSlot::Regular => FontFace::Helvetica,
        FontSlot::Bold => FontFace::HelveticaBold,
        FontSlot::Braille if embedded => FontFace::Embedded,
        FontSlot::Braille => FontFace::Helvetica,
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    braille: Option<IndirectFontRef>,
}

impl Fonts {
    fn get(&self, slot: FontSlot) -> &IndirectFontRef {
        match (face_for(slot, self.braille.is_some()), &self.braille) {
            (FontFace::Embedded, Some(braille)) => braille,
            (FontFace::HelveticaBold, _) => &self.bold,
            _ => &self.regular,
        }
    }
}

fn emit(title: &str, pages: &[Page], font: Option<&FontMetrics>) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .with_context(|| "failed to load built-in font")?;
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .with_context(|| "failed to load built-in font")?;
    let braille = match font {
        Some(metrics) => Some(
            doc.add_external_font(Cursor::new(metrics.data().to_vec()))
                .with_context(|| "failed to embed font")?,
        ),
        None => None,
    };
    let fonts = Fonts {
        regular,
        bold,
        braille,
    };

    for (index, ops) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) =
                doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), format!("Layer {}", index + 1));
            doc.get_page(page).get_layer(layer)
        };
        draw_page(&layer, ops, &fonts);
    }

    let mut buffer = Vec::new();
    {
        let mut writer = BufWriter::new(&mut buffer);
        doc.save(&mut writer)
            .with_context(|| "failed to write pdf")?;
    }
    Ok(buffer)
}

fn draw_page(layer: &PdfLayerReference, ops: &[DrawOp], fonts: &Fonts) {
    for op in ops {
        match op {
            DrawOp::Text {
                text,
                x,
                baseline,
                size,
                font,
            } => {
                layer.use_text(
                    text.clone(),
                    *size,
                    mm(*x),
                    mm(PAGE_HEIGHT - baseline),
                    fonts.get(*font),
                );
            }
            DrawOp::Fill {
                x,
                top,
                width,
                height,
                grey: level,
            } => {
                let ring = vec![
                    (point(*x, *top), false),
                    (point(x + width, *top), false),
                    (point(x + width, top + height), false),
                    (point(*x, top + height), false),
                ];
                layer.set_fill_color(grey(*level));
                layer.add_polygon(Polygon {
                    rings: vec![ring],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                });
                layer.set_fill_color(grey(0.0));
            }
            DrawOp::Stroke {
                from,
                to,
                thickness,
                grey: level,
            } => {
                layer.set_outline_color(grey(*level));
                layer.set_outline_thickness(*thickness);
                layer.add_line(Line {
                    points: vec![(point(from.0, from.1), false), (point(to.0, to.1), false)],
                    is_closed: false,
                });
            }
        }
    }
}
