//! Itinerary markdown to PDF.
//!
//! The conversion is a deliberately small line classifier rather than a
//! markdown engine: every input line becomes exactly one block followed by a
//! fixed spacer. `## ` lines are headings, `- ` lines are single-item bullet
//! entries and everything else is a paragraph. Consecutive bullets are not
//! merged and no other heading level is recognised.

use chrono::{DateTime, Local, TimeZone};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::io::BufWriter;
use thiserror::Error;

pub const FILE_NAME: &str = "travel_plan.pdf";
pub const MIME_TYPE: &str = "application/pdf";
pub const TITLE: &str = "AI Travel Guide Plan";

const HEADING_MARKER: &str = "## ";
const BULLET_MARKER: &str = "- ";
const LINE_SPACER: f32 = 4.0;

// US letter, in points
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN_SIDE: f32 = 0.5 * 72.0;
const MARGIN_TOP_BOTTOM: f32 = 0.7 * 72.0;
const BULLET_INDENT: f32 = 18.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("font error: {0}")]
    Font(String),
    #[error("failed to write PDF: {0}")]
    Write(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Meta(String),
    Heading(String),
    Bullet(String),
    Paragraph(String),
    /// Vertical gap in points.
    Spacer(f32),
}

pub fn classify_line(line: &str) -> Block {
    if let Some(rest) = line.strip_prefix(HEADING_MARKER) {
        Block::Heading(rest.to_string())
    } else if let Some(rest) = line.strip_prefix(BULLET_MARKER) {
        Block::Bullet(rest.to_string())
    } else if line.is_empty() {
        Block::Paragraph(" ".to_string())
    } else {
        Block::Paragraph(line.to_string())
    }
}

/// Splits on `\n` only. A single trailing newline does not add an empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    let body = text.strip_suffix('\n').unwrap_or(text);
    body.split('\n').collect()
}

pub fn document_flow(itinerary: &str) -> Vec<Block> {
    let mut flow = Vec::new();
    for line in split_lines(itinerary) {
        flow.push(classify_line(line));
        flow.push(Block::Spacer(LINE_SPACER));
    }
    flow
}

/// Title block, timestamp and the itinerary flow, in page order.
pub fn build_story<Tz: TimeZone>(itinerary: &str, generated_at: &DateTime<Tz>) -> Vec<Block>
where
    Tz::Offset: std::fmt::Display,
{
    let mut story = vec![
        Block::Title(TITLE.to_string()),
        Block::Spacer(10.0),
        Block::Meta(format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M"))),
        Block::Spacer(12.0),
    ];
    story.extend(document_flow(itinerary));
    story
}

pub fn render(itinerary: &str) -> Result<Vec<u8>, RenderError> {
    render_at(itinerary, &Local::now())
}

pub fn render_at<Tz: TimeZone>(itinerary: &str, generated_at: &DateTime<Tz>) -> Result<Vec<u8>, RenderError>
where
    Tz::Offset: std::fmt::Display,
{
    let story = build_story(itinerary, generated_at);
    let pages = layout(&story);
    write_pdf(&pages)
}

// --- Layout ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy)]
struct Style {
    font: FontKind,
    size: f32,
    leading: f32,
    space_before: f32,
    space_after: f32,
    indent: f32,
    centered: bool,
}

const TITLE_STYLE: Style = Style { font: FontKind::Bold, size: 18.0, leading: 22.0, space_before: 0.0, space_after: 6.0, indent: 0.0, centered: true };
const META_STYLE: Style = Style { font: FontKind::Regular, size: 10.0, leading: 12.0, space_before: 0.0, space_after: 0.0, indent: 0.0, centered: false };
const HEADING_STYLE: Style = Style { font: FontKind::Bold, size: 14.0, leading: 18.0, space_before: 12.0, space_after: 6.0, indent: 0.0, centered: false };
const BODY_STYLE: Style = Style { font: FontKind::Regular, size: 10.0, leading: 12.0, space_before: 6.0, space_after: 0.0, indent: 0.0, centered: false };
const BULLET_STYLE: Style = Style { indent: BULLET_INDENT, ..BODY_STYLE };

/// One run of text at an absolute baseline position (points, origin bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub text: String,
    pub font: FontKind,
    pub size: f32,
    pub x: f32,
    pub y: f32,
}

struct Cursor {
    pages: Vec<Vec<Placed>>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self { pages: vec![Vec::new()], y: top() }
    }

    fn at_top(&self) -> bool { self.y >= top() }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = top();
    }

    fn place(&mut self, placed: Placed) {
        if let Some(page) = self.pages.last_mut() {
            page.push(placed);
        }
    }
}

fn top() -> f32 { PAGE_HEIGHT - MARGIN_TOP_BOTTOM }
fn bottom() -> f32 { MARGIN_TOP_BOTTOM }
fn frame_width() -> f32 { PAGE_WIDTH - 2.0 * MARGIN_SIDE }

pub fn layout(story: &[Block]) -> Vec<Vec<Placed>> {
    let mut cursor = Cursor::new();
    for block in story {
        match block {
            Block::Spacer(h) => {
                let h = *h;
                // gaps are dropped at a page break
                if cursor.y - h < bottom() {
                    cursor.new_page();
                } else {
                    cursor.y -= h;
                }
            }
            Block::Title(t) => place_text(&mut cursor, t, TITLE_STYLE, None),
            Block::Meta(t) => place_text(&mut cursor, t, META_STYLE, None),
            Block::Heading(t) => place_text(&mut cursor, t, HEADING_STYLE, None),
            Block::Paragraph(t) => place_text(&mut cursor, t, BODY_STYLE, None),
            Block::Bullet(t) => place_text(&mut cursor, t, BULLET_STYLE, Some("-")),
        }
    }
    cursor.pages
}

fn place_text(cursor: &mut Cursor, text: &str, style: Style, bullet: Option<&str>) {
    if !cursor.at_top() {
        cursor.y -= style.space_before;
    }

    let left = MARGIN_SIDE + style.indent;
    let width = frame_width() - style.indent;
    let lines = wrap_text(&pdf_safe(text), style.font, style.size, width);

    for (i, line) in lines.iter().enumerate() {
        if cursor.y - style.leading < bottom() {
            cursor.new_page();
        }
        let baseline = cursor.y - style.size;
        let x = if style.centered {
            MARGIN_SIDE + (frame_width() - text_width(line, style.font, style.size)).max(0.0) / 2.0
        } else {
            left
        };
        if i == 0 {
            if let Some(glyph) = bullet {
                cursor.place(Placed { text: glyph.to_string(), font: style.font, size: style.size, x: left - style.indent / 2.0, y: baseline });
            }
        }
        cursor.place(Placed { text: line.clone(), font: style.font, size: style.size, x, y: baseline });
        cursor.y -= style.leading;
    }

    cursor.y -= style.space_after;
}

/// Rough Helvetica advance widths in ems; good enough for line breaking.
fn char_width(c: char, font: FontKind) -> f32 {
    let w = match c {
        'i' | 'j' | 'l' | '\'' | '|' | '!' | '.' | ',' | ';' | ':' => 0.25,
        ' ' | 'f' | 't' | 'I' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.33,
        'm' | 'w' | 'M' | 'W' | '@' => 0.85,
        c if c.is_ascii_uppercase() => 0.68,
        c if c.is_ascii_digit() => 0.56,
        _ => 0.55,
    };
    match font {
        FontKind::Regular => w,
        FontKind::Bold => w * 1.06,
    }
}

fn text_width(text: &str, font: FontKind, size: f32) -> f32 {
    text.chars().map(|c| char_width(c, font)).sum::<f32>() * size
}

/// Greedy word wrap. Words wider than the line are split by character.
pub fn wrap_text(text: &str, font: FontKind, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        let candidate = if current.is_empty() { word.to_string() } else { format!("{current} {word}") };
        if text_width(&candidate, font, size) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        for c in word.chars() {
            current.push(c);
            if text_width(&current, font, size) > max_width && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(c);
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Builtin PDF fonts only cover Latin-1; map common typography and drop the rest.
pub fn pdf_safe(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{2022}' | '\u{00B7}' => out.push('-'),
            '\u{00A0}' | '\t' => out.push(' '),
            c if c.is_control() => {}
            c if (c as u32) <= 0xFF => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

// --- Emission ---

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

fn write_pdf(pages: &[Vec<Placed>]) -> Result<Vec<u8>, RenderError> {
    let (doc, first_page, first_layer) = PdfDocument::new(TITLE, pt_to_mm(PAGE_WIDTH), pt_to_mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(|e| RenderError::Font(e.to_string()))?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(|e| RenderError::Font(e.to_string()))?;

    for (i, items) in pages.iter().enumerate() {
        let (page, layer) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(pt_to_mm(PAGE_WIDTH), pt_to_mm(PAGE_HEIGHT), format!("Page {}", i + 1))
        };
        let layer_ref = doc.get_page(page).get_layer(layer);
        for item in items {
            let font = match item.font {
                FontKind::Regular => &regular,
                FontKind::Bold => &bold,
            };
            layer_ref.use_text(item.text.as_str(), item.size, pt_to_mm(item.x), pt_to_mm(item.y), font);
        }
    }

    let mut buf: Vec<u8> = Vec::new();
    {
        let mut writer = BufWriter::new(&mut buf);
        doc.save(&mut writer).map_err(|e| RenderError::Write(e.to_string()))?;
    }
    Ok(buf)
}
