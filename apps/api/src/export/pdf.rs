//! PDF backend. Lays styled text out on US-letter pages with the base-14
//! Helvetica faces and writes the file with `lopdf`.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::export::metrics::{get_metrics, Face};
use crate::export::{ExportConfig, ExportFormat, ExportIoError, Primitive, Styled};

const BULLET: &str = "•";
const BULLET_INDENT: i64 = 12;
const BULLET_GAP: i64 = 10;

/// How one primitive is drawn.
struct PdfStyle {
    face: Face,
    size: i64,
    space_before: i64,
}

fn style_for(primitive: Primitive, config: &ExportConfig) -> PdfStyle {
    let [h1, h2, h3] = config.heading_sizes;
    match primitive {
        Primitive::Title => PdfStyle {
            face: Face::Bold,
            size: h1,
            space_before: 0,
        },
        Primitive::SectionHeading => PdfStyle {
            face: Face::Bold,
            size: h2,
            space_before: 14,
        },
        Primitive::EntryHeading => PdfStyle {
            face: Face::Bold,
            size: h3,
            space_before: 8,
        },
        Primitive::Body => PdfStyle {
            face: Face::Regular,
            size: config.body_size,
            space_before: 4,
        },
        Primitive::Bullet => PdfStyle {
            face: Face::Regular,
            size: config.body_size,
            space_before: 2,
        },
    }
}

fn font_name(face: Face) -> &'static str {
    match face {
        Face::Regular => "F1",
        Face::Bold => "F2",
    }
}

/// Line advance for a type size: 125% of the size, rounded up.
fn leading(size: i64) -> i64 {
    (size * 5 + 3) / 4
}

/// Encodes text as WinAnsi bytes for the standard fonts. Characters outside
/// the encoding become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '•' => 0x95,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '–' => 0x96,
            '—' => 0x97,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

/// Accumulates text operations page by page.
struct PageWriter<'c> {
    config: &'c ExportConfig,
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    /// Baseline of the next line.
    y: i64,
}

impl<'c> PageWriter<'c> {
    fn new(config: &'c ExportConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            current: Vec::new(),
            y: config.page_height - config.margin,
        }
    }

    fn top(&self) -> i64 {
        self.config.page_height - self.config.margin
    }

    fn break_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.y = self.top();
    }

    /// Moves down by `gap`, skipped at the top of a page.
    fn space(&mut self, gap: i64) {
        if self.y < self.top() {
            self.y -= gap;
        }
    }

    /// Reserves one line of `size`, breaking the page first if it would cross
    /// the bottom margin. Returns the baseline to draw at.
    fn next_line(&mut self, size: i64) -> i64 {
        let advance = leading(size);
        if self.y - advance < self.config.margin && self.y < self.top() {
            self.break_page();
        }
        self.y -= advance;
        self.y
    }

    fn text(&mut self, face: Face, size: i64, x: i64, y: i64, text: &str) {
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font_name(face).into(), Object::Integer(size)]),
            Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]),
            Operation::new(
                "Tj",
                vec![Object::String(win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.break_page();
        }
        self.pages
    }
}

fn lay_out(styled: &[Styled<'_>], config: &ExportConfig) -> Vec<Vec<Operation>> {
    let mut writer = PageWriter::new(config);
    let left = config.margin;
    let width = config.page_width - 2 * config.margin;

    for item in styled {
        let style = style_for(item.primitive, config);
        let metrics = get_metrics(style.face);
        writer.space(style.space_before);

        for text in &item.lines {
            if item.primitive == Primitive::Bullet {
                let text_x = left + BULLET_INDENT + BULLET_GAP;
                let wrapped = metrics.wrap(text, style.size, width - BULLET_INDENT - BULLET_GAP);
                for (i, line) in wrapped.iter().enumerate() {
                    let y = writer.next_line(style.size);
                    if i == 0 {
                        writer.text(style.face, style.size, left + BULLET_INDENT, y, BULLET);
                    }
                    writer.text(style.face, style.size, text_x, y, line);
                }
            } else {
                for line in metrics.wrap(text, style.size, width) {
                    let y = writer.next_line(style.size);
                    writer.text(style.face, style.size, left, y, &line);
                }
            }
        }
    }

    writer.finish()
}

// ────────────────────────────────────────────────────────────────────────────
// Serialization
// ────────────────────────────────────────────────────────────────────────────

pub fn write_pdf(styled: &[Styled<'_>], config: &ExportConfig) -> Result<Vec<u8>, ExportIoError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(font_dictionary("Helvetica"));
    let bold = doc.add_object(font_dictionary("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in lay_out(styled, config) {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| ExportIoError::new(ExportFormat::Pdf, e))?;
        let content_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(config.page_width),
            Object::Integer(config.page_height),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id: ObjectId = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportIoError::new(ExportFormat::Pdf, e))?;
    Ok(bytes)
}

fn font_dictionary(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}
