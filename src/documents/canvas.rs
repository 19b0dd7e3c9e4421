//! Fixed-layout page canvas and its PDF serialization.
//!
//! Layouts place items with a top-left origin in points, the way the documents
//! are designed on paper. [`Canvas::to_pdf`] flips coordinates into PDF space and
//! writes one content stream per page using the standard Helvetica faces.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use super::scan_code::ScanCode;
use super::DocumentError;

/// US Letter.
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 50.0;

/// Average Helvetica glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: Font,
        text: String,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        gray: f32,
    },
    Modules {
        x: f32,
        y: f32,
        size: f32,
        code: ScanCode,
    },
}

#[derive(Debug, Default, Clone)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone)]
pub struct Canvas {
    pages: Vec<Page>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// A canvas with one blank page.
    pub fn new() -> Self {
        Self {
            pages: vec![Page::default()],
        }
    }

    pub fn add_page(&mut self) -> &mut Self {
        self.pages.push(Page::default());
        self
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current(&mut self) -> &mut Page {
        // `new` always creates the first page.
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub fn text(&mut self, x: f32, y: f32, size: f32, text: impl Into<String>) -> &mut Self {
        self.push_text(x, y, size, Font::Regular, text.into())
    }

    pub fn bold(&mut self, x: f32, y: f32, size: f32, text: impl Into<String>) -> &mut Self {
        self.push_text(x, y, size, Font::Bold, text.into())
    }

    /// Horizontally centred on the page.
    pub fn centered(&mut self, y: f32, size: f32, font: Font, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        let x = ((PAGE_WIDTH - estimate_width(&text, size)) / 2.0).max(MARGIN);
        self.push_text(x, y, size, font, text)
    }

    /// Word-wrapped paragraph; returns the height it occupies.
    pub fn paragraph(&mut self, x: f32, y: f32, size: f32, width: f32, text: &str) -> f32 {
        let line_height = size * 1.25;
        let lines = wrap(text, size, width);
        for (index, line) in lines.iter().enumerate() {
            self.text(x, y + line_height * index as f32, size, line.clone());
        }
        line_height * lines.len() as f32
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32)) -> &mut Self {
        self.current().ops.push(DrawOp::Line { from, to });
        self
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, gray: f32) -> &mut Self {
        self.current().ops.push(DrawOp::FillRect {
            x,
            y,
            width,
            height,
            gray,
        });
        self
    }

    /// Draws a scannable code as a `size` x `size` square.
    pub fn scan_code(&mut self, x: f32, y: f32, size: f32, code: &ScanCode) -> &mut Self {
        self.current().ops.push(DrawOp::Modules {
            x,
            y,
            size,
            code: code.clone(),
        });
        self
    }

    fn push_text(&mut self, x: f32, y: f32, size: f32, font: Font, text: String) -> &mut Self {
        self.current().ops.push(DrawOp::Text {
            x,
            y,
            size,
            font,
            text,
        });
        self
    }

    /// Every text item in drawing order across all pages.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|page| {
            page.ops.iter().filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|text| text.contains(needle))
    }

    /// All text items joined by single spaces, so wrapped paragraphs read back whole.
    pub fn joined_text(&self) -> String {
        self.texts().collect::<Vec<_>>().join(" ")
    }

    pub fn scan_codes(&self) -> impl Iterator<Item = &ScanCode> {
        self.pages.iter().flat_map(|page| {
            page.ops.iter().filter_map(|op| match op {
                DrawOp::Modules { code, .. } => Some(code),
                _ => None,
            })
        })
    }

    /// Serializes the canvas into a complete PDF file.
    pub fn to_pdf(&self) -> Result<Vec<u8>, DocumentError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(font_dictionary("Helvetica"));
        let bold_id = doc.add_object(font_dictionary("Helvetica-Bold"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let content = Content {
                operations: page_operations(page),
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(PAGE_WIDTH),
                Object::Real(PAGE_HEIGHT),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

fn font_dictionary(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn page_operations(page: &Page) -> Vec<Operation> {
    let mut ops = Vec::new();
    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                font,
                text,
            } => {
                // Item y is the top of the line; PDF wants the baseline.
                let baseline = PAGE_HEIGHT - y - size * 0.8;
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![Object::Name(font.resource_name().as_bytes().to_vec()), Object::Real(*size)],
                ));
                ops.push(Operation::new("Td", vec![Object::Real(*x), Object::Real(baseline)]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(win_ansi(text), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            DrawOp::Line { from, to } => {
                ops.push(Operation::new("w", vec![Object::Real(1.0)]));
                ops.push(Operation::new(
                    "m",
                    vec![Object::Real(from.0), Object::Real(PAGE_HEIGHT - from.1)],
                ));
                ops.push(Operation::new(
                    "l",
                    vec![Object::Real(to.0), Object::Real(PAGE_HEIGHT - to.1)],
                ));
                ops.push(Operation::new("S", vec![]));
            }
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                gray,
            } => {
                ops.push(Operation::new("g", vec![Object::Real(*gray)]));
                ops.push(Operation::new("re", rect(*x, *y, *width, *height)));
                ops.push(Operation::new("f", vec![]));
                ops.push(Operation::new("g", vec![Object::Real(0.0)]));
            }
            DrawOp::Modules { x, y, size, code } => {
                let module = size / code.width().max(1) as f32;
                ops.push(Operation::new("g", vec![Object::Real(0.0)]));
                for (col, row) in code.dark_modules() {
                    ops.push(Operation::new(
                        "re",
                        rect(x + col as f32 * module, y + row as f32 * module, module, module),
                    ));
                }
                ops.push(Operation::new("f", vec![]));
            }
        }
    }
    ops
}

/// Rectangle operands for a top-left-origin box.
fn rect(x: f32, y: f32, width: f32, height: f32) -> Vec<Object> {
    vec![
        Object::Real(x),
        Object::Real(PAGE_HEIGHT - y - height),
        Object::Real(width),
        Object::Real(height),
    ]
}

/// WinAnsi bytes for the standard fonts; characters outside Latin-1 become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\u{2013}' | '\u{2014}' => b'-',
            '\u{2018}' | '\u{2019}' => b'\'',
            '\u{201C}' | '\u{201D}' => b'"',
            ch if (ch as u32) < 0x100 => ch as u32 as u8,
            _ => b'?',
        })
        .collect()
}

pub fn estimate_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_WIDTH
}

/// Greedy word wrap using the average glyph width.
pub fn wrap(text: &str, size: f32, width: f32) -> Vec<String> {
    let max_chars = ((width / (size * AVG_GLYPH_WIDTH)).floor() as usize).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas_has_one_page() {
        let canvas = Canvas::new();
        assert_eq!(canvas.page_count(), 1);
    }

    #[test]
    fn test_texts_span_pages() {
        let mut canvas = Canvas::new();
        canvas.text(50.0, 50.0, 12.0, "primera");
        canvas.add_page();
        canvas.bold(50.0, 50.0, 12.0, "segunda");
        let texts: Vec<&str> = canvas.texts().collect();
        assert_eq!(texts, vec!["primera", "segunda"]);
        assert_eq!(canvas.page_count(), 2);
    }

    #[test]
    fn test_to_pdf_produces_pdf_header_and_text() {
        let mut canvas = Canvas::new();
        canvas.text(50.0, 50.0, 12.0, "NOM-00000042");
        let bytes = canvas.to_pdf().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let haystack = String::from_utf8_lossy(&bytes);
        assert!(haystack.contains("NOM-00000042"));
    }

    #[test]
    fn test_win_ansi_keeps_latin1() {
        assert_eq!(win_ansi("NÓMINA"), vec![b'N', 0xD3, b'M', b'I', b'N', b'A']);
        assert_eq!(win_ansi("a\u{2014}b"), b"a-b".to_vec());
        assert_eq!(win_ansi("\u{1F680}"), b"?".to_vec());
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap("uno dos tres cuatro cinco seis", 10.0, 50.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|line| line.chars().count() <= 10));
        assert_eq!(lines.join(" "), "uno dos tres cuatro cinco seis");
    }
}
