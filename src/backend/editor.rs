//! Edit-side model: writes FreeText annotations with lopdf.

use std::path::Path;

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document as LopdfDocument, Object, ObjectId, Stream, StringFormat};

use crate::error::{Error, Result};
use crate::model::{BaseFont, FreeTextAnnotation, Quadding};

use super::{AnnotationEditor, Closeable};

/// Inner margin of the appearance box.
const PADDING: f32 = 2.0;

/// Line height as a multiple of the font size.
const LEADING: f32 = 1.2;

/// Collects annotations and writes them into a loaded document.
pub struct LopdfEditor {
    doc: Option<LopdfDocument>,
    pending: Vec<(u32, FreeTextAnnotation)>,
    written: usize,
}

impl LopdfEditor {
    pub fn new(doc: LopdfDocument) -> Self {
        Self {
            doc: Some(doc),
            pending: Vec::new(),
            written: 0,
        }
    }

    /// Annotations queued but not yet applied.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Annotations applied so far.
    pub fn written(&self) -> usize {
        self.written
    }

    fn document_mut(&mut self) -> Result<&mut LopdfDocument> {
        self.doc
            .as_mut()
            .ok_or_else(|| Error::Annotation("document is closed".to_string()))
    }
}

impl Closeable for LopdfEditor {
    fn close(&mut self) {
        if self.doc.take().is_some() {
            log::debug!("Closed edit model ({} annotations dropped)", self.pending.len());
        }
        self.pending.clear();
    }
}

impl AnnotationEditor for LopdfEditor {
    fn add_annotation(&mut self, page: u32, annotation: FreeTextAnnotation) -> Result<()> {
        let doc = self.document_mut()?;
        let count = doc.get_pages().len() as u32;
        if !doc.get_pages().contains_key(&page) {
            return Err(Error::PageOutOfRange(page, count));
        }
        self.pending.push((page, annotation));
        Ok(())
    }

    fn apply(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        let start = self.written;
        let doc = self.document_mut()?;
        let pages = doc.get_pages();

        for (offset, (page, annotation)) in pending.iter().enumerate() {
            let page_id = *pages
                .get(page)
                .ok_or_else(|| Error::PageOutOfRange(*page, pages.len() as u32))?;
            attach_free_text(doc, page_id, annotation, start + offset)?;
        }

        self.written += pending.len();
        log::debug!("Applied {} annotations", pending.len());
        Ok(())
    }

    fn write(&mut self, path: &Path) -> Result<()> {
        let doc = self.document_mut()?;
        doc.save(path).map_err(|e| Error::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        log::info!("Wrote {}", path.display());
        Ok(())
    }
}

fn annotation_error(e: lopdf::Error) -> Error {
    Error::Annotation(e.to_string())
}

/// Add one FreeText annotation to the page's `/Annots`.
fn attach_free_text(
    doc: &mut LopdfDocument,
    page_id: ObjectId,
    annotation: &FreeTextAnnotation,
    serial: usize,
) -> Result<()> {
    let style = &annotation.style;
    let [x1, y1, x2, y2] = annotation.rect;
    let real = Object::Real;

    let appearance = appearance_stream(annotation)?;
    let appearance_id = doc.add_object(appearance);

    let annot = dictionary! {
        "Type" => "Annot",
        "Subtype" => "FreeText",
        "Rect" => vec![real(x1.min(x2)), real(y1.min(y2)), real(x1.max(x2)), real(y1.max(y2))],
        "Contents" => text_string(&annotation.contents),
        "F" => Object::Integer(style.flags.bits() as i64),
        "C" => style.color.iter().map(|c| real(*c)).collect::<Vec<_>>(),
        "CA" => real(style.opacity),
        "BS" => dictionary! { "W" => real(style.border_width) },
        "DA" => Object::string_literal(default_appearance(style.font, style.font_size)),
        "Q" => Object::Integer(style.quadding.value()),
        "NM" => Object::string_literal(format!("pdfgloss-{}", serial + 1)),
        "M" => Object::string_literal(pdf_date(Utc::now())),
        "P" => Object::Reference(page_id),
        "AP" => dictionary! { "N" => Object::Reference(appearance_id) },
    };
    let annot_id = doc.add_object(annot);

    let existing = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(annotation_error)?
        .get(b"Annots")
        .ok()
        .cloned();

    match existing {
        Some(Object::Reference(array_id)) => {
            let array = doc
                .get_object_mut(array_id)
                .and_then(Object::as_array_mut)
                .map_err(annotation_error)?;
            array.push(Object::Reference(annot_id));
        }
        Some(Object::Array(mut array)) => {
            array.push(Object::Reference(annot_id));
            page_dict_mut(doc, page_id)?.set("Annots", array);
        }
        _ => {
            page_dict_mut(doc, page_id)?.set("Annots", vec![Object::Reference(annot_id)]);
        }
    }
    Ok(())
}

fn page_dict_mut(doc: &mut LopdfDocument, page_id: ObjectId) -> Result<&mut Dictionary> {
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(annotation_error)
}

/// PDF date string, e.g. `D:20240131120000Z`.
fn pdf_date(at: DateTime<Utc>) -> String {
    at.format("D:%Y%m%d%H%M%SZ").to_string()
}

fn default_appearance(font: BaseFont, size: f32) -> String {
    format!("/{} {} Tf 0 g", font.resource_name(), size)
}

/// Normal appearance: filled box, optional border, wrapped text.
fn appearance_stream(annotation: &FreeTextAnnotation) -> Result<Stream> {
    let style = &annotation.style;
    let width = annotation.width();
    let height = annotation.height();
    let real = Object::Real;
    let name = |n: &str| Object::Name(n.as_bytes().to_vec());

    let [r, g, b] = style.color;
    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new("gs", vec![name("GS0")]),
        Operation::new("rg", vec![real(r), real(g), real(b)]),
        Operation::new("re", vec![real(0.0), real(0.0), real(width), real(height)]),
        Operation::new("f", vec![]),
    ];

    if style.border_width > 0.0 {
        let inset = style.border_width / 2.0;
        ops.extend([
            Operation::new("w", vec![real(style.border_width)]),
            Operation::new("G", vec![real(0.0)]),
            Operation::new(
                "re",
                vec![
                    real(inset),
                    real(inset),
                    real((width - style.border_width).max(0.0)),
                    real((height - style.border_width).max(0.0)),
                ],
            ),
            Operation::new("S", vec![]),
        ]);
    }

    let size = style.font_size;
    let inner = (width - 2.0 * PADDING).max(size);
    let lines = wrap_text(&annotation.contents, inner, style.font, size);

    ops.extend([
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![name(style.font.resource_name()), real(size)]),
        Operation::new("g", vec![real(0.0)]),
    ]);
    let mut baseline = height - PADDING - size;
    for line in &lines {
        let x = match style.quadding {
            Quadding::LeftJustified => PADDING,
            Quadding::Centered => PADDING + (inner - line_width(line, style.font, size)) / 2.0,
            Quadding::RightJustified => PADDING + inner - line_width(line, style.font, size),
        };
        ops.push(Operation::new(
            "Tm",
            vec![real(1.0), real(0.0), real(0.0), real(1.0), real(x.max(0.0)), real(baseline)],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi_bytes(line), StringFormat::Literal)],
        ));
        baseline -= size * LEADING;
    }
    ops.extend([Operation::new("ET", vec![]), Operation::new("Q", vec![])]);

    let content = Content { operations: ops }
        .encode()
        .map_err(annotation_error)?;

    let font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => style.font.postscript_name(),
        "Encoding" => "WinAnsiEncoding",
    };
    let mut fonts = Dictionary::new();
    fonts.set(style.font.resource_name(), font);

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "BBox" => vec![real(0.0), real(0.0), real(width), real(height)],
        "Resources" => dictionary! {
            "Font" => fonts,
            "ExtGState" => dictionary! {
                "GS0" => dictionary! { "ca" => real(style.opacity), "CA" => real(style.opacity) },
            },
        },
    };
    Ok(Stream::new(dict, content))
}

fn char_width(c: char, font: BaseFont, size: f32) -> f32 {
    if c as u32 > 0xFF {
        size
    } else {
        size * font.average_advance()
    }
}

fn line_width(line: &str, font: BaseFont, size: f32) -> f32 {
    line.chars().map(|c| char_width(c, font, size)).sum()
}

/// Greedy word wrap to `max_width`. Words wider than a line are broken.
pub(crate) fn wrap_text(text: &str, max_width: f32, font: BaseFont, size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;
    let space = char_width(' ', font, size);

    for word in text.split_whitespace() {
        let word_width = line_width(word, font, size);
        let needed = if current.is_empty() { word_width } else { current_width + space + word_width };

        if needed <= max_width {
            if !current.is_empty() {
                current.push(' ');
                current_width += space;
            }
            current.push_str(word);
            current_width += word_width;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }

        for c in word.chars() {
            let w = char_width(c, font, size);
            if current_width + w > max_width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            current.push(c);
            current_width += w;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Bytes for a simple-font string. Characters outside Latin-1 become `?`.
fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(c as u32).unwrap_or(b'?'))
        .collect()
}

/// PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationStyle, Rect};

    /// Two empty pages; the second already carries a direct `/Annots` array.
    fn two_page_document() -> LopdfDocument {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let first = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        let second = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Annots" => vec![Object::Null],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![first.into(), second.into()],
                "Count" => 2,
            }),
        );
        let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog);
        doc
    }

    fn annots_len(editor: &LopdfEditor, page: u32) -> usize {
        let doc = editor.doc.as_ref().unwrap();
        let page_id = doc.get_pages()[&page];
        doc.get_dictionary(page_id)
            .unwrap()
            .get(b"Annots")
            .and_then(Object::as_array)
            .map_or(0, |a| a.len())
    }

    fn note(text: &str) -> FreeTextAnnotation {
        FreeTextAnnotation::new(Rect::new(10, 10, 110, 40), text, AnnotationStyle::default())
    }

    #[test]
    fn test_apply_attaches_annotations() {
        let mut editor = LopdfEditor::new(two_page_document());
        editor.add_annotation(1, note("first")).unwrap();
        editor.add_annotation(2, note("second")).unwrap();
        assert_eq!(editor.pending(), 2);

        editor.apply().unwrap();
        assert_eq!(editor.pending(), 0);
        assert_eq!(editor.written(), 2);
        assert_eq!(annots_len(&editor, 1), 1);
        // appended after the existing entry
        assert_eq!(annots_len(&editor, 2), 2);
    }

    #[test]
    fn test_add_annotation_rejects_missing_page() {
        let mut editor = LopdfEditor::new(two_page_document());
        let result = editor.add_annotation(7, note("x"));
        assert!(matches!(result, Err(Error::PageOutOfRange(7, 2))));
    }

    #[test]
    fn test_closed_editor_refuses_work() {
        let mut editor = LopdfEditor::new(two_page_document());
        editor.add_annotation(1, note("x")).unwrap();
        editor.close();
        assert_eq!(editor.pending(), 0);
        assert!(matches!(editor.apply(), Err(Error::Annotation(_))));
    }

    #[test]
    fn test_wrap_text_fits_on_one_line() {
        let lines = wrap_text("Hello world", 100.0, BaseFont::Helvetica, 10.0);
        assert_eq!(lines, vec!["Hello world"]);
    }

    #[test]
    fn test_wrap_text_breaks_lines() {
        // 5pt per char: "Hello world" is 55pt
        let lines = wrap_text("Hello world again", 40.0, BaseFont::Helvetica, 10.0);
        assert_eq!(lines, vec!["Hello", "world", "again"]);
    }

    #[test]
    fn test_wrap_text_breaks_long_words() {
        let lines = wrap_text("abcdefghij", 25.0, BaseFont::Helvetica, 10.0);
        assert_eq!(lines, vec!["abcde", "fghij"]);
    }

    #[test]
    fn test_wrap_text_empty() {
        assert!(wrap_text("   ", 100.0, BaseFont::Helvetica, 10.0).is_empty());
    }

    #[test]
    fn test_text_string_ascii() {
        match text_string("Hello") {
            Object::String(bytes, StringFormat::Literal) => assert_eq!(bytes, b"Hello".to_vec()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_text_string_unicode() {
        match text_string("é") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(bytes, vec![0xFE, 0xFF, 0x00, 0xE9]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_win_ansi_bytes() {
        assert_eq!(win_ansi_bytes("café 世"), b"caf\xe9 ?".to_vec());
    }

    #[test]
    fn test_pdf_date() {
        let at = DateTime::parse_from_rfc3339("2024-01-31T12:05:09Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(pdf_date(at), "D:20240131120509Z");
    }

    #[test]
    fn test_default_appearance() {
        assert_eq!(default_appearance(BaseFont::Helvetica, 10.0), "/Helv 10 Tf 0 g");
    }
}
