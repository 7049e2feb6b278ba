//! Positioned text spans from a page content stream.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

/// Average glyph advance for proportional Latin text, as a fraction of the font size.
const LATIN_ADVANCE: f32 = 0.5;

/// Leading used by `T*` until a `TL` operator sets one.
const DEFAULT_LEADING: f32 = 12.0;

/// TJ adjustments larger than this (thousandths of an em) count as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A run of text shown by one text operator.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedSpan {
    /// Decoded text
    pub text: String,
    /// X position of the left edge
    pub x: f32,
    /// Y position of the baseline
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
    /// Effective font size in points
    pub font_size: f32,
}

impl PositionedSpan {
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            font_size,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Approximate descender line.
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2
    }

    /// Approximate ascender line.
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, (self.bottom() + self.top()) / 2.0)
    }
}

/// Walks page content streams and collects [`PositionedSpan`]s.
pub struct SpanCollector<'a> {
    doc: &'a LopdfDocument,
}

impl<'a> SpanCollector<'a> {
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self { doc }
    }

    /// Collect every non-blank span on `page_num` (1-indexed).
    pub fn collect_page(&self, page_num: u32) -> Result<Vec<PositionedSpan>> {
        let pages = self.doc.get_pages();
        let page_id = *pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;

        let fonts = self.doc.get_page_fonts(page_id).map_err(|e| Error::PageDecode {
            page: page_num,
            reason: format!("fonts: {}", e),
        })?;

        let malformed = |reason: String| Error::PageDecode {
            page: page_num,
            reason,
        };

        let raw = self.page_content(page_id).map_err(malformed)?;
        let content =
            lopdf::content::Content::decode(&raw).map_err(|e| malformed(e.to_string()))?;

        // The parser stops quietly at the first bad token.
        if content.operations.is_empty() && !raw.iter().all(u8::is_ascii_whitespace) {
            return Err(malformed("no operators in content stream".to_string()));
        }

        let mut state = TextState::default();
        let mut spans = Vec::new();

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "BT" => state.begin_text(),
                "ET" => state.in_text = false,
                "Tf" if operands.len() >= 2 => {
                    if let Object::Name(name) = &operands[0] {
                        state.font = name.clone();
                    }
                    state.font_size = get_number(&operands[1]).unwrap_or(12.0);
                }
                "TL" if !operands.is_empty() => {
                    state.leading = get_number(&operands[0]).unwrap_or(DEFAULT_LEADING);
                }
                "Td" if operands.len() >= 2 => {
                    let tx = get_number(&operands[0]).unwrap_or(0.0);
                    let ty = get_number(&operands[1]).unwrap_or(0.0);
                    state.matrix.move_line(tx, ty);
                }
                "TD" if operands.len() >= 2 => {
                    let tx = get_number(&operands[0]).unwrap_or(0.0);
                    let ty = get_number(&operands[1]).unwrap_or(0.0);
                    state.leading = -ty;
                    state.matrix.move_line(tx, ty);
                }
                "Tm" if operands.len() >= 6 => {
                    let n: Vec<f32> = operands.iter().take(6).map(|o| get_number(o).unwrap_or(0.0)).collect();
                    state.matrix = TextMatrix::new(n[0], n[1], n[2], n[3], n[4], n[5]);
                }
                "T*" => state.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        let text = self.decode(&fonts, &state.font, bytes);
                        state.show(text, &mut spans);
                    }
                }
                "'" => {
                    state.next_line();
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        let text = self.decode(&fonts, &state.font, bytes);
                        state.show(text, &mut spans);
                    }
                }
                "\"" => {
                    state.next_line();
                    if let Some(Object::String(bytes, _)) = operands.get(2) {
                        let text = self.decode(&fonts, &state.font, bytes);
                        state.show(text, &mut spans);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        let text = self.decode_tj(&fonts, &state.font, items);
                        state.show(text, &mut spans);
                    }
                }
                _ => {}
            }
        }

        if state.in_text {
            return Err(malformed("text object is not closed".to_string()));
        }

        log::debug!("Page {}: collected {} text spans", page_num, spans.len());
        Ok(spans)
    }

    /// Raw (decompressed) content stream bytes of a page.
    fn page_content(&self, page_id: ObjectId) -> std::result::Result<Vec<u8>, String> {
        let page_dict = self.doc.get_dictionary(page_id).map_err(|e| e.to_string())?;
        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without content is blank, not broken.
            Err(_) => return Ok(Vec::new()),
        };

        let stream_ids: Vec<ObjectId> = match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Array(arr)) => arr.iter().filter_map(|o| o.as_reference().ok()).collect(),
                _ => vec![*r],
            },
            Object::Array(arr) => arr.iter().filter_map(|o| o.as_reference().ok()).collect(),
            _ => return Err("invalid /Contents entry".to_string()),
        };

        let mut content = Vec::new();
        for id in stream_ids {
            match self.doc.get_object(id) {
                Ok(Object::Stream(s)) => {
                    let data = s.decompressed_content().unwrap_or_else(|_| s.content.clone());
                    content.extend_from_slice(&data);
                    content.push(b'\n');
                }
                _ => return Err(format!("content stream {} {} R is not a stream", id.0, id.1)),
            }
        }
        Ok(content)
    }

    fn decode(&self, fonts: &BTreeMap<Vec<u8>, &Dictionary>, font: &[u8], bytes: &[u8]) -> String {
        if let Some(dict) = fonts.get(font) {
            if let Ok(encoding) = dict.get_font_encoding(self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&encoding, bytes) {
                    if !text.is_empty() {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }

    /// Decode a TJ array, turning large positioning gaps into spaces.
    fn decode_tj(
        &self,
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        font: &[u8],
        items: &[Object],
    ) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => combined.push_str(&self.decode(fonts, font, bytes)),
                other => {
                    let Some(adjustment) = get_number(other) else {
                        continue;
                    };
                    let needs_space = -adjustment > TJ_SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with(char::is_whitespace)
                        && !combined.chars().last().is_some_and(is_spaceless_script_char);
                    if needs_space {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }
}

/// Text state tracked while walking a content stream.
#[derive(Debug, Clone)]
struct TextState {
    matrix: TextMatrix,
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
    in_text: bool,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: TextMatrix::default(),
            font: Vec::new(),
            font_size: 12.0,
            leading: DEFAULT_LEADING,
            in_text: false,
        }
    }
}

impl TextState {
    fn begin_text(&mut self) {
        self.in_text = true;
        self.matrix = TextMatrix::default();
    }

    fn next_line(&mut self) {
        self.matrix.move_line(0.0, -self.leading);
    }

    /// Record a span at the current position and advance past it.
    fn show(&mut self, text: String, spans: &mut Vec<PositionedSpan>) {
        if !self.in_text {
            return;
        }
        let advance = estimate_advance(&text, self.font_size);
        let scale = self.matrix.scale();
        if !text.trim().is_empty() {
            let (x, y) = self.matrix.position();
            spans.push(PositionedSpan::new(
                text,
                x,
                y,
                advance * scale,
                self.font_size * scale,
            ));
        }
        self.matrix.advance(advance);
    }
}

/// Text matrix with the line matrix folded in.
#[derive(Debug, Clone, Copy)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    line_e: f32,
    line_f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }
}

impl TextMatrix {
    fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self {
            a,
            b,
            c,
            d,
            e,
            f,
            line_e: e,
            line_f: f,
        }
    }

    /// Start a new line offset from the start of the current one.
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    /// Move along the baseline by `tx` text space units.
    fn advance(&mut self, tx: f32) {
        self.e += tx * self.a;
        self.f += tx * self.b;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        let scale = (self.a * self.a + self.c * self.c).sqrt();
        if scale > 0.0 {
            scale
        } else {
            1.0
        }
    }
}

/// Estimated advance of `text` in text space units.
pub(crate) fn estimate_advance(text: &str, font_size: f32) -> f32 {
    text.chars()
        .map(|c| {
            if is_spaceless_script_char(c) || is_fullwidth(c) {
                font_size
            } else {
                font_size * LATIN_ADVANCE
            }
        })
        .sum()
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn is_fullwidth(c: char) -> bool {
    matches!(c as u32, 0xFF00..=0xFFEF | 0xAC00..=0xD7AF)
}

/// Characters from scripts that do not separate words with spaces.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        // Hiragana, Katakana
        || (0x3040..=0x30FF).contains(&code)
        // CJK Symbols and Punctuation
        || (0x3000..=0x303F).contains(&code)
}

/// Fallback decoding when the font encoding is unavailable.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0x65, 0x6C, 0x6C, 0xE9]), "Hellé");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x4F, 0x60, 0x59, 0x7D]), "你好");
    }

    #[test]
    fn test_estimate_advance() {
        assert_eq!(estimate_advance("abcd", 10.0), 20.0);
        assert_eq!(estimate_advance("你好", 10.0), 20.0);
    }

    #[test]
    fn test_text_matrix_lines() {
        let mut m = TextMatrix::default();
        m.move_line(100.0, 700.0);
        m.advance(50.0);
        assert_eq!(m.position(), (150.0, 700.0));
        // Td is relative to the line start, not the advanced position.
        m.move_line(0.0, -14.0);
        assert_eq!(m.position(), (100.0, 686.0));
    }

    #[test]
    fn test_text_state_skips_blank_and_outside_bt() {
        let mut state = TextState::default();
        let mut spans = Vec::new();
        state.show("outside".into(), &mut spans);
        assert!(spans.is_empty());

        state.begin_text();
        state.matrix.move_line(10.0, 20.0);
        state.show("   ".into(), &mut spans);
        state.show("ab".into(), &mut spans);
        assert_eq!(spans.len(), 1);
        // The blank run still advanced the pen.
        assert_eq!(spans[0].x, 10.0 + 3.0 * 6.0);
        assert_eq!(spans[0].width, 12.0);
    }

    #[test]
    fn test_span_geometry() {
        let span = PositionedSpan::new("x", 10.0, 100.0, 20.0, 10.0);
        assert_eq!(span.right(), 30.0);
        assert_eq!(span.top(), 108.0);
        assert_eq!(span.bottom(), 98.0);
        assert_eq!(span.center(), (20.0, 103.0));
    }

    fn one_page_doc(content: &[u8]) -> LopdfDocument {
        use lopdf::{dictionary, Stream};

        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn test_collect_page_spans() {
        let doc = one_page_doc(b"BT /F1 12 Tf 1 0 0 1 72 700 Tm (Hello) Tj ET");
        let spans = SpanCollector::new(&doc).collect_page(1).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Hello");
        assert_eq!((spans[0].x, spans[0].y), (72.0, 700.0));
    }

    #[test]
    fn test_unterminated_string_is_decode_error() {
        let doc = one_page_doc(b"BT /F1 12 Tf (unterminated Tj ET");
        let result = SpanCollector::new(&doc).collect_page(1);
        assert!(matches!(result, Err(Error::PageDecode { page: 1, .. })));
    }

    #[test]
    fn test_garbage_content_is_decode_error() {
        let doc = one_page_doc(b"((((");
        let result = SpanCollector::new(&doc).collect_page(1);
        assert!(matches!(result, Err(Error::PageDecode { page: 1, .. })));
    }

    #[test]
    fn test_blank_content_is_empty_page() {
        let doc = one_page_doc(b"  \n");
        assert!(SpanCollector::new(&doc).collect_page(1).unwrap().is_empty());
    }

    #[test]
    fn test_spaceless_script() {
        assert!(is_spaceless_script_char('中'));
        assert!(is_spaceless_script_char('あ'));
        assert!(!is_spaceless_script_char('한'));
        assert!(!is_spaceless_script_char('a'));
    }
}
