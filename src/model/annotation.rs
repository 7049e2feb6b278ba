//! FreeText annotation model.

use serde::{Deserialize, Serialize};

use super::Rect;

/// Annotation flags (PDF 32000-1, table 165), in bit order.
///
/// Kept as named booleans internally; [`AnnotationFlags::bits`] produces the
/// integer stored under `/F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationFlags {
    pub invisible: bool,
    pub hidden: bool,
    pub print: bool,
    pub no_zoom: bool,
    pub no_rotate: bool,
    pub no_view: bool,
    pub read_only: bool,
    pub locked: bool,
    pub toggle_no_view: bool,
    pub locked_contents: bool,
}

impl AnnotationFlags {
    /// No flags set.
    pub const fn empty() -> Self {
        Self {
            invisible: false,
            hidden: false,
            print: false,
            no_zoom: false,
            no_rotate: false,
            no_view: false,
            read_only: false,
            locked: false,
            toggle_no_view: false,
            locked_contents: false,
        }
    }

    /// Printable, non-rotating, read-only and fully locked.
    ///
    /// This is the flag set written for translation overlays (`/F 724`).
    pub const fn overlay() -> Self {
        Self {
            print: true,
            no_rotate: true,
            read_only: true,
            locked: true,
            locked_contents: true,
            ..Self::empty()
        }
    }

    /// Integer value for the `/F` entry. Flag n (1-based) is bit n-1.
    pub fn bits(&self) -> u32 {
        [
            self.invisible,
            self.hidden,
            self.print,
            self.no_zoom,
            self.no_rotate,
            self.no_view,
            self.read_only,
            self.locked,
            self.toggle_no_view,
            self.locked_contents,
        ]
        .iter()
        .enumerate()
        .filter(|(_, set)| **set)
        .fold(0, |acc, (bit, _)| acc | (1 << bit))
    }

    /// Inverse of [`AnnotationFlags::bits`]; unknown bits are ignored.
    pub fn from_bits(bits: u32) -> Self {
        let has = |bit: u32| bits & (1 << bit) != 0;
        Self {
            invisible: has(0),
            hidden: has(1),
            print: has(2),
            no_zoom: has(3),
            no_rotate: has(4),
            no_view: has(5),
            read_only: has(6),
            locked: has(7),
            toggle_no_view: has(8),
            locked_contents: has(9),
        }
    }
}

impl Default for AnnotationFlags {
    fn default() -> Self {
        Self::overlay()
    }
}

/// One of the 14 standard PDF fonts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseFont {
    #[default]
    Helvetica,
    HelveticaBold,
    TimesRoman,
    Courier,
}

impl BaseFont {
    /// PostScript name used in `/BaseFont`.
    pub fn postscript_name(&self) -> &'static str {
        match self {
            BaseFont::Helvetica => "Helvetica",
            BaseFont::HelveticaBold => "Helvetica-Bold",
            BaseFont::TimesRoman => "Times-Roman",
            BaseFont::Courier => "Courier",
        }
    }

    /// Resource name used in default appearance strings.
    pub fn resource_name(&self) -> &'static str {
        match self {
            BaseFont::Helvetica => "Helv",
            BaseFont::HelveticaBold => "HeBo",
            BaseFont::TimesRoman => "TiRo",
            BaseFont::Courier => "Cour",
        }
    }

    /// Average glyph advance as a fraction of the font size.
    pub(crate) fn average_advance(&self) -> f32 {
        match self {
            BaseFont::Courier => 0.6,
            BaseFont::HelveticaBold => 0.55,
            BaseFont::Helvetica => 0.5,
            BaseFont::TimesRoman => 0.45,
        }
    }
}

/// Text justification (`/Q`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quadding {
    #[default]
    LeftJustified,
    Centered,
    RightJustified,
}

impl Quadding {
    pub fn value(&self) -> i64 {
        match self {
            Quadding::LeftJustified => 0,
            Quadding::Centered => 1,
            Quadding::RightJustified => 2,
        }
    }
}

/// Visual style shared by every annotation of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationStyle {
    /// Display flags
    pub flags: AnnotationFlags,
    /// Background colour, RGB in 0..=1
    pub color: [f32; 3],
    /// Constant opacity (`/CA`)
    pub opacity: f32,
    /// Border width in points
    pub border_width: f32,
    /// Font for the translated text
    pub font: BaseFont,
    /// Font size in points
    pub font_size: f32,
    /// Text justification
    pub quadding: Quadding,
}

impl AnnotationStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(mut self, flags: AnnotationFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color.map(|c| c.clamp(0.0, 1.0));
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_border_width(mut self, width: f32) -> Self {
        self.border_width = width.max(0.0);
        self
    }

    pub fn with_font(mut self, font: BaseFont) -> Self {
        self.font = font;
        self
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_quadding(mut self, quadding: Quadding) -> Self {
        self.quadding = quadding;
        self
    }
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            flags: AnnotationFlags::overlay(),
            color: [0.9, 0.5, 0.8],
            opacity: 1.0,
            border_width: 1.0,
            font: BaseFont::Helvetica,
            font_size: 10.0,
            quadding: Quadding::LeftJustified,
        }
    }
}

/// A FreeText annotation waiting to be written to a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeTextAnnotation {
    /// Annotation rectangle `[x1, y1, x2, y2]`
    pub rect: [f32; 4],
    /// Text shown in the box
    pub contents: String,
    /// Visual style
    pub style: AnnotationStyle,
}

impl FreeTextAnnotation {
    /// Create an annotation covering `rect`.
    pub fn new(rect: Rect, contents: impl Into<String>, style: AnnotationStyle) -> Self {
        Self {
            rect: rect.to_float_array(),
            contents: contents.into(),
            style,
        }
    }

    pub fn width(&self) -> f32 {
        (self.rect[2] - self.rect[0]).abs()
    }

    pub fn height(&self) -> f32 {
        (self.rect[3] - self.rect[1]).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_flags_bits() {
        // print | no_rotate | read_only | locked | locked_contents
        assert_eq!(AnnotationFlags::overlay().bits(), 4 + 16 + 64 + 128 + 512);
        assert_eq!(AnnotationFlags::default().bits(), 724);
    }

    #[test]
    fn test_flags_round_trip_single_bits() {
        for bit in 0..10 {
            let flags = AnnotationFlags::from_bits(1 << bit);
            assert_eq!(flags.bits(), 1 << bit);
        }
        assert_eq!(AnnotationFlags::empty().bits(), 0);
        assert_eq!(AnnotationFlags::from_bits(1 << 12), AnnotationFlags::empty());
    }

    #[test]
    fn test_default_style() {
        let style = AnnotationStyle::default();
        assert_eq!(style.color, [0.9, 0.5, 0.8]);
        assert_eq!(style.opacity, 1.0);
        assert_eq!(style.font, BaseFont::Helvetica);
        assert_eq!(style.font_size, 10.0);
        assert_eq!(style.quadding, Quadding::LeftJustified);
    }

    #[test]
    fn test_style_builder_clamps() {
        let style = AnnotationStyle::new()
            .with_opacity(3.0)
            .with_color([1.5, -1.0, 0.5])
            .with_border_width(-2.0);
        assert_eq!(style.opacity, 1.0);
        assert_eq!(style.color, [1.0, 0.0, 0.5]);
        assert_eq!(style.border_width, 0.0);
    }

    #[test]
    fn test_annotation_from_rect() {
        let ann = FreeTextAnnotation::new(Rect::new(10, 20, 110, 60), "Hello", AnnotationStyle::default());
        assert_eq!(ann.rect, [10.0, 20.0, 110.0, 60.0]);
        assert_eq!(ann.width(), 100.0);
        assert_eq!(ann.height(), 40.0);
    }
}
