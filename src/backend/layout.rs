//! Coarse paragraph estimation.
//!
//! Spans are grouped into lines by baseline, and consecutive lines into
//! paragraphs by vertical gap, font size and left edge. Single column only;
//! this is a stand-in for a real layout engine, not a replacement for one.

use std::cmp::Ordering;

use crate::model::ParagraphArea;

use super::content::PositionedSpan;

/// A line of spans sharing a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// Spans sorted left to right
    pub spans: Vec<PositionedSpan>,
    /// Baseline of the first span
    pub y: f32,
    /// Left edge
    pub x: f32,
    /// Right edge
    pub right: f32,
    /// Largest font size on the line
    pub font_size: f32,
}

impl TextLine {
    fn from_spans(mut spans: Vec<PositionedSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
        let x = spans.iter().map(|s| s.x).fold(f32::INFINITY, f32::min);
        let right = spans.iter().map(|s| s.right()).fold(f32::NEG_INFINITY, f32::max);
        let font_size = spans.iter().map(|s| s.font_size).fold(0.0, f32::max);
        let y = spans.first().map(|s| s.y).unwrap_or(0.0);
        Self {
            spans,
            y,
            x,
            right,
            font_size,
        }
    }

    pub fn top(&self) -> f32 {
        self.spans.iter().map(|s| s.top()).fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn bottom(&self) -> f32 {
        self.spans.iter().map(|s| s.bottom()).fold(f32::INFINITY, f32::min)
    }
}

/// Group spans into lines, top of the page first.
pub fn group_into_lines(spans: &[PositionedSpan]) -> Vec<TextLine> {
    let mut sorted: Vec<PositionedSpan> = spans.to_vec();
    sorted.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });

    let mut lines = Vec::new();
    let mut current: Vec<PositionedSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in sorted {
        let tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Whether `curr` starts a new paragraph after `prev`.
fn should_break(prev: &TextLine, curr: &TextLine, sensitivity: u32) -> bool {
    let sensitivity = sensitivity as f32;
    let size = prev.font_size.max(curr.font_size);

    let gap = prev.y - curr.y;
    if gap > size * (1.2 + 0.1 * sensitivity) {
        return true;
    }

    if (prev.font_size - curr.font_size).abs() > 1.0 {
        return true;
    }

    (prev.x - curr.x).abs() > 4.0 * sensitivity
}

/// Estimate paragraph areas from the spans of one page.
pub fn estimate_paragraphs(spans: &[PositionedSpan], merge_sensitivity: u32) -> Vec<ParagraphArea> {
    let lines = group_into_lines(spans);
    let mut areas = Vec::new();
    let mut block: Vec<&TextLine> = Vec::new();

    for line in &lines {
        if let Some(prev) = block.last() {
            if should_break(prev, line, merge_sensitivity) {
                areas.push(enclosing_area(&block));
                block.clear();
            }
        }
        block.push(line);
    }
    if !block.is_empty() {
        areas.push(enclosing_area(&block));
    }

    log::debug!(
        "Estimated {} paragraphs from {} lines (sensitivity {})",
        areas.len(),
        lines.len(),
        merge_sensitivity
    );
    areas
}

/// Smallest integer area enclosing every line of a block.
fn enclosing_area(lines: &[&TextLine]) -> ParagraphArea {
    let left = lines.iter().map(|l| l.x).fold(f32::INFINITY, f32::min);
    let right = lines.iter().map(|l| l.right).fold(f32::NEG_INFINITY, f32::max);
    let bottom = lines.iter().map(|l| l.bottom()).fold(f32::INFINITY, f32::min);
    let top = lines.iter().map(|l| l.top()).fold(f32::NEG_INFINITY, f32::max);

    let x = left.floor() as i32;
    let y = bottom.floor() as i32;
    ParagraphArea::new(x, y, right.ceil() as i32 - x, top.ceil() as i32 - y)
}
