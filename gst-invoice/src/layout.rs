//! Laid-out visual surface: positioned text, rules, boxes and images in millimetres.
//!
//! Y grows downwards from the top of the surface, like a rendered page; the PDF
//! export flips it when drawing.

use crate::error::{InvoiceError, Result};
use crate::qr::QrImage;

pub const PT_TO_MM: f32 = 25.4 / 72.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
    pub const BLUE: Rgb = Rgb(0.145, 0.388, 0.922);
    pub const BLUE_LIGHT: Rgb = Rgb(0.937, 0.965, 1.0);
    pub const GRAY_DARK: Rgb = Rgb(0.216, 0.255, 0.318);
    pub const GRAY: Rgb = Rgb(0.294, 0.333, 0.388);
    pub const GRAY_MID: Rgb = Rgb(0.612, 0.639, 0.686);
    pub const GRAY_LIGHT: Rgb = Rgb(0.976, 0.98, 0.984);
}

/// Measures rendered text so columns can be right-aligned and wrapped.
pub trait TextMetrics {
    fn text_width_mm(&self, text: &str, size_pt: f32) -> f32;

    fn has_glyph(&self, ch: char) -> bool;
}

/// Width estimate for the builtin Helvetica, which has no real metrics available.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMetrics;

impl TextMetrics for EstimatedMetrics {
    fn text_width_mm(&self, text: &str, size_pt: f32) -> f32 {
        (text.chars().count() as f32) * size_pt * PT_TO_MM * 0.52
    }

    fn has_glyph(&self, ch: char) -> bool {
        // builtin fonts are WinAnsi encoded
        (ch as u32) < 0x100
    }
}

pub struct TtfMetrics<'a> {
    face: ttf_parser::Face<'a>,
}

impl<'a> TtfMetrics<'a> {
    pub fn parse(font_bytes: &'a [u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(font_bytes, 0)
            .map_err(|e| InvoiceError::Export(format!("cannot parse font: {e}")))?;
        Ok(Self { face })
    }
}

impl TextMetrics for TtfMetrics<'_> {
    fn text_width_mm(&self, text: &str, size_pt: f32) -> f32 {
        let units_per_em = self.face.units_per_em() as f32;
        if units_per_em <= 0.0 {
            return 0.0;
        }

        let mut width_units: i32 = 0;
        for ch in text.chars() {
            let Some(gid) = self.face.glyph_index(ch) else {
                continue;
            };
            width_units += self.face.glyph_hor_advance(gid).unwrap_or(0) as i32;
        }

        (width_units as f32 / units_per_em) * size_pt * PT_TO_MM
    }

    fn has_glyph(&self, ch: char) -> bool {
        self.face.glyph_index(ch).is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text {
        x: f32,
        baseline: f32,
        size_pt: f32,
        bold: bool,
        color: Rgb,
        text: String,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        thickness_pt: f32,
        color: Rgb,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Rgb,
    },
    Image {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        image: QrImage,
    },
}

impl Element {
    /// Vertical extent `(top, bottom)` in surface millimetres.
    pub fn extent(&self) -> (f32, f32) {
        match self {
            Element::Text { baseline, size_pt, .. } => {
                let em = size_pt * PT_TO_MM;
                (baseline - em, baseline + em * 0.25)
            }
            Element::Rule { y, thickness_pt, .. } => {
                let half = thickness_pt * PT_TO_MM / 2.0;
                (y - half, y + half)
            }
            Element::Rect { y, h, .. } | Element::Image { y, h, .. } => (*y, y + h),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub width_mm: f32,
    pub height_mm: f32,
    pub elements: Vec<Element>,
}

impl Surface {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

pub struct TextStyle {
    pub size_pt: f32,
    pub bold: bool,
    pub color: Rgb,
}

impl TextStyle {
    pub const fn new(size_pt: f32, bold: bool, color: Rgb) -> Self {
        Self { size_pt, bold, color }
    }

    pub fn line_height(&self) -> f32 {
        self.size_pt * PT_TO_MM * 1.45
    }
}

/// Accumulates elements; callers track their own vertical cursor.
pub struct Canvas<'m> {
    metrics: &'m dyn TextMetrics,
    width_mm: f32,
    elements: Vec<Element>,
}

impl<'m> Canvas<'m> {
    pub fn new(metrics: &'m dyn TextMetrics, width_mm: f32) -> Self {
        Self {
            metrics,
            width_mm,
            elements: Vec::new(),
        }
    }

    pub fn text(&mut self, x: f32, baseline: f32, style: &TextStyle, text: &str) {
        if text.is_empty() {
            return;
        }
        self.elements.push(Element::Text {
            x,
            baseline,
            size_pt: style.size_pt,
            bold: style.bold,
            color: style.color,
            text: text.to_string(),
        });
    }

    pub fn text_right(&mut self, x_right: f32, baseline: f32, style: &TextStyle, text: &str) {
        let w = self.metrics.text_width_mm(text, style.size_pt);
        self.text((x_right - w).max(0.0), baseline, style, text);
    }

    pub fn text_center(&mut self, x_left: f32, x_right: f32, baseline: f32, style: &TextStyle, text: &str) {
        let w = self.metrics.text_width_mm(text, style.size_pt);
        self.text(x_left + ((x_right - x_left) - w).max(0.0) / 2.0, baseline, style, text);
    }

    /// Draws `text` wrapped to `max_width` starting at `top`; returns the y below the last line.
    pub fn paragraph(&mut self, x: f32, top: f32, max_width: f32, style: &TextStyle, text: &str) -> f32 {
        let mut y = top;
        for line in self.wrap(text, style.size_pt, max_width) {
            y += style.line_height();
            self.text(x, y - style.line_height() * 0.3, style, &line);
        }
        y
    }

    pub fn rule(&mut self, x1: f32, x2: f32, y: f32, thickness_pt: f32, color: Rgb) {
        self.elements.push(Element::Rule {
            x1,
            x2,
            y,
            thickness_pt,
            color,
        });
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: Rgb) {
        self.elements.push(Element::Rect { x, y, w, h, fill });
    }

    /// Boxes drawn after their content was measured must sit underneath it.
    pub fn rect_behind(&mut self, from: usize, x: f32, y: f32, w: f32, h: f32, fill: Rgb) {
        let at = from.min(self.elements.len());
        self.elements.insert(at, Element::Rect { x, y, w, h, fill });
    }

    pub fn image(&mut self, x: f32, y: f32, w: f32, h: f32, image: QrImage) {
        self.elements.push(Element::Image { x, y, w, h, image });
    }

    pub fn mark(&self) -> usize {
        self.elements.len()
    }

    /// Greedy word wrap by measured width; words wider than a line are split by character.
    pub fn wrap(&self, input: &str, size_pt: f32, max_width_mm: f32) -> Vec<String> {
        let s = input.trim();
        if s.is_empty() {
            return Vec::new();
        }

        let fits = |t: &str| self.metrics.text_width_mm(t, size_pt) <= max_width_mm;
        let mut out: Vec<String> = Vec::new();
        let mut current = String::new();

        for word in s.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if fits(&candidate) {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if fits(word) {
                current.push_str(word);
                continue;
            }

            for ch in word.chars() {
                let cand = format!("{current}{ch}");
                if fits(&cand) || current.is_empty() {
                    current = cand;
                } else {
                    out.push(std::mem::replace(&mut current, ch.to_string()));
                }
            }
        }

        if !current.is_empty() {
            out.push(current);
        }
        out
    }

    pub fn finish(self, height_mm: f32) -> Surface {
        Surface {
            width_mm: self.width_mm,
            height_mm,
            elements: self.elements,
        }
    }
}
