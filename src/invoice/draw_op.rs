use serde::Serialize;

/// A4 portrait, millimetres.
pub const PAGE_W: f32 = 210.0;
pub const PAGE_H: f32 = 297.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb8(pub u8, pub u8, pub u8);

impl Rgb8 {
    pub const WHITE: Rgb8 = Rgb8(255, 255, 255);
    pub const BLACK: Rgb8 = Rgb8(0, 0, 0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
    Italic,
}

/// Where `x` sits relative to the rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// One drawing primitive at absolute page coordinates (top-left origin, y down).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum DrawOp {
    Text {
        text: String,
        x: f32,
        /// Baseline.
        y: f32,
        size: f32,
        weight: FontWeight,
        color: Rgb8,
        align: TextAlign,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        fill: Option<Rgb8>,
        stroke: Option<Rgb8>,
        line_width: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Rgb8,
        width: f32,
    },
}

impl DrawOp {
    pub fn text_content(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLayout {
    /// 1-based.
    pub number: usize,
    pub ops: Vec<DrawOp>,
}

impl PageLayout {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            ops: Vec::new(),
        }
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.ops.iter().any(|op| op.text_content() == Some(needle))
    }
}
