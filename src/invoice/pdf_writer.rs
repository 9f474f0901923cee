use std::borrow::Cow;
use std::f32::consts::FRAC_PI_2;
use std::io::{BufWriter, Cursor};
use std::path::Path;

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rect, Rgb,
};
use tracing::debug;

use super::draw_op::{DrawOp, FontWeight, Rgb8, TextAlign, PAGE_H, PAGE_W};
use super::invoice_layout::InvoiceLayout;
use crate::error::{InvoiceError, Result};

// PDF font sizes and stroke widths are in points; layout coordinates are in millimetres.
const PT_TO_MM: f32 = 25.4 / 72.0;

/// Average Helvetica advance as a fraction of the em, used when no font file is loaded.
const HELVETICA_AVG_ADVANCE: f32 = 0.5;

const CORNER_SEGMENTS: usize = 4;

struct FontSet<'a> {
    normal: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    /// Present when a TTF was embedded; used for measuring.
    face: Option<ttf_parser::Face<'a>>,
}

impl<'a> FontSet<'a> {
    fn load(doc: &PdfDocumentReference, font_bytes: Option<&'a [u8]>) -> Result<Self> {
        match font_bytes {
            Some(bytes) => {
                let font = doc
                    .add_external_font(Cursor::new(bytes))
                    .map_err(|e| InvoiceError::render(format!("cannot embed font: {e}")))?;
                let face = ttf_parser::Face::parse(bytes, 0)
                    .map_err(|e| InvoiceError::render(format!("cannot parse font for measurement: {e}")))?;
                // One Unicode face serves every weight.
                Ok(FontSet {
                    normal: font.clone(),
                    bold: font.clone(),
                    italic: font,
                    face: Some(face),
                })
            }
            None => {
                let builtin = |f: BuiltinFont| {
                    doc.add_builtin_font(f)
                        .map_err(|e| InvoiceError::render(format!("cannot add builtin font: {e}")))
                };
                Ok(FontSet {
                    normal: builtin(BuiltinFont::Helvetica)?,
                    bold: builtin(BuiltinFont::HelveticaBold)?,
                    italic: builtin(BuiltinFont::HelveticaOblique)?,
                    face: None,
                })
            }
        }
    }

    fn font(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Normal => &self.normal,
            FontWeight::Bold => &self.bold,
            FontWeight::Italic => &self.italic,
        }
    }

    fn prepare<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.face.is_some() {
            Cow::Borrowed(text)
        } else {
            builtin_safe_text(text)
        }
    }

    fn width_mm(&self, text: &str, font_size_pt: f32) -> f32 {
        match &self.face {
            Some(face) => text_width_mm_ttf(face, text, font_size_pt),
            None => text.chars().count() as f32 * font_size_pt * HELVETICA_AVG_ADVANCE * PT_TO_MM,
        }
    }
}

/// The standard fonts only cover WinAnsi, so the rupee sign is spelled out.
fn builtin_safe_text(text: &str) -> Cow<'_, str> {
    if text.contains('₹') {
        Cow::Owned(text.replace('₹', "Rs."))
    } else {
        Cow::Borrowed(text)
    }
}

fn text_width_mm_ttf(face: &ttf_parser::Face<'_>, text: &str, font_size_pt: f32) -> f32 {
    let units_per_em = face.units_per_em() as f32;
    if units_per_em <= 0.0 {
        return 0.0;
    }

    let width_units: u32 = text
        .chars()
        .filter_map(|ch| face.glyph_index(ch))
        .map(|gid| u32::from(face.glyph_hor_advance(gid).unwrap_or(0)))
        .sum();

    (width_units as f32 / units_per_em) * font_size_pt * PT_TO_MM
}

fn pdf_color(c: Rgb8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(c.0) / 255.0,
        f32::from(c.1) / 255.0,
        f32::from(c.2) / 255.0,
        None,
    ))
}

fn point(x: f32, y_top: f32) -> (Point, bool) {
    (Point::new(Mm(x), Mm(PAGE_H - y_top)), false)
}

/// Serializes a laid-out invoice into PDF bytes.
///
/// With `font_path` the TTF is embedded and used for measurement; otherwise
/// the standard Helvetica family is referenced.
pub fn render_pdf(layout: &InvoiceLayout, font_path: Option<&Path>) -> Result<Vec<u8>> {
    let font_bytes = font_path
        .map(|path| {
            std::fs::read(path)
                .map_err(|e| InvoiceError::render(format!("cannot read font {}: {e}", path.display())))
        })
        .transpose()?;

    let title = format!("Invoice {}", layout.invoice_number);
    let (doc, page1, layer1) = PdfDocument::new(&title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
    let fonts = FontSet::load(&doc, font_bytes.as_deref())?;

    for (idx, page) in layout.pages.iter().enumerate() {
        let layer = if idx == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page_idx, layer_idx) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
            doc.get_page(page_idx).get_layer(layer_idx)
        };
        for op in &page.ops {
            draw(&layer, &fonts, op);
        }
        debug!(page = page.number, ops = page.ops.len(), "page rendered");
    }

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)
        .map_err(|e| InvoiceError::render(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| InvoiceError::render(e.to_string()))
}

fn draw(layer: &PdfLayerReference, fonts: &FontSet<'_>, op: &DrawOp) {
    match op {
        DrawOp::Text {
            text,
            x,
            y,
            size,
            weight,
            color,
            align,
        } => {
            let text = fonts.prepare(text);
            let left = match align {
                TextAlign::Left => *x,
                TextAlign::Center => x - fonts.width_mm(&text, *size) / 2.0,
                TextAlign::Right => x - fonts.width_mm(&text, *size),
            };
            layer.set_fill_color(pdf_color(*color));
            layer.use_text(text.as_ref(), *size, Mm(left.max(0.0)), Mm(PAGE_H - y), fonts.font(*weight));
        }
        DrawOp::Rect {
            x,
            y,
            w,
            h,
            radius,
            fill,
            stroke,
            line_width,
        } => {
            let mode = match (fill, stroke) {
                (Some(_), Some(_)) => PaintMode::FillStroke,
                (Some(_), None) => PaintMode::Fill,
                (None, Some(_)) => PaintMode::Stroke,
                (None, None) => return,
            };
            if let Some(c) = fill {
                layer.set_fill_color(pdf_color(*c));
            }
            if let Some(c) = stroke {
                layer.set_outline_color(pdf_color(*c));
                layer.set_outline_thickness(line_width / PT_TO_MM);
            }

            if *radius <= 0.0 {
                let rect = Rect::new(Mm(*x), Mm(PAGE_H - (y + h)), Mm(x + w), Mm(PAGE_H - y)).with_mode(mode);
                layer.add_rect(rect);
            } else {
                layer.add_polygon(Polygon {
                    rings: vec![rounded_rect_ring(*x, *y, *w, *h, *radius)],
                    mode,
                    winding_order: WindingOrder::NonZero,
                });
            }
        }
        DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
        } => {
            layer.set_outline_color(pdf_color(*color));
            layer.set_outline_thickness(width / PT_TO_MM);
            layer.add_line(Line {
                points: vec![point(*x1, *y1), point(*x2, *y2)],
                is_closed: false,
            });
        }
    }
}

/// Outline of a rounded rectangle, corners approximated by short chords.
fn rounded_rect_ring(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Vec<(Point, bool)> {
    let r = radius.min(w / 2.0).min(h / 2.0);
    // Corner centres, clockwise from top-left, with the starting angle of each arc.
    let corners = [
        (x + r, y + r, 2.0 * FRAC_PI_2),
        (x + w - r, y + r, 3.0 * FRAC_PI_2),
        (x + w - r, y + h - r, 0.0),
        (x + r, y + h - r, FRAC_PI_2),
    ];

    let mut ring = Vec::with_capacity(corners.len() * (CORNER_SEGMENTS + 1));
    for (cx, cy, start) in corners {
        for step in 0..=CORNER_SEGMENTS {
            let angle = start + FRAC_PI_2 * step as f32 / CORNER_SEGMENTS as f32;
            ring.push(point(cx + r * angle.cos(), cy + r * angle.sin()));
        }
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::draw_op::PageLayout;
    use crate::model::InvoiceType;

    fn sample_layout(pages: usize) -> InvoiceLayout {
        let pages = (1..=pages)
            .map(|number| PageLayout {
                number,
                ops: vec![
                    DrawOp::Rect {
                        x: 20.0,
                        y: 20.0,
                        w: 170.0,
                        h: 8.0,
                        radius: 1.0,
                        fill: Some(Rgb8(52, 73, 94)),
                        stroke: None,
                        line_width: 0.0,
                    },
                    DrawOp::Text {
                        text: "GRAND TOTAL: ₹250.00".to_string(),
                        x: 105.0,
                        y: 25.0,
                        size: 10.0,
                        weight: FontWeight::Bold,
                        color: Rgb8::WHITE,
                        align: TextAlign::Center,
                    },
                    DrawOp::Line {
                        x1: 30.0,
                        y1: 262.0,
                        x2: 90.0,
                        y2: 262.0,
                        color: Rgb8(189, 195, 199),
                        width: 0.3,
                    },
                ],
            })
            .collect();
        InvoiceLayout {
            invoice_number: "INV-20240305-0042".to_string(),
            invoice_type: InvoiceType::Sale,
            pages,
        }
    }

    #[test]
    fn renders_a_pdf_with_builtin_fonts() {
        let bytes = render_pdf(&sample_layout(1), None).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn extra_pages_grow_the_document() {
        let one = render_pdf(&sample_layout(1), None).unwrap();
        let three = render_pdf(&sample_layout(3), None).unwrap();
        assert!(three.len() > one.len());
    }

    #[test]
    fn missing_font_file_is_a_render_error() {
        let err = render_pdf(&sample_layout(1), Some(Path::new("/nonexistent/font.ttf"))).unwrap_err();
        assert!(matches!(err, InvoiceError::Render(_)));
    }

    #[test]
    fn rupee_sign_is_spelled_out_for_builtin_fonts() {
        assert_eq!(builtin_safe_text("₹12.00"), "Rs.12.00");
        assert!(matches!(builtin_safe_text("12.00"), Cow::Borrowed(_)));
    }

    #[test]
    fn rounded_ring_stays_inside_its_box() {
        let ring = rounded_rect_ring(10.0, 10.0, 20.0, 8.0, 2.0);
        assert_eq!(ring.len(), 4 * (CORNER_SEGMENTS + 1));
        for (p, _) in ring {
            let (x, y) = (p.x.0 * PT_TO_MM, PAGE_H - p.y.0 * PT_TO_MM);
            assert!((9.99..=30.01).contains(&x), "x out of bounds: {x}");
            assert!((9.99..=18.01).contains(&y), "y out of bounds: {y}");
        }
    }
}
