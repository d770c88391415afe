//! Render - paints laid-out pages into a PDF with printpdf
//!
//! Text uses the built-in Helvetica faces, so nothing is embedded.

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Point,
    Polygon, Pt, Rgb,
};
use thiserror::Error;
use tracing::debug;

use crate::layout::{self, DrawOp, PageLayout};
use crate::palette::{self, Color};
use crate::styles::{FontFace, PageSetup};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Font setup failed: {0}")]
    Font(String),

    #[error("PDF serialization failed: {0}")]
    Serialize(String),
}

const LAYER: &str = "Flowchart";
const GLOW_RADIUS: f32 = 200.0;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, RenderError> {
        let builtin = |font: BuiltinFont| doc.add_builtin_font(font).map_err(|e| RenderError::Font(e.to_string()));
        Ok(Self {
            regular: builtin(BuiltinFont::Helvetica)?,
            bold: builtin(BuiltinFont::HelveticaBold)?,
            oblique: builtin(BuiltinFont::HelveticaOblique)?,
        })
    }

    fn get(&self, face: FontFace) -> &IndirectFontRef {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
            FontFace::Oblique => &self.oblique,
        }
    }
}

fn pdf_color(color: Color) -> printpdf::Color {
    let (r, g, b) = color.unit_rgb();
    printpdf::Color::Rgb(Rgb::new(r, g, b, None))
}

fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

fn polygon(points: &[(f32, f32)], mode: PaintMode) -> Polygon {
    Polygon {
        rings: vec![points.iter().map(|&(x, y)| (Point::new(mm(x), mm(y)), false)).collect()],
        mode,
        winding_order: WindingOrder::NonZero,
    }
}

/// Dark page fill with the teal glow in the top-right corner
fn page_background(setup: &PageSetup) -> Vec<DrawOp> {
    vec![
        DrawOp::Shape {
            points: layout::rect_points(setup.page(), 0.0),
            fill: Some(palette::DARK_BG),
            stroke: None,
        },
        DrawOp::Shape {
            points: layout::circle_points(setup.width - 100.0, setup.height - 80.0, GLOW_RADIUS, 72),
            fill: Some(palette::GLOW.over(palette::DARK_BG)),
            stroke: None,
        },
    ]
}

fn paint(layer: &PdfLayerReference, fonts: &Fonts, op: &DrawOp) {
    match op {
        DrawOp::Shape { points, fill, stroke } => {
            let mode = match (fill, stroke) {
                (Some(_), Some(_)) => PaintMode::FillStroke,
                (Some(_), None) => PaintMode::Fill,
                (None, Some(_)) => PaintMode::Stroke,
                (None, None) => return,
            };
            if let Some(fill) = fill {
                layer.set_fill_color(pdf_color(*fill));
            }
            if let Some(stroke) = stroke {
                layer.set_outline_color(pdf_color(stroke.color));
                layer.set_outline_thickness(stroke.width);
            }
            layer.add_polygon(polygon(points, mode));
        }
        DrawOp::Text { x, y, text, face, size, color } => {
            layer.set_fill_color(pdf_color(*color));
            layer.use_text(text.as_str(), *size, mm(*x), mm(*y), fonts.get(*face));
        }
    }
}

/// Render pages to PDF bytes. Every page gets the deck background first.
pub fn render_pdf(title: &str, pages: &[PageLayout], setup: &PageSetup) -> Result<Vec<u8>, RenderError> {
    let (doc, first_page, first_layer) = PdfDocument::new(title, mm(setup.width), mm(setup.height), LAYER);
    let fonts = Fonts::load(&doc)?;
    let background = page_background(setup);

    for (index, page) in pages.iter().enumerate() {
        let (page_idx, layer_idx) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(mm(setup.width), mm(setup.height), LAYER)
        };
        let layer = doc.get_page(page_idx).get_layer(layer_idx);

        for op in background.iter().chain(&page.ops) {
            paint(&layer, &fonts, op);
        }
        debug!(page = index + 1, ops = page.ops.len(), "rendered page");
    }

    doc.save_to_bytes().map_err(|e| RenderError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_covers_page() {
        let setup = PageSetup::default();
        let ops = page_background(&setup);
        assert_eq!(ops[0].bounds(), setup.page());
        match &ops[1] {
            DrawOp::Shape { fill: Some(fill), .. } => assert!(fill.is_opaque()),
            other => panic!("unexpected glow op: {:?}", other),
        }
    }

    #[test]
    fn test_render_blank_page() {
        let bytes = render_pdf("Blank", &[PageLayout::default()], &PageSetup::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
