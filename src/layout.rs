//! Layout - flows a story down the page frame
//!
//! Produces positioned draw operations in PDF user space (points, origin
//! bottom-left). Pagination is top-down: a flowable that does not fit the
//! remaining frame height starts a new page.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use tracing::debug;

use crate::metrics::{self, CAP_HEIGHT};
use crate::palette::Color;
use crate::story::{ArrowDirection, Cell, CellItem, Flowable, Paragraph, PanelStyle, Table};
use crate::styles::{Align, FontFace, PageSetup, Rect, TextStyle, VAlign};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Closed polygon
    Shape {
        points: Vec<(f32, f32)>,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    /// Single line of text, `y` is the baseline
    Text {
        x: f32,
        y: f32,
        text: String,
        face: FontFace,
        size: f32,
        color: Color,
    },
}

impl DrawOp {
    /// Bounding box of the drawn area (text uses its advance width and size)
    pub fn bounds(&self) -> Rect {
        match self {
            DrawOp::Shape { points, .. } => {
                let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
                let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
                for &(x, y) in points {
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
                Rect { x: min_x, y: min_y, width: max_x - min_x, height: max_y - min_y }
            }
            DrawOp::Text { x, y, text, face, size, .. } => Rect {
                x: *x,
                y: *y,
                width: metrics::text_width(text, *face, *size),
                height: size * CAP_HEIGHT,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub ops: Vec<DrawOp>,
}

impl PageLayout {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Rectangle as a closed polygon, corners rounded when `radius > 0`
pub fn rect_points(rect: Rect, radius: f32) -> Vec<(f32, f32)> {
    let radius = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
    if radius == 0.0 {
        return vec![
            (rect.x, rect.y),
            (rect.right(), rect.y),
            (rect.right(), rect.top()),
            (rect.x, rect.top()),
        ];
    }

    const ARC_STEPS: usize = 6;
    let corners = [
        (rect.right() - radius, rect.y + radius, -FRAC_PI_2),
        (rect.right() - radius, rect.top() - radius, 0.0),
        (rect.x + radius, rect.top() - radius, FRAC_PI_2),
        (rect.x + radius, rect.y + radius, std::f32::consts::PI),
    ];

    let mut points = Vec::with_capacity(4 * (ARC_STEPS + 1));
    for (cx, cy, start) in corners {
        for step in 0..=ARC_STEPS {
            let angle = start + FRAC_PI_2 * step as f32 / ARC_STEPS as f32;
            points.push((cx + radius * angle.cos(), cy + radius * angle.sin()));
        }
    }
    points
}

/// Polygon approximating a circle
pub fn circle_points(cx: f32, cy: f32, radius: f32, segments: usize) -> Vec<(f32, f32)> {
    (0..segments)
        .map(|i| {
            let angle = std::f32::consts::TAU * i as f32 / segments as f32;
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect()
}

/// Arrow outline (shaft plus head) filling a `size` square around the centre
pub fn arrow_points(cx: f32, cy: f32, size: f32, direction: ArrowDirection) -> Vec<(f32, f32)> {
    let half = size / 2.0;
    let shaft = size * 0.08;
    let head_len = size * 0.45;
    let head_half = size * 0.32;

    // Pointing right, then rotated into place.
    let outline = [
        (-half, -shaft),
        (half - head_len, -shaft),
        (half - head_len, -head_half),
        (half, 0.0),
        (half - head_len, head_half),
        (half - head_len, shaft),
        (-half, shaft),
    ];

    let angle = match direction {
        ArrowDirection::Right => 0.0,
        ArrowDirection::Down => -FRAC_PI_2,
        ArrowDirection::DownLeft => -3.0 * FRAC_PI_4,
        ArrowDirection::DownRight => -FRAC_PI_4,
    };
    let (sin, cos) = angle.sin_cos();

    outline
        .iter()
        .map(|&(x, y)| (cx + x * cos - y * sin, cy + x * sin + y * cos))
        .collect()
}

/// Arrow glyph edge length for a style
fn glyph_size(style: &TextStyle) -> f32 {
    style.size * 0.75
}

fn glyph_gap(style: &TextStyle) -> f32 {
    style.size * 0.5
}

fn paragraph_lines(paragraph: &Paragraph, width: f32) -> Vec<String> {
    let text = metrics::normalize(&paragraph.text);
    metrics::wrap(&text, paragraph.style.face, paragraph.style.size, width)
}

fn paragraph_height(paragraph: &Paragraph, width: f32) -> f32 {
    let style = &paragraph.style;
    style.space_before + paragraph_lines(paragraph, width).len() as f32 * style.leading + style.space_after
}

fn item_height(item: &CellItem, width: f32) -> f32 {
    match item {
        CellItem::Paragraph(p) => paragraph_height(p, width),
        CellItem::Spacer(h) => *h,
        CellItem::Arrows { style, .. } => style.space_before + style.leading + style.space_after,
    }
}

fn content_height(cell: &Cell, width: f32) -> f32 {
    let inner = width - cell.padding.left - cell.padding.right;
    cell.items.iter().map(|item| item_height(item, inner)).sum()
}

pub fn table_height(table: &Table) -> f32 {
    table.row_height.unwrap_or_else(|| {
        table
            .cells
            .iter()
            .zip(&table.columns)
            .map(|(cell, width)| content_height(cell, *width) + cell.padding.top + cell.padding.bottom)
            .fold(0.0, f32::max)
    })
}

fn baseline(line_top: f32, style: &TextStyle) -> f32 {
    line_top - (style.leading + style.size * CAP_HEIGHT) / 2.0
}

fn draw_paragraph(ops: &mut Vec<DrawOp>, paragraph: &Paragraph, x: f32, top: f32, width: f32) {
    let style = &paragraph.style;
    let mut line_top = top - style.space_before;

    for line in paragraph_lines(paragraph, width) {
        if !line.is_empty() {
            let line_x = match style.align {
                Align::Left => x,
                Align::Center => {
                    x + (width - metrics::text_width(&line, style.face, style.size)) / 2.0
                }
            };
            ops.push(DrawOp::Text {
                x: line_x,
                y: baseline(line_top, style),
                text: line,
                face: style.face,
                size: style.size,
                color: style.color,
            });
        }
        line_top -= style.leading;
    }
}

fn draw_arrows(
    ops: &mut Vec<DrawOp>,
    label: &str,
    style: &TextStyle,
    arrows: (Option<ArrowDirection>, Option<ArrowDirection>),
    x: f32,
    top: f32,
    width: f32,
) {
    let label = metrics::normalize(label);
    let label_width = metrics::text_width(&label, style.face, style.size);
    let glyph = glyph_size(style);
    let gap = if label.is_empty() { 0.0 } else { glyph_gap(style) };

    let arrow_count = arrows.0.is_some() as usize + arrows.1.is_some() as usize;
    let total = label_width + arrow_count as f32 * (glyph + gap);

    let line_top = top - style.space_before;
    let center_y = line_top - style.leading / 2.0;
    let mut cursor = x + (width - total) / 2.0;

    if let Some(direction) = arrows.0 {
        ops.push(DrawOp::Shape {
            points: arrow_points(cursor + glyph / 2.0, center_y, glyph, direction),
            fill: Some(style.color),
            stroke: None,
        });
        cursor += glyph + gap;
    }

    if !label.is_empty() {
        ops.push(DrawOp::Text {
            x: cursor,
            y: baseline(line_top, style),
            text: label,
            face: style.face,
            size: style.size,
            color: style.color,
        });
        cursor += label_width + gap;
    }

    if let Some(direction) = arrows.1 {
        ops.push(DrawOp::Shape {
            points: arrow_points(cursor + glyph / 2.0, center_y, glyph, direction),
            fill: Some(style.color),
            stroke: None,
        });
    }
}

fn draw_panel(ops: &mut Vec<DrawOp>, rect: Rect, panel: &PanelStyle) {
    ops.push(DrawOp::Shape {
        points: rect_points(rect, panel.corner_radius),
        fill: Some(panel.background),
        stroke: Some(Stroke { color: panel.border, width: panel.border_width }),
    });
}

fn draw_cell(ops: &mut Vec<DrawOp>, cell: &Cell, rect: Rect) {
    if let Some(panel) = &cell.panel {
        draw_panel(ops, rect, panel);
    }

    let x = rect.x + cell.padding.left;
    let width = rect.width - cell.padding.left - cell.padding.right;
    let available = rect.height - cell.padding.top - cell.padding.bottom;
    let content = content_height(cell, rect.width);

    let mut top = rect.top() - cell.padding.top;
    if cell.valign == VAlign::Middle && available > content {
        top -= (available - content) / 2.0;
    }

    for item in &cell.items {
        match item {
            CellItem::Paragraph(p) => draw_paragraph(ops, p, x, top, width),
            CellItem::Spacer(_) => {}
            CellItem::Arrows { label, style, leading, trailing } => {
                draw_arrows(ops, label, style, (*leading, *trailing), x, top, width)
            }
        }
        top -= item_height(item, width);
    }
}

/// Lays out a story page by page
pub struct LayoutEngine {
    frame: Rect,
    pages: Vec<PageLayout>,
    current: PageLayout,
    cursor: f32,
    page_empty: bool,
}

impl LayoutEngine {
    pub fn new(setup: &PageSetup) -> Self {
        let frame = setup.frame();
        Self {
            frame,
            pages: vec![],
            current: PageLayout::default(),
            cursor: frame.top(),
            page_empty: true,
        }
    }

    fn remaining(&self) -> f32 {
        self.cursor - self.frame.y
    }

    fn finish_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        debug!(page = self.pages.len() + 1, ops = page.ops.len(), "laid out page");
        self.pages.push(page);
        self.cursor = self.frame.top();
        self.page_empty = true;
    }

    /// Start a new page when `height` does not fit, unless this page is still empty
    fn reserve(&mut self, height: f32) {
        if !self.page_empty && height > self.remaining() {
            self.finish_page();
        }
        self.page_empty = false;
    }

    fn place_paragraph(&mut self, paragraph: &Paragraph) {
        let height = paragraph_height(paragraph, self.frame.width);
        self.reserve(height);
        draw_paragraph(&mut self.current.ops, paragraph, self.frame.x, self.cursor, self.frame.width);
        self.cursor -= height;
    }

    fn place_table(&mut self, table: &Table) {
        let height = table_height(table);
        self.reserve(height);

        let mut x = self.frame.x + (self.frame.width - table.width()) / 2.0;
        let y = self.cursor - height;
        for (cell, width) in table.cells.iter().zip(&table.columns) {
            draw_cell(&mut self.current.ops, cell, Rect { x, y, width: *width, height });
            x += width;
        }
        self.cursor -= height;
    }

    pub fn layout(mut self, story: &[Flowable]) -> Vec<PageLayout> {
        for flowable in story {
            match flowable {
                Flowable::PageBreak => {
                    if !self.page_empty {
                        self.finish_page();
                    }
                }
                Flowable::Spacer(height) => {
                    if self.page_empty {
                        continue;
                    }
                    if *height > self.remaining() {
                        self.finish_page();
                    } else {
                        self.cursor -= height;
                    }
                }
                Flowable::Paragraph(p) => self.place_paragraph(p),
                Flowable::Table(t) => self.place_table(t),
            }
        }

        if !self.page_empty || self.pages.is_empty() {
            self.finish_page();
        }
        self.pages
    }
}

pub fn layout(story: &[Flowable], setup: &PageSetup) -> Vec<PageLayout> {
    LayoutEngine::new(setup).layout(story)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FlowchartDocument;
    use crate::palette;
    use crate::story::{self, Padding};
    use crate::styles::StyleSheet;

    fn moltblox_pages() -> Vec<PageLayout> {
        let setup = PageSetup::default();
        let flowables = story::compose(&FlowchartDocument::moltblox(), &setup);
        layout(&flowables, &setup)
    }

    #[test]
    fn test_every_content_page_starts_a_pdf_page() {
        let pages = moltblox_pages();
        assert!(pages.len() >= 4);

        let titles = ["User Journey Flow", "Implementation Roadmap", "System Architecture", "Revenue Flow"];
        let mut starts = vec![];
        for title in titles {
            let index = pages
                .iter()
                .position(|p| p.texts().next() == Some(title))
                .unwrap_or_else(|| panic!("{} does not open a page", title));
            starts.push(index);
        }
        assert!(starts.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_ops_stay_on_page() {
        let page = PageSetup::default().page();
        for layout in moltblox_pages() {
            for op in &layout.ops {
                assert!(page.contains(&op.bounds()), "{:?} leaves the page", op);
            }
        }
    }

    #[test]
    fn test_text_stays_inside_frame() {
        let frame = PageSetup::default().frame();
        for layout in moltblox_pages() {
            for op in layout.ops.iter().filter(|op| matches!(op, DrawOp::Text { .. })) {
                assert!(frame.contains(&op.bounds()), "{:?} leaves the frame", op);
            }
        }
    }

    #[test]
    fn test_text_is_normalized() {
        let pages = moltblox_pages();
        let all: Vec<&str> = pages.iter().flat_map(|p| p.texts()).collect();
        assert!(all.contains(&"Frontend <-> API"));
        assert!(all.iter().any(|t| t.starts_with("- Deploy MoltToken")));
        assert!(all.iter().all(|t| t.is_ascii()));
    }

    #[test]
    fn test_page_break_on_empty_page_is_ignored() {
        let styles = StyleSheet::default();
        let story = vec![
            Flowable::PageBreak,
            Flowable::Paragraph(Paragraph::new("only", styles.title)),
            Flowable::PageBreak,
        ];
        let pages = layout(&story, &PageSetup::default());
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_empty_story_still_has_a_page() {
        assert_eq!(layout(&[], &PageSetup::default()).len(), 1);
    }

    #[test]
    fn test_overflow_moves_table_to_next_page() {
        let setup = PageSetup::default();
        let frame = setup.frame();
        let tall = Flowable::Table(Table {
            columns: vec![100.0],
            row_height: Some(frame.height * 0.6),
            cells: vec![Cell {
                items: vec![],
                panel: Some(PanelStyle {
                    background: palette::SURFACE_CARD,
                    border: palette::TEAL,
                    border_width: 1.0,
                    corner_radius: 0.0,
                }),
                padding: Padding::new(0.0, 0.0, 0.0, 0.0),
                valign: VAlign::Top,
            }],
        });
        let pages = layout(&[tall.clone(), tall], &setup);
        assert_eq!(pages.len(), 2);

        // Each lands flush with the top of its frame.
        for page in &pages {
            let bounds = page.ops[0].bounds();
            assert!((bounds.top() - frame.top()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_middle_valign_centres_content() {
        let styles = StyleSheet::default();
        let cell = Cell {
            items: vec![CellItem::Paragraph(Paragraph::new("Box", styles.box_title))],
            panel: None,
            padding: Padding::new(8.0, 8.0, 6.0, 6.0),
            valign: VAlign::Middle,
        };
        let rect = Rect { x: 0.0, y: 0.0, width: 200.0, height: 100.0 };
        let mut ops = vec![];
        draw_cell(&mut ops, &cell, rect);

        let DrawOp::Text { y, .. } = &ops[0] else { panic!("expected text") };
        let cap_middle = *y + styles.box_title.size * CAP_HEIGHT / 2.0;
        assert!((cap_middle - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_rounded_rect_stays_inside_bounds() {
        let rect = Rect { x: 10.0, y: 20.0, width: 200.0, height: 80.0 };
        let points = rect_points(rect, 8.0);
        assert_eq!(points.len(), 28);
        let shape = DrawOp::Shape { points, fill: None, stroke: None };
        let bounds = shape.bounds();
        assert!((bounds.x - 10.0).abs() < 1e-3 && (bounds.top() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_down_arrow_points_down() {
        let points = arrow_points(0.0, 0.0, 10.0, ArrowDirection::Down);
        let tip = points[3];
        assert!(tip.0.abs() < 1e-4);
        assert!((tip.1 + 5.0).abs() < 1e-4);
    }
}
