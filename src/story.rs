//! Story - composes document content into flowables
//!
//! A story is the flat, ordered list of things the layout engine stacks down
//! the page: paragraphs, spacers, single-row tables and page breaks.

use crate::content::{FlowchartDocument, Page, PageBody, Panel, Phase, RevenueFlow, Step};
use crate::palette::{self, Color};
use crate::styles::{PageSetup, StyleSheet, TextStyle, VAlign, INCH};

#[derive(Debug, Clone, PartialEq)]
pub enum Flowable {
    Paragraph(Paragraph),
    Spacer(f32),
    Table(Table),
    PageBreak,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub style: TextStyle,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self { text: text.into(), style }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    Right,
    Down,
    DownLeft,
    DownRight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellItem {
    Paragraph(Paragraph),
    Spacer(f32),
    /// One centred line: optional arrow, label, optional arrow
    Arrows {
        label: String,
        style: TextStyle,
        leading: Option<ArrowDirection>,
        trailing: Option<ArrowDirection>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelStyle {
    pub background: Color,
    pub border: Color,
    pub border_width: f32,
    pub corner_radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Padding {
    pub const fn new(top: f32, bottom: f32, left: f32, right: f32) -> Self {
        Self { top, bottom, left, right }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub items: Vec<CellItem>,
    pub panel: Option<PanelStyle>,
    pub padding: Padding,
    pub valign: VAlign,
}

impl Cell {
    fn plain(items: Vec<CellItem>) -> Self {
        Self {
            items,
            panel: None,
            padding: Padding::new(0.0, 0.0, 0.0, 0.0),
            valign: VAlign::Middle,
        }
    }
}

/// Single-row table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<f32>,
    pub row_height: Option<f32>,
    pub cells: Vec<Cell>,
}

impl Table {
    pub fn width(&self) -> f32 {
        self.columns.iter().sum()
    }
}

const BOX_COLUMN: f32 = 2.8 * INCH;
const ARROW_COLUMN: f32 = 0.5 * INCH;
const JOURNEY_ROW: f32 = 1.1 * INCH;

/// Width of a full journey row: `columns` boxes joined by arrow columns
pub fn journey_row_width(columns: usize) -> f32 {
    columns as f32 * BOX_COLUMN + columns.saturating_sub(1) as f32 * ARROW_COLUMN
}

/// Composes flowables for one page setup and style sheet
pub struct StoryBuilder<'a> {
    styles: &'a StyleSheet,
    frame_width: f32,
    panel_width: f32,
    pair_width: f32,
    flowables: Vec<Flowable>,
}

impl<'a> StoryBuilder<'a> {
    pub fn new(styles: &'a StyleSheet, setup: &PageSetup) -> Self {
        let frame_width = setup.frame().width;
        Self {
            styles,
            frame_width,
            panel_width: (setup.width - 1.4 * INCH).min(frame_width),
            pair_width: (setup.width - 1.8 * INCH).min(frame_width),
            flowables: vec![],
        }
    }

    pub fn compose(mut self, document: &FlowchartDocument) -> Vec<Flowable> {
        for (index, page) in document.pages.iter().enumerate() {
            if index > 0 {
                self.flowables.push(Flowable::PageBreak);
            }
            self.page(page);
        }
        self.flowables
    }

    fn push_table(&mut self, table: Table) {
        self.flowables.push(Flowable::Table(table));
    }

    fn spacer(&mut self, height: f32) {
        self.flowables.push(Flowable::Spacer(height));
    }

    fn page(&mut self, page: &Page) {
        self.flowables.push(Flowable::Paragraph(Paragraph::new(&page.title, self.styles.title)));
        self.flowables.push(Flowable::Paragraph(Paragraph::new(&page.subtitle, self.styles.subtitle)));

        match &page.body {
            PageBody::Journey { columns, steps } => self.journey(*columns, steps),
            PageBody::Roadmap { phases } => self.roadmap(phases),
            PageBody::Architecture { layers } => self.architecture(layers),
            PageBody::Revenue(flow) => self.revenue(flow),
        }
    }

    /// Full-width single-cell row holding a centred arrow line
    fn arrow_row(&mut self, width: f32, height: f32, item: CellItem) {
        self.push_table(Table {
            columns: vec![width],
            row_height: Some(height),
            cells: vec![Cell::plain(vec![item])],
        });
    }

    fn down_arrow(style: TextStyle) -> CellItem {
        CellItem::Arrows {
            label: String::new(),
            style,
            leading: Some(ArrowDirection::Down),
            trailing: None,
        }
    }

    fn journey(&mut self, columns: usize, steps: &[Step]) {
        let columns = columns.max(1);
        let rows: Vec<&[Step]> = steps.chunks(columns).collect();

        for (row_idx, row) in rows.iter().enumerate() {
            let mut widths = vec![];
            let mut cells = vec![];

            for (i, step) in row.iter().enumerate() {
                widths.push(BOX_COLUMN);
                cells.push(Cell {
                    items: vec![
                        CellItem::Paragraph(Paragraph::new(&step.title, self.styles.box_title)),
                        CellItem::Spacer(4.0),
                        CellItem::Paragraph(Paragraph::new(&step.body, self.styles.box_body)),
                    ],
                    panel: Some(PanelStyle {
                        background: palette::SURFACE_CARD,
                        border: palette::TEAL,
                        border_width: 1.5,
                        corner_radius: 8.0,
                    }),
                    padding: Padding::new(8.0, 8.0, 6.0, 6.0),
                    valign: VAlign::Middle,
                });

                if i + 1 < row.len() {
                    widths.push(ARROW_COLUMN);
                    cells.push(Cell::plain(vec![CellItem::Arrows {
                        label: String::new(),
                        style: self.styles.arrow,
                        leading: Some(ArrowDirection::Right),
                        trailing: None,
                    }]));
                }
            }

            self.push_table(Table { columns: widths, row_height: Some(JOURNEY_ROW), cells });

            if row_idx + 1 < rows.len() {
                self.spacer(2.0);
                let arrow = Self::down_arrow(self.styles.arrow);
                self.arrow_row(self.frame_width, 0.35 * INCH, arrow);
                self.spacer(2.0);
            }
        }
    }

    fn roadmap(&mut self, phases: &[Phase]) {
        for (i, phase) in phases.iter().enumerate() {
            let bullets = phase
                .items
                .iter()
                .map(|item| format!("\u{2022} {}", item))
                .collect::<Vec<_>>()
                .join("\n");

            let cell = Cell {
                items: vec![
                    CellItem::Paragraph(Paragraph::new(
                        &phase.title,
                        self.styles.phase_title.with_color(phase.color),
                    )),
                    CellItem::Paragraph(Paragraph::new(&phase.subtitle, self.styles.phase_subtitle)),
                    CellItem::Spacer(4.0),
                    CellItem::Paragraph(Paragraph::new(bullets, self.styles.phase_body)),
                ],
                panel: Some(bordered(phase.color, 2.0)),
                padding: Padding::new(10.0, 10.0, 14.0, 14.0),
                valign: VAlign::Top,
            };
            self.push_table(Table { columns: vec![self.panel_width], row_height: None, cells: vec![cell] });

            if i + 1 < phases.len() {
                self.spacer(2.0);
                let arrow = Self::down_arrow(self.styles.small_arrow);
                self.arrow_row(self.panel_width, 0.25 * INCH, arrow);
                self.spacer(2.0);
            }
        }
    }

    fn panel_cell(&self, panel: &Panel) -> Cell {
        Cell {
            items: vec![
                CellItem::Paragraph(Paragraph::new(
                    &panel.title,
                    self.styles.layer_title.with_color(panel.color),
                )),
                CellItem::Spacer(3.0),
                CellItem::Paragraph(Paragraph::new(&panel.body, self.styles.layer_body)),
            ],
            panel: Some(bordered(panel.color, 2.0)),
            padding: Padding::new(10.0, 10.0, 12.0, 12.0),
            valign: VAlign::Middle,
        }
    }

    fn architecture(&mut self, layers: &[Panel]) {
        for (i, layer) in layers.iter().enumerate() {
            let cell = self.panel_cell(layer);
            self.push_table(Table { columns: vec![self.panel_width], row_height: None, cells: vec![cell] });

            if i + 1 < layers.len() {
                let arrow = Self::down_arrow(self.styles.small_arrow);
                self.arrow_row(self.panel_width, 0.22 * INCH, arrow);
            }
        }
    }

    fn revenue(&mut self, flow: &RevenueFlow) {
        let source = self.panel_cell(&flow.source);
        self.push_table(Table { columns: vec![self.panel_width], row_height: None, cells: vec![source] });

        self.spacer(4.0);
        let payment = CellItem::Arrows {
            label: flow.payment_label.clone(),
            style: self.styles.small_arrow,
            leading: Some(ArrowDirection::Down),
            trailing: Some(ArrowDirection::Down),
        };
        self.arrow_row(self.panel_width, 0.3 * INCH, payment);
        self.spacer(4.0);

        let escrow = self.panel_cell(&flow.escrow);
        self.push_table(Table { columns: vec![self.panel_width], row_height: None, cells: vec![escrow] });

        if !flow.splits.is_empty() {
            let count = flow.splits.len();

            self.spacer(4.0);
            let label_width = self.panel_width / count as f32;
            let labels = flow
                .splits
                .iter()
                .enumerate()
                .map(|(i, split)| {
                    Cell::plain(vec![CellItem::Arrows {
                        label: split.label.clone(),
                        style: self.styles.split.with_color(split.color),
                        leading: (i == 0 && count > 1).then_some(ArrowDirection::DownLeft),
                        trailing: match (i + 1 == count, count > 1) {
                            (true, true) => Some(ArrowDirection::DownRight),
                            (true, false) => Some(ArrowDirection::Down),
                            _ => None,
                        },
                    }])
                })
                .collect();
            self.push_table(Table {
                columns: vec![label_width; count],
                row_height: Some(0.3 * INCH),
                cells: labels,
            });
            self.spacer(4.0);

            let destinations = flow.splits.iter().map(|s| self.panel_cell(&s.destination)).collect();
            self.push_table(Table {
                columns: vec![self.pair_width / count as f32; count],
                row_height: None,
                cells: destinations,
            });
        }

        self.spacer(20.0);
        self.flowables.push(Flowable::Paragraph(Paragraph::new(
            &flow.streams_title,
            self.styles.section_heading,
        )));

        if !flow.streams.is_empty() {
            let count = flow.streams.len();
            let cells = flow
                .streams
                .iter()
                .map(|stream| Cell {
                    items: vec![
                        CellItem::Paragraph(Paragraph::new(&stream.title, self.styles.stream_title)),
                        CellItem::Spacer(3.0),
                        CellItem::Paragraph(Paragraph::new(&stream.body, self.styles.stream_body)),
                    ],
                    panel: Some(bordered(palette::TEAL, 1.0)),
                    padding: Padding::new(8.0, 8.0, 6.0, 6.0),
                    valign: VAlign::Top,
                })
                .collect();
            self.push_table(Table {
                columns: vec![self.pair_width / count as f32; count],
                row_height: None,
                cells,
            });
        }
    }
}

fn bordered(border: Color, width: f32) -> PanelStyle {
    PanelStyle {
        background: palette::SURFACE_CARD,
        border,
        border_width: width,
        corner_radius: 0.0,
    }
}

/// Compose the whole document with the default style sheet
pub fn compose(document: &FlowchartDocument, setup: &PageSetup) -> Vec<Flowable> {
    let styles = StyleSheet::default();
    StoryBuilder::new(&styles, setup).compose(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(story: &[Flowable]) -> Vec<&Table> {
        story
            .iter()
            .filter_map(|f| match f {
                Flowable::Table(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_page_breaks_between_pages() {
        let story = compose(&FlowchartDocument::moltblox(), &PageSetup::default());
        let breaks = story.iter().filter(|f| **f == Flowable::PageBreak).count();
        assert_eq!(breaks, 3);
        assert!(!matches!(story.last(), Some(Flowable::PageBreak)));
    }

    #[test]
    fn test_journey_rows_alternate_boxes_and_arrows() {
        let mut doc = FlowchartDocument::moltblox();
        doc.pages.truncate(1);
        let story = compose(&doc, &PageSetup::default());
        let tables = tables(&story);

        // 3 box rows + 2 connecting down arrows
        assert_eq!(tables.len(), 5);
        let first = tables[0];
        assert_eq!(first.cells.len(), 5);
        assert!((first.width() - (3.0 * 2.8 + 2.0 * 0.5) * INCH).abs() < 1e-3);
        assert!((first.width() - journey_row_width(3)).abs() < 1e-3);
        assert!(first.cells[0].panel.is_some());
        assert!(first.cells[1].panel.is_none());
    }

    #[test]
    fn test_short_last_row_has_no_trailing_arrow() {
        let mut doc = FlowchartDocument::moltblox();
        if let PageBody::Journey { steps, .. } = &mut doc.pages[0].body {
            steps.truncate(4);
        }
        doc.pages.truncate(1);
        let story = compose(&doc, &PageSetup::default());
        let last = *tables(&story).last().unwrap();
        assert_eq!(last.cells.len(), 1);
    }

    #[test]
    fn test_roadmap_phase_title_uses_phase_color() {
        let doc = FlowchartDocument::moltblox();
        let story = compose(&doc, &PageSetup::default());
        let blue_title = tables(&story).into_iter().find_map(|t| match &t.cells[0].items[0] {
            CellItem::Paragraph(p) if p.text == "Phase 2: Blockchain" => Some(p.style.color),
            _ => None,
        });
        assert_eq!(blue_title, Some(palette::BLUE));
    }

    #[test]
    fn test_split_labels_get_diagonal_arrows() {
        let doc = FlowchartDocument::moltblox();
        let story = compose(&doc, &PageSetup::default());
        let split_row = tables(&story)
            .into_iter()
            .find(|t| t.cells.len() == 2 && t.row_height.is_some())
            .unwrap();

        match (&split_row.cells[0].items[0], &split_row.cells[1].items[0]) {
            (
                CellItem::Arrows { leading: Some(ArrowDirection::DownLeft), trailing: None, .. },
                CellItem::Arrows { leading: None, trailing: Some(ArrowDirection::DownRight), .. },
            ) => {}
            other => panic!("unexpected split row: {:?}", other),
        }
    }

    #[test]
    fn test_tables_fit_frame() {
        let setup = PageSetup::default();
        let story = compose(&FlowchartDocument::moltblox(), &setup);
        for table in tables(&story) {
            assert!(table.width() <= setup.frame().width + 1e-3);
        }
    }
}
