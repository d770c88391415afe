//! Styles - text styles and page geometry
//!
//! All measurements are PDF points (1/72 inch).

use serde::{Deserialize, Serialize};

use crate::palette::{self, Color};

pub const INCH: f32 = 72.0;

/// Landscape A4
pub const PAGE_WIDTH: f32 = 841.89;
pub const PAGE_HEIGHT: f32 = 595.28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFace {
    Regular,
    Bold,
    Oblique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    Top,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: f32,
    pub color: Color,
    pub leading: f32,
    pub align: Align,
    pub space_before: f32,
    pub space_after: f32,
}

impl TextStyle {
    /// Style with the default leading of 1.2 x size and no extra spacing
    pub fn new(face: FontFace, size: f32, color: Color, align: Align) -> Self {
        Self {
            face,
            size,
            color,
            leading: size * 1.2,
            align,
            space_before: 0.0,
            space_after: 0.0,
        }
    }

    pub fn leading(mut self, leading: f32) -> Self {
        self.leading = leading;
        self
    }

    pub fn spacing(mut self, before: f32, after: f32) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Named styles used by the flowchart deck
#[derive(Debug, Clone)]
pub struct StyleSheet {
    pub title: TextStyle,
    pub subtitle: TextStyle,
    pub box_title: TextStyle,
    pub box_body: TextStyle,
    pub phase_title: TextStyle,
    pub phase_subtitle: TextStyle,
    pub phase_body: TextStyle,
    pub layer_title: TextStyle,
    pub layer_body: TextStyle,
    pub arrow: TextStyle,
    pub small_arrow: TextStyle,
    pub split: TextStyle,
    pub section_heading: TextStyle,
    pub stream_title: TextStyle,
    pub stream_body: TextStyle,
}

impl Default for StyleSheet {
    fn default() -> Self {
        use palette::{CYAN, TEAL, WHITE, WHITE_40, WHITE_70};
        use Align::{Center, Left};
        use FontFace::{Bold, Oblique, Regular};

        Self {
            title: TextStyle::new(Bold, 24.0, WHITE, Center).spacing(0.0, 6.0),
            subtitle: TextStyle::new(Regular, 11.0, WHITE_70, Center).spacing(0.0, 20.0),
            box_title: TextStyle::new(Bold, 11.0, WHITE, Center).leading(14.0),
            box_body: TextStyle::new(Regular, 8.0, WHITE_70, Center).leading(10.0),
            phase_title: TextStyle::new(Bold, 12.0, WHITE, Left).leading(14.0),
            phase_subtitle: TextStyle::new(Oblique, 9.0, WHITE_40, Left).leading(11.0),
            phase_body: TextStyle::new(Regular, 9.0, WHITE_70, Left).leading(12.0),
            layer_title: TextStyle::new(Bold, 11.0, WHITE, Center).leading(14.0),
            layer_body: TextStyle::new(Regular, 8.0, WHITE_70, Center).leading(10.0),
            arrow: TextStyle::new(Bold, 16.0, TEAL, Center).spacing(2.0, 2.0),
            small_arrow: TextStyle::new(Bold, 12.0, TEAL, Center).spacing(1.0, 1.0),
            split: TextStyle::new(Bold, 10.0, WHITE, Center).leading(12.0),
            section_heading: TextStyle::new(Bold, 14.0, WHITE, Center).spacing(0.0, 10.0),
            stream_title: TextStyle::new(Bold, 9.0, CYAN, Center).leading(11.0),
            stream_body: TextStyle::new(Regular, 8.0, WHITE_70, Center).leading(10.0),
        }
    }
}

/// Axis-aligned rectangle in PDF user space (origin bottom-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn contains(&self, other: &Rect) -> bool {
        const EPS: f32 = 0.01;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.top() <= self.top() + EPS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Inset between the margins and the flowable area
    pub frame_padding: f32,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            margin_top: 0.6 * INCH,
            margin_bottom: 0.5 * INCH,
            margin_left: 0.6 * INCH,
            margin_right: 0.6 * INCH,
            frame_padding: 6.0,
        }
    }
}

impl PageSetup {
    pub fn page(&self) -> Rect {
        Rect { x: 0.0, y: 0.0, width: self.width, height: self.height }
    }

    /// Area flowables are placed in
    pub fn frame(&self) -> Rect {
        let x = self.margin_left + self.frame_padding;
        let y = self.margin_bottom + self.frame_padding;
        Rect {
            x,
            y,
            width: self.width - self.margin_left - self.margin_right - 2.0 * self.frame_padding,
            height: self.height - self.margin_top - self.margin_bottom - 2.0 * self.frame_padding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_leading() {
        let sheet = StyleSheet::default();
        assert!((sheet.title.leading - 28.8).abs() < 1e-4);
        assert_eq!(sheet.box_body.leading, 10.0);
    }

    #[test]
    fn test_frame_inside_page() {
        let setup = PageSetup::default();
        let frame = setup.frame();
        assert!(setup.page().contains(&frame));
        assert!((frame.width - (PAGE_WIDTH - 1.2 * INCH - 12.0)).abs() < 1e-3);
        assert!((frame.top() - (PAGE_HEIGHT - 0.6 * INCH - 6.0)).abs() < 1e-3);
    }

    #[test]
    fn test_full_width_panel_fits_frame() {
        let frame = PageSetup::default().frame();
        assert!(PAGE_WIDTH - 1.4 * INCH <= frame.width);
    }
}
