//! Overlay tooltip for visually truncated cells.
//!
//! Timing lives in the engine (show probe, content update and hide are three
//! scheduler keys). This module holds the hover state and the sizing policy:
//! never for empty text, always for multi-line text, otherwise only when the
//! measured text overflows the cell box.

use serde::Serialize;

use crate::style::tooltip_html;
use crate::viewport::CellBox;

/// Rendered size of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextSize {
    pub width: f32,
    pub height: f32,
}

/// Measures text the way grid cells render it (same font, no wrapping).
pub trait TextMeasurer {
    fn measure(&self, text: &str) -> TextSize;
}

/// Decide whether `text` rendered in `cell` is truncated.
///
/// `padding` is the horizontal cell padding not available to text.
pub fn needs_tooltip(text: &str, cell: CellBox, padding: f32, measurer: &dyn TextMeasurer) -> bool {
    if text.is_empty() {
        return false;
    }
    if text.contains('\n') {
        return true;
    }
    let size = measurer.measure(text);
    size.width > cell.width - padding || size.height > cell.height
}

/// Cell under the pointer, with the pointer position captured on enter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoveredCell {
    pub row: usize,
    pub cell: usize,
    pub x: f32,
    pub y: f32,
}

/// What the host should display.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipState {
    pub visible: bool,
    pub x: f32,
    pub y: f32,
    /// Escaped content, line breaks as `<br>`.
    pub content_html: String,
}

/// Hover tracking and tooltip visibility.
#[derive(Debug, Clone, Default)]
pub struct TooltipSizer {
    padding: f32,
    hovered: Option<HoveredCell>,
    state: TooltipState,
}

impl TooltipSizer {
    pub fn new(padding: f32) -> Self {
        Self {
            padding,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &TooltipState {
        &self.state
    }

    pub fn hovered(&self) -> Option<HoveredCell> {
        self.hovered
    }

    pub fn on_pointer_enter(&mut self, hovered: HoveredCell) {
        self.hovered = Some(hovered);
    }

    /// Forget the hovered cell. Returns whether a tooltip is showing and
    /// needs hiding.
    pub fn on_pointer_leave(&mut self) -> bool {
        self.hovered = None;
        self.state.visible
    }

    /// Tooltip to show for the hovered cell, if its content is truncated.
    ///
    /// `hovered` must still be the cell under the pointer, otherwise the
    /// probe is stale and yields nothing.
    pub fn probe(
        &self,
        hovered: HoveredCell,
        text: &str,
        cell: CellBox,
        measurer: &dyn TextMeasurer,
    ) -> Option<TooltipState> {
        if self.hovered != Some(hovered) {
            return None;
        }
        needs_tooltip(text, cell, self.padding, measurer).then(|| TooltipState {
            visible: true,
            x: hovered.x,
            y: hovered.y,
            content_html: tooltip_html(text),
        })
    }

    /// Display `state`. Returns whether anything changed.
    pub fn show(&mut self, state: TooltipState) -> bool {
        let changed = self.state != state;
        self.state = state;
        changed
    }

    pub fn hide(&mut self) -> bool {
        let changed = self.state.visible;
        self.state = TooltipState::default();
        changed
    }
}

#[cfg(test)]
#[allow(clippy::unreachable)]
mod tests {
    use super::*;

    /// 7px per char, 14px line height.
    struct Monospace;

    impl TextMeasurer for Monospace {
        fn measure(&self, text: &str) -> TextSize {
            TextSize {
                width: 7.0 * text.chars().count() as f32,
                height: 14.0,
            }
        }
    }

    const WIDE: CellBox = CellBox {
        width: 200.0,
        height: 25.0,
    };

    #[test]
    fn test_policy() {
        assert!(!needs_tooltip("", WIDE, 8.0, &Monospace));
        assert!(needs_tooltip("a\nb", WIDE, 8.0, &Monospace));
        assert!(!needs_tooltip("x", WIDE, 8.0, &Monospace));
        let narrow = CellBox {
            width: 30.0,
            height: 25.0,
        };
        assert!(needs_tooltip("abcd", narrow, 8.0, &Monospace));
        let short = CellBox {
            width: 200.0,
            height: 10.0,
        };
        assert!(needs_tooltip("x", short, 8.0, &Monospace));
    }

    #[test]
    fn test_stale_probe_ignored() {
        let mut sizer = TooltipSizer::new(8.0);
        let hovered = HoveredCell {
            row: 1,
            cell: 2,
            x: 10.0,
            y: 20.0,
        };
        sizer.on_pointer_enter(hovered);
        assert!(sizer.probe(hovered, "a\nb", WIDE, &Monospace).is_some());
        sizer.on_pointer_leave();
        assert!(sizer.probe(hovered, "a\nb", WIDE, &Monospace).is_none());
    }

    #[test]
    fn test_show_and_hide() {
        let mut sizer = TooltipSizer::new(8.0);
        let hovered = HoveredCell {
            row: 0,
            cell: 1,
            x: 1.0,
            y: 2.0,
        };
        sizer.on_pointer_enter(hovered);
        let Some(state) = sizer.probe(hovered, "<a>\nb", WIDE, &Monospace) else {
            unreachable!("multi-line text always gets a tooltip");
        };
        assert_eq!(state.content_html, "&lt;a&gt;<br>b");
        assert!(sizer.show(state));
        assert!(sizer.on_pointer_leave());
        assert!(sizer.hide());
        assert!(!sizer.hide());
    }
}
