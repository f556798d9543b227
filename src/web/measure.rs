use std::cell::RefCell;
use std::collections::HashMap;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::{GridError, Result};
use crate::tooltip::{TextMeasurer, TextSize};

const MEASURE_CACHE_CAP: usize = 4096;

/// Measures single-line text on an offscreen canvas, in the cell font.
pub struct CanvasTextMeasurer {
    ctx: CanvasRenderingContext2d,
    line_height: f32,
    widths: RefCell<HashMap<String, f32>>,
}

impl CanvasTextMeasurer {
    /// Measure with `font`, or with whatever font the host already set on
    /// the canvas context.
    ///
    /// # Errors
    /// [`GridError::Js`] if the canvas has no 2D context.
    pub fn new(canvas: &HtmlCanvasElement, font: Option<&str>, line_height: f32) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| GridError::Js(format!("{e:?}")))?
            .ok_or_else(|| GridError::Js("measuring canvas has no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| GridError::Js("not a 2d context".into()))?;
        if let Some(font) = font {
            ctx.set_font(font);
        }
        Ok(Self {
            ctx,
            line_height,
            widths: RefCell::new(HashMap::new()),
        })
    }
}

impl TextMeasurer for CanvasTextMeasurer {
    #[allow(clippy::cast_possible_truncation)]
    fn measure(&self, text: &str) -> TextSize {
        let mut widths = self.widths.borrow_mut();
        let width = if let Some(&width) = widths.get(text) {
            width
        } else {
            let width = self
                .ctx
                .measure_text(text)
                .map(|m| m.width() as f32)
                .unwrap_or(0.0);
            if widths.len() >= MEASURE_CACHE_CAP {
                widths.clear();
            }
            widths.insert(text.to_string(), width);
            width
        };
        TextSize {
            width,
            height: self.line_height,
        }
    }
}
