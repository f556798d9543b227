//! Tuning knobs of the synchronization engine.
//!
//! Delays are empirical. Only their relative order matters for correctness:
//! the tooltip show delay must be non-zero so fast pointer movement never
//! flashes a tooltip.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Engine configuration. Every field has a default, so hosts may pass a
/// partial object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    /// Column rebuild after a data-page swap.
    pub column_rebuild_delay_ms: f64,
    /// CSS class refresh after a selection change.
    pub style_refresh_delay_ms: f64,
    /// Highlight recomputation after a highlight request.
    pub highlight_delay_ms: f64,
    /// External "what's on screen" panel refresh after scrolling.
    pub panel_refresh_delay_ms: f64,
    /// Canvas resize after the container visibility changed.
    pub viewport_resize_delay_ms: f64,
    /// Hover time before a cell is probed for truncation.
    pub tooltip_show_delay_ms: f64,
    /// Delay between a positive probe and the tooltip content update.
    pub tooltip_content_delay_ms: f64,
    /// Delay before a visible tooltip is hidden on pointer leave.
    pub tooltip_hide_delay_ms: f64,
    /// Fixed max width of the index column.
    pub index_column_max_width: f32,
    /// Minimum width of data columns.
    pub column_min_width: f32,
    /// Horizontal padding subtracted from a cell's width before measuring.
    pub tooltip_padding: f32,
    /// Cell box height used when the widget cannot report one.
    pub cell_height: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            column_rebuild_delay_ms: 0.0,
            style_refresh_delay_ms: 100.0,
            highlight_delay_ms: 100.0,
            panel_refresh_delay_ms: 300.0,
            viewport_resize_delay_ms: 500.0,
            tooltip_show_delay_ms: 300.0,
            tooltip_content_delay_ms: 100.0,
            tooltip_hide_delay_ms: 100.0,
            index_column_max_width: 45.0,
            column_min_width: 80.0,
            tooltip_padding: 8.0,
            cell_height: 25.0,
        }
    }
}

impl GridConfig {
    /// Check the constraints the engine relies on.
    ///
    /// # Errors
    /// Returns [`GridError::Config`] for negative delays or a zero tooltip
    /// show delay.
    pub fn validate(&self) -> Result<()> {
        let delays = [
            ("columnRebuildDelayMs", self.column_rebuild_delay_ms),
            ("styleRefreshDelayMs", self.style_refresh_delay_ms),
            ("highlightDelayMs", self.highlight_delay_ms),
            ("panelRefreshDelayMs", self.panel_refresh_delay_ms),
            ("viewportResizeDelayMs", self.viewport_resize_delay_ms),
            ("tooltipShowDelayMs", self.tooltip_show_delay_ms),
            ("tooltipContentDelayMs", self.tooltip_content_delay_ms),
            ("tooltipHideDelayMs", self.tooltip_hide_delay_ms),
        ];
        if let Some((name, _)) = delays.iter().find(|(_, d)| !d.is_finite() || *d < 0.0) {
            return Err(GridError::Config(format!("{name} must be a finite, non-negative delay")));
        }
        if self.tooltip_show_delay_ms <= 0.0 {
            return Err(GridError::Config("tooltipShowDelayMs must be greater than 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GridConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_tooltip_delay_rejected() {
        let config = GridConfig {
            tooltip_show_delay_ms: 0.0,
            ..GridConfig::default()
        };
        assert!(matches!(config.validate(), Err(GridError::Config(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GridConfig =
            serde_json::from_str(r#"{ "highlightDelayMs": 250 }"#).unwrap_or_default();
        assert!((config.highlight_delay_ms - 250.0).abs() < f64::EPSILON);
        assert!((config.panel_refresh_delay_ms - 300.0).abs() < f64::EPSILON);
    }
}
