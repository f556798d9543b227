use crate::schedule::TaskKey;
use crate::style::HighlightTarget;
use crate::tooltip::{HoveredCell, TooltipState};

/// Deferred work of the engine. One variant per scheduler key.
#[derive(Debug, Clone, PartialEq)]
pub enum GridTask {
    RebuildColumns,
    RefreshStyles,
    /// `None` resets the highlight.
    RefreshHighlight(Option<HighlightTarget>),
    RefreshPanel,
    ResizeViewport { available_height: f32 },
    TooltipProbe(HoveredCell),
    TooltipReveal(TooltipState),
    TooltipHide,
}

impl GridTask {
    /// Scheduler key the task debounces under.
    pub fn key(&self) -> TaskKey {
        match self {
            Self::RebuildColumns => TaskKey::COLUMNS,
            Self::RefreshStyles => TaskKey::STYLES,
            Self::RefreshHighlight(_) => TaskKey::HIGHLIGHT,
            Self::RefreshPanel => TaskKey::PANEL,
            Self::ResizeViewport { .. } => TaskKey::RESIZE,
            Self::TooltipProbe(_) => TaskKey::TOOLTIP_SHOW,
            Self::TooltipReveal(_) => TaskKey::TOOLTIP_CONTENT,
            Self::TooltipHide => TaskKey::TOOLTIP_HIDE,
        }
    }
}
