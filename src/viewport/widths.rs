use std::collections::HashMap;

/// Column id -> width in pixels.
pub type ColumnWidths = HashMap<String, f32>;

/// Persistence of user-resized column widths, keyed by dataset/preparation id.
pub trait ColumnWidthStore {
    fn load(&self, dataset_id: &str) -> ColumnWidths;

    fn save(&mut self, dataset_id: &str, widths: &ColumnWidths);
}

/// In-memory [`ColumnWidthStore`].
#[derive(Debug, Default, Clone)]
pub struct MemoryWidthStore {
    entries: HashMap<String, ColumnWidths>,
}

impl MemoryWidthStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ColumnWidthStore for MemoryWidthStore {
    fn load(&self, dataset_id: &str) -> ColumnWidths {
        self.entries.get(dataset_id).cloned().unwrap_or_default()
    }

    fn save(&mut self, dataset_id: &str, widths: &ColumnWidths) {
        self.entries.insert(dataset_id.to_string(), widths.clone());
    }
}
