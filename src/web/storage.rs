use web_sys::Storage;

use crate::viewport::{ColumnWidthStore, ColumnWidths};

const KEY_PREFIX: &str = "gridsync.columns.widths.";

/// Column widths in `window.localStorage`, one JSON entry per dataset.
pub struct LocalStorageWidthStore {
    storage: Storage,
}

impl LocalStorageWidthStore {
    /// `None` when local storage is unavailable (private mode, sandbox).
    pub fn new() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

impl ColumnWidthStore for LocalStorageWidthStore {
    fn load(&self, dataset_id: &str) -> ColumnWidths {
        let key = format!("{KEY_PREFIX}{dataset_id}");
        let Ok(Some(json)) = self.storage.get_item(&key) else {
            return ColumnWidths::new();
        };
        serde_json::from_str(&json).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable widths for {}: {}", dataset_id, e);
            ColumnWidths::new()
        })
    }

    fn save(&mut self, dataset_id: &str, widths: &ColumnWidths) {
        let key = format!("{KEY_PREFIX}{dataset_id}");
        match serde_json::to_string(widths) {
            Ok(json) => {
                if self.storage.set_item(&key, &json).is_err() {
                    tracing::warn!("Could not persist widths for {}", dataset_id);
                }
            }
            Err(e) => tracing::warn!("Could not serialize widths: {}", e),
        }
    }
}
