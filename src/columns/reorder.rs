//! Drag-reorder diff: which single column moved between two orderings.
//!
//! The grid widget only reports the new column order after a drag. The
//! application needs the moved column and its drop anchor, so the two
//! orderings are walked in lock-step until the first mismatch, and the two
//! possible explanations (forward or backward move) are tested there.
//!
//! A candidate is accepted only if replaying it on the previous ordering
//! reproduces the new ordering exactly. Anything else, e.g. several columns
//! moved at once, is reported as "no move".

use serde::Serialize;

use crate::types::{ColumnDefinition, INDEX_ID};

/// Positions of a single-column move, as indices into the previous ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnMove {
    /// Index the moved column had before the drag.
    pub from: usize,
    /// Index the moved column has after the drag.
    pub to: usize,
}

/// A detected column move, named for the application layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovedColumn {
    pub moved_id: String,
    /// Id that occupied the landing slot in the previous ordering.
    pub target_id: String,
    pub moved_name: String,
}

/// Detect a single-column move between two orderings of ids.
///
/// Returns `None` for identical orderings and for orderings that cannot be
/// explained by moving exactly one element.
pub fn detect_move<T: AsRef<str>>(previous: &[T], current: &[T]) -> Option<ColumnMove> {
    if previous.len() != current.len() {
        return None;
    }

    let first = previous
        .iter()
        .zip(current)
        .position(|(a, b)| a.as_ref() != b.as_ref())?;
    let previous_at = previous.get(first)?.as_ref();
    let current_at = current.get(first)?.as_ref();

    // Forward: the column at `first` was dragged right, so its successor
    // shifted left into `first`.
    if previous.get(first + 1).map(AsRef::as_ref) == Some(current_at) {
        if let Some(to) = current.iter().position(|id| id.as_ref() == previous_at) {
            let candidate = ColumnMove { from: first, to };
            if replays(previous, current, candidate) {
                return Some(candidate);
            }
        }
    }

    // Backward: the column now at `first` jumped left, so the previous
    // occupant of `first` sits right after it.
    if current.get(first + 1).map(AsRef::as_ref) == Some(previous_at) {
        if let Some(from) = previous.iter().position(|id| id.as_ref() == current_at) {
            let candidate = ColumnMove { from, to: first };
            if replays(previous, current, candidate) {
                return Some(candidate);
            }
        }
    }

    None
}

/// Apply `candidate` to `previous` and compare with `current`.
fn replays<T: AsRef<str>>(previous: &[T], current: &[T], candidate: ColumnMove) -> bool {
    let mut ids: Vec<&str> = previous.iter().map(AsRef::as_ref).collect();
    if candidate.from >= ids.len() || candidate.to >= ids.len() {
        return false;
    }
    let moved = ids.remove(candidate.from);
    ids.insert(candidate.to, moved);
    ids.iter().copied().eq(current.iter().map(AsRef::as_ref))
}

/// Detect which column a drag-reorder moved, ignoring the index column.
pub fn detect_moved_column(
    previous: &[ColumnDefinition],
    current: &[ColumnDefinition],
) -> Option<MovedColumn> {
    let previous_ids = data_ids(previous);
    let current_ids = data_ids(current);
    if previous_ids == current_ids {
        return None;
    }

    let Some(found) = detect_move(&previous_ids, &current_ids) else {
        tracing::warn!(
            "Ignoring column reorder that is not a single-column move ({} columns)",
            current_ids.len()
        );
        return None;
    };

    let moved_id = previous_ids.get(found.from)?.to_string();
    let target_id = previous_ids.get(found.to)?.to_string();
    let moved_name = current
        .iter()
        .find(|c| c.id == moved_id)
        .map(|c| c.name().to_string())
        .unwrap_or_default();

    tracing::debug!(
        "Column {} moved from {} to {} (anchor {})",
        moved_id,
        found.from,
        found.to,
        target_id
    );
    Some(MovedColumn {
        moved_id,
        target_id,
        moved_name,
    })
}

fn data_ids(columns: &[ColumnDefinition]) -> Vec<&str> {
    columns
        .iter()
        .map(|c| c.id.as_str())
        .filter(|id| *id != INDEX_ID)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&["A", "B", "C", "D"], &["B", "C", "A", "D"], 0, 2 ; "forward move")]
    #[test_case(&["A", "B", "C", "D"], &["C", "A", "B", "D"], 2, 0 ; "backward move")]
    #[test_case(&["A", "B", "C", "D"], &["A", "B", "D", "C"], 2, 3 ; "adjacent swap at end")]
    #[test_case(&["A", "B", "C", "D"], &["A", "D", "B", "C"], 3, 1 ; "last to middle")]
    #[test_case(&["A", "B", "C", "D"], &["A", "C", "D", "B"], 1, 3 ; "middle to last")]
    fn test_single_moves(previous: &[&str], current: &[&str], from: usize, to: usize) {
        assert_eq!(detect_move(previous, current), Some(ColumnMove { from, to }));
    }

    #[test]
    fn test_move_serializes_as_positions() {
        let found = detect_move(&["A", "B", "C"], &["B", "C", "A"]);
        let json = serde_json::to_value(found).unwrap_or_default();
        assert_eq!(json, serde_json::json!({ "from": 0, "to": 2 }));
        let none = serde_json::to_value(detect_move(&["A"], &["A"])).unwrap_or_default();
        assert!(none.is_null());
    }

    #[test]
    fn test_identical_is_none() {
        let ids = ["A", "B", "C"];
        assert_eq!(detect_move(&ids, &ids), None);
    }

    #[test_case(&["A", "B", "C", "D"], &["B", "A", "D", "C"] ; "two swaps")]
    #[test_case(&["A", "B", "C", "D"], &["D", "C", "B", "A"] ; "reversed")]
    #[test_case(&["A", "B", "C"], &["A", "B"] ; "different length")]
    #[test_case(&["A", "B", "C"], &["A", "X", "C"] ; "different ids")]
    fn test_multi_column_reorders_rejected(previous: &[&str], current: &[&str]) {
        assert_eq!(detect_move(previous, current), None);
    }
}
