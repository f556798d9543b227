//! Column definitions and drag-reorder detection.

mod builder;
mod reorder;

pub use builder::{column_diff_class, create_columns, ColumnBuilder};
pub use reorder::{detect_move, detect_moved_column, ColumnMove, MovedColumn};
