//! Data types shared by the synchronization engine.

mod column;
mod row;
mod selection;

pub use column::*;
pub use row::*;
pub use selection::*;
