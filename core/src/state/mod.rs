pub mod selection;
pub mod sort;

pub use selection::{SelectionState, SelectionStore};
pub use sort::{SortDirection, SortState};
