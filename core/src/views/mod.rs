pub mod dashboard;
pub mod format;
pub mod model;
pub mod sync;

pub use dashboard::{Dashboard, DashboardOptions, ViewState};
pub use model::{
    ColumnHeader, ComparativeDataset, ComparativeView, ProfileCard, SortIndicator, TableCell,
    TableRow, TableView, TrendDataset, TrendView, ViewSnapshot,
};
pub use sync::ViewSynchronizer;
