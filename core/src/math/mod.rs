pub mod align;
pub mod stats;

pub use align::SeriesAligner;
pub use stats::StatsHelper;
