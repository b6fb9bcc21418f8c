pub mod analysis;
pub mod clock;
pub mod dashboard;
pub mod extract;
pub mod feed;
pub mod loader;
pub mod model;
pub mod utils;

pub use analysis::{compute_stats, filter, SummaryStats};
pub use extract::{extract, Extractor, ExtractorConfig};
pub use model::{Cell, FeedEnvelope, RawRow, StockRecord};
