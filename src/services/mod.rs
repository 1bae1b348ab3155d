pub mod batch;
pub mod enricher;
pub mod metadata_extractor;
pub mod page_fetcher;

pub use enricher::*;
pub use metadata_extractor::*;
pub use page_fetcher::*;
