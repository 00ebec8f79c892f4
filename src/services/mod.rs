pub mod droid;
pub mod export;
pub mod job_scraper;
pub mod structured_data;

pub use droid::*;
pub use job_scraper::*;
pub use structured_data::*;
