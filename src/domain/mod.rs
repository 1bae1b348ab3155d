pub mod html_class;
pub mod job_record;
pub mod scraped_fields;

pub use job_record::*;
pub use scraped_fields::*;
