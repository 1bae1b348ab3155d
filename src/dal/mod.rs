pub mod record_file;
pub mod stream_writer;
pub mod url_csv;

pub use record_file::*;
pub use stream_writer::*;
pub use url_csv::*;
