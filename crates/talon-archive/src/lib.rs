pub mod gz_json;
pub mod local;
pub mod s3;

pub use gz_json::GzJsonDirSource;
pub use local::JsonFileSink;
pub use s3::{S3EventSource, S3Store, S3SummarySink};
