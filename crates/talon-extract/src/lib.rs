pub mod record;

pub use record::extract_event;
