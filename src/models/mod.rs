pub mod record;

pub use record::{SessionRecord, RECORD_DATE_FORMAT};
