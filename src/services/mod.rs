pub mod records;

pub use records::{MutationOutcome, RecordService};
