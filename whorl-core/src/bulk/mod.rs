mod executor;

pub use executor::{parse_domains_from_file, BulkResolver, BulkResult, ProgressCallback};
