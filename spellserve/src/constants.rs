/// Extension of a persisted dictionary record, `<code>.dict`.
pub const RECORD_EXTENSION: &str = "dict";
/// File name of the persisted alias metadata.
pub const METADATA_FILE: &str = "metadata";
/// Edit distance used when a dictionary is created with `max_errors == 0`.
pub const DEFAULT_MAX_ERRORS: u32 = 2;
/// Version tag written into serialized [`FuzzyDictionary`](crate::dictionary::FuzzyDictionary) state.
pub const STATE_FORMAT_VERSION: u32 = 1;
