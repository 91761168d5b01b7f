mod repo;

pub use repo::{append, list_for_date, list_for_range, EntryKind, LogEntry, NewEntry};
