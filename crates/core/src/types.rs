/// Row ids are SQLite INTEGER PRIMARY KEY values.
pub type DbId = i64;

/// Timestamps are local wall-clock time, assigned by the store at insert.
pub type Timestamp = chrono::NaiveDateTime;
