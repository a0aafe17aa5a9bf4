/// Caller-supplied identifier of a live client session.
pub type ClientId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
