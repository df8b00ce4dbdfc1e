/// Backend identifiers are UUIDv7 for every wiki object.
pub type ObjectId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Versions are identified by the storage commit they were created in.
pub type CommitId = String;
