/// Identifiers issued by the remote API are integer primary keys.
pub type DbId = i64;
