use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post as the API surfaces it: always joined with the author's
/// username, so clients never have to resolve the display name themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub username: String,
}
