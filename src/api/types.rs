use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shared workspace both partners read and write. Stored in the
/// `profile_key` column of every table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceKey(pub String);

impl WorkspaceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl fmt::Display for WorkspaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-assigned primary key. PostgREST hands back whatever the column
/// type is, so accept both bigint and uuid/text ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(n) => write!(f, "{}", n),
            RowId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "nyuToIu")]
    NyuToIu,
    #[serde(rename = "iuToNyu")]
    IuToNyu,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::NyuToIu, Direction::IuToNyu];

    /// Value stored in the `direction` column
    pub fn as_wire(&self) -> &'static str {
        match self {
            Direction::NyuToIu => "nyuToIu",
            Direction::IuToNyu => "iuToNyu",
        }
    }

    /// "NYU → IU" style label, given the two place names
    pub fn label(&self, home: &str, away: &str) -> String {
        match self {
            Direction::NyuToIu => format!("{} → {}", home, away),
            Direction::IuToNyu => format!("{} → {}", away, home),
        }
    }

    /// Where the day being planned takes place
    pub fn destination<'a>(&self, home: &'a str, away: &'a str) -> &'a str {
        match self {
            Direction::NyuToIu => away,
            Direction::IuToNyu => home,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Do,
    Eat,
    Shower,
    Goodmorning,
    Goodnight,
    Getready,
}

// ============================================================================
// trip_plans
// ============================================================================

/// Older rows stored a single string where we now keep a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    Many(Vec<String>),
    One(String),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::Many(v) => v,
            OneOrMany::One(s) if s.is_empty() => Vec::new(),
            OneOrMany::One(s) => vec![s],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanRow {
    pub direction: Direction,
    #[serde(default)]
    pub activity: Option<OneOrMany>,
    #[serde(default)]
    pub vibe: Option<String>,
    #[serde(default)]
    pub food: Option<OneOrMany>,
    #[serde(default)]
    pub locked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanUpsert {
    pub profile_key: WorkspaceKey,
    pub direction: Direction,
    pub activity: Vec<String>,
    pub vibe: Option<String>,
    pub food: Vec<String>,
    pub locked: bool,
}

// ============================================================================
// trip_schedules / trip_schedule_blocks
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub id: RowId,
    pub profile_key: WorkspaceKey,
    pub direction: Direction,
    pub day_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSchedule {
    pub profile_key: WorkspaceKey,
    pub direction: Direction,
    pub day_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: RowId,
    pub schedule_id: RowId,
    pub label: String,
    pub kind: BlockKind,
    #[serde(default)]
    pub day_index: i32,
    pub start_minutes: i32,
    pub end_minutes: i32,
}

impl Block {
    pub fn duration(&self) -> i32 {
        self.end_minutes - self.start_minutes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBlock {
    pub schedule_id: RowId,
    pub label: String,
    pub kind: BlockKind,
    pub day_index: i32,
    pub start_minutes: i32,
    pub end_minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockTimes {
    pub start_minutes: i32,
    pub end_minutes: i32,
}

// ============================================================================
// schedule_posts / schedule_likes / schedule_comments
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: RowId,
    pub schedule_id: RowId,
    pub direction: Direction,
    pub day_label: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostUpsert {
    pub profile_key: WorkspaceKey,
    pub schedule_id: RowId,
    pub direction: Direction,
    pub day_label: String,
    pub title: String,
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeRow {
    pub post_id: RowId,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewLike {
    pub post_id: RowId,
    pub profile_key: WorkspaceKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: RowId,
    pub post_id: RowId,
    #[serde(default)]
    pub author_name: Option<String>,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn author(&self) -> &str {
        self.author_name.as_deref().unwrap_or("Us")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub post_id: RowId,
    pub profile_key: WorkspaceKey,
    pub author_name: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_id_accepts_numbers_and_strings() {
        let ids: Vec<RowId> = serde_json::from_str(r#"[7, "a1b2"]"#).unwrap();
        assert_eq!(ids, vec![RowId::Int(7), RowId::Text("a1b2".into())]);
        assert_eq!(ids[0].to_string(), "7");
    }

    #[test]
    fn plan_row_normalizes_legacy_scalars() {
        let row: PlanRow = serde_json::from_str(
            r#"{"direction":"iuToNyu","activity":"Coffee","vibe":null,
                "food":["Thai"],"locked":null}"#,
        )
        .unwrap();
        assert_eq!(row.direction, Direction::IuToNyu);
        assert_eq!(row.activity.unwrap().into_vec(), vec!["Coffee".to_string()]);
        assert_eq!(row.food.unwrap().into_vec(), vec!["Thai".to_string()]);
        assert!(row.vibe.is_none());
    }

    #[test]
    fn block_kind_uses_lowercase_wire_names() {
        let json = serde_json::to_string(&BlockKind::Goodmorning).unwrap();
        assert_eq!(json, "\"goodmorning\"");
    }

    #[test]
    fn direction_labels_follow_place_names() {
        assert_eq!(Direction::NyuToIu.label("NYU", "IU"), "NYU → IU");
        assert_eq!(Direction::IuToNyu.label("NYU", "IU"), "IU → NYU");
        assert_eq!(Direction::NyuToIu.destination("NYU", "IU"), "IU");
    }

    #[test]
    fn comment_without_author_reads_as_us() {
        let c: Comment = serde_json::from_str(r#"{"id":1,"post_id":2,"content":"hi"}"#).unwrap();
        assert_eq!(c.author(), "Us");
    }
}
