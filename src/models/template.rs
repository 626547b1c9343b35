use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Legacy weekly-template row: recurrence keyed by (day_of_week, parity)
/// instead of a concrete date. Teacher name is denormalized text here,
/// which is what the bulk replace-teacher operation rewrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LessonTemplate {
    pub id: String,
    pub group_id: i64,
    /// Monday=0 .. Saturday=5.
    pub day_of_week: i64,
    /// 0=any, 1=even, 2=odd; see [`crate::models::Parity`].
    pub parity: i64,
    pub start_time: String,
    pub end_time: String,
    pub subject: String,
    pub teacher_name: String,
    pub room: String,
    pub kind: String,
}
