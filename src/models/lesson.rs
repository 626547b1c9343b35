use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One concrete lesson occurrence: a single row per calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Lesson {
    pub id: String,
    pub group_id: i64,
    /// Calendar date, "YYYY-MM-DD".
    pub date: String,
    /// "HH:MM", must sort before `end_time`.
    pub start_time: String,
    pub end_time: String,
    pub subject: String,
    pub teacher_id: Option<i64>,
    pub room: String,
    /// "lecture" or "practice".
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonInput {
    pub start_time: String,
    pub end_time: String,
    pub subject: String,
    pub teacher_id: Option<i64>,
    pub room: String,
    pub kind: String,
}

/// Which academic weeks a recurring template applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    Any,
    Even,
    Odd,
}

impl Parity {
    pub fn as_i64(self) -> i64 {
        match self {
            Parity::Any => 0,
            Parity::Even => 1,
            Parity::Odd => 2,
        }
    }

    pub fn from_i64(value: i64) -> Option<Parity> {
        match value {
            0 => Some(Parity::Any),
            1 => Some(Parity::Even),
            2 => Some(Parity::Odd),
            _ => None,
        }
    }

    pub fn matches(self, week_is_even: bool) -> bool {
        match self {
            Parity::Any => true,
            Parity::Even => week_is_even,
            Parity::Odd => !week_is_even,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Parity::Any => "any",
            Parity::Even => "even",
            Parity::Odd => "odd",
        }
    }
}
