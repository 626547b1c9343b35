use serde::Serialize;
use sqlx::FromRow;

/// Append-only log entry for an admin mutation; `old_value`/`new_value`
/// hold opaque JSON snapshots of the affected rows.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuditRecord {
    pub id: String,
    pub admin_id: String,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub created_at: String,
}
