use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use crate::db::repository;
use crate::models::AuditRecord;

/// Appends one audit record. Best-effort by contract: a failed write is
/// logged and swallowed so it can never fail an already-committed change.
pub async fn record(
    db: &SqlitePool,
    admin_id: &str,
    action: &str,
    target_type: &str,
    target_id: Option<String>,
    old_value: Option<serde_json::Value>,
    new_value: Option<serde_json::Value>,
) {
    let record = AuditRecord {
        id: Uuid::new_v4().to_string(),
        admin_id: admin_id.to_string(),
        action: action.to_string(),
        target_type: target_type.to_string(),
        target_id,
        old_value: old_value.map(|v| v.to_string()),
        new_value: new_value.map(|v| v.to_string()),
        created_at: Utc::now().to_rfc3339(),
    };

    if let Err(e) = repository::insert_audit(db, &record).await {
        warn!("audit write failed for action {}: {}", action, e);
    }
}
