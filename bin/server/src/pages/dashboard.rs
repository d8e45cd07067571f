//! Dashboard page.

use axum::Json;
use serde::Serialize;

use crate::auth::Acl;
use crate::error::AppError;

/// What the dashboard shows the current user.
#[derive(Debug, Serialize)]
pub struct DashboardView {
    /// Whether editing controls are shown.
    pub can_write: bool,
}

/// The dashboard. Needs `read`; `write` only unlocks editing.
pub async fn dashboard(acl: Acl) -> Result<Json<DashboardView>, AppError> {
    acl.require(["read"]).await?;

    Ok(Json(DashboardView {
        can_write: acl.has_permission("write").await,
    }))
}
