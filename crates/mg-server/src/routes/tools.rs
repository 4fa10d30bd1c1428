//! External tool status.

use axum::extract::State;
use axum::Json;
use mg_extract::ToolInfo;

use crate::context::AppContext;
use crate::error::AppError;

/// GET /api/tools
///
/// Version detection runs the tools, so it happens off the async workers.
pub async fn tools(State(ctx): State<AppContext>) -> Result<Json<Vec<ToolInfo>>, AppError> {
    let registry = ctx.tools.clone();
    let infos = tokio::task::spawn_blocking(move || registry.check_all())
        .await
        .map_err(|e| mg_core::Error::Internal(format!("tool check failed: {e}")))?;
    Ok(Json(infos))
}
