//! Token-gated maintenance endpoints. Authorization happens in the route
//! layer, see `auth`.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    AppState,
    cache::CacheTag,
    db,
    error::{AppError, AppResult},
    import::{self, DeleteReport, ImportReport},
    jobs::{self, DailyReport, WeeklyReport},
};

pub async fn init_db(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    db::migrate(&state.db).await?;
    Ok(Json(json!({ "success": true, "message": "Databasen er klar" })))
}

pub async fn migrate_arrays(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let report = db::migrate_pros_cons(&state.db).await?;
    if report.total() > 0 {
        state.cache.invalidate(&CacheTag::ALL).await;
    }
    Ok(Json(json!({ "success": true, "migrated": report, "total": report.total() })))
}

pub async fn import_media(State(state): State<Arc<AppState>>) -> AppResult<Json<ImportReport>> {
    Ok(Json(import::import_media(&state).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteRequest {
    pub tmdb_ids: Vec<i32>,
    pub dr_entity_ids: Vec<String>,
}

/// Deletes the ids in the body, or the configured blocklist when the body is
/// empty.
pub async fn delete_media(State(state): State<Arc<AppState>>, body: Bytes) -> AppResult<Json<Value>> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        DeleteRequest {
            tmdb_ids: state.config.blocked_tmdb_ids.clone(),
            dr_entity_ids: state.config.blocked_dr_ids.clone(),
        }
    } else {
        serde_json::from_slice(&body)
            .map_err(|err| AppError::validation(format!("Ugyldig forespørgsel: {err}")))?
    };

    let report: DeleteReport =
        import::delete_media(&state.db, &request.tmdb_ids, &request.dr_entity_ids).await?;
    if report.media > 0 {
        state.cache.invalidate(&[CacheTag::Media, CacheTag::Home]).await;
    }
    Ok(Json(json!({ "success": true, "deleted": report })))
}

#[derive(Debug, Deserialize)]
pub struct RevalidateRequest {
    #[serde(default)]
    pub tags: Vec<String>,
}

pub async fn revalidate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RevalidateRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(request) = body.map_err(|_| AppError::validation("Ugyldig forespørgsel"))?;
    if request.tags.is_empty() {
        return Err(AppError::validation("Angiv mindst ét cache-tag"));
    }

    let tags = request
        .tags
        .iter()
        .map(|raw| raw.parse::<CacheTag>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|unknown| AppError::validation(format!("Ukendt cache-tag: {unknown}")))?;

    state.cache.invalidate(&tags).await;
    info!(tags = ?request.tags, "cache revalidated");
    Ok(Json(json!({
        "success": true,
        "revalidated": tags.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
    })))
}

pub async fn cron_daily(State(state): State<Arc<AppState>>) -> AppResult<Json<DailyReport>> {
    Ok(Json(jobs::daily(&state).await?))
}

pub async fn cron_weekly(State(state): State<Arc<AppState>>) -> AppResult<Json<WeeklyReport>> {
    Ok(Json(jobs::weekly(&state).await?))
}
