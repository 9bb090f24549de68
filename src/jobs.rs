//! Scheduled maintenance: streaming refresh, review generation, link health
//! and poster repair. Each record is committed on its own; a failing record is
//! logged, added to `errors` and the run carries on.

use futures::{StreamExt, stream};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
    sea_query::{Expr, Order},
};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};
use wreq::StatusCode;

use crate::{
    AppState,
    cache::CacheTag,
    entities::{board_game, game, media, streaming_availability},
    error::{AppError, AppResult},
    import::{Upserted, upsert_availability},
    models::{MediaType, WatchProvider, now_sec},
};

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub success: bool,
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl JobReport {
    pub fn new() -> Self {
        Self { success: true, ..Self::default() }
    }

    pub fn skip(mut self, reason: &str) -> Self {
        info!(reason, "job skipped");
        self.skipped = Some(reason.to_string());
        self
    }

    pub fn error(&mut self, context: &str, err: &AppError) {
        warn!(context, error = %err, "job item failed");
        self.errors.push(format!("{context}: {err}"));
    }

    pub fn count(&mut self, outcome: Upserted) {
        match outcome {
            Upserted::Created => self.created += 1,
            Upserted::Updated => self.updated += 1,
            Upserted::Skipped => {},
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub success: bool,
    pub streaming: JobReport,
    pub reviews: JobReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub success: bool,
    pub health_check: HealthReport,
    pub poster_repair: JobReport,
}

pub async fn daily(state: &AppState) -> AppResult<DailyReport> {
    let streaming = refresh_streaming(state).await?;
    let reviews = generate_reviews(state).await?;
    if streaming.updated + reviews.updated > 0 {
        state.cache.invalidate(&[CacheTag::Media, CacheTag::Home]).await;
    }
    Ok(DailyReport { success: true, streaming, reviews })
}

pub async fn weekly(state: &AppState) -> AppResult<WeeklyReport> {
    let health_check = check_links(state).await?;
    let poster_repair = repair_posters(state).await?;
    if poster_repair.updated > 0 {
        state.cache.invalidate(&[CacheTag::Media, CacheTag::Home]).await;
    }
    Ok(WeeklyReport { success: true, health_check, poster_repair })
}

/// Re-reads watch providers for the TMDB titles checked longest ago.
pub async fn refresh_streaming(state: &AppState) -> AppResult<JobReport> {
    let mut report = JobReport::new();
    if !state.tmdb.enabled() {
        return Ok(report.skip("TMDB_ACCESS_TOKEN er ikke sat"));
    }

    let candidates = refresh_candidates(&state.db, state.config.streaming_refresh_batch).await?;

    let region = state.config.tmdb_region.as_str();
    let results: Vec<(String, AppResult<bool>)> = stream::iter(candidates)
        .map(|item| async move {
            let outcome = refresh_one(state, &item, region).await;
            (item.slug, outcome)
        })
        .buffer_unordered(state.config.max_concurrent.max(1))
        .collect()
        .await;

    for (slug, outcome) in results {
        report.processed += 1;
        match outcome {
            Ok(true) => report.updated += 1,
            Ok(false) => {},
            Err(err) => report.error(&slug, &err),
        }
    }
    debug!(processed = report.processed, updated = report.updated, "streaming refresh finished");
    Ok(report)
}

/// TMDB titles ordered by their newest `last_checked`, falling back to
/// `updated_at` for titles without offers, oldest first.
pub async fn refresh_candidates(db: &DatabaseConnection, batch: u64) -> AppResult<Vec<media::Model>> {
    let last_seen = Expr::cust(
        "COALESCE((SELECT max(\"streaming_availability\".\"last_checked\") \
         FROM \"streaming_availability\" \
         WHERE \"streaming_availability\".\"media_id\" = \"media\".\"id\"), \
         \"media\".\"updated_at\")",
    );
    Ok(media::Entity::find()
        .filter(media::Column::TmdbId.is_not_null())
        .order_by(last_seen, Order::Asc)
        .order_by_asc(media::Column::Id)
        .limit(batch)
        .all(db)
        .await?)
}

async fn refresh_one(state: &AppState, item: &media::Model, region: &str) -> AppResult<bool> {
    let Some(tmdb_id) = item.tmdb_id else {
        return Ok(false);
    };
    let offers = state
        .tmdb
        .watch_providers(tmdb_id, MediaType::from_stored(&item.media_type), region)
        .await?;
    let now = now_sec();
    record_offers(&state.db, item.id, &offers, now).await?;

    if offers.is_empty() {
        let mut active: media::ActiveModel = item.clone().into();
        active.updated_at = Set(now);
        active.update(&state.db).await?;
    }
    Ok(!offers.is_empty())
}

/// Upserts every offer and marks previously seen providers that are gone as
/// unavailable.
pub async fn record_offers(
    db: &DatabaseConnection,
    media_id: i32,
    offers: &[WatchProvider],
    now: i64,
) -> AppResult<()> {
    for offer in offers {
        upsert_availability(db, media_id, offer, now).await?;
    }

    let seen: Vec<String> = offers.iter().map(|o| o.provider_name.clone()).collect();
    streaming_availability::Entity::update_many()
        .col_expr(streaming_availability::Column::Available, Expr::value(false))
        .col_expr(streaming_availability::Column::LastChecked, Expr::value(now))
        .filter(streaming_availability::Column::MediaId.eq(media_id))
        .filter(streaming_availability::Column::Provider.is_not_in(seen))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn generate_reviews(state: &AppState) -> AppResult<JobReport> {
    let mut report = JobReport::new();
    if !state.reviews.enabled() {
        return Ok(report.skip("REVIEW_API_URL er ikke sat"));
    }

    let pending = media::Entity::find()
        .filter(media::Column::ReviewGeneratedAt.is_null())
        .order_by_asc(media::Column::CreatedAt)
        .order_by_asc(media::Column::Id)
        .limit(state.config.review_batch)
        .all(&state.db)
        .await?;

    for item in pending {
        report.processed += 1;
        let slug = item.slug.clone();
        let result: AppResult<bool> = async {
            let Some(review) = state.reviews.review(&item).await? else {
                return Ok(false);
            };
            let min_age = review.min_age.or(item.min_age);
            let mut active: media::ActiveModel = item.into();
            active.parent_info = Set(review.parent_info);
            active.parent_tip = Set(review.parent_tip);
            active.pros = Set(Some(json!(review.pros)));
            active.cons = Set(Some(json!(review.cons)));
            active.min_age = Set(min_age);
            active.has_violence = Set(review.has_violence);
            active.has_scary_content = Set(review.has_scary_content);
            active.has_language = Set(review.has_language);
            active.has_educational = Set(review.has_educational);
            active.review_generated_at = Set(Some(now_sec()));
            active.updated_at = Set(now_sec());
            active.update(&state.db).await?;
            Ok(true)
        }
        .await;

        match result {
            Ok(true) => report.updated += 1,
            Ok(false) => {},
            Err(err) => report.error(&slug, &err),
        }
    }
    info!(processed = report.processed, updated = report.updated, "review generation finished");
    Ok(report)
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenLink {
    pub catalog: &'static str,
    pub slug: String,
    pub url: String,
    pub status: Option<u16>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub success: bool,
    pub checked: usize,
    pub broken: Vec<BrokenLink>,
}

/// Icon, image and website links of the least recently updated catalog rows.
pub async fn collect_links(db: &DatabaseConnection, cap: u64) -> AppResult<Vec<BrokenLink>> {
    let games = game::Entity::find()
        .order_by_asc(game::Column::UpdatedAt)
        .order_by_asc(game::Column::Id)
        .limit(cap)
        .all(db)
        .await?;
    let board_games = board_game::Entity::find()
        .order_by_asc(board_game::Column::UpdatedAt)
        .order_by_asc(board_game::Column::Id)
        .limit(cap)
        .all(db)
        .await?;

    let link = |catalog, slug: &str, url: Option<String>| {
        url.filter(|u| u.starts_with("http")).map(|url| BrokenLink {
            catalog,
            slug: slug.to_string(),
            url,
            status: None,
        })
    };
    let mut links = Vec::new();
    for g in games {
        links.extend(link("games", &g.slug, g.icon_url));
        links.extend(link("games", &g.slug, g.website_url));
    }
    for b in board_games {
        links.extend(link("board_games", &b.slug, b.image_url));
        links.extend(link("board_games", &b.slug, b.website_url));
    }
    links.truncate(cap as usize);
    Ok(links)
}

pub async fn check_links(state: &AppState) -> AppResult<HealthReport> {
    let links = collect_links(&state.db, state.config.health_check_batch).await?;
    let checked = links.len();

    let results: Vec<Option<BrokenLink>> = stream::iter(links)
        .map(|mut link| async move {
            match fetch_status(&state.http, &link.url).await {
                Ok(status) if status.is_success() || status.is_redirection() => None,
                Ok(status) => {
                    link.status = Some(status.as_u16());
                    Some(link)
                },
                Err(err) => {
                    debug!(url = %link.url, error = %err, "link check failed");
                    Some(link)
                },
            }
        })
        .buffer_unordered(state.config.max_concurrent.max(1))
        .collect()
        .await;

    let broken: Vec<BrokenLink> = results.into_iter().flatten().collect();
    for link in &broken {
        warn!(catalog = link.catalog, slug = %link.slug, url = %link.url, status = ?link.status, "broken link");
    }
    info!(checked, broken = broken.len(), "link health check finished");
    Ok(HealthReport { success: true, checked, broken })
}

/// HEAD first; servers refusing HEAD get a GET.
async fn fetch_status(http: &wreq::Client, url: &str) -> AppResult<StatusCode> {
    let status = http.head(url).send().await?.status();
    if status == StatusCode::METHOD_NOT_ALLOWED {
        return Ok(http.get(url).send().await?.status());
    }
    Ok(status)
}

pub async fn repair_posters(state: &AppState) -> AppResult<JobReport> {
    let mut report = JobReport::new();
    if !state.tmdb.enabled() {
        return Ok(report.skip("TMDB_ACCESS_TOKEN er ikke sat"));
    }

    let missing = media::Entity::find()
        .filter(media::Column::PosterUrl.is_null())
        .filter(media::Column::TmdbId.is_not_null())
        .order_by_asc(media::Column::Id)
        .limit(state.config.icon_repair_batch)
        .all(&state.db)
        .await?;

    for item in missing {
        report.processed += 1;
        let Some(tmdb_id) = item.tmdb_id else { continue };
        let slug = item.slug.clone();
        let kind = MediaType::from_stored(&item.media_type);
        match state.tmdb.poster_url(tmdb_id, kind).await {
            Ok(Some(url)) => {
                let mut active: media::ActiveModel = item.into();
                active.poster_url = Set(Some(url));
                active.updated_at = Set(now_sec());
                match active.update(&state.db).await {
                    Ok(_) => report.updated += 1,
                    Err(err) => report.error(&slug, &AppError::from(err)),
                }
            },
            Ok(None) => debug!(slug = %slug, "TMDB has no poster"),
            Err(err) => report.error(&slug, &err),
        }
    }
    Ok(report)
}
