//! Media import from DR and TMDB, plus the blocklist delete.
//!
//! Imports upsert on the external id: a known title has its descriptive
//! fields refreshed while review and streaming enrichment is left in place.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    NotSet, PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
    sea_query::OnConflict,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    AppState,
    cache::CacheTag,
    dr::DrTitle,
    entities::{media, streaming_availability},
    error::AppResult,
    jobs::JobReport,
    models::{MediaSource, MediaType, ProviderType, WatchProvider, now_sec},
    tmdb::TmdbTitle,
};

pub const DR_PROVIDER: &str = "DR TV";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Upserted {
    Created,
    Updated,
    /// The external id already belongs to a title of the other media type.
    Skipped,
}

#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub success: bool,
    pub dr: JobReport,
    pub tmdb: JobReport,
}

pub async fn import_media(state: &AppState) -> AppResult<ImportReport> {
    let dr = import_dr(state).await;
    let tmdb = import_tmdb(state).await;

    if dr.created + dr.updated + tmdb.created + tmdb.updated > 0 {
        state.cache.invalidate(&[CacheTag::Media, CacheTag::Home]).await;
    }
    info!(
        dr_created = dr.created,
        dr_updated = dr.updated,
        tmdb_created = tmdb.created,
        tmdb_updated = tmdb.updated,
        "media import finished"
    );
    Ok(ImportReport { success: true, dr, tmdb })
}

async fn import_dr(state: &AppState) -> JobReport {
    let mut report = JobReport::new();
    if !state.dr.enabled() {
        return report.skip("DR_LIST_URL er ikke sat");
    }

    let titles = match state.dr.list(state.config.import_max_pages).await {
        Ok(titles) => titles,
        Err(err) => {
            report.error("DR list", &err);
            return report;
        },
    };

    for title in titles {
        if state.config.blocked_dr_ids.contains(&title.id) {
            debug!(id = %title.id, "skipping blocked DR title");
            continue;
        }
        report.processed += 1;
        match upsert_dr(&state.db, &title).await {
            Ok(outcome) => report.count(outcome),
            Err(err) => report.error(&title.id, &err),
        }
    }
    report
}

async fn import_tmdb(state: &AppState) -> JobReport {
    let mut report = JobReport::new();
    if !state.tmdb.enabled() {
        return report.skip("TMDB_ACCESS_TOKEN er ikke sat");
    }

    for kind in [MediaType::Movie, MediaType::Series] {
        for page in 1..=state.config.import_max_pages.max(1) {
            let titles = match state.tmdb.discover(kind, page).await {
                Ok(titles) => titles,
                Err(err) => {
                    report.error(&format!("discover {} page {page}", kind.as_str()), &err);
                    break;
                },
            };
            if titles.is_empty() {
                break;
            }

            for title in titles {
                if state.config.blocked_tmdb_ids.contains(&title.id) {
                    debug!(tmdb_id = title.id, "skipping blocked TMDB title");
                    continue;
                }
                report.processed += 1;
                match upsert_tmdb(&state.db, &title).await {
                    Ok(outcome) => report.count(outcome),
                    Err(err) => report.error(&format!("tmdb {}", title.id), &err),
                }
            }
        }
    }
    report
}

pub async fn upsert_tmdb(db: &DatabaseConnection, title: &TmdbTitle) -> AppResult<Upserted> {
    let now = now_sec();
    let existing =
        media::Entity::find().filter(media::Column::TmdbId.eq(title.id)).one(db).await?;

    if let Some(row) = existing {
        if row.media_type != title.media_type.as_str() {
            warn!(tmdb_id = title.id, stored = %row.media_type, "TMDB id already used by another media type");
            return Ok(Upserted::Skipped);
        }
        let poster = title.poster_url.clone().or(row.poster_url.clone());
        let overview = title.overview.clone().or(row.overview.clone());
        let mut active: media::ActiveModel = row.into();
        active.title = Set(title.title.clone());
        active.original_title = Set(title.original_title.clone());
        active.overview = Set(overview);
        active.poster_url = Set(poster);
        active.release_year = Set(title.release_year);
        active.is_danish = Set(title.is_danish());
        active.is_nordic = Set(title.is_nordic());
        active.updated_at = Set(now);
        active.update(db).await?;
        return Ok(Upserted::Updated);
    }

    let slug = unique_slug(db, &title.title).await?;
    media::ActiveModel {
        tmdb_id: Set(Some(title.id)),
        dr_entity_id: Set(None),
        slug: Set(slug),
        title: Set(title.title.clone()),
        original_title: Set(title.original_title.clone()),
        media_type: Set(title.media_type.as_str().to_string()),
        overview: Set(title.overview.clone()),
        poster_url: Set(title.poster_url.clone()),
        release_year: Set(title.release_year),
        source: Set(MediaSource::Tmdb.as_str().to_string()),
        is_danish: Set(title.is_danish()),
        is_nordic: Set(title.is_nordic()),
        ..blank_media(now)
    }
    .insert(db)
    .await?;
    Ok(Upserted::Created)
}

pub async fn upsert_dr(db: &DatabaseConnection, title: &DrTitle) -> AppResult<Upserted> {
    let now = now_sec();
    let existing = media::Entity::find()
        .filter(media::Column::DrEntityId.eq(title.id.as_str()))
        .one(db)
        .await?;

    let (media_id, outcome) = match existing {
        Some(row) => {
            let id = row.id;
            let poster = title.poster_url.clone().or(row.poster_url.clone());
            let overview = title.overview.clone().or(row.overview.clone());
            let mut active: media::ActiveModel = row.into();
            active.title = Set(title.title.clone());
            active.media_type = Set(title.media_type.as_str().to_string());
            active.overview = Set(overview);
            active.poster_url = Set(poster);
            active.release_year = Set(title.release_year);
            active.updated_at = Set(now);
            active.update(db).await?;
            (id, Upserted::Updated)
        },
        None => {
            let slug = unique_slug(db, &title.title).await?;
            let row = media::ActiveModel {
                tmdb_id: Set(None),
                dr_entity_id: Set(Some(title.id.clone())),
                slug: Set(slug),
                title: Set(title.title.clone()),
                media_type: Set(title.media_type.as_str().to_string()),
                overview: Set(title.overview.clone()),
                poster_url: Set(title.poster_url.clone()),
                release_year: Set(title.release_year),
                source: Set(MediaSource::Dr.as_str().to_string()),
                is_danish: Set(true),
                is_nordic: Set(true),
                ..blank_media(now)
            }
            .insert(db)
            .await?;
            (row.id, Upserted::Created)
        },
    };

    let offer = WatchProvider {
        provider_name: DR_PROVIDER.to_string(),
        link: title.link.clone(),
        provider_type: ProviderType::Stream,
    };
    upsert_availability(db, media_id, &offer, now).await?;
    Ok(outcome)
}

fn blank_media(now: i64) -> media::ActiveModel {
    media::ActiveModel {
        id: NotSet,
        original_title: Set(None),
        min_age: Set(None),
        has_violence: Set(false),
        has_scary_content: Set(false),
        has_language: Set(false),
        has_educational: Set(false),
        parent_info: Set(None),
        parent_tip: Set(None),
        pros: Set(None),
        cons: Set(None),
        review_generated_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

/// One row per `(media, provider)`; a repeat sighting refreshes it.
pub async fn upsert_availability<C: ConnectionTrait>(
    db: &C,
    media_id: i32,
    offer: &WatchProvider,
    now: i64,
) -> AppResult<()> {
    let row = streaming_availability::ActiveModel {
        id: NotSet,
        media_id: Set(media_id),
        provider: Set(offer.provider_name.clone()),
        provider_type: Set(offer.provider_type.as_code()),
        link: Set(offer.link.clone()),
        available: Set(true),
        last_checked: Set(now),
    };

    streaming_availability::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                streaming_availability::Column::MediaId,
                streaming_availability::Column::Provider,
            ])
            .update_columns([
                streaming_availability::Column::ProviderType,
                streaming_availability::Column::Link,
                streaming_availability::Column::Available,
                streaming_availability::Column::LastChecked,
            ])
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Lowercase ASCII slug; Danish letters are transliterated.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for ch in title.to_lowercase().chars() {
        match ch {
            'æ' => out.push_str("ae"),
            'ø' | 'ö' => out.push_str("oe"),
            'å' => out.push_str("aa"),
            'ä' => out.push_str("ae"),
            'é' | 'è' => out.push('e'),
            'ü' => out.push_str("ue"),
            c if c.is_ascii_alphanumeric() => out.push(c),
            _ => {
                if !out.is_empty() && !out.ends_with('-') {
                    out.push('-');
                }
            },
        }
    }
    out.trim_end_matches('-').to_string()
}

async fn unique_slug(db: &DatabaseConnection, title: &str) -> AppResult<String> {
    let base = match slugify(title) {
        s if s.is_empty() => "titel".to_string(),
        s => s,
    };
    let mut candidate = base.clone();
    let mut n = 1;
    while media::Entity::find().filter(media::Column::Slug.eq(candidate.as_str())).count(db).await?
        > 0
    {
        n += 1;
        candidate = format!("{base}-{n}");
    }
    Ok(candidate)
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReport {
    pub media: u64,
    pub streaming: u64,
}

/// Removes the listed titles and their availability rows in one transaction.
pub async fn delete_media(
    db: &DatabaseConnection,
    tmdb_ids: &[i32],
    dr_ids: &[String],
) -> AppResult<DeleteReport> {
    if tmdb_ids.is_empty() && dr_ids.is_empty() {
        return Ok(DeleteReport::default());
    }

    let txn = db.begin().await?;
    let ids: Vec<i32> = media::Entity::find()
        .select_only()
        .column(media::Column::Id)
        .filter(
            Condition::any()
                .add(media::Column::TmdbId.is_in(tmdb_ids.iter().copied()))
                .add(media::Column::DrEntityId.is_in(dr_ids.iter().cloned())),
        )
        .into_tuple()
        .all(&txn)
        .await?;

    let streaming = streaming_availability::Entity::delete_many()
        .filter(streaming_availability::Column::MediaId.is_in(ids.iter().copied()))
        .exec(&txn)
        .await?
        .rows_affected;
    let media = media::Entity::delete_many()
        .filter(media::Column::Id.is_in(ids))
        .exec(&txn)
        .await?
        .rows_affected;
    txn.commit().await?;

    info!(media, streaming, "deleted blocked media");
    Ok(DeleteReport { media, streaming })
}
