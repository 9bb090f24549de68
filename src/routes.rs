use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, admin, auth,
    cache::CacheTag,
    catalog::{
        self, CatalogQuery, Catalog, FEATURED_LIMIT, Filter, Ordering, Pagination, SEARCH_LIMIT,
        Window,
    },
    contact,
    entities::{board_game, game, media, streaming_availability},
    error::{AppError, AppResult},
    models::{
        BoardGameDto, DetailResponse, GameDto, ListResponse, MediaDetail, MediaDto, SearchResponse,
        StreamingDto,
    },
    sitemap,
};

const HOME_MEDIA_LIMIT: u64 = 8;

pub fn router(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/init-db", post(admin::init_db))
        .route("/migrate-arrays", post(admin::migrate_arrays))
        .route("/import-media", post(admin::import_media))
        .route("/delete-media", post(admin::delete_media))
        .route("/revalidate", post(admin::revalidate))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin));

    let cron = Router::new()
        .route("/daily", get(admin::cron_daily))
        .route("/weekly", get(admin::cron_weekly))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_cron));

    Router::new()
        .route("/api/games", get(list::<game::Entity>))
        .route("/api/games/featured", get(featured_games))
        .route("/api/games/{slug}", get(detail::<game::Entity>))
        .route("/api/boardgames", get(list::<board_game::Entity>))
        .route("/api/boardgames/featured", get(featured_board_games))
        .route("/api/boardgames/{slug}", get(detail::<board_game::Entity>))
        .route("/api/search", get(search))
        .route("/api/home", get(home))
        .route("/api/media", get(media_list))
        .route("/api/media/{slug}", get(media_detail))
        .route("/api/contact", post(contact::submit))
        .route("/sitemap.xml", get(sitemap::sitemap))
        .nest("/api/admin", admin)
        .nest("/api/cron", cron)
        .with_state(state)
}

pub async fn list<C>(
    State(state): State<Arc<AppState>>,
    Query(q): Query<CatalogQuery>,
) -> AppResult<Json<ListResponse<C::Dto>>>
where
    C: Catalog,
    C::Model: Sync,
{
    let policy = state.config.param_policy;
    let filter = Filter::from_query(&q, policy)?;
    let ordering = Ordering::resolve(q.sort.as_deref(), q.order.as_deref());
    let window = Window::from_query(q.limit.as_deref(), q.offset.as_deref(), policy)?;

    let (rows, total) = catalog::fetch_page::<C>(&state.db, &filter, ordering, window).await?;
    let pagination = Pagination::new(window, rows.len(), total);

    Ok(Json(ListResponse {
        success: true,
        data: rows.into_iter().map(C::Dto::from).collect(),
        pagination,
    }))
}

pub async fn detail<C>(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Json<DetailResponse<C::Dto>>>
where
    C: Catalog,
    C::Model: Sync,
{
    let model = catalog::find_by_slug::<C>(&state.db, &slug)
        .await?
        .ok_or_else(|| AppError::not_found(C::NOT_FOUND))?;
    let related = catalog::related::<C>(&state.db, &C::related_key(&model)).await?;

    Ok(Json(DetailResponse {
        success: true,
        data: C::Dto::from(model),
        related: related.into_iter().map(C::Dto::from).collect(),
    }))
}

async fn featured_games(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    featured::<game::Entity>(&state, CacheTag::FeaturedGames).await
}

async fn featured_board_games(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    featured::<board_game::Entity>(&state, CacheTag::FeaturedBoardGames).await
}

async fn featured<C>(state: &AppState, tag: CacheTag) -> AppResult<Json<Value>>
where
    C: Catalog,
    C::Model: Sync,
{
    let value = state
        .cache
        .get_or_load(tag, || async {
            let rows = catalog::featured::<C>(&state.db, FEATURED_LIMIT).await?;
            let data: Vec<C::Dto> = rows.into_iter().map(C::Dto::from).collect();
            Ok(json!({ "success": true, "data": data }))
        })
        .await?;
    Ok(Json(value))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchResponse>> {
    let query = params.q.unwrap_or_default().trim().to_string();

    let games = catalog::search::<game::Entity>(&state.db, &query, SEARCH_LIMIT).await?;
    let board_games =
        catalog::search::<board_game::Entity>(&state.db, &query, SEARCH_LIMIT).await?;

    Ok(Json(SearchResponse {
        success: true,
        total: games.len() + board_games.len(),
        query,
        games: games.into_iter().map(GameDto::from).collect(),
        board_games: board_games.into_iter().map(BoardGameDto::from).collect(),
    }))
}

pub async fn home(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let value = state.cache.get_or_load(CacheTag::Home, || load_home(&state)).await?;
    Ok(Json(value))
}

async fn load_home(state: &AppState) -> AppResult<Value> {
    let db = &state.db;
    let games = catalog::featured::<game::Entity>(db, FEATURED_LIMIT).await?;
    let board_games = catalog::featured::<board_game::Entity>(db, FEATURED_LIMIT).await?;
    let latest = media::Entity::find()
        .order_by_desc(media::Column::CreatedAt)
        .order_by_asc(media::Column::Id)
        .limit(HOME_MEDIA_LIMIT)
        .all(db)
        .await?;

    Ok(json!({
        "success": true,
        "featuredGames": games.into_iter().map(GameDto::from).collect::<Vec<_>>(),
        "featuredBoardGames": board_games.into_iter().map(BoardGameDto::from).collect::<Vec<_>>(),
        "latestMedia": latest.into_iter().map(MediaDto::from).collect::<Vec<_>>(),
        "counts": {
            "games": game::Entity::find().count(db).await?,
            "boardGames": board_game::Entity::find().count(db).await?,
            "media": media::Entity::find().count(db).await?,
        },
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct MediaQuery {
    #[serde(rename = "type")]
    media_type: Option<String>,
    source: Option<String>,
    danish: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
}

impl MediaQuery {
    fn is_default(&self) -> bool {
        self.media_type.is_none()
            && self.source.is_none()
            && self.danish.is_none()
            && self.limit.is_none()
            && self.offset.is_none()
    }

    fn condition(&self) -> Condition {
        let mut all = Condition::all();
        if let Some(kind) = self.media_type.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            all = all.add(media::Column::MediaType.eq(kind));
        }
        if let Some(source) = self.source.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            all = all.add(media::Column::Source.eq(source));
        }
        if self.danish.as_deref() == Some("true") {
            all = all.add(media::Column::IsDanish.eq(true));
        }
        all
    }
}

/// The unfiltered first page is served from the `media` cache tag.
pub async fn media_list(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MediaQuery>,
) -> AppResult<Json<Value>> {
    if q.is_default() {
        let value =
            state.cache.get_or_load(CacheTag::Media, || load_media_page(&state, &q)).await?;
        return Ok(Json(value));
    }
    Ok(Json(load_media_page(&state, &q).await?))
}

async fn load_media_page(state: &AppState, q: &MediaQuery) -> AppResult<Value> {
    let window =
        Window::from_query(q.limit.as_deref(), q.offset.as_deref(), state.config.param_policy)?;
    let select = media::Entity::find().filter(q.condition());

    let rows = select
        .clone()
        .order_by_desc(media::Column::CreatedAt)
        .order_by_asc(media::Column::Id)
        .limit(window.limit)
        .offset(window.offset)
        .all(&state.db)
        .await?;
    let total = select.count(&state.db).await?;
    let pagination = Pagination::new(window, rows.len(), total);

    Ok(serde_json::to_value(ListResponse {
        success: true,
        data: rows.into_iter().map(MediaDto::from).collect(),
        pagination,
    })?)
}

pub async fn media_detail(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Json<Value>> {
    let item = media::Entity::find()
        .filter(media::Column::Slug.eq(slug.as_str()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Titlen blev ikke fundet"))?;

    let streaming = streaming_availability::Entity::find()
        .filter(streaming_availability::Column::MediaId.eq(item.id))
        .filter(streaming_availability::Column::Available.eq(true))
        .order_by_asc(streaming_availability::Column::ProviderType)
        .order_by_asc(streaming_availability::Column::Provider)
        .all(&state.db)
        .await?;

    let detail = MediaDetail {
        media: MediaDto::from(item),
        streaming: streaming.into_iter().map(StreamingDto::from).collect(),
    };
    Ok(Json(json!({ "success": true, "data": detail })))
}
