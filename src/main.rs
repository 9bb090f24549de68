mod admin;
mod auth;
mod cache;
mod catalog;
mod config;
mod contact;
mod db;
mod dr;
mod entities;
mod error;
mod import;
mod jobs;
mod mailer;
mod models;
mod review;
mod routes;
mod sitemap;
mod tmdb;

#[cfg(test)]
mod test_support;

use std::{sync::Arc, time::Duration};

use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use crate::{
    cache::TagCache, config::Config, dr::DrClient, mailer::Mailer, review::ReviewClient,
    tmdb::TmdbClient,
};

pub struct AppState {
    pub config: Arc<Config>,
    pub db: DatabaseConnection,
    pub http: wreq::Client,
    pub cache: TagCache,
    pub tmdb: Arc<TmdbClient>,
    pub dr: Arc<DrClient>,
    pub reviews: Arc<ReviewClient>,
    pub mailer: Arc<Mailer>,
}

impl AppState {
    pub fn new(config: Arc<Config>, db: DatabaseConnection, http: wreq::Client) -> Self {
        let tmdb = TmdbClient::new(
            http.clone(),
            config.tmdb_access_token.clone(),
            config.tmdb_base_url.clone(),
            config.tmdb_rps,
        );
        let dr = DrClient::new(http.clone(), config.dr_list_url.clone());
        let reviews = ReviewClient::new(
            http.clone(),
            config.review_api_url.clone(),
            config.review_api_key.clone(),
            config.review_model.clone(),
        );
        let mailer = Mailer::new(
            http.clone(),
            config.resend_api_key.clone(),
            config.resend_base_url.clone(),
            config.contact_from.clone(),
        );

        Self {
            cache: TagCache::new(config.cache_ttl_seconds),
            tmdb: Arc::new(tmdb),
            dr: Arc::new(dr),
            reviews: Arc::new(reviews),
            mailer: Arc::new(mailer),
            config,
            db,
            http,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(Config::from_env()?);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,boernespil=debug,sqlx=warn")),
        )
        .init();

    let http = wreq::Client::builder().timeout(Duration::from_secs(30)).build()?;
    let db = db::connect_and_migrate(&config.database_url).await?;

    let state = Arc::new(AppState::new(config.clone(), db, http));

    let app = routes::router(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
