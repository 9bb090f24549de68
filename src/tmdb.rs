use std::{collections::HashMap, num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;
use wreq::header::AUTHORIZATION;

use crate::{
    error::AppResult,
    models::{MediaType, ProviderType, WatchProvider},
};

const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
const NORDIC_LANGUAGES: [&str; 6] = ["da", "sv", "no", "nb", "fi", "is"];

pub struct TmdbClient {
    client: wreq::Client,
    access_token: String,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

/// A discovered film or series, normalised across TMDB's movie and tv shapes.
#[derive(Clone, Debug, PartialEq)]
pub struct TmdbTitle {
    pub id: i32,
    pub media_type: MediaType,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub release_year: Option<i32>,
    pub original_language: Option<String>,
}

impl TmdbTitle {
    pub fn is_danish(&self) -> bool {
        self.original_language.as_deref() == Some("da")
    }

    pub fn is_nordic(&self) -> bool {
        self.original_language.as_deref().is_some_and(|l| NORDIC_LANGUAGES.contains(&l))
    }
}

impl TmdbClient {
    pub fn new(client: wreq::Client, access_token: String, base_url: String, rps: u32) -> Self {
        if access_token.trim().is_empty() {
            tracing::warn!("TMDB disabled - no TMDB_ACCESS_TOKEN provided");
        }

        let quota = Quota::per_second(NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN));
        let limiter = Arc::new(RateLimiter::direct(quota));
        Self { client, access_token, base_url, limiter }
    }

    pub fn enabled(&self) -> bool {
        !self.access_token.trim().is_empty()
    }

    /// One page of family/kids titles in a Nordic original language.
    pub async fn discover(&self, kind: MediaType, page: u32) -> AppResult<Vec<TmdbTitle>> {
        if !self.enabled() {
            return Ok(Vec::new());
        }

        let (path, genre) = match kind {
            MediaType::Movie => ("discover/movie", "10751"),
            MediaType::Series => ("discover/tv", "10762"),
        };
        let languages = NORDIC_LANGUAGES.join("|");

        let resp: DiscoverResponse = self
            .get(path)
            .await
            .query(&[
                ("with_genres", genre),
                ("with_original_language", languages.as_str()),
                ("include_adult", "false"),
                ("sort_by", "popularity.desc"),
                ("page", &page.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp
            .results
            .into_iter()
            .filter(|r| !r.adult)
            .filter_map(|r| r.into_title(kind))
            .collect())
    }

    pub async fn poster_url(&self, tmdb_id: i32, kind: MediaType) -> AppResult<Option<String>> {
        if !self.enabled() {
            return Ok(None);
        }

        let details: DetailsResponse = self
            .get(&format!("{}/{tmdb_id}", type_segment(kind)))
            .await
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(details.poster_path.as_deref().map(image_url))
    }

    /// Offers in `region`; an empty list when TMDB knows of none.
    pub async fn watch_providers(
        &self,
        tmdb_id: i32,
        kind: MediaType,
        region: &str,
    ) -> AppResult<Vec<WatchProvider>> {
        if !self.enabled() {
            return Ok(Vec::new());
        }

        let resp: WatchProvidersResponse = self
            .get(&format!("{}/{tmdb_id}/watch/providers", type_segment(kind)))
            .await
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp.results.get(region).map(RegionProviders::flatten).unwrap_or_default())
    }

    async fn get(&self, path: &str) -> wreq::RequestBuilder {
        self.limiter.until_ready().await;
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        self.client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .query(&[("language", "da-DK")])
    }
}

fn type_segment(kind: MediaType) -> &'static str {
    match kind {
        MediaType::Movie => "movie",
        MediaType::Series => "tv",
    }
}

fn image_url(path: &str) -> String {
    format!("{IMAGE_BASE}{path}")
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    results: Vec<DiscoverResult>,
}

#[derive(Debug, Deserialize)]
struct DiscoverResult {
    id: i32,
    #[serde(alias = "name")]
    title: Option<String>,
    #[serde(alias = "original_name")]
    original_title: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    #[serde(alias = "first_air_date")]
    release_date: Option<String>,
    original_language: Option<String>,
    #[serde(default)]
    adult: bool,
}

impl DiscoverResult {
    fn into_title(self, kind: MediaType) -> Option<TmdbTitle> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        Some(TmdbTitle {
            id: self.id,
            media_type: kind,
            title,
            original_title: self.original_title,
            overview: self.overview.filter(|o| !o.trim().is_empty()),
            poster_url: self.poster_path.as_deref().map(image_url),
            release_year: self.release_date.as_deref().and_then(|d| d.get(..4)?.parse().ok()),
            original_language: self.original_language,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WatchProvidersResponse {
    #[serde(default)]
    results: HashMap<String, RegionProviders>,
}

#[derive(Debug, Default, Deserialize)]
struct RegionProviders {
    link: Option<String>,
    #[serde(default)]
    flatrate: Vec<ProviderEntry>,
    #[serde(default)]
    rent: Vec<ProviderEntry>,
    #[serde(default)]
    buy: Vec<ProviderEntry>,
}

impl RegionProviders {
    fn flatten(&self) -> Vec<WatchProvider> {
        let offers = [
            (ProviderType::Stream, &self.flatrate),
            (ProviderType::Rent, &self.rent),
            (ProviderType::Buy, &self.buy),
        ];
        let mut out: Vec<WatchProvider> = Vec::new();
        for (provider_type, entries) in offers {
            for entry in entries {
                // A provider offering several ways keeps its best one.
                if out.iter().any(|p| p.provider_name == entry.provider_name) {
                    continue;
                }
                out.push(WatchProvider {
                    provider_name: entry.provider_name.clone(),
                    link: self.link.clone(),
                    provider_type,
                });
            }
        }
        out
    }
}

#[derive(Debug, Deserialize)]
struct ProviderEntry {
    provider_name: String,
}
