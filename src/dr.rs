use serde::Deserialize;
use tracing::{debug, warn};

use crate::{error::AppResult, models::MediaType};

const DR_SITE: &str = "https://www.dr.dk/drtv";

pub struct DrClient {
    client: wreq::Client,
    list_url: Option<String>,
}

/// A title from the DR children's list.
#[derive(Clone, Debug, PartialEq)]
pub struct DrTitle {
    pub id: String,
    pub title: String,
    pub media_type: MediaType,
    pub overview: Option<String>,
    pub release_year: Option<i32>,
    pub poster_url: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DrPage {
    #[serde(default)]
    items: Vec<DrItem>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DrItem {
    id: String,
    title: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    short_description: Option<String>,
    production_year: Option<i32>,
    images: Option<DrImages>,
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DrImages {
    tile: Option<String>,
}

impl DrItem {
    fn into_title(self) -> Option<DrTitle> {
        let title = self.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;
        let media_type = match self.kind.as_deref() {
            Some("series" | "season") => MediaType::Series,
            _ => MediaType::Movie,
        };
        Some(DrTitle {
            id: self.id,
            title,
            media_type,
            overview: self.short_description.filter(|d| !d.trim().is_empty()),
            release_year: self.production_year,
            poster_url: self.images.and_then(|i| i.tile),
            link: self.path.map(|p| format!("{DR_SITE}{p}")),
        })
    }
}

impl DrClient {
    pub fn new(client: wreq::Client, list_url: Option<String>) -> Self {
        if list_url.is_none() {
            warn!("DR import disabled - no DR_LIST_URL provided");
        }
        Self { client, list_url }
    }

    pub fn enabled(&self) -> bool {
        self.list_url.is_some()
    }

    /// Follows `next` links for at most `max_pages` pages.
    pub async fn list(&self, max_pages: u32) -> AppResult<Vec<DrTitle>> {
        let Some(mut url) = self.list_url.clone() else {
            return Ok(Vec::new());
        };

        let mut titles = Vec::new();
        for page in 0..max_pages.max(1) {
            let resp: DrPage =
                self.client.get(&url).send().await?.error_for_status()?.json().await?;
            debug!(page, items = resp.items.len(), "fetched DR list page");
            titles.extend(resp.items.into_iter().filter_map(DrItem::into_title));

            match resp.next {
                Some(next) if !next.is_empty() => url = next,
                _ => break,
            }
        }
        Ok(titles)
    }
}
