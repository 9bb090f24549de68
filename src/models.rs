use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    catalog::{
        Pagination,
        shape::{native_list, parse_json_array, parse_string_list},
    },
    entities::{board_game, game, media, streaming_availability},
};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDto {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub categories: Vec<String>,
    pub skills: Vec<String>,
    pub themes: Vec<String>,
    pub platforms: Vec<String>,
    pub screenshots: Vec<Value>,
    pub min_age: i32,
    pub max_age: i32,
    pub age_group: String,
    pub price: Option<f64>,
    pub price_model: String,
    pub rating: f64,
    pub featured: bool,
    pub editor_choice: bool,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub icon_url: Option<String>,
    pub website_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<game::Model> for GameDto {
    fn from(m: game::Model) -> Self {
        Self {
            categories: parse_string_list(Some(&m.categories)),
            skills: parse_string_list(Some(&m.skills)),
            themes: parse_string_list(Some(&m.themes)),
            platforms: parse_string_list(Some(&m.platforms)),
            screenshots: parse_json_array(Some(&m.screenshots)),
            pros: native_list(m.pros.as_ref()),
            cons: native_list(m.cons.as_ref()),
            created_at: timestamp(m.created_at),
            updated_at: timestamp(m.updated_at),
            id: m.id,
            slug: m.slug,
            title: m.title,
            short_description: m.short_description,
            description: m.description,
            min_age: m.min_age,
            max_age: m.max_age,
            age_group: m.age_group,
            price: m.price,
            price_model: m.price_model,
            rating: m.rating,
            featured: m.featured,
            editor_choice: m.editor_choice,
            icon_url: m.icon_url,
            website_url: m.website_url,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardGameDto {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub categories: Vec<String>,
    pub skills: Vec<String>,
    pub themes: Vec<String>,
    pub min_age: i32,
    pub max_age: i32,
    pub age_group: String,
    pub min_players: i32,
    pub max_players: i32,
    pub play_time_minutes: i32,
    pub complexity: String,
    pub price: Option<f64>,
    pub rating: f64,
    pub featured: bool,
    pub editor_choice: bool,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub image_url: Option<String>,
    pub website_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<board_game::Model> for BoardGameDto {
    fn from(m: board_game::Model) -> Self {
        Self {
            categories: parse_string_list(Some(&m.categories)),
            skills: parse_string_list(Some(&m.skills)),
            themes: parse_string_list(Some(&m.themes)),
            pros: native_list(m.pros.as_ref()),
            cons: native_list(m.cons.as_ref()),
            created_at: timestamp(m.created_at),
            updated_at: timestamp(m.updated_at),
            id: m.id,
            slug: m.slug,
            title: m.title,
            short_description: m.short_description,
            description: m.description,
            min_age: m.min_age,
            max_age: m.max_age,
            age_group: m.age_group,
            min_players: m.min_players,
            max_players: m.max_players,
            play_time_minutes: m.play_time_minutes,
            complexity: m.complexity,
            price: m.price,
            rating: m.rating,
            featured: m.featured,
            editor_choice: m.editor_choice,
            image_url: m.image_url,
            website_url: m.website_url,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "series",
        }
    }

    /// Stored values other than `series` are films.
    pub fn from_stored(raw: &str) -> Self {
        if raw == "series" { MediaType::Series } else { MediaType::Movie }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSource {
    Tmdb,
    Dr,
}

impl MediaSource {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaSource::Tmdb => "tmdb",
            MediaSource::Dr => "dr",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Stream,
    Rent,
    Buy,
}

impl ProviderType {
    pub fn as_code(self) -> i32 {
        match self {
            ProviderType::Stream => 1,
            ProviderType::Rent => 2,
            ProviderType::Buy => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(ProviderType::Stream),
            2 => Some(ProviderType::Rent),
            3 => Some(ProviderType::Buy),
            _ => None,
        }
    }
}

/// One streaming offer as reported by a provider lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct WatchProvider {
    pub provider_name: String,
    pub link: Option<String>,
    pub provider_type: ProviderType,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDto {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub original_title: Option<String>,
    #[serde(rename = "type")]
    pub media_type: String,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub release_year: Option<i32>,
    pub min_age: Option<i32>,
    pub source: String,
    pub tmdb_id: Option<i32>,
    pub dr_entity_id: Option<String>,
    pub is_danish: bool,
    pub is_nordic: bool,
    pub has_violence: bool,
    pub has_scary_content: bool,
    pub has_language: bool,
    pub has_educational: bool,
    pub parent_info: Option<String>,
    pub parent_tip: Option<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub updated_at: Timestamp,
}

impl From<media::Model> for MediaDto {
    fn from(m: media::Model) -> Self {
        Self {
            pros: native_list(m.pros.as_ref()),
            cons: native_list(m.cons.as_ref()),
            updated_at: timestamp(m.updated_at),
            id: m.id,
            slug: m.slug,
            title: m.title,
            original_title: m.original_title,
            media_type: m.media_type,
            overview: m.overview,
            poster_url: m.poster_url,
            release_year: m.release_year,
            min_age: m.min_age,
            source: m.source,
            tmdb_id: m.tmdb_id,
            dr_entity_id: m.dr_entity_id,
            is_danish: m.is_danish,
            is_nordic: m.is_nordic,
            has_violence: m.has_violence,
            has_scary_content: m.has_scary_content,
            has_language: m.has_language,
            has_educational: m.has_educational,
            parent_info: m.parent_info,
            parent_tip: m.parent_tip,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingDto {
    pub provider: String,
    pub provider_type: Option<ProviderType>,
    pub link: Option<String>,
    pub available: bool,
    pub last_checked: Timestamp,
}

impl From<streaming_availability::Model> for StreamingDto {
    fn from(m: streaming_availability::Model) -> Self {
        Self {
            provider: m.provider,
            provider_type: ProviderType::from_code(m.provider_type),
            link: m.link,
            available: m.available,
            last_checked: timestamp(m.last_checked),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct DetailResponse<T, R = T> {
    pub success: bool,
    pub data: T,
    pub related: Vec<R>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub games: Vec<GameDto>,
    pub board_games: Vec<BoardGameDto>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDetail {
    #[serde(flatten)]
    pub media: MediaDto,
    pub streaming: Vec<StreamingDto>,
}

/// Stored unix seconds as a timestamp; out-of-range values clamp to the epoch.
pub fn timestamp(seconds: i64) -> Timestamp {
    Timestamp::from_second(seconds).unwrap_or(Timestamp::UNIX_EPOCH)
}

pub fn now_sec() -> i64 {
    Timestamp::now().as_second()
}
