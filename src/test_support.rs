use std::{collections::HashMap, sync::Arc};

use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, NotSet, Set};
use serde_json::json;

use crate::{
    AppState,
    config::Config,
    db,
    entities::{board_game, game, media},
    models::now_sec,
};

pub const ADMIN_TOKEN: &str = "admin-secret";
pub const CRON_SECRET: &str = "cron-secret";

pub async fn memory_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    db::migrate(&db).await.unwrap();
    db
}

pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("ADMIN_TOKEN".to_string(), ADMIN_TOKEN.to_string()),
        ("CRON_SECRET".to_string(), CRON_SECRET.to_string()),
        ("SITE_URL".to_string(), "https://boernespil.test".to_string()),
    ]);
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub async fn test_state() -> Arc<AppState> {
    test_state_with(&[]).await
}

pub async fn test_state_with(extra: &[(&str, &str)]) -> Arc<AppState> {
    let http = wreq::Client::builder().build().unwrap();
    Arc::new(AppState::new(Arc::new(test_config(extra)), memory_db().await, http))
}

#[derive(Clone, Debug)]
pub struct GameSeed {
    slug: String,
    title: String,
    min_age: i32,
    max_age: i32,
    age_group: String,
    categories: Vec<String>,
    skills: Vec<String>,
    themes: Vec<String>,
    rating: f64,
    featured: bool,
    editor_choice: bool,
}

impl GameSeed {
    pub fn new(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            title: slug.to_string(),
            min_age: 3,
            max_age: 6,
            age_group: "3-6".to_string(),
            categories: Vec::new(),
            skills: Vec::new(),
            themes: Vec::new(),
            rating: 3.0,
            featured: false,
            editor_choice: false,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn ages(mut self, min: i32, max: i32) -> Self {
        self.min_age = min;
        self.max_age = max;
        self
    }

    pub fn age_group(mut self, group: &str) -> Self {
        self.age_group = group.to_string();
        self
    }

    pub fn categories(mut self, tags: &[&str]) -> Self {
        self.categories = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn skills(mut self, tags: &[&str]) -> Self {
        self.skills = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn themes(mut self, tags: &[&str]) -> Self {
        self.themes = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    pub fn editor_choice(mut self) -> Self {
        self.editor_choice = true;
        self
    }
}

pub async fn seed_game(db: &DatabaseConnection, seed: GameSeed) -> game::Model {
    let now = now_sec();
    game::ActiveModel {
        id: NotSet,
        slug: Set(seed.slug),
        title: Set(seed.title),
        short_description: Set("Kort beskrivelse".to_string()),
        description: Set("Lang beskrivelse".to_string()),
        categories: Set(json!(seed.categories).to_string()),
        skills: Set(json!(seed.skills).to_string()),
        themes: Set(json!(seed.themes).to_string()),
        platforms: Set(r#"["iOS","Android"]"#.to_string()),
        screenshots: Set("[]".to_string()),
        min_age: Set(seed.min_age),
        max_age: Set(seed.max_age),
        age_group: Set(seed.age_group),
        price: Set(None),
        price_model: Set("gratis".to_string()),
        rating: Set(seed.rating),
        featured: Set(seed.featured),
        editor_choice: Set(seed.editor_choice),
        pros: Set(Some(json!(["Sjovt"]))),
        cons: Set(Some(json!([]))),
        icon_url: Set(None),
        website_url: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_board_game(
    db: &DatabaseConnection,
    slug: &str,
    min_players: i32,
    max_players: i32,
    complexity: &str,
) -> board_game::Model {
    let now = now_sec();
    board_game::ActiveModel {
        id: NotSet,
        slug: Set(slug.to_string()),
        title: Set(slug.to_string()),
        short_description: Set(String::new()),
        description: Set(String::new()),
        categories: Set(r#"["Familie"]"#.to_string()),
        skills: Set("[]".to_string()),
        themes: Set("[]".to_string()),
        min_age: Set(5),
        max_age: Set(10),
        age_group: Set("7-10".to_string()),
        min_players: Set(min_players),
        max_players: Set(max_players),
        play_time_minutes: Set(20),
        complexity: Set(complexity.to_string()),
        price: Set(Some(199.0)),
        rating: Set(4.0),
        featured: Set(false),
        editor_choice: Set(false),
        pros: Set(None),
        cons: Set(None),
        image_url: Set(None),
        website_url: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_media(
    db: &DatabaseConnection,
    slug: &str,
    tmdb_id: Option<i32>,
    dr_entity_id: Option<&str>,
) -> media::Model {
    let now = now_sec();
    media::ActiveModel {
        id: NotSet,
        tmdb_id: Set(tmdb_id),
        dr_entity_id: Set(dr_entity_id.map(str::to_string)),
        slug: Set(slug.to_string()),
        title: Set(slug.to_string()),
        original_title: Set(None),
        media_type: Set("movie".to_string()),
        overview: Set(Some("En film for hele familien".to_string())),
        poster_url: Set(None),
        release_year: Set(Some(2020)),
        min_age: Set(None),
        source: Set(if tmdb_id.is_some() { "tmdb" } else { "dr" }.to_string()),
        is_danish: Set(true),
        is_nordic: Set(true),
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
    }
    .insert(db)
    .await
    .unwrap()
}
