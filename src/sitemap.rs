use std::{fmt::Write, sync::Arc};

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, QuerySelect};

use crate::{
    AppState,
    catalog::filter::AGE_BUCKETS,
    entities::{board_game, game, media},
    error::AppResult,
    models::timestamp,
};

const STATIC_ROUTES: [(&str, &str); 8] = [
    ("/", "1.0"),
    ("/spil", "0.9"),
    ("/braetspil", "0.9"),
    ("/film-og-serier", "0.9"),
    ("/soeg", "0.5"),
    ("/om-os", "0.3"),
    ("/kontakt", "0.3"),
    ("/privatlivspolitik", "0.2"),
];

struct Entry {
    path: String,
    lastmod: Option<i64>,
    priority: &'static str,
}

pub async fn sitemap(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let xml = build(&state.db, &state.config.site_url).await?;
    Ok(([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml).into_response())
}

pub async fn build(db: &DatabaseConnection, site_url: &str) -> AppResult<String> {
    let mut entries: Vec<Entry> = STATIC_ROUTES
        .iter()
        .map(|&(path, priority)| Entry { path: path.to_string(), lastmod: None, priority })
        .collect();
    entries.extend(AGE_BUCKETS.iter().map(|b| Entry {
        path: format!("/alder/{}", b.key),
        lastmod: None,
        priority: "0.7",
    }));

    let games: Vec<(String, i64)> = game::Entity::find()
        .select_only()
        .columns([game::Column::Slug, game::Column::UpdatedAt])
        .order_by_asc(game::Column::Id)
        .into_tuple()
        .all(db)
        .await?;
    let board_games: Vec<(String, i64)> = board_game::Entity::find()
        .select_only()
        .columns([board_game::Column::Slug, board_game::Column::UpdatedAt])
        .order_by_asc(board_game::Column::Id)
        .into_tuple()
        .all(db)
        .await?;
    let titles: Vec<(String, i64)> = media::Entity::find()
        .select_only()
        .columns([media::Column::Slug, media::Column::UpdatedAt])
        .order_by_asc(media::Column::Id)
        .into_tuple()
        .all(db)
        .await?;

    for (prefix, rows) in [("/spil", games), ("/braetspil", board_games), ("/film-og-serier", titles)]
    {
        entries.extend(rows.into_iter().map(|(slug, updated_at)| Entry {
            path: format!("{prefix}/{}", urlencoding::encode(&slug)),
            lastmod: Some(updated_at),
            priority: "0.8",
        }));
    }

    Ok(render(site_url, &entries))
}

fn render(site_url: &str, entries: &[Entry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str("  <url>\n");
        let _ = writeln!(xml, "    <loc>{}</loc>", xml_escape(&format!("{site_url}{}", entry.path)));
        if let Some(seconds) = entry.lastmod {
            let _ = writeln!(xml, "    <lastmod>{}</lastmod>", timestamp(seconds));
        }
        let _ = writeln!(xml, "    <priority>{}</priority>", entry.priority);
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
