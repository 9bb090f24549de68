//! Catalog query builder shared by the digital-game and board-game tables.
//!
//! A request's query string is turned into a [`Filter`], an [`Ordering`] and a
//! [`Window`]; [`fetch_page`] issues the paged fetch and the count against the
//! same predicate.

pub mod filter;
pub mod pagination;
pub mod shape;
pub mod sort;

use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect,
};
use serde::Serialize;
use tracing::debug;

pub use self::{
    filter::{AgeBucket, CatalogQuery, Filter},
    pagination::{Pagination, Window},
    sort::Ordering,
};
use crate::error::AppResult;

pub const RELATED_LIMIT: u64 = 4;
pub const FEATURED_LIMIT: u64 = 8;
pub const SEARCH_LIMIT: u64 = 20;

/// Logical columns a catalog may expose. Catalogs answer `None` for the ones
/// they do not carry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Field {
    Id,
    Slug,
    Title,
    ShortDescription,
    Description,
    Categories,
    Skills,
    Themes,
    MinAge,
    MaxAge,
    AgeGroup,
    MinPlayers,
    MaxPlayers,
    PlayTimeMinutes,
    Complexity,
    Price,
    Rating,
    Featured,
    EditorChoice,
    CreatedAt,
    UpdatedAt,
}

pub trait Catalog: EntityTrait {
    type Dto: Serialize + From<Self::Model> + Send;

    const NAME: &'static str;
    /// User-facing message for an unknown slug.
    const NOT_FOUND: &'static str;

    fn column(field: Field) -> Option<Self::Column>;

    fn related_key(model: &Self::Model) -> RelatedKey;
}

/// What a detail lookup needs to find similar entities.
#[derive(Clone, Debug, PartialEq)]
pub struct RelatedKey {
    pub id: i32,
    pub age_group: String,
    pub first_category: Option<String>,
}

impl RelatedKey {
    pub fn new(id: i32, age_group: &str, encoded_categories: &str) -> Self {
        let first_category = shape::parse_string_list(Some(encoded_categories))
            .into_iter()
            .map(|c| filter::fold(c.trim()))
            .find(|c| !c.is_empty());
        Self { id, age_group: age_group.to_string(), first_category }
    }
}

pub async fn fetch_page<C>(
    db: &DatabaseConnection,
    filter: &Filter,
    ordering: Ordering,
    window: Window,
) -> AppResult<(Vec<C::Model>, u64)>
where
    C: Catalog,
    C::Model: Sync,
{
    let select = C::find().filter(filter.condition::<C>());

    let rows = ordering
        .apply::<C>(select.clone())
        .limit(window.limit)
        .offset(window.offset)
        .all(db)
        .await?;
    let total = select.count(db).await?;

    debug!(catalog = C::NAME, returned = rows.len(), total, "fetched catalog page");
    Ok((rows, total))
}

pub async fn find_by_slug<C: Catalog>(
    db: &DatabaseConnection,
    slug: &str,
) -> AppResult<Option<C::Model>> {
    let Some(column) = C::column(Field::Slug) else {
        return Ok(None);
    };
    Ok(C::find().filter(column.eq(slug)).one(db).await?)
}

/// Same age bucket or sharing the first category, best tiers first.
pub async fn related<C: Catalog>(
    db: &DatabaseConnection,
    key: &RelatedKey,
) -> AppResult<Vec<C::Model>> {
    let mut similar = Condition::any();
    if let Some(column) = C::column(Field::AgeGroup) {
        similar = similar.add(column.eq(key.age_group.as_str()));
    }
    if let Some(category) = &key.first_category {
        if let Some(expr) =
            filter::tag_membership::<C>(Field::Categories, std::slice::from_ref(category))
        {
            similar = similar.add(expr);
        }
    }

    let mut select = C::find().filter(similar);
    if let Some(id) = C::column(Field::Id) {
        select = select.filter(id.ne(key.id));
    }

    Ok(Ordering::default().apply::<C>(select).limit(RELATED_LIMIT).all(db).await?)
}

pub async fn featured<C: Catalog>(db: &DatabaseConnection, limit: u64) -> AppResult<Vec<C::Model>> {
    let mut flagged = Condition::any();
    for field in [Field::EditorChoice, Field::Featured] {
        if let Some(column) = C::column(field) {
            flagged = flagged.add(column.eq(true));
        }
    }
    Ok(Ordering::default().apply::<C>(C::find().filter(flagged)).limit(limit).all(db).await?)
}

/// Free-text search. A blank query returns nothing.
pub async fn search<C: Catalog>(
    db: &DatabaseConnection,
    text: &str,
    limit: u64,
) -> AppResult<Vec<C::Model>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let filter = Filter { search: Some(text.to_string()), ..Filter::default() };
    let select = C::find().filter(filter.condition::<C>());
    Ok(sort::apply_search_order::<C>(select).limit(limit).all(db).await?)
}

#[cfg(test)]
mod tests {
    use sea_orm::{ActiveModelTrait, Set};

    use super::*;
    use crate::{
        config::ParamPolicy,
        entities::{board_game, game},
        test_support::{GameSeed, memory_db, seed_board_game, seed_game},
    };

    fn query(pairs: &[(&str, &str)]) -> CatalogQuery {
        let encoded = pairs
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let uri: axum::http::Uri = format!("/?{encoded}").parse().unwrap();
        axum::extract::Query::<CatalogQuery>::try_from_uri(&uri).unwrap().0
    }

    async fn list_games(
        db: &DatabaseConnection,
        pairs: &[(&str, &str)],
    ) -> (Vec<game::Model>, Pagination) {
        let q = query(pairs);
        let filter = Filter::from_query(&q, ParamPolicy::Lenient).unwrap();
        let ordering = Ordering::resolve(q.sort.as_deref(), q.order.as_deref());
        let window = Window::from_query(q.limit.as_deref(), q.offset.as_deref(), ParamPolicy::Lenient)
            .unwrap();
        let (rows, total) = fetch_page::<game::Entity>(db, &filter, ordering, window).await.unwrap();
        let pagination = Pagination::new(window, rows.len(), total);
        (rows, pagination)
    }

    #[tokio::test]
    async fn age_bucket_matches_label_or_overlapping_range() {
        let db = memory_db().await;
        seed_game(&db, GameSeed::new("labelled").ages(9, 12).age_group("3-6")).await;
        seed_game(&db, GameSeed::new("overlapping").ages(5, 8).age_group("7-10")).await;
        seed_game(&db, GameSeed::new("too-old").ages(12, 16).age_group("11-15")).await;

        let (rows, _) = list_games(&db, &[("ageGroup", "3-6")]).await;
        let mut slugs: Vec<_> = rows.iter().map(|g| g.slug.as_str()).collect();
        slugs.sort_unstable();
        assert_eq!(slugs, ["labelled", "overlapping"]);
        for g in &rows {
            assert!(g.age_group == "3-6" || (g.min_age <= 6 && g.max_age >= 3));
        }
    }

    #[tokio::test]
    async fn unknown_age_bucket_is_ignored() {
        let db = memory_db().await;
        seed_game(&db, GameSeed::new("a").ages(3, 6)).await;
        seed_game(&db, GameSeed::new("b").ages(10, 14)).await;

        let (rows, pagination) = list_games(&db, &[("ageGroup", "99-100")]).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(pagination.total, 2);
    }

    #[tokio::test]
    async fn age_range_results_overlap_the_query() {
        let db = memory_db().await;
        seed_game(&db, GameSeed::new("toddler").ages(1, 3)).await;
        seed_game(&db, GameSeed::new("wide").ages(4, 12)).await;
        seed_game(&db, GameSeed::new("teen").ages(13, 17)).await;

        let (rows, _) = list_games(&db, &[("minAge", "5"), ("maxAge", "8")]).await;
        assert_eq!(rows.iter().map(|g| g.slug.as_str()).collect::<Vec<_>>(), ["wide"]);
        for g in &rows {
            assert!(g.min_age <= 8 && g.max_age >= 5);
        }
    }

    #[tokio::test]
    async fn malformed_numbers_are_unconstrained_when_lenient() {
        let db = memory_db().await;
        seed_game(&db, GameSeed::new("a").ages(1, 3)).await;
        seed_game(&db, GameSeed::new("b").ages(10, 14)).await;

        let (rows, _) = list_games(&db, &[("minAge", "fem")]).await;
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn tag_lists_or_within_and_across() {
        let db = memory_db().await;
        seed_game(&db, GameSeed::new("math-logic").categories(&["Matematik"]).skills(&["Logik"]))
            .await;
        seed_game(&db, GameSeed::new("reading-logic").categories(&["Læsning"]).skills(&["logik"]))
            .await;
        seed_game(&db, GameSeed::new("math-only").categories(&["matematik"]).skills(&["Motorik"]))
            .await;

        let (rows, _) =
            list_games(&db, &[("categories", " MATEMATIK ,læsning"), ("skills", "logik")]).await;
        let mut slugs: Vec<_> = rows.iter().map(|g| g.slug.as_str()).collect();
        slugs.sort_unstable();
        assert_eq!(slugs, ["math-logic", "reading-logic"]);
    }

    #[tokio::test]
    async fn tag_match_is_membership_not_substring() {
        let db = memory_db().await;
        seed_game(&db, GameSeed::new("art").categories(&["kunst"])).await;
        seed_game(&db, GameSeed::new("crafts").categories(&["kunsthåndværk"])).await;

        let (rows, _) = list_games(&db, &[("categories", "kunst")]).await;
        assert_eq!(rows.iter().map(|g| g.slug.as_str()).collect::<Vec<_>>(), ["art"]);
    }

    #[tokio::test]
    async fn malformed_stored_tags_never_match_and_never_fail() {
        let db = memory_db().await;
        let broken = seed_game(&db, GameSeed::new("broken")).await;
        let mut active: game::ActiveModel = broken.into();
        active.categories = Set("not json".to_string());
        active.update(&db).await.unwrap();
        seed_game(&db, GameSeed::new("ok").categories(&["eventyr"])).await;

        let (rows, _) = list_games(&db, &[("categories", "eventyr")]).await;
        assert_eq!(rows.iter().map(|g| g.slug.as_str()).collect::<Vec<_>>(), ["ok"]);
    }

    #[tokio::test]
    async fn search_spans_text_and_encoded_tags() {
        let db = memory_db().await;
        seed_game(&db, GameSeed::new("dino").title("Dino Dash")).await;
        seed_game(&db, GameSeed::new("tagged").themes(&["Dinosaurer"])).await;
        seed_game(&db, GameSeed::new("other").title("Rumrejse")).await;

        let (rows, _) = list_games(&db, &[("search", "DINO")]).await;
        let mut slugs: Vec<_> = rows.iter().map(|g| g.slug.as_str()).collect();
        slugs.sort_unstable();
        assert_eq!(slugs, ["dino", "tagged"]);
    }

    #[tokio::test]
    async fn danish_letters_match_in_any_case() {
        let db = memory_db().await;
        seed_game(&db, GameSeed::new("fairy").categories(&["Æventyr"])).await;
        seed_game(&db, GameSeed::new("eco").title("Økologi for børn")).await;
        seed_game(&db, GameSeed::new("other").title("Rumrejse").categories(&["Rummet"])).await;

        for input in ["æventyr", "ÆVENTYR", "Æventyr"] {
            let (rows, _) = list_games(&db, &[("categories", input)]).await;
            let slugs: Vec<_> = rows.iter().map(|g| g.slug.as_str()).collect();
            assert_eq!(slugs, ["fairy"], "categories={input}");
        }
        for input in ["økologi", "ØKOLOGI", "Økologi"] {
            let (rows, _) = list_games(&db, &[("search", input)]).await;
            let slugs: Vec<_> = rows.iter().map(|g| g.slug.as_str()).collect();
            assert_eq!(slugs, ["eco"], "search={input}");

            let found = search::<game::Entity>(&db, input, SEARCH_LIMIT).await.unwrap();
            assert_eq!(found.len(), 1, "search={input}");
        }

        let (rows, _) = list_games(&db, &[("search", "æventyr")]).await;
        assert_eq!(rows.iter().map(|g| g.slug.as_str()).collect::<Vec<_>>(), ["fairy"]);
    }

    #[tokio::test]
    async fn related_matches_capitalised_danish_category() {
        let db = memory_db().await;
        let anchor =
            seed_game(&db, GameSeed::new("anchor").age_group("0-3").categories(&["Årstider"])).await;
        seed_game(&db, GameSeed::new("seasons").age_group("11-15").categories(&["ÅRSTIDER"])).await;
        seed_game(&db, GameSeed::new("unrelated").age_group("11-15")).await;

        let key = <game::Entity as Catalog>::related_key(&anchor);
        assert_eq!(key.first_category.as_deref(), Some("årstider"));
        let rows = related::<game::Entity>(&db, &key).await.unwrap();
        assert_eq!(rows.iter().map(|g| g.slug.as_str()).collect::<Vec<_>>(), ["seasons"]);
    }

    #[tokio::test]
    async fn search_escapes_like_wildcards() {
        let db = memory_db().await;
        seed_game(&db, GameSeed::new("plain").title("Hundrede procent")).await;
        seed_game(&db, GameSeed::new("percent").title("100% sjov")).await;

        let (rows, _) = list_games(&db, &[("search", "%")]).await;
        assert_eq!(rows.iter().map(|g| g.slug.as_str()).collect::<Vec<_>>(), ["percent"]);
    }

    #[tokio::test]
    async fn editor_choice_precedes_featured_for_every_sort() {
        let db = memory_db().await;
        seed_game(&db, GameSeed::new("plain-top").rating(5.0).title("Aaa")).await;
        seed_game(&db, GameSeed::new("featured").rating(3.0).featured().title("Mmm")).await;
        seed_game(&db, GameSeed::new("editor").rating(1.0).editor_choice().title("Zzz")).await;

        for (sort, order) in [("rating", "desc"), ("title", "asc"), ("price", "asc"), ("bogus", "x")]
        {
            let (rows, _) = list_games(&db, &[("sort", sort), ("order", order)]).await;
            let slugs: Vec<_> = rows.iter().map(|g| g.slug.as_str()).collect();
            assert_eq!(slugs, ["editor", "featured", "plain-top"], "sort={sort}");
        }
    }

    #[tokio::test]
    async fn ties_break_on_id_across_pages() {
        let db = memory_db().await;
        for i in 0..5 {
            seed_game(&db, GameSeed::new(&format!("g{i}")).rating(4.0)).await;
        }

        let (first, p1) = list_games(&db, &[("limit", "2")]).await;
        let (second, p2) = list_games(&db, &[("limit", "2"), ("offset", "2")]).await;
        let (third, p3) = list_games(&db, &[("limit", "2"), ("offset", "4")]).await;
        let slugs: Vec<_> =
            first.iter().chain(&second).chain(&third).map(|g| g.slug.clone()).collect();
        assert_eq!(slugs, ["g0", "g1", "g2", "g3", "g4"]);
        assert!(p1.has_more && p2.has_more && !p3.has_more);
    }

    #[tokio::test]
    async fn limit_is_clamped_and_large_offsets_are_empty() {
        let db = memory_db().await;
        for i in 0..105 {
            seed_game(&db, GameSeed::new(&format!("g{i:03}"))).await;
        }

        let (rows, pagination) = list_games(&db, &[("limit", "1000")]).await;
        assert_eq!(rows.len(), 100);
        assert_eq!(pagination.limit, 100);
        assert_eq!(pagination.total, 105);
        assert!(pagination.has_more);

        let (rows, pagination) = list_games(&db, &[("offset", "5000")]).await;
        assert!(rows.is_empty());
        assert!(!pagination.has_more);
    }

    #[tokio::test]
    async fn board_games_filter_on_players_and_complexity() {
        let db = memory_db().await;
        seed_board_game(&db, "duo", 2, 2, "let").await;
        seed_board_game(&db, "party", 4, 8, "let").await;
        seed_board_game(&db, "heavy", 2, 4, "svær").await;

        let q = query(&[("minPlayers", "3"), ("maxPlayers", "5"), ("complexity", "let")]);
        let filter = Filter::from_query(&q, ParamPolicy::Lenient).unwrap();
        let (rows, total) = fetch_page::<board_game::Entity>(
            &db,
            &filter,
            Ordering::default(),
            Window::default(),
        )
        .await
        .unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].slug, "party");
    }

    #[tokio::test]
    async fn related_excludes_self_and_caps_at_four() {
        let db = memory_db().await;
        let anchor =
            seed_game(&db, GameSeed::new("anchor").age_group("3-6").categories(&["Musik"])).await;
        for i in 0..5 {
            seed_game(&db, GameSeed::new(&format!("same-age-{i}")).age_group("3-6")).await;
        }
        seed_game(&db, GameSeed::new("same-cat").age_group("11-15").categories(&["musik"]).editor_choice())
            .await;
        seed_game(&db, GameSeed::new("unrelated").age_group("11-15")).await;

        let key = <game::Entity as Catalog>::related_key(&anchor);
        let rows = related::<game::Entity>(&db, &key).await.unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].slug, "same-cat");
        assert!(rows.iter().all(|g| g.slug != "anchor" && g.slug != "unrelated"));
    }

    #[tokio::test]
    async fn search_orders_featured_then_rating_and_ignores_blank() {
        let db = memory_db().await;
        seed_game(&db, GameSeed::new("low").title("Bondegård").rating(2.0).featured()).await;
        seed_game(&db, GameSeed::new("high").title("Bondegården 2").rating(4.5)).await;
        seed_game(&db, GameSeed::new("editor").title("Bondegård Deluxe").rating(1.0).editor_choice())
            .await;

        let rows = search::<game::Entity>(&db, "bondegård", SEARCH_LIMIT).await.unwrap();
        let slugs: Vec<_> = rows.iter().map(|g| g.slug.as_str()).collect();
        assert_eq!(slugs, ["low", "high", "editor"]);

        assert!(search::<game::Entity>(&db, "   ", SEARCH_LIMIT).await.unwrap().is_empty());
    }
}
