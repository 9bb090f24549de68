use sea_orm::entity::prelude::*;

use crate::catalog::{Catalog, Field, RelatedKey};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "board_games")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub slug: String,
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub categories: String,
    pub skills: String,
    pub themes: String,
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
    pub pros: Option<Json>,
    pub cons: Option<Json>,
    pub image_url: Option<String>,
    pub website_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Catalog for Entity {
    type Dto = crate::models::BoardGameDto;

    const NAME: &'static str = "board_games";
    const NOT_FOUND: &'static str = "Brætspillet blev ikke fundet";

    fn column(field: Field) -> Option<Column> {
        Some(match field {
            Field::Id => Column::Id,
            Field::Slug => Column::Slug,
            Field::Title => Column::Title,
            Field::ShortDescription => Column::ShortDescription,
            Field::Description => Column::Description,
            Field::Categories => Column::Categories,
            Field::Skills => Column::Skills,
            Field::Themes => Column::Themes,
            Field::MinAge => Column::MinAge,
            Field::MaxAge => Column::MaxAge,
            Field::AgeGroup => Column::AgeGroup,
            Field::MinPlayers => Column::MinPlayers,
            Field::MaxPlayers => Column::MaxPlayers,
            Field::PlayTimeMinutes => Column::PlayTimeMinutes,
            Field::Complexity => Column::Complexity,
            Field::Price => Column::Price,
            Field::Rating => Column::Rating,
            Field::Featured => Column::Featured,
            Field::EditorChoice => Column::EditorChoice,
            Field::CreatedAt => Column::CreatedAt,
            Field::UpdatedAt => Column::UpdatedAt,
        })
    }

    fn related_key(model: &Model) -> RelatedKey {
        RelatedKey::new(model.id, &model.age_group, &model.categories)
    }
}
