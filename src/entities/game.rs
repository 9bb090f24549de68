use sea_orm::entity::prelude::*;

use crate::catalog::{Catalog, Field, RelatedKey};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "games")]
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
    pub platforms: String,
    pub screenshots: String,
    pub min_age: i32,
    pub max_age: i32,
    pub age_group: String,
    pub price: Option<f64>,
    pub price_model: String,
    pub rating: f64,
    pub featured: bool,
    pub editor_choice: bool,
    pub pros: Option<Json>,
    pub cons: Option<Json>,
    pub icon_url: Option<String>,
    pub website_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Catalog for Entity {
    type Dto = crate::models::GameDto;

    const NAME: &'static str = "games";
    const NOT_FOUND: &'static str = "Spillet blev ikke fundet";

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
            Field::Price => Column::Price,
            Field::Rating => Column::Rating,
            Field::Featured => Column::Featured,
            Field::EditorChoice => Column::EditorChoice,
            Field::CreatedAt => Column::CreatedAt,
            Field::UpdatedAt => Column::UpdatedAt,
            Field::MinPlayers | Field::MaxPlayers | Field::PlayTimeMinutes | Field::Complexity => {
                return None;
            },
        })
    }

    fn related_key(model: &Model) -> RelatedKey {
        RelatedKey::new(model.id, &model.age_group, &model.categories)
    }
}
