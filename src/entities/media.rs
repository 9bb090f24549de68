use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "media")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub tmdb_id: Option<i32>,
    #[sea_orm(unique)]
    pub dr_entity_id: Option<String>,
    #[sea_orm(unique)]
    pub slug: String,
    pub title: String,
    pub original_title: Option<String>,
    pub media_type: String,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub release_year: Option<i32>,
    pub min_age: Option<i32>,
    pub source: String,
    pub is_danish: bool,
    pub is_nordic: bool,
    pub has_violence: bool,
    pub has_scary_content: bool,
    pub has_language: bool,
    pub has_educational: bool,
    pub parent_info: Option<String>,
    pub parent_tip: Option<String>,
    pub pros: Option<Json>,
    pub cons: Option<Json>,
    pub review_generated_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::streaming_availability::Entity")]
    StreamingAvailability,
}

impl Related<super::streaming_availability::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StreamingAvailability.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
