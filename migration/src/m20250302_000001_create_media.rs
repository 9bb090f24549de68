use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Media::Table)
                    .if_not_exists()
                    .col(pk_auto(Media::Id))
                    .col(integer_null(Media::TmdbId).unique_key())
                    .col(string_null(Media::DrEntityId).unique_key())
                    .col(string_uniq(Media::Slug))
                    .col(string(Media::Title))
                    .col(string_null(Media::OriginalTitle))
                    .col(string(Media::MediaType))
                    .col(text_null(Media::Overview))
                    .col(string_null(Media::PosterUrl))
                    .col(integer_null(Media::ReleaseYear))
                    .col(integer_null(Media::MinAge))
                    .col(string(Media::Source))
                    .col(boolean(Media::IsDanish).default(false))
                    .col(boolean(Media::IsNordic).default(false))
                    .col(boolean(Media::HasViolence).default(false))
                    .col(boolean(Media::HasScaryContent).default(false))
                    .col(boolean(Media::HasLanguage).default(false))
                    .col(boolean(Media::HasEducational).default(false))
                    .col(text_null(Media::ParentInfo))
                    .col(text_null(Media::ParentTip))
                    .col(json_null(Media::Pros))
                    .col(json_null(Media::Cons))
                    .col(big_integer_null(Media::ReviewGeneratedAt))
                    .col(big_integer(Media::CreatedAt))
                    .col(big_integer(Media::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StreamingAvailability::Table)
                    .if_not_exists()
                    .col(pk_auto(StreamingAvailability::Id))
                    .col(integer(StreamingAvailability::MediaId))
                    .col(string(StreamingAvailability::Provider))
                    .col(integer(StreamingAvailability::ProviderType))
                    .col(string_null(StreamingAvailability::Link))
                    .col(boolean(StreamingAvailability::Available).default(true))
                    .col(big_integer(StreamingAvailability::LastChecked))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_streaming_availability_media")
                            .from(StreamingAvailability::Table, StreamingAvailability::MediaId)
                            .to(Media::Table, Media::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_streaming_availability_unique")
                    .table(StreamingAvailability::Table)
                    .col(StreamingAvailability::MediaId)
                    .col(StreamingAvailability::Provider)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_streaming_availability_last_checked")
                    .table(StreamingAvailability::Table)
                    .col(StreamingAvailability::LastChecked)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(StreamingAvailability::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Media::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Media {
    Table,
    Id,
    TmdbId,
    DrEntityId,
    Slug,
    Title,
    OriginalTitle,
    MediaType,
    Overview,
    PosterUrl,
    ReleaseYear,
    MinAge,
    Source,
    IsDanish,
    IsNordic,
    HasViolence,
    HasScaryContent,
    HasLanguage,
    HasEducational,
    ParentInfo,
    ParentTip,
    Pros,
    Cons,
    ReviewGeneratedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StreamingAvailability {
    Table,
    Id,
    MediaId,
    Provider,
    ProviderType,
    Link,
    Available,
    LastChecked,
}
