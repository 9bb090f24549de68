use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(pk_auto(Games::Id))
                    .col(string_uniq(Games::Slug))
                    .col(string(Games::Title))
                    .col(text(Games::ShortDescription).default(""))
                    .col(text(Games::Description).default(""))
                    .col(text(Games::Categories).default("[]"))
                    .col(text(Games::Skills).default("[]"))
                    .col(text(Games::Themes).default("[]"))
                    .col(text(Games::Platforms).default("[]"))
                    .col(text(Games::Screenshots).default("[]"))
                    .col(integer(Games::MinAge))
                    .col(integer(Games::MaxAge))
                    .col(string(Games::AgeGroup))
                    .col(double_null(Games::Price))
                    .col(string(Games::PriceModel).default("gratis"))
                    .col(double(Games::Rating).default(0.0))
                    .col(boolean(Games::Featured).default(false))
                    .col(boolean(Games::EditorChoice).default(false))
                    .col(json_null(Games::Pros))
                    .col(json_null(Games::Cons))
                    .col(string_null(Games::IconUrl))
                    .col(string_null(Games::WebsiteUrl))
                    .col(big_integer(Games::CreatedAt))
                    .col(big_integer(Games::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BoardGames::Table)
                    .if_not_exists()
                    .col(pk_auto(BoardGames::Id))
                    .col(string_uniq(BoardGames::Slug))
                    .col(string(BoardGames::Title))
                    .col(text(BoardGames::ShortDescription).default(""))
                    .col(text(BoardGames::Description).default(""))
                    .col(text(BoardGames::Categories).default("[]"))
                    .col(text(BoardGames::Skills).default("[]"))
                    .col(text(BoardGames::Themes).default("[]"))
                    .col(integer(BoardGames::MinAge))
                    .col(integer(BoardGames::MaxAge))
                    .col(string(BoardGames::AgeGroup))
                    .col(integer(BoardGames::MinPlayers).default(1))
                    .col(integer(BoardGames::MaxPlayers).default(4))
                    .col(integer(BoardGames::PlayTimeMinutes).default(30))
                    .col(string(BoardGames::Complexity).default("let"))
                    .col(double_null(BoardGames::Price))
                    .col(double(BoardGames::Rating).default(0.0))
                    .col(boolean(BoardGames::Featured).default(false))
                    .col(boolean(BoardGames::EditorChoice).default(false))
                    .col(json_null(BoardGames::Pros))
                    .col(json_null(BoardGames::Cons))
                    .col(string_null(BoardGames::ImageUrl))
                    .col(string_null(BoardGames::WebsiteUrl))
                    .col(big_integer(BoardGames::CreatedAt))
                    .col(big_integer(BoardGames::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(BoardGames::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Games::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Games {
    Table,
    Id,
    Slug,
    Title,
    ShortDescription,
    Description,
    Categories,
    Skills,
    Themes,
    Platforms,
    Screenshots,
    MinAge,
    MaxAge,
    AgeGroup,
    Price,
    PriceModel,
    Rating,
    Featured,
    EditorChoice,
    Pros,
    Cons,
    IconUrl,
    WebsiteUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum BoardGames {
    Table,
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
    Pros,
    Cons,
    ImageUrl,
    WebsiteUrl,
    CreatedAt,
    UpdatedAt,
}
