use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_catalog::{BoardGames, Games};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_games_tiers")
                    .table(Games::Table)
                    .col(Games::EditorChoice)
                    .col(Games::Featured)
                    .col(Games::Rating)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_games_age")
                    .table(Games::Table)
                    .col(Games::MinAge)
                    .col(Games::MaxAge)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_board_games_tiers")
                    .table(BoardGames::Table)
                    .col(BoardGames::EditorChoice)
                    .col(BoardGames::Featured)
                    .col(BoardGames::Rating)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_board_games_age")
                    .table(BoardGames::Table)
                    .col(BoardGames::MinAge)
                    .col(BoardGames::MaxAge)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_board_games_age").table(BoardGames::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_board_games_tiers").table(BoardGames::Table).to_owned())
            .await?;
        manager.drop_index(Index::drop().name("idx_games_age").table(Games::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_games_tiers").table(Games::Table).to_owned()).await?;
        Ok(())
    }
}
