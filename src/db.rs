use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Set, Statement,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    catalog::shape::parse_json_array,
    entities::{board_game, game, media},
    error::AppResult,
    models::now_sec,
};

pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;

    for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL", "PRAGMA foreign_keys=ON"] {
        db.execute(Statement::from_string(db.get_database_backend(), pragma.to_string())).await?;
    }

    migrate(&db).await?;
    Ok(db)
}

/// Applies pending schema migrations. Safe to call repeatedly.
pub async fn migrate(db: &DatabaseConnection) -> AppResult<()> {
    Migrator::up(db, None).await?;
    info!("schema up to date");
    Ok(())
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayMigrationReport {
    pub games: u64,
    pub board_games: u64,
    pub media: u64,
}

impl ArrayMigrationReport {
    pub fn total(&self) -> u64 {
        self.games + self.board_games + self.media
    }
}

/// Upgrades every row of one entity module and yields how many changed.
macro_rules! upgrade_table {
    ($db:expr, $now:expr, $entity:ident) => {{
        let mut changed = 0u64;
        for row in $entity::Entity::find().all($db).await? {
            let (pros, cons) = (upgrade(&row.pros), upgrade(&row.cons));
            if pros.is_none() && cons.is_none() {
                continue;
            }
            let mut active: $entity::ActiveModel = row.into();
            if let Some(pros) = pros {
                active.pros = Set(Some(pros));
            }
            if let Some(cons) = cons {
                active.cons = Set(Some(cons));
            }
            active.updated_at = Set($now);
            active.update($db).await?;
            changed += 1;
        }
        changed
    }};
}

/// Rewrites legacy `pros`/`cons` values (a JSON string holding an encoded
/// array) into native JSON arrays. Rows already holding non-string values are
/// left alone, so a second run updates nothing.
pub async fn migrate_pros_cons(db: &DatabaseConnection) -> AppResult<ArrayMigrationReport> {
    let now = now_sec();
    let report = ArrayMigrationReport {
        games: upgrade_table!(db, now, game),
        board_games: upgrade_table!(db, now, board_game),
        media: upgrade_table!(db, now, media),
    };
    debug!(?report, "pros/cons migration finished");
    Ok(report)
}

/// Replacement for a legacy string value; `None` when nothing needs doing.
fn upgrade(value: &Option<Value>) -> Option<Value> {
    match value {
        Some(Value::String(encoded)) => Some(Value::Array(parse_json_array(Some(encoded)))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::{GameSeed, memory_db, seed_board_game, seed_game, seed_media};

    #[test]
    fn only_strings_are_upgraded() {
        assert_eq!(upgrade(&Some(json!("[\"a\",\"b\"]"))), Some(json!(["a", "b"])));
        assert_eq!(upgrade(&Some(json!("garbage"))), Some(json!([])));
        assert_eq!(upgrade(&Some(json!(["a"]))), None);
        assert_eq!(upgrade(&None), None);
    }

    #[tokio::test]
    async fn second_run_updates_zero_rows() {
        let db = memory_db().await;
        let legacy = seed_game(&db, GameSeed::new("legacy")).await;
        let mut active: game::ActiveModel = legacy.into();
        active.pros = Set(Some(json!("[\"Gratis\",\"Ingen reklamer\"]")));
        active.cons = Set(Some(json!("[\"Kræver internet\"]")));
        active.update(&db).await.unwrap();
        seed_game(&db, GameSeed::new("native")).await;

        let first = migrate_pros_cons(&db).await.unwrap();
        assert_eq!(first.games, 1);
        assert_eq!(first.total(), 1);

        let row = game::Entity::find_by_id(1).one(&db).await.unwrap().unwrap();
        assert_eq!(row.pros, Some(json!(["Gratis", "Ingen reklamer"])));
        assert_eq!(row.cons, Some(json!(["Kræver internet"])));

        let second = migrate_pros_cons(&db).await.unwrap();
        assert_eq!(second.total(), 0);
    }

    #[tokio::test]
    async fn upgrades_each_table_independently() {
        let db = memory_db().await;
        let board = seed_board_game(&db, "skak", 2, 2, "svær").await;
        let mut active: board_game::ActiveModel = board.into();
        active.pros = Set(Some(json!("[\"Klassiker\"]")));
        active.update(&db).await.unwrap();
        let title = seed_media(&db, "bamse", Some(11), None).await;
        let mut active: media::ActiveModel = title.into();
        active.cons = Set(Some(json!("ikke json")));
        active.update(&db).await.unwrap();

        let report = migrate_pros_cons(&db).await.unwrap();
        assert_eq!(report, ArrayMigrationReport { games: 0, board_games: 1, media: 1 });

        let row = media::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!(row.cons, Some(json!([])));
        assert_eq!(migrate_pros_cons(&db).await.unwrap().total(), 0);
    }
}
