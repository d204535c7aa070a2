pub mod exchange;
pub mod queries;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Error;

pub use queries::categories::Category;
pub use queries::questions::{NewQuestion, Question};

use crate::settings::DatabaseSettings;

pub async fn establish_connection(settings: &DatabaseSettings) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(&settings.url)?
        .create_if_missing(true)
        .foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::SqlitePool;

    use super::queries::questions::create_question;
    use super::{establish_connection, run_migrations, NewQuestion};
    use crate::settings::DatabaseSettings;

    /// Fresh in-memory database with the seed categories applied.
    /// A single connection keeps every query on the same memory database.
    pub async fn memory_pool() -> SqlitePool {
        let settings = DatabaseSettings {
            url: "sqlite::memory:".to_owned(),
            max_connections: 1,
            run_migrations: true,
        };
        let pool = establish_connection(&settings).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    pub async fn add_question(pool: &SqlitePool, question: &str, category: i64) -> i64 {
        create_question(
            pool,
            &NewQuestion {
                question: question.to_owned(),
                answer: "answer".to_owned(),
                difficulty: 1,
                category,
            },
        )
        .await
        .unwrap()
    }
}
