use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use std::str::FromStr;

use crate::utils::get_data_dir;

// Column identities follow the original tabular layout: deutsch (common
// name), latein (scientific name), familie (family), bild_path (image).
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS flowers (
    deutsch TEXT NOT NULL PRIMARY KEY,
    latein TEXT NOT NULL,
    familie TEXT NOT NULL,
    bild_path TEXT NOT NULL,
    correct_count INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS answer_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    deutsch_guess TEXT NOT NULL,
    latein_guess TEXT NOT NULL,
    familie_guess TEXT NOT NULL,
    deutsch TEXT NOT NULL,
    latein TEXT NOT NULL,
    familie TEXT NOT NULL,
    all_correct INTEGER NOT NULL,
    answered_at TEXT NOT NULL
);
"#;

#[derive(Clone)]
pub struct DB {
    pub(super) pool: SqlitePool,
}

impl DB {
    pub async fn new() -> Result<Self> {
        let data_dir = get_data_dir()?;
        let db_path = data_dir.join("flowers.db");

        let options =
            SqliteConnectOptions::from_str(&db_path.to_string_lossy())?.create_if_missing(true);

        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        // First run is not an error: an empty schema is simply created.
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[cfg(test)]
impl DB {
    pub async fn new_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(options).await
    }
}
