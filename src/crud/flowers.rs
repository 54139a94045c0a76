use anyhow::Result;
use futures::TryStreamExt;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::flower::Flower;

use super::DB;

fn flower_from_row(row: &SqliteRow) -> Result<Flower> {
    let correct_count: i64 = row.try_get("correct_count")?;
    Ok(Flower {
        common_name: row.try_get("deutsch")?,
        scientific_name: row.try_get("latein")?,
        family: row.try_get("familie")?,
        image_path: row.try_get("bild_path")?,
        correct_count: correct_count.max(0) as u32,
    })
}

impl DB {
    pub async fn load_flowers(&self) -> Result<Vec<Flower>> {
        let mut rows = sqlx::query(
            r#"
            SELECT deutsch, latein, familie, bild_path, correct_count
            FROM flowers
            ORDER BY deutsch
            "#,
        )
        .fetch(&self.pool);

        let mut flowers = Vec::new();
        while let Some(row) = rows.try_next().await? {
            flowers.push(flower_from_row(&row)?);
        }
        Ok(flowers)
    }

    pub async fn add_flower(&self, flower: &Flower) -> Result<()> {
        let correct_count = flower.correct_count as i64;
        sqlx::query(
            r#"
            INSERT INTO flowers (deutsch, latein, familie, bild_path, correct_count)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&flower.common_name)
        .bind(&flower.scientific_name)
        .bind(&flower.family)
        .bind(&flower.image_path)
        .bind(correct_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn flower_exists(&self, common_name: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM flowers WHERE deutsch = ?")
                .bind(common_name)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    /// Persist one card's mastery counter, keyed by common name.
    pub async fn save_correct_count(&self, flower: &Flower) -> Result<()> {
        let correct_count = flower.correct_count as i64;
        sqlx::query("UPDATE flowers SET correct_count = ? WHERE deutsch = ?")
            .bind(correct_count)
            .bind(&flower.common_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Save the whole deck in one transaction.
    pub async fn save_flowers(&self, flowers: &[Flower]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for flower in flowers {
            let correct_count = flower.correct_count as i64;
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO flowers (deutsch, latein, familie, bild_path, correct_count)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&flower.common_name)
            .bind(&flower.scientific_name)
            .bind(&flower.family)
            .bind(&flower.image_path)
            .bind(correct_count)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Full progress wipe: every count back to 0, identities untouched.
    pub async fn reset_counts(&self) -> Result<()> {
        sqlx::query("UPDATE flowers SET correct_count = 0")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DB;
    use crate::flower::Flower;

    fn rose() -> Flower {
        Flower::new("rose", "Rosa", "Rosaceae", "images/rose.jpg")
    }

    #[tokio::test]
    async fn add_load_and_exists() {
        let db = DB::new_in_memory().await.unwrap();
        assert!(db.load_flowers().await.unwrap().is_empty());

        db.add_flower(&rose()).await.unwrap();
        assert!(db.flower_exists("rose").await.unwrap());
        assert!(!db.flower_exists("tulip").await.unwrap());

        let flowers = db.load_flowers().await.unwrap();
        assert_eq!(flowers, vec![rose()]);
    }

    #[tokio::test]
    async fn duplicate_common_name_is_rejected() {
        let db = DB::new_in_memory().await.unwrap();
        db.add_flower(&rose()).await.unwrap();
        assert!(db.add_flower(&rose()).await.is_err());
    }

    #[tokio::test]
    async fn counts_persist_and_reset() {
        let db = DB::new_in_memory().await.unwrap();
        let mut flower = rose();
        db.add_flower(&flower).await.unwrap();

        flower.correct_count = 2;
        db.save_correct_count(&flower).await.unwrap();
        assert_eq!(db.load_flowers().await.unwrap()[0].correct_count, 2);

        db.reset_counts().await.unwrap();
        let reloaded = db.load_flowers().await.unwrap();
        assert_eq!(reloaded[0].correct_count, 0);
        // identity fields survive the reset
        assert_eq!(reloaded[0].scientific_name, "Rosa");
        assert_eq!(reloaded[0].image_path, "images/rose.jpg");
    }

    #[tokio::test]
    async fn save_flowers_writes_the_whole_deck() {
        let db = DB::new_in_memory().await.unwrap();
        let mut deck = vec![
            rose(),
            Flower::new("tulip", "Tulipa", "Liliaceae", "images/tulip.jpg"),
        ];
        db.save_flowers(&deck).await.unwrap();

        deck[1].correct_count = 3;
        db.save_flowers(&deck).await.unwrap();

        let reloaded = db.load_flowers().await.unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded[1].common_name, "tulip");
        assert_eq!(reloaded[1].correct_count, 3);
    }
}
