use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use sqlx::Row;

use crate::flower::AnswerLogEntry;

use super::DB;

impl DB {
    /// Append one attempt. With a bounded retention only the newest
    /// `keep` rows survive.
    pub async fn append_log(&self, entry: &AnswerLogEntry, retention: Option<u32>) -> Result<()> {
        let all_correct = entry.all_correct as i64;
        let answered_at = entry.answered_at.to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO answer_log (
                deutsch_guess, latein_guess, familie_guess,
                deutsch, latein, familie,
                all_correct, answered_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.guess_common_name)
        .bind(&entry.guess_scientific_name)
        .bind(&entry.guess_family)
        .bind(&entry.common_name)
        .bind(&entry.scientific_name)
        .bind(&entry.family)
        .bind(all_correct)
        .bind(answered_at)
        .execute(&self.pool)
        .await?;

        if let Some(keep) = retention {
            sqlx::query(
                r#"
                DELETE FROM answer_log
                WHERE id NOT IN (SELECT id FROM answer_log ORDER BY id DESC LIMIT ?)
                "#,
            )
            .bind(keep as i64)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    pub async fn load_log(&self) -> Result<Vec<AnswerLogEntry>> {
        let mut rows = sqlx::query(
            r#"
            SELECT deutsch_guess, latein_guess, familie_guess,
                   deutsch, latein, familie,
                   all_correct, answered_at
            FROM answer_log
            ORDER BY id
            "#,
        )
        .fetch(&self.pool);

        let mut entries = Vec::new();
        while let Some(row) = rows.try_next().await? {
            let all_correct: i64 = row.try_get("all_correct")?;
            let answered_at: String = row.try_get("answered_at")?;
            let answered_at = DateTime::parse_from_rfc3339(&answered_at)
                .with_context(|| format!("Invalid timestamp in answer log: {answered_at}"))?
                .with_timezone(&Utc);

            entries.push(AnswerLogEntry {
                guess_common_name: row.try_get("deutsch_guess")?,
                guess_scientific_name: row.try_get("latein_guess")?,
                guess_family: row.try_get("familie_guess")?,
                common_name: row.try_get("deutsch")?,
                scientific_name: row.try_get("latein")?,
                family: row.try_get("familie")?,
                all_correct: all_correct != 0,
                answered_at,
            });
        }
        Ok(entries)
    }

    pub async fn clear_log(&self) -> Result<()> {
        sqlx::query("DELETE FROM answer_log")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::DB;
    use crate::flower::AnswerLogEntry;

    fn entry(guess: &str, all_correct: bool) -> AnswerLogEntry {
        AnswerLogEntry {
            guess_common_name: guess.to_string(),
            guess_scientific_name: "Rosa".into(),
            guess_family: "Rosaceae".into(),
            common_name: "rose".into(),
            scientific_name: "Rosa".into(),
            family: "Rosaceae".into(),
            all_correct,
            answered_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn appends_and_loads_in_order() {
        let db = DB::new_in_memory().await.unwrap();
        db.append_log(&entry("first", false), None).await.unwrap();
        db.append_log(&entry("second", true), None).await.unwrap();

        let log = db.load_log().await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].guess_common_name, "first");
        assert!(!log[0].all_correct);
        assert_eq!(log[1].guess_common_name, "second");
        assert!(log[1].all_correct);
    }

    #[tokio::test]
    async fn bounded_retention_keeps_the_newest_entries() {
        let db = DB::new_in_memory().await.unwrap();
        for i in 0..7 {
            db.append_log(&entry(&format!("guess-{i}"), false), Some(5))
                .await
                .unwrap();
        }

        let log = db.load_log().await.unwrap();
        assert_eq!(log.len(), 5);
        assert_eq!(log[0].guess_common_name, "guess-2");
        assert_eq!(log[4].guess_common_name, "guess-6");
    }

    #[tokio::test]
    async fn clear_empties_the_log() {
        let db = DB::new_in_memory().await.unwrap();
        db.append_log(&entry("a", true), None).await.unwrap();
        db.clear_log().await.unwrap();
        assert!(db.load_log().await.unwrap().is_empty());
    }
}
