use anyhow::Result;

use crate::crud::DB;
use crate::palette::Palette;
use crate::stats::learned_count;
use crate::utils::{ask_yn, pluralize};

/// Wipe all learning progress: every correct-count back to zero and the
/// answer log emptied. Card identities and images are untouched.
pub async fn run(db: &DB, yes: bool) -> Result<()> {
    let deck = db.load_flowers().await?;
    if deck.is_empty() {
        println!("No flowers yet; nothing to reset.");
        return Ok(());
    }

    if !yes {
        let confirmed = ask_yn(format!(
            "This wipes the learning progress of {} ({} currently learned). It cannot be undone.",
            Palette::paint(Palette::BLOSSOM, pluralize("flower", deck.len())),
            learned_count(&deck)
        ));
        if !confirmed {
            println!("Aborting; progress untouched.");
            return Ok(());
        }
    }

    db.reset_counts().await?;
    db.clear_log().await?;
    println!(
        "Progress reset. {} back in the learning pool.",
        pluralize("flower", deck.len())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flower::Flower;

    #[tokio::test]
    async fn reset_zeroes_counts_and_clears_the_log() {
        let db = DB::new_in_memory().await.unwrap();
        let mut flower = Flower::new("rose", "Rosa", "Rosaceae", "images/rose.jpg");
        flower.correct_count = 3;
        db.add_flower(&flower).await.unwrap();

        run(&db, true).await.unwrap();

        let deck = db.load_flowers().await.unwrap();
        assert_eq!(learned_count(&deck), 0);
        assert_eq!(deck[0].common_name, "rose");
        assert!(db.load_log().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_on_an_empty_deck_is_a_no_op() {
        let db = DB::new_in_memory().await.unwrap();
        run(&db, true).await.unwrap();
    }
}
