//! SQLite persistence for study entries, flashcard decks and active studies.

mod connection;
mod helpers;
mod migrations;
mod repositories;

pub use connection::Database;

use anyhow::Result;
use async_trait::async_trait;

use crate::{
    models::{ActiveStudy, Flashcard, FlashcardDeck, StudyEntry},
    store::StudyStore,
};

#[async_trait]
impl StudyStore for Database {
    async fn save_entry(&self, entry: &StudyEntry) -> Result<()> {
        self.insert_entry(entry).await
    }

    async fn delete_entry(&self, id: &str) -> Result<bool> {
        self.remove_entry(id).await
    }

    async fn list_entries(&self) -> Result<Vec<StudyEntry>> {
        self.get_entries().await
    }

    async fn save_deck(&self, deck: &FlashcardDeck) -> Result<()> {
        self.insert_deck(deck).await
    }

    async fn update_deck_cards(&self, deck_id: &str, cards: &[Flashcard]) -> Result<bool> {
        self.replace_deck_cards(deck_id, cards).await
    }

    async fn delete_deck(&self, id: &str) -> Result<bool> {
        self.remove_deck(id).await
    }

    async fn list_decks(&self) -> Result<Vec<FlashcardDeck>> {
        self.get_decks().await
    }

    async fn save_active_study(&self, study: &ActiveStudy) -> Result<()> {
        self.insert_active_study(study).await
    }

    async fn set_active_study_completed(&self, id: &str, completed: bool) -> Result<bool> {
        self.mark_active_study(id, completed).await
    }

    async fn delete_active_study(&self, id: &str) -> Result<bool> {
        self.remove_active_study(id).await
    }

    async fn list_active_studies(&self) -> Result<Vec<ActiveStudy>> {
        self.get_active_studies().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    use crate::{
        models::{CardDraft, CardLevel, CompletionFlags, DeckDraft, StudyMethod, StudyTime},
        review::{Advance, ReviewRating, ReviewSession},
    };

    fn entry(id: &str, date: NaiveDate) -> StudyEntry {
        StudyEntry {
            id: id.into(),
            date,
            subject: "Math".into(),
            content: "Derivatives".into(),
            completion: CompletionFlags {
                questions_done: true,
                active_review_done: true,
                ..Default::default()
            },
            questions_count: 15,
            elapsed: StudyTime::new(1, 2, 3),
            pomodoro_count: 2,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn deck(subject: &str, created_offset_secs: i64) -> FlashcardDeck {
        DeckDraft {
            subject: subject.into(),
            topic: "Basics".into(),
            cards: vec![
                CardDraft { front: "q1".into(), back: "a1".into() },
                CardDraft { front: "q2".into(), back: "a2".into() },
                CardDraft { front: "q3".into(), back: "a3".into() },
            ],
        }
        .build(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::seconds(created_offset_secs))
        .unwrap()
    }

    #[tokio::test]
    async fn entries_persist_all_fields() {
        let db = Database::in_memory().unwrap();
        let later = entry("b", NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        let earlier = entry("a", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        db.save_entry(&later).await.unwrap();
        db.save_entry(&earlier).await.unwrap();

        let stored = db.list_entries().await.unwrap();
        assert_eq!(stored, vec![earlier, later]);
    }

    #[tokio::test]
    async fn duplicate_entry_id_is_an_error() {
        let db = Database::in_memory().unwrap();
        let e = entry("a", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        db.save_entry(&e).await.unwrap();
        assert!(db.save_entry(&e).await.is_err());
    }

    #[tokio::test]
    async fn delete_entry_reports_whether_it_existed() {
        let db = Database::in_memory().unwrap();
        db.save_entry(&entry("a", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()))
            .await
            .unwrap();

        assert!(db.delete_entry("a").await.unwrap());
        assert!(!db.delete_entry("a").await.unwrap());
        assert!(db.list_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn decks_keep_card_order_and_newest_first() {
        let db = Database::in_memory().unwrap();
        let older = deck("Law", 0);
        let newer = deck("Math", 60);
        db.save_deck(&older).await.unwrap();
        db.save_deck(&newer).await.unwrap();

        let stored = db.list_decks().await.unwrap();
        assert_eq!(stored, vec![newer, older]);
    }

    #[tokio::test]
    async fn committed_review_is_persisted() {
        let db = Database::in_memory().unwrap();
        let mut stored_deck = deck("Math", 0);
        db.save_deck(&stored_deck).await.unwrap();

        let now = Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap();
        let mut session = ReviewSession::start(&stored_deck).unwrap();
        let outcome = loop {
            match session.flip().rate(ReviewRating::Medium, now) {
                Advance::Next(next) => session = next,
                Advance::Completed(outcome) => break outcome,
            }
        };
        assert!(outcome.commit(&mut stored_deck));
        assert!(db
            .update_deck_cards(&stored_deck.id, &stored_deck.cards)
            .await
            .unwrap());

        let reloaded = db.list_decks().await.unwrap().remove(0);
        assert_eq!(reloaded.cards.len(), 3);
        assert!(reloaded
            .cards
            .iter()
            .all(|c| c.level == CardLevel::Medium && c.last_reviewed == Some(now)));
        let fronts: Vec<_> = reloaded.cards.iter().map(|c| c.front.as_str()).collect();
        assert_eq!(fronts, ["q1", "q2", "q3"]);
    }

    #[tokio::test]
    async fn updating_unknown_deck_is_a_no_op() {
        let db = Database::in_memory().unwrap();
        let d = deck("Math", 0);
        assert!(!db.update_deck_cards("missing", &d.cards).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_a_deck_removes_its_cards() {
        let db = Database::in_memory().unwrap();
        let d = deck("Math", 0);
        db.save_deck(&d).await.unwrap();
        assert!(db.delete_deck(&d.id).await.unwrap());

        let orphaned: i64 = db
            .execute(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM flashcards", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(orphaned, 0);
        assert!(db.list_decks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn active_studies_toggle_and_delete() {
        let db = Database::in_memory().unwrap();
        let study = ActiveStudy {
            id: "s1".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            subject: "Law".into(),
            topic: "Torts".into(),
            method: StudyMethod::Explanation,
            notes: String::new(),
            completed: false,
        };
        db.save_active_study(&study).await.unwrap();

        assert!(db.set_active_study_completed("s1", true).await.unwrap());
        let stored = db.list_active_studies().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].completed);
        assert_eq!(stored[0].method, StudyMethod::Explanation);

        assert!(!db.set_active_study_completed("nope", true).await.unwrap());
        assert!(db.delete_active_study("s1").await.unwrap());
        assert!(db.list_active_studies().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("studydesk.sqlite3");
        let e = entry("a", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        {
            let db = Database::new(path.clone()).unwrap();
            assert_eq!(db.path(), Some(path.as_path()));
            db.save_entry(&e).await.unwrap();
        }

        let reopened = Database::new(path).unwrap();
        assert_eq!(reopened.list_entries().await.unwrap(), vec![e]);
    }
}
