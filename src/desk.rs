//! Wires engine outputs to a `StudyStore`.
//!
//! `StudyDesk` holds no state of its own. Every view is recomputed from the
//! store so the analytics always reflect the full, current history.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};

use crate::{
    analytics::{self, ProgressSummary},
    entries::{self, EntryDraft, SessionTotals},
    models::{ActiveStudy, DeckDraft, FlashcardDeck, StudyEntry},
    planner::{self, ActiveStudyDraft, DayPlanProgress},
    review::ReviewOutcome,
    store::StudyStore,
};

#[derive(Clone)]
pub struct StudyDesk {
    store: Arc<dyn StudyStore>,
}

impl StudyDesk {
    pub fn new(store: Arc<dyn StudyStore>) -> Self {
        Self { store }
    }

    /// Assemble an entry from the form and timer totals and save it.
    pub async fn record_entry(
        &self,
        draft: EntryDraft,
        date: NaiveDate,
        totals: SessionTotals,
        now: DateTime<Utc>,
    ) -> Result<StudyEntry> {
        let entry = entries::assemble(draft, date, totals, now);
        self.store
            .save_entry(&entry)
            .await
            .context("failed to save study entry")?;
        info!(
            "Saved {} entry for {} ({})",
            entry.subject, entry.date, entry.elapsed
        );
        Ok(entry)
    }

    pub async fn delete_entry(&self, id: &str) -> Result<bool> {
        let removed = self.store.delete_entry(id).await?;
        if !removed {
            warn!("No study entry with id {id}");
        }
        Ok(removed)
    }

    pub async fn entries(&self) -> Result<Vec<StudyEntry>> {
        self.store.list_entries().await
    }

    pub async fn entries_on(&self, date: NaiveDate) -> Result<Vec<StudyEntry>> {
        let all = self.store.list_entries().await?;
        Ok(analytics::entries_on(&all, date).into_iter().cloned().collect())
    }

    pub async fn month_markers(&self, year: i32, month: u32) -> Result<Vec<u32>> {
        let all = self.store.list_entries().await?;
        Ok(analytics::month_markers(&all, year, month))
    }

    pub async fn progress(&self, today: NaiveDate) -> Result<ProgressSummary> {
        let all = self.store.list_entries().await?;
        Ok(analytics::summarize(&all, today))
    }

    pub async fn create_deck(&self, draft: DeckDraft, now: DateTime<Utc>) -> Result<FlashcardDeck> {
        let deck = draft.build(now)?;
        self.store
            .save_deck(&deck)
            .await
            .context("failed to save deck")?;
        info!("Created deck {} with {} cards", deck.id, deck.cards.len());
        Ok(deck)
    }

    pub async fn decks(&self) -> Result<Vec<FlashcardDeck>> {
        self.store.list_decks().await
    }

    pub async fn deck(&self, id: &str) -> Result<FlashcardDeck> {
        self.store
            .list_decks()
            .await?
            .into_iter()
            .find(|deck| deck.id == id)
            .ok_or_else(|| anyhow!("no deck with id {id}"))
    }

    pub async fn delete_deck(&self, id: &str) -> Result<bool> {
        self.store.delete_deck(id).await
    }

    /// Persist a finished review. This is the only path by which review
    /// results reach storage.
    pub async fn commit_review(&self, outcome: ReviewOutcome) -> Result<FlashcardDeck> {
        let mut deck = self.deck(&outcome.deck_id).await?;
        if !outcome.commit(&mut deck) {
            bail!("review outcome does not belong to deck {}", deck.id);
        }
        if !self.store.update_deck_cards(&deck.id, &deck.cards).await? {
            bail!("deck {} was deleted during the review", deck.id);
        }
        info!("Committed review of deck {}", deck.id);
        Ok(deck)
    }

    pub async fn plan_study(&self, draft: ActiveStudyDraft, date: NaiveDate) -> Result<ActiveStudy> {
        let study = draft.build(date)?;
        self.store
            .save_active_study(&study)
            .await
            .context("failed to save active study")?;
        Ok(study)
    }

    /// Flip a planned study's completion and return the new value.
    pub async fn toggle_study(&self, id: &str) -> Result<bool> {
        let mut study = self
            .store
            .list_active_studies()
            .await?
            .into_iter()
            .find(|study| study.id == id)
            .ok_or_else(|| anyhow!("no active study with id {id}"))?;

        let completed = planner::toggle(&mut study);
        self.store.set_active_study_completed(id, completed).await?;
        Ok(completed)
    }

    pub async fn delete_study(&self, id: &str) -> Result<bool> {
        self.store.delete_active_study(id).await
    }

    pub async fn day_plan(&self, date: NaiveDate) -> Result<(Vec<ActiveStudy>, DayPlanProgress)> {
        let all = self.store.list_active_studies().await?;
        let progress = DayPlanProgress::for_date(&all, date);
        let studies = all.into_iter().filter(|s| s.date == date).collect();
        Ok((studies, progress))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::Database,
        models::{CardDraft, CardLevel, CompletionFlags, StudyTime},
        review::{Advance, ReviewRating, ReviewSession},
    };

    fn desk() -> StudyDesk {
        StudyDesk::new(Arc::new(Database::in_memory().unwrap()))
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn draft(subject: &str, questions: u32) -> EntryDraft {
        EntryDraft {
            subject: subject.into(),
            content: String::new(),
            completion: CompletionFlags {
                questions_done: questions > 0,
                ..Default::default()
            },
            questions_count: questions,
        }
    }

    fn totals(hours: u32, minutes: u32) -> SessionTotals {
        SessionTotals {
            elapsed: StudyTime::new(hours, minutes, 0),
            pomodoros: 1,
        }
    }

    #[tokio::test]
    async fn progress_reflects_saved_entries() {
        let desk = desk();
        desk.record_entry(draft("Math", 5), day(1), totals(1, 30), Utc::now())
            .await
            .unwrap();
        desk.record_entry(draft("Math", 3), day(2), totals(0, 45), Utc::now())
            .await
            .unwrap();

        let summary = desk.progress(day(2)).await.unwrap();
        assert_eq!(summary.total_questions, 8);
        assert!((summary.daily_average - 1.125).abs() < 1e-9);
        assert_eq!(summary.streak, 2);

        assert_eq!(desk.entries_on(day(1)).await.unwrap().len(), 1);
        assert_eq!(desk.month_markers(2024, 3).await.unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn deleted_entries_leave_the_summary() {
        let desk = desk();
        let entry = desk
            .record_entry(draft("Law", 0), day(1), totals(2, 0), Utc::now())
            .await
            .unwrap();
        assert!(desk.delete_entry(&entry.id).await.unwrap());
        assert!(!desk.delete_entry(&entry.id).await.unwrap());

        let summary = desk.progress(day(1)).await.unwrap();
        assert_eq!(summary, ProgressSummary::default());
    }

    #[tokio::test]
    async fn review_results_only_persist_on_commit() {
        let desk = desk();
        let deck = desk
            .create_deck(
                DeckDraft {
                    subject: "Bio".into(),
                    topic: "Cells".into(),
                    cards: vec![
                        CardDraft { front: "f1".into(), back: "b1".into() },
                        CardDraft { front: "f2".into(), back: "b2".into() },
                    ],
                },
                Utc::now(),
            )
            .await
            .unwrap();

        let now = Utc::now();
        let session = ReviewSession::start(&deck).unwrap();
        let Advance::Next(session) = session.flip().rate(ReviewRating::Easy, now) else {
            panic!("two-card deck finished after one card");
        };

        // Abandoned halfway: storage is untouched.
        drop(session);
        let stored = desk.deck(&deck.id).await.unwrap();
        assert!(stored.cards.iter().all(|c| c.level == CardLevel::Unset));

        let session = ReviewSession::start(&stored).unwrap();
        let Advance::Next(session) = session.flip().rate(ReviewRating::Easy, now) else {
            panic!("two-card deck finished after one card");
        };
        let Advance::Completed(outcome) = session.flip().rate(ReviewRating::Hard, now) else {
            panic!("review did not finish on the last card");
        };

        let committed = desk.commit_review(outcome).await.unwrap();
        let levels: Vec<_> = committed.cards.iter().map(|c| c.level).collect();
        assert_eq!(levels, [CardLevel::Easy, CardLevel::Hard]);
        assert_eq!(desk.deck(&deck.id).await.unwrap(), committed);
    }

    #[tokio::test]
    async fn commit_for_deleted_deck_fails() {
        let desk = desk();
        let deck = desk
            .create_deck(
                DeckDraft {
                    subject: "Bio".into(),
                    topic: "Cells".into(),
                    cards: vec![CardDraft { front: "f".into(), back: "b".into() }],
                },
                Utc::now(),
            )
            .await
            .unwrap();

        let Advance::Completed(outcome) = ReviewSession::start(&deck)
            .unwrap()
            .flip()
            .rate(ReviewRating::Medium, Utc::now())
        else {
            panic!("single-card review should finish");
        };

        assert!(desk.delete_deck(&deck.id).await.unwrap());
        assert!(desk.commit_review(outcome).await.is_err());
    }

    #[tokio::test]
    async fn invalid_deck_draft_is_not_saved() {
        let desk = desk();
        let result = desk
            .create_deck(
                DeckDraft {
                    subject: "Bio".into(),
                    topic: "Cells".into(),
                    cards: Vec::new(),
                },
                Utc::now(),
            )
            .await;
        assert!(result.is_err());
        assert!(desk.decks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn day_plan_tracks_toggles() {
        let desk = desk();
        let first = desk
            .plan_study(
                ActiveStudyDraft {
                    subject: "Law".into(),
                    topic: "Torts".into(),
                    ..Default::default()
                },
                day(4),
            )
            .await
            .unwrap();
        desk.plan_study(
            ActiveStudyDraft {
                subject: "Law".into(),
                topic: "Crimes".into(),
                ..Default::default()
            },
            day(4),
        )
        .await
        .unwrap();

        assert!(desk.toggle_study(&first.id).await.unwrap());
        let (studies, progress) = desk.day_plan(day(4)).await.unwrap();
        assert_eq!(studies.len(), 2);
        assert_eq!(progress, DayPlanProgress { completed: 1, total: 2 });

        assert!(!desk.toggle_study(&first.id).await.unwrap());
        assert!(desk.toggle_study("missing").await.is_err());
        assert!(desk.delete_study(&first.id).await.unwrap());
        assert_eq!(desk.day_plan(day(4)).await.unwrap().1.total, 1);
    }
}
