//! Persistence boundary for everything the engine produces.
//!
//! The engine never talks to storage directly; callers hand its outputs to a
//! `StudyStore`. `db::Database` is the SQLite implementation.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ActiveStudy, Flashcard, FlashcardDeck, StudyEntry};

#[async_trait]
pub trait StudyStore: Send + Sync {
    async fn save_entry(&self, entry: &StudyEntry) -> Result<()>;
    async fn delete_entry(&self, id: &str) -> Result<bool>;
    /// All entries, oldest date first.
    async fn list_entries(&self) -> Result<Vec<StudyEntry>>;

    async fn save_deck(&self, deck: &FlashcardDeck) -> Result<()>;
    /// Replace a deck's card list wholesale. Returns `false` for an unknown deck.
    async fn update_deck_cards(&self, deck_id: &str, cards: &[Flashcard]) -> Result<bool>;
    async fn delete_deck(&self, id: &str) -> Result<bool>;
    /// All decks, newest first, cards in their stored order.
    async fn list_decks(&self) -> Result<Vec<FlashcardDeck>>;

    async fn save_active_study(&self, study: &ActiveStudy) -> Result<()>;
    async fn set_active_study_completed(&self, id: &str, completed: bool) -> Result<bool>;
    async fn delete_active_study(&self, id: &str) -> Result<bool>;
    async fn list_active_studies(&self) -> Result<Vec<ActiveStudy>>;
}
