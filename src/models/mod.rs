pub mod active_study;
pub mod deck;
pub mod entry;

pub use active_study::{ActiveStudy, StudyMethod};
pub use deck::{CardDraft, CardLevel, DeckDraft, Flashcard, FlashcardDeck};
pub use entry::{CompletionFlags, StudyEntry, StudyTime};
