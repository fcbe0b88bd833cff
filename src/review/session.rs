//! Flashcard review as snapshot-and-commit.
//!
//! Starting a session copies the deck's cards. Ratings only touch that copy;
//! the copy comes back as a [`ReviewOutcome`] when the last card is passed,
//! and only then may it be written to the deck. Dropping a session part-way
//! leaves the stored deck untouched.
//!
//! The face being shown is part of the type: only a [`RevealedCard`] can be
//! rated, and the only way to get one is to flip the front.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{CardLevel, Flashcard, FlashcardDeck};

/// The three self-ratings offered once the answer is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewRating {
    Hard,
    Medium,
    Easy,
}

impl ReviewRating {
    pub fn level(&self) -> CardLevel {
        match self {
            ReviewRating::Hard => CardLevel::Hard,
            ReviewRating::Medium => CardLevel::Medium,
            ReviewRating::Easy => CardLevel::Easy,
        }
    }

    pub fn from_level(value: u8) -> Option<Self> {
        match value {
            1 => Some(ReviewRating::Hard),
            3 => Some(ReviewRating::Medium),
            5 => Some(ReviewRating::Easy),
            _ => None,
        }
    }
}

/// Session-local card sequence handed back when the review finishes.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub deck_id: String,
    pub cards: Vec<Flashcard>,
}

impl ReviewOutcome {
    /// Write the reviewed cards back into `deck`. Returns `false` if the
    /// outcome belongs to a different deck.
    pub fn commit(self, deck: &mut FlashcardDeck) -> bool {
        if deck.id != self.deck_id {
            return false;
        }
        deck.cards = self.cards;
        true
    }
}

#[derive(Debug, Clone)]
struct Walk {
    deck_id: String,
    cards: Vec<Flashcard>,
    current: usize,
}

impl Walk {
    fn card(&self) -> &Flashcard {
        &self.cards[self.current]
    }

    fn position(&self) -> (usize, usize) {
        (self.current + 1, self.cards.len())
    }

    fn progress(&self) -> f64 {
        (self.current + 1) as f64 / self.cards.len() as f64
    }

    fn advance(mut self) -> Advance {
        if self.current + 1 >= self.cards.len() {
            return Advance::Completed(ReviewOutcome {
                deck_id: self.deck_id,
                cards: self.cards,
            });
        }
        self.current += 1;
        Advance::Next(ReviewSession { walk: self })
    }
}

/// Result of moving past a card.
#[derive(Debug)]
pub enum Advance {
    /// Next card, front side up.
    Next(ReviewSession),
    /// The last card was passed; this is the only place results surface.
    Completed(ReviewOutcome),
}

/// A review in progress with the current card's front showing.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    walk: Walk,
}

impl ReviewSession {
    /// Begin reviewing `deck`. Empty decks cannot be reviewed.
    pub fn start(deck: &FlashcardDeck) -> Option<Self> {
        if !deck.is_reviewable() {
            return None;
        }
        Some(Self {
            walk: Walk {
                deck_id: deck.id.clone(),
                cards: deck.cards.clone(),
                current: 0,
            },
        })
    }

    pub fn card(&self) -> &Flashcard {
        self.walk.card()
    }

    /// `(current card number, total cards)`, 1-based.
    pub fn position(&self) -> (usize, usize) {
        self.walk.position()
    }

    pub fn progress(&self) -> f64 {
        self.walk.progress()
    }

    pub fn flip(self) -> RevealedCard {
        RevealedCard { walk: self.walk }
    }

    /// Skip the current card without rating it.
    pub fn advance(self) -> Advance {
        self.walk.advance()
    }
}

/// A review in progress with the current card's back showing.
#[derive(Debug, Clone)]
pub struct RevealedCard {
    walk: Walk,
}

impl RevealedCard {
    pub fn card(&self) -> &Flashcard {
        self.walk.card()
    }

    pub fn position(&self) -> (usize, usize) {
        self.walk.position()
    }

    pub fn progress(&self) -> f64 {
        self.walk.progress()
    }

    pub fn flip(self) -> ReviewSession {
        ReviewSession { walk: self.walk }
    }

    /// Record the rating on the session copy of the card, then move on.
    pub fn rate(mut self, rating: ReviewRating, now: DateTime<Utc>) -> Advance {
        let current = self.walk.current;
        let card = &mut self.walk.cards[current];
        card.level = rating.level();
        card.last_reviewed = Some(now);
        self.walk.advance()
    }

    pub fn advance(self) -> Advance {
        self.walk.advance()
    }
}
