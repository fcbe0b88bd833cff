//! Flashcard deck data models.
//!
//! A deck's card order and card faces are fixed once the deck is built.
//! Review only ever changes `level` and `last_reviewed`, and only through a
//! committed review session.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Last self-rated difficulty of a card. Stored as the integers 0, 1, 3, 5.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum CardLevel {
    #[default]
    Unset,
    Hard,
    Medium,
    Easy,
}

impl CardLevel {
    pub fn as_u8(&self) -> u8 {
        match self {
            CardLevel::Unset => 0,
            CardLevel::Hard => 1,
            CardLevel::Medium => 3,
            CardLevel::Easy => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CardLevel::Unset => "Unrated",
            CardLevel::Hard => "Hard",
            CardLevel::Medium => "Medium",
            CardLevel::Easy => "Easy",
        }
    }
}

impl From<CardLevel> for u8 {
    fn from(level: CardLevel) -> Self {
        level.as_u8()
    }
}

impl TryFrom<u8> for CardLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CardLevel::Unset),
            1 => Ok(CardLevel::Hard),
            3 => Ok(CardLevel::Medium),
            5 => Ok(CardLevel::Easy),
            other => Err(format!("invalid card level {other}; expected 0, 1, 3 or 5")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub level: CardLevel,
    pub last_reviewed: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardDeck {
    pub id: String,
    pub subject: String,
    /// Topic label shown under the subject.
    pub topic: String,
    pub created_at: DateTime<Utc>,
    pub cards: Vec<Flashcard>,
}

impl FlashcardDeck {
    pub fn is_reviewable(&self) -> bool {
        !self.cards.is_empty()
    }
}

/// Front/back pair typed into the deck builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDraft {
    pub front: String,
    pub back: String,
}

/// Input data for creating a deck.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckDraft {
    pub subject: String,
    pub topic: String,
    pub cards: Vec<CardDraft>,
}

impl DeckDraft {
    /// Validate the draft and assign ids. New cards start unrated.
    pub fn build(self, now: DateTime<Utc>) -> Result<FlashcardDeck> {
        if self.subject.trim().is_empty() {
            bail!("deck subject is required");
        }
        if self.topic.trim().is_empty() {
            bail!("deck topic is required");
        }
        if self.cards.is_empty() {
            bail!("a deck needs at least one card");
        }

        let cards = self
            .cards
            .into_iter()
            .map(|draft| Flashcard {
                id: Uuid::new_v4().to_string(),
                front: draft.front,
                back: draft.back,
                level: CardLevel::Unset,
                last_reviewed: None,
            })
            .collect();

        Ok(FlashcardDeck {
            id: Uuid::new_v4().to_string(),
            subject: self.subject,
            topic: self.topic,
            created_at: now,
            cards,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(cards: usize) -> DeckDraft {
        DeckDraft {
            subject: "Constitutional Law".into(),
            topic: "Article 5".into(),
            cards: (0..cards)
                .map(|i| CardDraft {
                    front: format!("q{i}"),
                    back: format!("a{i}"),
                })
                .collect(),
        }
    }

    #[test]
    fn build_keeps_card_order_and_starts_unrated() {
        let now = Utc::now();
        let deck = draft(3).build(now).unwrap();

        assert_eq!(deck.created_at, now);
        assert_eq!(deck.cards.len(), 3);
        let fronts: Vec<_> = deck.cards.iter().map(|c| c.front.as_str()).collect();
        assert_eq!(fronts, ["q0", "q1", "q2"]);
        assert!(deck
            .cards
            .iter()
            .all(|c| c.level == CardLevel::Unset && c.last_reviewed.is_none()));
        assert_ne!(deck.cards[0].id, deck.cards[1].id);
    }

    #[test]
    fn build_rejects_incomplete_drafts() {
        assert!(draft(0).build(Utc::now()).is_err());

        let mut missing_subject = draft(1);
        missing_subject.subject = "  ".into();
        assert!(missing_subject.build(Utc::now()).is_err());

        let mut missing_topic = draft(1);
        missing_topic.topic.clear();
        assert!(missing_topic.build(Utc::now()).is_err());
    }

    #[test]
    fn level_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&CardLevel::Medium).unwrap(), "3");
        let level: CardLevel = serde_json::from_str("5").unwrap();
        assert_eq!(level, CardLevel::Easy);
        assert!(serde_json::from_str::<CardLevel>("2").is_err());
    }
}
