use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, OptionalExtension, Row, Transaction};

use crate::{
    db::{
        connection::Database,
        helpers::{parse_datetime, parse_optional_datetime, to_u8},
    },
    models::{CardLevel, Flashcard, FlashcardDeck},
};

fn row_to_card(row: &Row) -> Result<(String, Flashcard)> {
    let level: i64 = row.get("level")?;
    let level = CardLevel::try_from(to_u8(level, "level")?).map_err(|err| anyhow!(err))?;
    let last_reviewed: Option<String> = row.get("last_reviewed")?;

    Ok((
        row.get("deck_id")?,
        Flashcard {
            id: row.get("id")?,
            front: row.get("front")?,
            back: row.get("back")?,
            level,
            last_reviewed: parse_optional_datetime(last_reviewed, "last_reviewed")?,
        },
    ))
}

fn row_to_deck(row: &Row) -> Result<FlashcardDeck> {
    let created_at: String = row.get("created_at")?;
    Ok(FlashcardDeck {
        id: row.get("id")?,
        subject: row.get("subject")?,
        topic: row.get("topic")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        cards: Vec::new(),
    })
}

fn insert_cards(tx: &Transaction<'_>, deck_id: &str, cards: &[Flashcard]) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO flashcards (id, deck_id, position, front, back, level, last_reviewed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for (position, card) in cards.iter().enumerate() {
        stmt.execute(params![
            card.id,
            deck_id,
            position as i64,
            card.front,
            card.back,
            card.level.as_u8(),
            card.last_reviewed.map(|dt| dt.to_rfc3339()),
        ])
        .with_context(|| format!("failed to insert flashcard {}", card.id))?;
    }
    Ok(())
}

impl Database {
    pub async fn insert_deck(&self, deck: &FlashcardDeck) -> Result<()> {
        let record = deck.clone();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO flashcard_decks (id, subject, topic, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.id,
                    record.subject,
                    record.topic,
                    record.created_at.to_rfc3339(),
                ],
            )
            .with_context(|| format!("failed to insert deck {}", record.id))?;
            insert_cards(&tx, &record.id, &record.cards)?;
            tx.commit().context("failed to commit deck insert")?;
            Ok(())
        })
        .await
    }

    /// Swap the stored cards of a deck for `cards`, keeping their order.
    pub async fn replace_deck_cards(&self, deck_id: &str, cards: &[Flashcard]) -> Result<bool> {
        let deck_id = deck_id.to_string();
        let cards = cards.to_vec();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let exists = tx
                .query_row(
                    "SELECT 1 FROM flashcard_decks WHERE id = ?1",
                    params![deck_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if !exists {
                return Ok(false);
            }

            tx.execute("DELETE FROM flashcards WHERE deck_id = ?1", params![deck_id])
                .context("failed to clear deck cards")?;
            insert_cards(&tx, &deck_id, &cards)?;
            tx.commit().context("failed to commit card update")?;
            Ok(true)
        })
        .await
    }

    pub async fn remove_deck(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.execute(move |conn| {
            // Cards go with the deck through ON DELETE CASCADE.
            let affected = conn
                .execute("DELETE FROM flashcard_decks WHERE id = ?1", params![id])
                .context("failed to delete deck")?;
            Ok(affected > 0)
        })
        .await
    }

    pub async fn get_decks(&self) -> Result<Vec<FlashcardDeck>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, subject, topic, created_at
                 FROM flashcard_decks
                 ORDER BY created_at DESC",
            )?;
            let mut rows = stmt.query([])?;
            let mut decks = Vec::new();
            while let Some(row) = rows.next()? {
                decks.push(row_to_deck(row)?);
            }

            let mut cards_by_deck: HashMap<String, Vec<Flashcard>> = HashMap::new();
            let mut stmt = conn.prepare(
                "SELECT id, deck_id, front, back, level, last_reviewed
                 FROM flashcards
                 ORDER BY deck_id, position ASC",
            )?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let (deck_id, card) = row_to_card(row)?;
                cards_by_deck.entry(deck_id).or_default().push(card);
            }

            for deck in &mut decks {
                deck.cards = cards_by_deck.remove(&deck.id).unwrap_or_default();
            }
            Ok(decks)
        })
        .await
    }
}
