mod active_studies;
mod decks;
mod entries;
