//! Study session engine: focus timer, flashcard review, progress analytics
//! and the record assembly that ties a timed session to a saved entry.

pub mod analytics;
pub mod audio;
pub mod cli;
pub mod db;
pub mod desk;
pub mod entries;
pub mod models;
pub mod planner;
pub mod review;
pub mod settings;
pub mod store;
pub mod timer;
mod utils;

pub use desk::StudyDesk;
pub use store::StudyStore;
