pub mod session;

pub use session::{Advance, RevealedCard, ReviewOutcome, ReviewRating, ReviewSession};
