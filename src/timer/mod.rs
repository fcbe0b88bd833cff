pub mod controller;
pub mod state;

pub use controller::{TimerController, TimerEvent, TimerSnapshot};
pub use state::{clamp_minutes, parse_minutes, TickOutcome, TimerMode, TimerState, TimerStatus};
