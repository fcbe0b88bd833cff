use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{audio::CuePlayer, models::StudyTime, settings::TimerSettings};

use super::{TickOutcome, TimerMode, TimerState};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub countdown: String,
    pub elapsed: StudyTime,
}

impl From<&TimerState> for TimerSnapshot {
    fn from(state: &TimerState) -> Self {
        Self {
            countdown: state.countdown_label(),
            elapsed: state.elapsed_breakdown(),
            state: state.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum TimerEvent {
    StateChanged(TimerSnapshot),
    Heartbeat(TimerSnapshot),
    IntervalCompleted {
        finished: TimerMode,
        snapshot: TimerSnapshot,
    },
}

struct Ticker {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Drives a `TimerState` from a one-second clock while it is running.
///
/// One controller lives for one entry form. Every tick runs under the state
/// lock, so ticks never overlap with each other or with user actions.
#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<TimerState>>,
    cue: Arc<dyn CuePlayer>,
    events: broadcast::Sender<TimerEvent>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    tick_interval: Duration,
    heartbeat_every_ticks: u32,
}

impl TimerController {
    pub fn new(initial: TimerState, cue: Arc<dyn CuePlayer>) -> Self {
        let debug_mode = std::env::var("STUDYDESK_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            state: Arc::new(Mutex::new(initial)),
            cue,
            events,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
            heartbeat_every_ticks: if debug_mode { 1 } else { 10 },
        }
    }

    /// A fresh timer using the saved durations. `pomodoros` restores the count
    /// of a session being resumed; pass 0 for a new one.
    pub fn from_settings(
        settings: &TimerSettings,
        pomodoros: u32,
        cue: Arc<dyn CuePlayer>,
    ) -> Self {
        Self::new(
            TimerState::new(settings.work_minutes, settings.break_minutes).with_pomodoros(pomodoros),
            cue,
        )
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::from(&*self.state.lock().await)
    }

    pub async fn configure(&self, work_minutes: u32, break_minutes: u32) -> TimerSnapshot {
        let mut guard = self.state.lock().await;
        guard.configure(work_minutes, break_minutes);
        self.emit_state_changed(&guard)
    }

    // Transitions that start or stop the clock lock `ticker` before `state`
    // and hold both, so the status and the ticker always change together.
    // `tick_loop` only ever takes `state`.

    pub async fn start(&self) -> TimerSnapshot {
        let mut ticker = self.ticker.lock().await;
        let mut guard = self.state.lock().await;
        self.start_locked(&mut ticker, &mut guard);
        self.emit_state_changed(&guard)
    }

    pub async fn pause(&self) -> TimerSnapshot {
        let mut ticker = self.ticker.lock().await;
        let mut guard = self.state.lock().await;
        guard.pause();
        cancel_ticker(&mut ticker);
        self.emit_state_changed(&guard)
    }

    pub async fn toggle(&self) -> TimerSnapshot {
        let mut ticker = self.ticker.lock().await;
        let mut guard = self.state.lock().await;
        if guard.is_active() {
            guard.pause();
            cancel_ticker(&mut ticker);
        } else {
            self.start_locked(&mut ticker, &mut guard);
        }
        self.emit_state_changed(&guard)
    }

    pub async fn reset(&self) -> TimerSnapshot {
        let mut guard = self.state.lock().await;
        guard.reset();
        self.emit_state_changed(&guard)
    }

    pub async fn switch_mode(&self, mode: TimerMode) -> TimerSnapshot {
        let mut ticker = self.ticker.lock().await;
        let mut guard = self.state.lock().await;
        guard.switch_mode(mode);
        cancel_ticker(&mut ticker);
        self.emit_state_changed(&guard)
    }

    /// Stop the clock and hand back the final state for the entry assembler.
    pub async fn finish(&self) -> TimerState {
        let final_state = {
            let mut ticker = self.ticker.lock().await;
            let mut guard = self.state.lock().await;
            guard.pause();
            cancel_ticker(&mut ticker);
            guard.clone()
        };
        log_info!(
            "Focus timer finished with {} and {} pomodoros",
            final_state.elapsed_breakdown(),
            final_state.pomodoros_completed
        );
        final_state
    }

    fn start_locked(&self, ticker: &mut Option<Ticker>, state: &mut TimerState) {
        if !state.start() {
            return;
        }
        self.cue.play_start_cue();

        cancel_ticker(ticker);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(tick_loop(
            self.state.clone(),
            self.events.clone(),
            self.tick_interval,
            self.heartbeat_every_ticks,
            cancel.clone(),
        ));
        *ticker = Some(Ticker { handle, cancel });

        log_info!("Focus timer started");
    }

    fn emit_state_changed(&self, state: &TimerState) -> TimerSnapshot {
        let snapshot = TimerSnapshot::from(state);
        // No subscribers is fine; the form may not be listening.
        let _ = self.events.send(TimerEvent::StateChanged(snapshot.clone()));
        snapshot
    }
}

fn cancel_ticker(ticker: &mut Option<Ticker>) {
    if let Some(old) = ticker.take() {
        old.cancel.cancel();
        old.handle.abort();
    }
}

async fn tick_loop(
    state: Arc<Mutex<TimerState>>,
    events: broadcast::Sender<TimerEvent>,
    tick_interval: Duration,
    heartbeat_every: u32,
    cancel: CancellationToken,
) {
    // Late ticks are delayed rather than replayed in a burst: each tick is
    // exactly one second of countdown.
    let mut interval = time::interval_at(Instant::now() + tick_interval, tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks: u32 = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let (outcome, snapshot) = {
                    let mut guard = state.lock().await;
                    let outcome = guard.tick();
                    (outcome, TimerSnapshot::from(&*guard))
                };

                match outcome {
                    TickOutcome::Ignored => {
                        log_warn!("tick arrived for a stopped timer; ticker exiting");
                        break;
                    }
                    TickOutcome::Counted => {
                        ticks = ticks.wrapping_add(1);
                        if ticks % heartbeat_every == 0 {
                            log_debug!(
                                "[{}] {} left, {} focused",
                                snapshot.state.mode.as_str(),
                                snapshot.countdown,
                                snapshot.elapsed
                            );
                            let _ = events.send(TimerEvent::Heartbeat(snapshot));
                        }
                    }
                    TickOutcome::IntervalCompleted { finished } => {
                        log_info!(
                            "{} interval complete; {} pomodoros so far",
                            finished.as_str(),
                            snapshot.state.pomodoros_completed
                        );
                        let _ = events.send(TimerEvent::IntervalCompleted {
                            finished,
                            snapshot: snapshot.clone(),
                        });
                        let _ = events.send(TimerEvent::StateChanged(snapshot));
                        break;
                    }
                }
            }
            _ = cancel.cancelled() => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingCue(AtomicUsize);

    impl CuePlayer for CountingCue {
        fn play_start_cue(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn controller(work: u32, brk: u32) -> (TimerController, Arc<CountingCue>) {
        let cue = Arc::new(CountingCue::default());
        let controller = TimerController::new(TimerState::new(work, brk), cue.clone());
        (controller, cue)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second_while_running() {
        let (timer, cue) = controller(25, 5);

        timer.start().await;
        time::sleep(Duration::from_millis(3500)).await;

        let snapshot = timer.snapshot().await;
        assert_eq!(snapshot.state.total_secs_elapsed, 3);
        assert_eq!(snapshot.state.time_left_secs, 25 * 60 - 3);
        assert_eq!(snapshot.state.status, TimerStatus::Running);
        assert_eq!(cue.0.load(Ordering::SeqCst), 1);

        timer.pause().await;
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.snapshot().await.state.total_secs_elapsed, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn starting_twice_does_not_double_count() {
        let (timer, cue) = controller(25, 5);

        timer.start().await;
        timer.start().await;
        time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(timer.snapshot().await.state.total_secs_elapsed, 2);
        assert_eq!(cue.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn completed_work_interval_stops_in_break_mode() {
        let (timer, _cue) = controller(1, 2);
        let mut events = timer.subscribe();

        timer.start().await;
        time::sleep(Duration::from_millis(65_500)).await;

        let snapshot = timer.snapshot().await;
        assert_eq!(snapshot.state.mode, TimerMode::Break);
        assert_eq!(snapshot.state.status, TimerStatus::Idle);
        assert_eq!(snapshot.state.pomodoros_completed, 1);
        assert_eq!(snapshot.state.time_left_secs, 120);
        assert_eq!(snapshot.state.total_secs_elapsed, 60);

        let mut completions = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let TimerEvent::IntervalCompleted { finished, .. } = event {
                completions.push(finished);
            }
        }
        assert_eq!(completions, vec![TimerMode::Work]);
    }

    #[tokio::test(start_paused = true)]
    async fn resumed_session_adds_to_restored_pomodoros() {
        let settings = TimerSettings {
            work_minutes: 1,
            break_minutes: 1,
        };
        let timer = TimerController::from_settings(&settings, 2, Arc::new(CountingCue::default()));

        timer.start().await;
        time::sleep(Duration::from_millis(60_500)).await;

        let final_state = timer.finish().await;
        assert_eq!(final_state.pomodoros_completed, 3);
        assert_eq!(final_state.mode, TimerMode::Break);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_start_and_pause_never_strand_a_running_timer() {
        for _ in 0..200 {
            let (timer, _cue) = controller(25, 5);
            timer.start().await;

            let pauser = tokio::spawn({
                let timer = timer.clone();
                async move {
                    timer.pause().await;
                }
            });
            let starter = tokio::spawn({
                let timer = timer.clone();
                async move {
                    timer.start().await;
                }
            });
            pauser.await.unwrap();
            starter.await.unwrap();

            let ticker = timer.ticker.lock().await;
            let state = timer.state.lock().await;
            let clock_live = ticker
                .as_ref()
                .map_or(false, |t| !t.cancel.is_cancelled());
            assert_eq!(state.is_active(), clock_live);
            drop(state);
            drop(ticker);

            timer.finish().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn finish_stops_the_clock_and_returns_totals() {
        let (timer, _cue) = controller(25, 5);

        timer.start().await;
        time::sleep(Duration::from_millis(4500)).await;
        let final_state = timer.finish().await;
        time::sleep(Duration::from_secs(3)).await;

        assert_eq!(final_state.total_secs_elapsed, 4);
        assert!(!final_state.is_active());
        assert_eq!(timer.snapshot().await.state.total_secs_elapsed, 4);
    }
}
