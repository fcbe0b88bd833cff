//! Notification collaborator for the focus timer.
//!
//! Starting the timer plays a short cue. Playback is best effort: a missing
//! audio device or a dead audio thread is logged and otherwise ignored.

pub mod chime;

use chime::StartChime;

use log::warn;
use rodio::{OutputStream, Sink};
use std::sync::{
    mpsc::{self, Sender},
    Mutex,
};
use std::thread;

pub trait CuePlayer: Send + Sync {
    fn play_start_cue(&self);
}

/// Used when the cue is disabled in settings, and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCue;

impl CuePlayer for SilentCue {
    fn play_start_cue(&self) {}
}

enum CueCommand {
    Start,
}

/// Plays the start chime on a dedicated thread that owns the non-Send
/// rodio output stream.
pub struct AudioCue {
    tx: Mutex<Option<Sender<CueCommand>>>,
}

impl AudioCue {
    pub fn new() -> Self {
        Self {
            tx: Mutex::new(None),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<CueCommand>, String> {
        let mut guard = self.tx.lock().map_err(|e| e.to_string())?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<CueCommand>();

        thread::Builder::new()
            .name("audio-cue".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<(), String> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| format!("Failed to create audio sink: {}", e))?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        CueCommand::Start => {
                            if let Err(err) = ensure_sink(&mut _stream, &mut sink) {
                                warn!("Start cue unavailable: {err}");
                                continue;
                            }
                            if let Some(ref s) = sink {
                                // Restart from the beginning if a cue is still playing.
                                s.clear();
                                s.append(StartChime::default());
                                s.play();
                            }
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        *guard = Some(tx.clone());
        Ok(tx)
    }
}

impl Default for AudioCue {
    fn default() -> Self {
        Self::new()
    }
}

impl CuePlayer for AudioCue {
    fn play_start_cue(&self) {
        let sent = self
            .ensure_thread()
            .and_then(|tx| tx.send(CueCommand::Start).map_err(|e| e.to_string()));
        if let Err(err) = sent {
            warn!("Failed to play start cue: {err}");
        }
    }
}
