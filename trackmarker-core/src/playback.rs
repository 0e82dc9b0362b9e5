//! Playback state machine and the marker catch-up loop.

use std::sync::mpsc::Sender;

use crate::action::EngineEvent;
use crate::media::PlaybackSession;
use crate::store::MarkerStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing { channel: String },
}

/// Wraps one external playback session and walks the active channel's
/// timestamp sequence as the clock advances.
///
/// The cursor indexes the next not-yet-fired marker. It only moves forward
/// while a session is live and is reset exactly when a new session is bound
/// by `start_recording`.
pub struct PlaybackController {
    state: PlaybackState,
    session: Option<Box<dyn PlaybackSession>>,
    cursor: usize,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Stopped,
            session: None,
            cursor: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing { .. })
    }

    pub fn active_channel(&self) -> Option<&str> {
        match &self.state {
            PlaybackState::Playing { channel } => Some(channel),
            PlaybackState::Stopped => None,
        }
    }

    /// Clock position of the current session, if one exists (it may be
    /// paused; the position is retained until the session is replaced).
    pub fn position(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.position())
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// A new track was bound: discard the session and reset the cursor.
    pub fn bind_track(&mut self) {
        self.session = None;
        self.cursor = 0;
        self.state = PlaybackState::Stopped;
    }

    /// Bind `session` to `channel` and enter `Playing`. The cursor reset
    /// here is the only way it ever moves backwards.
    pub fn start_recording(&mut self, channel: String, session: Box<dyn PlaybackSession>) {
        self.session = Some(session);
        self.cursor = 0;
        self.state = PlaybackState::Playing { channel };
    }

    /// Pause the session, keeping its position and the cursor.
    pub fn stop_playback(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.pause();
        }
        self.state = PlaybackState::Stopped;
    }

    /// Read the active channel and clock for a marker insert.
    pub fn mark_position(&self) -> Result<(String, f64), PlaybackError> {
        match (&self.state, self.session.as_ref()) {
            (PlaybackState::Playing { channel }, Some(session)) => {
                Ok((channel.clone(), session.position().max(0.0)))
            }
            _ => Err(PlaybackError::NotPlaying),
        }
    }

    /// One synchronization step. Fires an event for every marker whose
    /// timestamp the clock has passed, ascending, each exactly once. The
    /// loop (rather than a single comparison) means markers bunched inside
    /// one tick interval all fire within that call instead of bleeding into
    /// later ticks or being skipped.
    pub fn tick(&mut self, store: &MarkerStore, events: &Sender<EngineEvent>) {
        let channel = match &self.state {
            PlaybackState::Playing { channel } => channel.clone(),
            PlaybackState::Stopped => return,
        };
        let (clock, finished) = match self.session.as_ref() {
            Some(session) => (session.position(), session.is_finished()),
            None => return,
        };

        if let Some(seq) = store.markers(&channel) {
            while self.cursor < seq.len() && clock >= seq[self.cursor] {
                let _ = events.send(EngineEvent::MarkerPassed {
                    channel: channel.clone(),
                    index: self.cursor,
                    timestamp: seq[self.cursor],
                });
                self.cursor += 1;
            }
        }

        if finished {
            self.stop_playback();
            let _ = events.send(EngineEvent::PlaybackFinished { channel });
        }
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// `rec` needs a channel name when nothing is playing.
    NoChannelSpecified,
    NotPlaying,
}

impl std::fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoChannelSpecified => write!(f, "no channel specified"),
            Self::NotPlaying => write!(f, "not playing"),
        }
    }
}

impl std::error::Error for PlaybackError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::mpsc;

    /// Scripted session: the test owns the clock.
    struct ManualSession {
        pos: Rc<Cell<f64>>,
        finished: Rc<Cell<bool>>,
        paused: Rc<Cell<bool>>,
    }

    impl PlaybackSession for ManualSession {
        fn position(&self) -> f64 {
            self.pos.get()
        }

        fn pause(&mut self) {
            self.paused.set(true);
        }

        fn is_finished(&self) -> bool {
            self.finished.get()
        }
    }

    struct Clock {
        pos: Rc<Cell<f64>>,
        finished: Rc<Cell<bool>>,
        paused: Rc<Cell<bool>>,
    }

    fn manual_session() -> (Clock, Box<dyn PlaybackSession>) {
        let pos = Rc::new(Cell::new(0.0));
        let finished = Rc::new(Cell::new(false));
        let paused = Rc::new(Cell::new(false));
        let session = ManualSession {
            pos: Rc::clone(&pos),
            finished: Rc::clone(&finished),
            paused: Rc::clone(&paused),
        };
        (Clock { pos, finished, paused }, Box::new(session))
    }

    fn beat_store() -> MarkerStore {
        let mut store = MarkerStore::new();
        store.add_channel("beat").unwrap();
        for ts in [1.0, 2.0, 5.0] {
            store.insert_marker("beat", ts).unwrap();
        }
        store
    }

    #[test]
    fn one_tick_catches_up_on_every_passed_marker() {
        let store = beat_store();
        let mut controller = PlaybackController::new();
        let (clock, session) = manual_session();
        controller.start_recording("beat".to_string(), session);

        let (tx, rx) = mpsc::channel();
        clock.pos.set(3.0);
        controller.tick(&store, &tx);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                EngineEvent::MarkerPassed { channel: "beat".into(), index: 0, timestamp: 1.0 },
                EngineEvent::MarkerPassed { channel: "beat".into(), index: 1, timestamp: 2.0 },
            ]
        );
        assert_eq!(controller.cursor(), 2);
    }

    #[test]
    fn a_marker_never_fires_twice_in_one_session() {
        let store = beat_store();
        let mut controller = PlaybackController::new();
        let (clock, session) = manual_session();
        controller.start_recording("beat".to_string(), session);
        let (tx, rx) = mpsc::channel();

        clock.pos.set(2.5);
        controller.tick(&store, &tx);
        assert_eq!(rx.try_iter().count(), 2);

        // Same position again, then slightly past: nothing refires.
        controller.tick(&store, &tx);
        clock.pos.set(2.6);
        controller.tick(&store, &tx);
        assert_eq!(rx.try_iter().count(), 0);
        assert_eq!(controller.cursor(), 2);

        clock.pos.set(5.0);
        controller.tick(&store, &tx);
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![EngineEvent::MarkerPassed { channel: "beat".into(), index: 2, timestamp: 5.0 }]
        );
    }

    #[test]
    fn tick_is_inert_while_stopped() {
        let store = beat_store();
        let mut controller = PlaybackController::new();
        let (tx, rx) = mpsc::channel();
        controller.tick(&store, &tx);
        assert_eq!(rx.try_iter().count(), 0);
        assert_eq!(controller.cursor(), 0);
    }

    #[test]
    fn stop_pauses_but_keeps_cursor_and_position() {
        let store = beat_store();
        let mut controller = PlaybackController::new();
        let (clock, session) = manual_session();
        controller.start_recording("beat".to_string(), session);
        let (tx, _rx) = mpsc::channel();

        clock.pos.set(1.5);
        controller.tick(&store, &tx);
        assert_eq!(controller.cursor(), 1);

        controller.stop_playback();
        assert!(!controller.is_playing());
        assert!(clock.paused.get());
        assert_eq!(controller.cursor(), 1);
        assert_eq!(controller.position(), Some(1.5));
    }

    #[test]
    fn starting_a_new_recording_resets_the_cursor() {
        let store = beat_store();
        let mut controller = PlaybackController::new();
        let (clock, session) = manual_session();
        controller.start_recording("beat".to_string(), session);
        let (tx, _rx) = mpsc::channel();

        clock.pos.set(10.0);
        controller.tick(&store, &tx);
        assert_eq!(controller.cursor(), 3);

        let (_clock2, session2) = manual_session();
        controller.start_recording("beat".to_string(), session2);
        assert_eq!(controller.cursor(), 0);
        assert_eq!(controller.active_channel(), Some("beat"));
    }

    #[test]
    fn binding_a_track_discards_the_session() {
        let mut controller = PlaybackController::new();
        let (_clock, session) = manual_session();
        controller.start_recording("beat".to_string(), session);

        controller.bind_track();
        assert!(!controller.is_playing());
        assert_eq!(controller.position(), None);
        assert_eq!(controller.cursor(), 0);
    }

    #[test]
    fn mark_position_requires_playing() {
        let mut controller = PlaybackController::new();
        assert_eq!(controller.mark_position(), Err(PlaybackError::NotPlaying));

        let (clock, session) = manual_session();
        controller.start_recording("jump".to_string(), session);
        clock.pos.set(2.5);
        assert_eq!(controller.mark_position(), Ok(("jump".to_string(), 2.5)));
    }

    #[test]
    fn a_finished_session_stops_recording() {
        let store = beat_store();
        let mut controller = PlaybackController::new();
        let (clock, session) = manual_session();
        controller.start_recording("beat".to_string(), session);
        let (tx, rx) = mpsc::channel();

        clock.pos.set(1.2);
        clock.finished.set(true);
        controller.tick(&store, &tx);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                EngineEvent::MarkerPassed { channel: "beat".into(), index: 0, timestamp: 1.0 },
                EngineEvent::PlaybackFinished { channel: "beat".into() },
            ]
        );
        assert!(!controller.is_playing());
        assert!(clock.paused.get());
        assert_eq!(controller.cursor(), 1);
    }

    #[test]
    fn tick_survives_a_vanished_channel() {
        let mut store = beat_store();
        let mut controller = PlaybackController::new();
        let (clock, session) = manual_session();
        controller.start_recording("beat".to_string(), session);
        let (tx, rx) = mpsc::channel();

        store.remove_channel("beat").unwrap();
        clock.pos.set(3.0);
        controller.tick(&store, &tx);
        assert_eq!(rx.try_iter().count(), 0);
        assert_eq!(controller.cursor(), 0);
    }
}
