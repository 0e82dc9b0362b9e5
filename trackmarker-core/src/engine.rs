//! The synchronization driver: owns all engine state and runs on the
//! clock-owning thread.

use std::path::PathBuf;
use std::sync::mpsc::Sender;

use crate::action::{Action, EngineEvent, StatusEvent};
use crate::dispatch;
use crate::media::MediaBackend;
use crate::playback::PlaybackController;
use crate::queue::ActionQueue;
use crate::store::MarkerStore;
use crate::view::{EngineView, SharedView, ViewPlayback};

/// Everything the clock-owning thread is the sole writer of.
pub struct EngineState {
    pub store: MarkerStore,
    pub controller: PlaybackController,
    pub media: Box<dyn MediaBackend>,
    /// Path of the currently bound track, if any.
    pub track_path: Option<PathBuf>,
    /// Last path used for saving or loading markers.
    pub marker_path: Option<PathBuf>,
}

impl EngineState {
    pub fn new(media: Box<dyn MediaBackend>) -> Self {
        Self {
            store: MarkerStore::new(),
            controller: PlaybackController::new(),
            media,
            track_path: None,
            marker_path: None,
        }
    }
}

/// What one poll produced, for the driving loop to surface.
#[derive(Debug, Default)]
pub struct PollReport {
    pub quit: bool,
    pub status: Vec<StatusEvent>,
}

/// Periodic synchronization driver. The owning loop calls [`Engine::poll`]
/// once per tick; everything else happens through the action queue.
pub struct Engine {
    state: EngineState,
    queue: ActionQueue<Action>,
    events_tx: Sender<EngineEvent>,
    view: SharedView<EngineView>,
}

impl Engine {
    pub fn new(
        media: Box<dyn MediaBackend>,
        queue: ActionQueue<Action>,
        events_tx: Sender<EngineEvent>,
        view: SharedView<EngineView>,
    ) -> Self {
        let engine = Self {
            state: EngineState::new(media),
            queue,
            events_tx,
            view,
        };
        engine.view.publish(Self::snapshot(&engine.state));
        engine
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EngineState {
        &mut self.state
    }

    /// One tick: drain queued actions, then advance marker detection, then
    /// publish the display snapshot. Draining first means a track or channel
    /// bound by this tick's actions is never scanned against stale state.
    pub fn poll(&mut self) -> PollReport {
        let mut report = PollReport::default();

        let state = &mut self.state;
        self.queue.drain_once(|action| {
            let result = dispatch::apply_action(action, state);
            report.quit |= result.quit;
            report.status.extend(result.status);
        });

        state.controller.tick(&state.store, &self.events_tx);
        self.view.publish(Self::snapshot(state));
        report
    }

    fn snapshot(state: &EngineState) -> EngineView {
        let playback = match state.controller.active_channel() {
            Some(channel) => ViewPlayback::Playing {
                channel: channel.to_string(),
                position: state.controller.position().unwrap_or(0.0),
            },
            None => ViewPlayback::Stopped {
                position: state.controller.position(),
            },
        };
        EngineView {
            track: state.track_path.clone(),
            marker_file: state.marker_path.clone(),
            store: state.store.clone(),
            playback,
        }
    }
}
