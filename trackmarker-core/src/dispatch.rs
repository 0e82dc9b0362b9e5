//! Action application: the single mutation entry point on the clock-owning
//! thread.
//!
//! Every error is caught here and turned into a status event; no caller is
//! waiting on the other side of the queue, so nothing may propagate.

use std::path::PathBuf;

use crate::action::{Action, DispatchResult};
use crate::engine::EngineState;
use crate::playback::PlaybackError;
use crate::store::MarkerStore;

pub fn apply_action(action: Action, state: &mut EngineState) -> DispatchResult {
    match action {
        Action::LoadTrack(path) => load_track(path, state),
        Action::AddChannel(name) => match state.store.add_channel(&name) {
            Ok(()) => DispatchResult::info(format!("added channel '{}'", name)),
            Err(e) => DispatchResult::error(e.to_string()),
        },
        Action::RemoveChannel(name) => remove_channel(&name, state),
        Action::ToggleRecord(channel) => toggle_record(channel, state),
        Action::Mark => mark(state),
        Action::StopPlayback => stop_playback(state),
        Action::Save(path) => save(path, state),
        Action::LoadMarkers(path) => load_markers(path, state),
        Action::Quit => {
            if state.controller.is_playing() {
                state.controller.stop_playback();
            }
            DispatchResult::with_quit()
        }
    }
}

fn load_track(path: PathBuf, state: &mut EngineState) -> DispatchResult {
    match state.media.load(&path) {
        Ok(()) => {
            state.controller.bind_track();
            state.track_path = Some(path.clone());
            DispatchResult::info(format!("loaded track {}", path.display()))
        }
        Err(e) => {
            log::warn!(target: "dispatch", "track load failed for {}: {}", path.display(), e);
            DispatchResult::error(format!("cannot load {}: {}", path.display(), e))
        }
    }
}

fn remove_channel(name: &str, state: &mut EngineState) -> DispatchResult {
    let mut result = DispatchResult::none();
    // An active binding must not outlive its channel.
    if state.controller.active_channel() == Some(name) {
        state.controller.stop_playback();
        result.push_info(format!("recording stopped on '{}'", name));
    }
    match state.store.remove_channel(name) {
        Ok(()) => result.push_info(format!("removed channel '{}'", name)),
        Err(e) => result.push_error(e.to_string()),
    }
    result
}

fn toggle_record(channel: Option<String>, state: &mut EngineState) -> DispatchResult {
    if state.controller.is_playing() {
        // Toggle off, whatever argument came along. Position is retained.
        let name = state.controller.active_channel().unwrap_or("").to_string();
        state.controller.stop_playback();
        return DispatchResult::info(format!("recording stopped on '{}'", name));
    }

    let Some(name) = channel else {
        return DispatchResult::error(PlaybackError::NoChannelSpecified.to_string());
    };

    match state.media.start_session() {
        Ok(session) => {
            state.store.ensure_channel(&name);
            state.controller.start_recording(name.clone(), session);
            DispatchResult::info(format!("recording on '{}'", name))
        }
        Err(e) => DispatchResult::error(e.to_string()),
    }
}

fn mark(state: &mut EngineState) -> DispatchResult {
    match state.controller.mark_position() {
        Ok((channel, timestamp)) => match state.store.insert_marker(&channel, timestamp) {
            Ok(()) => DispatchResult::info(format!("marker at {:.3}s in '{}'", timestamp, channel)),
            Err(e) => DispatchResult::error(e.to_string()),
        },
        Err(e) => DispatchResult::error(e.to_string()),
    }
}

fn stop_playback(state: &mut EngineState) -> DispatchResult {
    if state.controller.is_playing() {
        let name = state.controller.active_channel().unwrap_or("").to_string();
        state.controller.stop_playback();
        DispatchResult::info(format!("recording stopped on '{}'", name))
    } else {
        DispatchResult::info("nothing playing")
    }
}

fn save(path: Option<PathBuf>, state: &mut EngineState) -> DispatchResult {
    let Some(path) = path.or_else(|| state.marker_path.clone()) else {
        return DispatchResult::error("no marker file path set");
    };
    match state.store.save(&path) {
        Ok(()) => {
            state.marker_path = Some(path.clone());
            DispatchResult::info(format!(
                "saved {} channel(s) to {}",
                state.store.len(),
                path.display()
            ))
        }
        Err(e) => DispatchResult::error(format!("cannot save {}: {}", path.display(), e)),
    }
}

fn load_markers(path: PathBuf, state: &mut EngineState) -> DispatchResult {
    match MarkerStore::load(&path) {
        Ok(store) => {
            let mut result = DispatchResult::none();
            // The cursor indexes the old sequence; never let a session keep
            // running against a wholesale-replaced store.
            if state.controller.is_playing() {
                state.controller.stop_playback();
                result.push_info("recording stopped");
            }
            state.store = store;
            state.marker_path = Some(path.clone());
            result.push_info(format!(
                "loaded {} channel(s) from {}",
                state.store.len(),
                path.display()
            ));
            result
        }
        Err(e) => DispatchResult::error(format!("cannot load {}: {}", path.display(), e)),
    }
}
