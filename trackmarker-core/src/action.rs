//! Action and feedback types for the engine.
//!
//! Actions represent operator intents queued from the command thread and
//! executed on the clock-owning thread. They are fire-and-forget: an action
//! carries everything it needs, and failures surface as status events on the
//! executing side rather than propagating back to the sender.

use std::path::PathBuf;

/// A queued unit of work for the clock-owning thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Bind a new audio track, replacing any current one.
    LoadTrack(PathBuf),
    /// Create an empty channel; duplicates are rejected.
    AddChannel(String),
    /// Remove a channel; unknown names are rejected.
    RemoveChannel(String),
    /// Toggle recording: stop if playing, otherwise start on the named
    /// channel (created if absent).
    ToggleRecord(Option<String>),
    /// Record a marker at the session's current clock position.
    Mark,
    /// Pause playback without resetting the marker cursor.
    StopPlayback,
    /// Persist the marker store to the given path, or the last used one.
    Save(Option<PathBuf>),
    /// Replace the marker store wholesale from a file.
    LoadMarkers(PathBuf),
    /// Terminate the engine loop.
    Quit,
}

/// Feedback emitted by the engine while playback advances.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The playback clock passed a marker. Fired exactly once per marker
    /// per session, in ascending order.
    MarkerPassed {
        channel: String,
        index: usize,
        timestamp: f64,
    },
    /// The session ran out of audio; recording stopped on its own.
    PlaybackFinished { channel: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// A user-visible message produced while executing an action.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEvent {
    pub severity: Severity,
    pub message: String,
}

/// Result of applying one action.
#[derive(Debug, Clone, Default)]
pub struct DispatchResult {
    pub quit: bool,
    pub status: Vec<StatusEvent>,
}

impl DispatchResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_quit() -> Self {
        Self { quit: true, ..Self::default() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        let mut r = Self::default();
        r.push_info(message);
        r
    }

    pub fn error(message: impl Into<String>) -> Self {
        let mut r = Self::default();
        r.push_error(message);
        r
    }

    pub fn push_info(&mut self, message: impl Into<String>) {
        self.status.push(StatusEvent {
            severity: Severity::Info,
            message: message.into(),
        });
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.status.push(StatusEvent {
            severity: Severity::Error,
            message: message.into(),
        });
    }
}
