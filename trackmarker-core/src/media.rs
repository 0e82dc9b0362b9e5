//! Seam to the external media-playback library.
//!
//! The engine only needs a clock it can read and a transport it can pause;
//! decoding and audio output live behind these traits so the binary can
//! supply a real backend and tests can script one.

use std::io;
use std::path::Path;

/// One playback of the bound track, created per record transition.
pub trait PlaybackSession {
    /// Current clock position in seconds from track start.
    fn position(&self) -> f64;

    /// Pause output. Position is retained until the session is replaced.
    fn pause(&mut self);

    /// True once the track has played out.
    fn is_finished(&self) -> bool;
}

/// Owns the decoded track source and spawns sessions from it.
pub trait MediaBackend {
    /// Decode and bind a track file, replacing any current one. On failure
    /// the previously bound track (if any) is kept.
    fn load(&mut self, path: &Path) -> Result<(), TrackError>;

    /// Start a fresh session playing the bound track from its beginning.
    fn start_session(&mut self) -> Result<Box<dyn PlaybackSession>, TrackError>;
}

#[derive(Debug)]
pub enum TrackError {
    Io(io::Error),
    /// No track has been loaded yet.
    NoTrack,
    /// Decoder or output device failure, in the backend's own words.
    Backend(String),
}

impl From<io::Error> for TrackError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl std::fmt::Display for TrackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::NoTrack => write!(f, "no track loaded"),
            Self::Backend(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TrackError {}
