//! # trackmarker-core
//!
//! Engine library for the trackmarker tool. Load a music track, record
//! timestamp markers into named channels while it plays, and export the
//! channel-to-timestamps mapping as JSON for downstream software.
//!
//! The engine is split along its two threads:
//!
//! - The clock-owning thread runs [`engine::Engine::poll`]: it drains the
//!   action queue, advances marker playback, and publishes a display
//!   snapshot. It is the sole writer of the marker store and playback state.
//! - The command thread parses operator input and only ever enqueues
//!   [`action::Action`]s via [`queue::ActionSender`]; it reads state back
//!   through the lock-free [`view::SharedView`].
//!
//! Audio decoding and output stay behind the [`media`] traits; the binary
//! supplies an implementation.

pub mod action;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod media;
pub mod playback;
pub mod queue;
pub mod store;
pub mod view;

pub use action::{Action, DispatchResult, EngineEvent, Severity, StatusEvent};
pub use engine::{Engine, EngineState, PollReport};
pub use media::{MediaBackend, PlaybackSession, TrackError};
pub use playback::{PlaybackController, PlaybackError};
pub use queue::{action_queue, ActionQueue, ActionSender};
pub use store::{MarkerStore, PersistenceError, StoreError};
pub use view::{EngineView, SharedView, ViewPlayback};
