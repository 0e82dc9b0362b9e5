//! Lock-free snapshot sharing from the clock-owning thread to the command
//! thread.
//!
//! Triple buffering over three slots: the writer always owns a free back
//! slot and publishes by rotating it into the middle; the reader swaps the
//! middle into its front slot only when something new was published. Neither
//! side ever blocks, and a read never observes a half-written snapshot;
//! at worst it observes a stale one, the accepted cost of keeping display
//! reads off the action queue.

use std::cell::UnsafeCell;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::store::MarkerStore;

/// What the command thread gets to see: a full display snapshot, published
/// once per poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineView {
    pub track: Option<PathBuf>,
    pub marker_file: Option<PathBuf>,
    pub store: MarkerStore,
    pub playback: ViewPlayback,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewPlayback {
    /// Not recording. A paused session may still report its position.
    Stopped { position: Option<f64> },
    Playing { channel: String, position: f64 },
}

impl Default for ViewPlayback {
    fn default() -> Self {
        Self::Stopped { position: None }
    }
}

// One atomic byte encodes which physical slot plays which role, two bits
// per role, plus a bit flagging unconsumed data in the middle slot.
const FRONT: u8 = 0;
const MIDDLE: u8 = 2;
const BACK: u8 = 4;
const ROLE_MASK: u8 = 0b11;
const FRESH: u8 = 0x80;

struct Slots<T> {
    cells: [UnsafeCell<T>; 3],
    state: AtomicU8,
}

// The role rotation guarantees the back slot is only touched by the writer
// and the front slot only by the reader.
unsafe impl<T: Send> Send for Slots<T> {}
unsafe impl<T: Send> Sync for Slots<T> {}

/// Clonable handle to a triple-buffered snapshot. One thread publishes, one
/// thread reads; the discipline is the caller's (here: engine writes,
/// command thread reads).
pub struct SharedView<T> {
    slots: Arc<Slots<T>>,
}

impl<T> Clone for SharedView<T> {
    fn clone(&self) -> Self {
        Self { slots: Arc::clone(&self.slots) }
    }
}

fn role(state: u8, shift: u8) -> u8 {
    (state >> shift) & ROLE_MASK
}

impl<T: Clone + Default> SharedView<T> {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Slots {
                cells: [
                    UnsafeCell::new(T::default()),
                    UnsafeCell::new(T::default()),
                    UnsafeCell::new(T::default()),
                ],
                // front = slot 0, middle = slot 1, back = slot 2, nothing fresh
                state: AtomicU8::new((2 << BACK) | (1 << MIDDLE)),
            }),
        }
    }

    /// Publish a new snapshot (writer side).
    pub fn publish(&self, value: T) {
        let state = self.slots.state.load(Ordering::Acquire);
        let back = role(state, BACK) as usize;
        // Safety: the back slot belongs exclusively to the (single) writer
        // until the rotation below hands it over.
        unsafe {
            *self.slots.cells[back].get() = value;
        }

        loop {
            let state = self.slots.state.load(Ordering::Acquire);
            let next = (role(state, MIDDLE) << BACK)
                | (role(state, BACK) << MIDDLE)
                | (role(state, FRONT) << FRONT)
                | FRESH;
            if self
                .slots
                .state
                .compare_exchange_weak(state, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                break;
            }
        }
    }

    /// Read the latest published snapshot (reader side). Repeats the last
    /// value when nothing new arrived.
    pub fn read(&self) -> T {
        loop {
            let state = self.slots.state.load(Ordering::Acquire);
            if state & FRESH == 0 {
                break;
            }
            // Swap front and middle, clearing the fresh flag.
            let next = (role(state, BACK) << BACK)
                | (role(state, FRONT) << MIDDLE)
                | (role(state, MIDDLE) << FRONT);
            if self
                .slots
                .state
                .compare_exchange_weak(state, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                break;
            }
        }

        let state = self.slots.state.load(Ordering::Acquire);
        let front = role(state, FRONT) as usize;
        // Safety: the front slot belongs exclusively to the (single) reader.
        unsafe { (*self.slots.cells[front].get()).clone() }
    }
}

impl<T: Clone + Default> Default for SharedView<T> {
    fn default() -> Self {
        Self::new()
    }
}
