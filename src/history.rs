//! World History — Step Recording and Playback
//!
//! A bounded ring of per-step snapshots layered over the live simulation.
//! Recording appends one [`StepSnapshot`] per live step; playback walks the
//! ring and overwrites live body state, and is mutually exclusive with
//! recording. Snapshots capture each valid body and the manifolds it owned
//! that step — the manifolds are for rendering during playback, never
//! reprocessed.

use std::collections::VecDeque;

use crate::body::Body;
use crate::error::WorldError;
use crate::narrow_phase::ContactManifold;

/// Default snapshot capacity: 10 seconds at 60 steps per second.
pub const WORLD_HISTORY_CAPACITY: usize = 600;

// ============================================================================
// Snapshots
// ============================================================================

/// One body's state at the end of a recorded step.
#[derive(Clone, Debug)]
pub struct BodySnapshot {
    /// Full body state.
    pub body: Body,
    /// Manifolds where this body was the "A" side that step.
    pub manifolds: Vec<ContactManifold>,
}

/// All bodies at the end of one recorded step.
#[derive(Clone, Debug)]
pub struct StepSnapshot {
    /// The live step counter value when this snapshot was taken.
    pub step_index: u64,
    /// Every valid body, with its manifolds.
    pub bodies: Vec<BodySnapshot>,
}

// ============================================================================
// WorldHistory
// ============================================================================

/// Ring buffer of step snapshots plus the record/playback state machine.
///
/// States: Live (default), Recording, Playing. Recording and playing are
/// mutually exclusive.
pub struct WorldHistory {
    snapshots: VecDeque<StepSnapshot>,
    capacity: usize,
    /// Index of the currently-shown snapshot; `None` while not playing.
    cursor: Option<usize>,
    recording: bool,
}

impl WorldHistory {
    /// Create an empty history with the given snapshot capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
            cursor: None,
            recording: false,
        }
    }

    /// Number of retained snapshots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True when no snapshots are retained.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Maximum number of retained snapshots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether live steps are being recorded.
    #[inline]
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Whether playback is active.
    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.cursor.is_some()
    }

    /// Start recording: flush any existing snapshots, set the flag.
    ///
    /// Rejected while playback is active.
    pub fn begin_recording(&mut self) -> Result<(), WorldError> {
        if self.is_playing() {
            return Err(WorldError::HistoryPlaybackActive);
        }
        self.snapshots.clear();
        self.recording = true;
        Ok(())
    }

    /// Stop recording. Retained snapshots stay available for playback.
    pub fn end_recording(&mut self) {
        self.recording = false;
    }

    /// Append a snapshot, evicting the oldest entry first once full. The
    /// capacity is a strict cap.
    pub fn record(&mut self, snapshot: StepSnapshot) {
        if self.snapshots.len() >= self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    /// Enter playback at the oldest snapshot.
    ///
    /// Fails without state change while recording or with an empty ring.
    pub fn begin_playing(&mut self) -> Result<(), WorldError> {
        if self.recording {
            return Err(WorldError::HistoryRecordingActive);
        }
        if self.snapshots.is_empty() {
            return Err(WorldError::HistoryEmpty);
        }
        self.cursor = Some(0);
        Ok(())
    }

    /// Leave playback; the ring is kept.
    pub fn end_playing(&mut self) {
        self.cursor = None;
    }

    /// Move the playback cursor one snapshot forward or backward, wrapping
    /// at both ends. Returns the snapshot now shown, or `None` when not
    /// playing.
    pub fn advance(&mut self, forward: bool) -> Option<&StepSnapshot> {
        let cursor = self.cursor?;
        let len = self.snapshots.len();
        let next = if forward {
            if cursor + 1 >= len {
                0
            } else {
                cursor + 1
            }
        } else if cursor == 0 {
            len - 1
        } else {
            cursor - 1
        };
        self.cursor = Some(next);
        self.snapshots.get(next)
    }

    /// The snapshot at the playback cursor, while playing.
    #[must_use]
    pub fn current(&self) -> Option<&StepSnapshot> {
        self.snapshots.get(self.cursor?)
    }

    /// Snapshot by ring position (0 = oldest retained).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StepSnapshot> {
        self.snapshots.get(index)
    }

    /// Oldest retained snapshot.
    #[must_use]
    pub fn oldest(&self) -> Option<&StepSnapshot> {
        self.snapshots.front()
    }

    /// Drop all snapshots and leave playback.
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = None;
    }
}

impl Default for WorldHistory {
    fn default() -> Self {
        Self::new(WORLD_HISTORY_CAPACITY)
    }
}

// ============================================================================
// Tests
// ============================================================================
