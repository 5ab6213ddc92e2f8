//! World Error Types
//!
//! Unified error type for the simulation core. Recoverable failures (history
//! state-machine transitions, fallible body lookup) return
//! `Result<T, WorldError>`; programmer contract violations (accessing an
//! invalid handle through the panicking accessors) abort instead.
//!
//! Author: Moroya Sakamoto

use core::fmt;

/// Unified error type for world operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorldError {
    /// A history transition was requested while recording is active.
    HistoryRecordingActive,
    /// A history transition was requested while playback is active.
    HistoryPlaybackActive,
    /// Playback was requested with no recorded snapshots.
    HistoryEmpty,
    /// A body handle did not resolve to a live pool slot.
    InvalidBody {
        /// Raw slot index carried by the handle
        index: u32,
    },
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HistoryRecordingActive => write!(f, "history recording is active"),
            Self::HistoryPlaybackActive => write!(f, "history playback is active"),
            Self::HistoryEmpty => write!(f, "history has no snapshots"),
            Self::InvalidBody { index } => {
                write!(f, "body handle (slot {index}) is stale or invalid")
            }
        }
    }
}

impl std::error::Error for WorldError {}

// ============================================================================
// Tests
// ============================================================================
