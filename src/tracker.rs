/*!
Synchronization bookkeeping for the secure channel core.

The tracker is a small state value holding the current role-specific stage
and overall status. Within a session the status is monotonic: `Ready` and
`Error` are terminal, and the stage only advances forward.
*/

use std::fmt::Debug;

use crate::types::SynchronizationStatus;

/// Tracks the progress of one handshake. Generic over the role's stage enum
/// so the initiator and acceptor machines cannot confuse each other's
/// stages.
#[derive(Debug)]
pub struct SynchronizationTracker<S> {
    status: SynchronizationStatus,
    stage: S,
}

impl<S: Copy + Default + PartialOrd + Debug> SynchronizationTracker<S> {
    pub fn new() -> Self {
        Self { status: SynchronizationStatus::Processing, stage: S::default() }
    }

    /// Current overall status.
    pub fn status(&self) -> SynchronizationStatus {
        self.status
    }

    /// Mark the handshake failed. Terminal.
    pub fn set_error(&mut self) {
        self.status = SynchronizationStatus::Error;
    }

    /// Return to the initial stage with a `Processing` status.
    pub fn reset_state(&mut self) {
        self.status = SynchronizationStatus::Processing;
        self.stage = S::default();
    }

    /// Current stage.
    pub fn stage(&self) -> S {
        self.stage
    }

    /// Advance to the next stage. Stages never move backward.
    pub fn set_stage(&mut self, stage: S) {
        debug_assert!(stage > self.stage, "stage must advance: {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Mark the handshake complete and record its terminal stage.
    pub fn finalize_transaction(&mut self, stage: S) {
        self.status = SynchronizationStatus::Ready;
        self.set_stage(stage);
    }
}

impl<S: Copy + Default + PartialOrd + Debug> Default for SynchronizationTracker<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
    enum TestStage {
        #[default]
        First,
        Second,
        Complete,
    }

    #[test]
    fn test_initial_state() {
        let tracker = SynchronizationTracker::<TestStage>::new();
        assert_eq!(tracker.status(), SynchronizationStatus::Processing);
        assert_eq!(tracker.stage(), TestStage::First);
    }

    #[test]
    fn test_stage_advancement() {
        let mut tracker = SynchronizationTracker::<TestStage>::new();
        tracker.set_stage(TestStage::Second);
        assert_eq!(tracker.stage(), TestStage::Second);
        assert_eq!(tracker.status(), SynchronizationStatus::Processing);
    }

    #[test]
    fn test_finalize_transaction() {
        let mut tracker = SynchronizationTracker::<TestStage>::new();
        tracker.set_stage(TestStage::Second);
        tracker.finalize_transaction(TestStage::Complete);
        assert_eq!(tracker.status(), SynchronizationStatus::Ready);
        assert_eq!(tracker.stage(), TestStage::Complete);
    }

    #[test]
    fn test_error_is_terminal_until_reset() {
        let mut tracker = SynchronizationTracker::<TestStage>::new();
        tracker.set_error();
        assert_eq!(tracker.status(), SynchronizationStatus::Error);

        tracker.reset_state();
        assert_eq!(tracker.status(), SynchronizationStatus::Processing);
        assert_eq!(tracker.stage(), TestStage::First);
    }
}
