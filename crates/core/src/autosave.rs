//! Debounced autosave as an explicit state machine.
//!
//! The first edit after a clean state schedules exactly one deferred flush;
//! edits that arrive while that flush is pending are coalesced into it. At
//! most one flush is scheduled per document at any time.
//!
//! The machine is pure: it never touches a clock. Callers own the timer and
//! identify it by the `generation` handed out in [`Transition::Schedule`],
//! so a timer that fires after being superseded is recognised as stale.
//!
//! ```text
//!            edit                      timer / save_now
//!   Clean ─────────► DirtyPending(g) ─────────────────► Flushing
//!     ▲                 │  ▲  edit: coalesced              │  edit: remembered
//!     │                 │  └───────────────────────────────┤ ok, edited
//!     └─────────────────┼───────────────── ok, untouched ──┤
//!                       │                                  │ failed
//!                       └──────── edit ◄──── Dirty ◄───────┘
//! ```

use serde::Serialize;

/// Where the document stands relative to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AutosaveState {
    /// Everything in memory has been saved.
    Clean,
    /// Unsaved edits; a flush is scheduled under `generation`.
    DirtyPending { generation: u64 },
    /// A flush is in flight.
    Flushing { edited_during_flush: bool },
    /// Unsaved edits and nothing scheduled (the last flush failed).
    Dirty,
}

/// What the caller has to do after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Arm a timer that reports `generation` when it fires.
    Schedule { generation: u64 },
    /// The change was folded into an existing pending or in-flight flush.
    Coalesced,
    /// Nothing to schedule.
    Settled,
}

#[derive(Debug, Clone)]
pub struct Autosave {
    state: AutosaveState,
    last_generation: u64,
}

impl Default for Autosave {
    fn default() -> Self {
        Self::new()
    }
}

impl Autosave {
    pub fn new() -> Self {
        Self {
            state: AutosaveState::Clean,
            last_generation: 0,
        }
    }

    pub fn state(&self) -> AutosaveState {
        self.state
    }

    /// True whenever something in memory may not be on the server.
    pub fn is_dirty(&self) -> bool {
        !matches!(self.state, AutosaveState::Clean)
    }

    /// Generation of the currently scheduled flush, if any.
    pub fn pending_generation(&self) -> Option<u64> {
        match self.state {
            AutosaveState::DirtyPending { generation } => Some(generation),
            _ => None,
        }
    }

    fn schedule(&mut self) -> Transition {
        self.last_generation += 1;
        let generation = self.last_generation;
        self.state = AutosaveState::DirtyPending { generation };
        Transition::Schedule { generation }
    }

    /// A block changed locally.
    pub fn mark_dirty(&mut self) -> Transition {
        match self.state {
            AutosaveState::Clean | AutosaveState::Dirty => self.schedule(),
            AutosaveState::DirtyPending { .. } => Transition::Coalesced,
            AutosaveState::Flushing { .. } => {
                self.state = AutosaveState::Flushing {
                    edited_during_flush: true,
                };
                Transition::Coalesced
            }
        }
    }

    /// A debounce timer fired. Returns true if it is the current one and a
    /// flush should start; stale or superseded timers return false.
    pub fn timer_fired(&self, generation: u64) -> bool {
        self.pending_generation() == Some(generation)
    }

    /// A flush is starting. Returns the generation of the scheduled flush it
    /// supersedes, so the caller can cancel that timer.
    pub fn begin_flush(&mut self) -> Option<u64> {
        let superseded = self.pending_generation();
        let edited_during_flush = match self.state {
            AutosaveState::Flushing { edited_during_flush } => edited_during_flush,
            _ => false,
        };
        self.state = AutosaveState::Flushing {
            edited_during_flush,
        };
        superseded
    }

    /// Every block and the document save went through.
    pub fn flush_succeeded(&mut self) -> Transition {
        match self.state {
            AutosaveState::Flushing {
                edited_during_flush: true,
            } => self.schedule(),
            AutosaveState::Flushing {
                edited_during_flush: false,
            } => {
                self.state = AutosaveState::Clean;
                Transition::Settled
            }
            _ => Transition::Settled,
        }
    }

    /// Some request in the flush failed. The document stays dirty with
    /// nothing scheduled; the next edit schedules a new flush.
    pub fn flush_failed(&mut self) -> Transition {
        if matches!(self.state, AutosaveState::Flushing { .. }) {
            self.state = AutosaveState::Dirty;
        }
        Transition::Settled
    }

    /// Forget all pending work (document switched after its edits were
    /// handled). Returns the generation of a timer that must be cancelled.
    pub fn reset(&mut self) -> Option<u64> {
        let superseded = self.pending_generation();
        self.state = AutosaveState::Clean;
        superseded
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn first_edit_schedules_later_edits_coalesce() {
        let mut a = Autosave::new();
        assert_matches!(a.mark_dirty(), Transition::Schedule { generation: 1 });
        for _ in 0..10 {
            assert_eq!(a.mark_dirty(), Transition::Coalesced);
        }
        assert_eq!(a.pending_generation(), Some(1));
    }

    #[test]
    fn only_current_timer_starts_a_flush() {
        let mut a = Autosave::new();
        a.mark_dirty();
        assert!(a.timer_fired(1));
        assert!(!a.timer_fired(2));
        assert_eq!(a.begin_flush(), Some(1));
        assert!(!a.timer_fired(1));
    }

    #[test]
    fn successful_flush_returns_to_clean() {
        let mut a = Autosave::new();
        a.mark_dirty();
        a.begin_flush();
        assert!(a.is_dirty());
        assert_eq!(a.flush_succeeded(), Transition::Settled);
        assert_eq!(a.state(), AutosaveState::Clean);
        assert!(!a.is_dirty());
    }

    #[test]
    fn edit_during_flush_reschedules_after_success() {
        let mut a = Autosave::new();
        a.mark_dirty();
        a.begin_flush();
        assert_eq!(a.mark_dirty(), Transition::Coalesced);
        assert_matches!(a.flush_succeeded(), Transition::Schedule { generation: 2 });
        assert_eq!(a.pending_generation(), Some(2));
    }

    #[test]
    fn failed_flush_stays_dirty_until_next_edit() {
        let mut a = Autosave::new();
        a.mark_dirty();
        a.begin_flush();
        a.flush_failed();
        assert_eq!(a.state(), AutosaveState::Dirty);
        assert!(a.is_dirty());
        assert_eq!(a.pending_generation(), None);
        assert_matches!(a.mark_dirty(), Transition::Schedule { generation: 2 });
    }

    #[test]
    fn manual_flush_from_clean_is_allowed() {
        let mut a = Autosave::new();
        assert_eq!(a.begin_flush(), None);
        assert_eq!(a.flush_succeeded(), Transition::Settled);
        assert_eq!(a.state(), AutosaveState::Clean);
    }

    #[test]
    fn reset_reports_pending_timer() {
        let mut a = Autosave::new();
        a.mark_dirty();
        assert_eq!(a.reset(), Some(1));
        assert_eq!(a.state(), AutosaveState::Clean);
        assert_eq!(a.reset(), None);
    }
}
