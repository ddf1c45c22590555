//! Front-panel switch debouncer.
//!
//! Two momentary switches (start/stop and profile-select) are polled every
//! control-loop pass. Mechanical contacts bounce for a few milliseconds on
//! press and release, so a raw reading cannot be treated as a press. The
//! debouncer is a three-state machine:
//!
//! ```text
//!  IDLE ──[raw != none]──▶ CHECKING ──[stable >= 100 ms]──▶ WAIT-RELEASE
//!    ▲                        │  ▲                                │
//!    │                 [reading changed]                    [raw == none]
//!    └────────────────────────┘  └───(event fires on this edge)──┘
//! ```
//!
//! Exactly one [`SwitchEvent`] is emitted per physical press, on the
//! CHECKING→WAIT-RELEASE edge. Holding the switch emits nothing further, so
//! long presses cannot repeat-fire.

use log::debug;

/// Instantaneous (bouncy) reading of the switch inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawSwitch {
    StartStop,
    ProfileSelect,
}

/// A debounced, confirmed press. One per physical press-and-release cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchEvent {
    StartStop,
    ProfileSelect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    Idle,
    Checking { candidate: RawSwitch, since_ms: u64 },
    WaitingForRelease,
}

/// Debounce state machine. Pure sampling logic — no error states.
#[derive(Debug, Clone)]
pub struct SwitchDebouncer {
    state: DebounceState,
    period_ms: u32,
}

impl SwitchDebouncer {
    pub fn new(period_ms: u32) -> Self {
        Self {
            state: DebounceState::Idle,
            period_ms,
        }
    }

    /// Advance one tick with the current raw reading.
    ///
    /// Returns `Some(event)` at most once per physical press.
    pub fn tick(&mut self, raw: Option<RawSwitch>, now_ms: u64) -> Option<SwitchEvent> {
        match self.state {
            DebounceState::Idle => {
                if let Some(candidate) = raw {
                    self.state = DebounceState::Checking {
                        candidate,
                        since_ms: now_ms,
                    };
                }
                None
            }

            DebounceState::Checking {
                candidate,
                since_ms,
            } => {
                if raw != Some(candidate) {
                    // Bounce or cross-talk: the reading changed before the
                    // debounce period elapsed. Discard the candidate.
                    self.state = DebounceState::Idle;
                    return None;
                }
                if now_ms.saturating_sub(since_ms) >= u64::from(self.period_ms) {
                    self.state = DebounceState::WaitingForRelease;
                    let event = match candidate {
                        RawSwitch::StartStop => SwitchEvent::StartStop,
                        RawSwitch::ProfileSelect => SwitchEvent::ProfileSelect,
                    };
                    debug!("switch press confirmed: {:?}", event);
                    return Some(event);
                }
                None
            }

            DebounceState::WaitingForRelease => {
                if raw.is_none() {
                    self.state = DebounceState::Idle;
                }
                None
            }
        }
    }
}
