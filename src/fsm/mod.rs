//! Function-pointer finite state machine engine for the reflow sequencer.
//!
//! Classic embedded FSM pattern expressed in safe Rust:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  StateTable                                                │
//! │  ┌──────────┬───────────┬──────────┬───────────────────┐   │
//! │  │ OvenState │ on_enter  │ on_exit  │ on_update         │   │
//! │  ├──────────┼───────────┼──────────┼───────────────────┤   │
//! │  │ Idle      │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │   │
//! │  │ Preheat   │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │   │
//! │  │ ...       │           │          │                   │   │
//! │  └──────────┴───────────┴──────────┴───────────────────┘   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next)`, the engine runs `on_exit` for the current
//! state, then `on_enter` for the next, and updates the current pointer.
//! All functions receive `&mut FsmContext`, which holds the latest sample,
//! setpoint, timers, and the PID/window control state.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all process states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OvenState {
    Idle = 0,
    Preheat = 1,
    Soak = 2,
    Reflow = 3,
    Cool = 4,
    Complete = 5,
    TooHot = 6,
    Error = 7,
    Bake = 8,
}

impl OvenState {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 9;

    /// Convert an index back to `OvenState`. Panics on out-of-range in
    /// debug builds; returns `Error` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Preheat,
            2 => Self::Soak,
            3 => Self::Reflow,
            4 => Self::Cool,
            5 => Self::Complete,
            6 => Self::TooHot,
            7 => Self::Error,
            8 => Self::Bake,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Error
            }
        }
    }

    /// Short label shown on the top line of the display.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Preheat => "Pre",
            Self::Soak => "Soak",
            Self::Reflow => "Reflow",
            Self::Cool => "Cool",
            Self::Complete => "Done!",
            Self::TooHot => "Hot!",
            Self::Error => "Error",
            Self::Bake => "Bake",
        }
    }
}

/// Heat-process status. Gates the relay output and the heartbeat LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OvenStatus {
    Off,
    On,
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<OvenState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: OvenState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]) and walks it with a
/// caller-supplied [`FsmContext`] threaded through every handler call.
pub struct Fsm {
    /// Fixed-size table indexed by `OvenState as usize`.
    table: [StateDescriptor; OvenState::COUNT],
    /// Index of the currently active state.
    current: usize,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; OvenState::COUNT], initial: OvenState) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick: call `on_update` for the current state
    /// and execute the transition it requests, if any.
    pub fn tick(&mut self, ctx: &mut FsmContext) {
        let next = (self.table[self.current].on_update)(ctx);
        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Force an immediate transition. Used for the two overrides that outrank
    /// the state table: sensor faults (→ Error) and cancellation (→ Idle).
    pub fn force_transition(&mut self, next: OvenState, ctx: &mut FsmContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> OvenState {
        OvenState::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: OvenState, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
