//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers — no closures, no
//! dynamic dispatch, no heap. The table encodes the reflow curve:
//!
//! ```text
//!  IDLE ──[start]──▶ PREHEAT ──[T >= 150]──▶ SOAK ──[staircase done]──▶ REFLOW
//!    ▲ ▲                                                                  │
//!    │ └──[T < 50]── TOO-HOT ◀──[T >= 50 in Idle]              [T >= peak-5]
//!    │                                                                    ▼
//!    └── IDLE ◀──[beep done]── COMPLETE ◀──[T <= 100]──────────────── COOL
//!
//!  IDLE ──[start, bake profile]──▶ BAKE (holds until cancelled)
//!  any sampling fault ──▶ ERROR ──[fault cleared]──▶ IDLE
//! ```
//!
//! The soak stage ramps the setpoint in fixed 5 °C steps every micro-period,
//! producing the characteristic staircase plateau; overflowing the profile's
//! soak ceiling is what hands over to reflow.

use super::context::FsmContext;
use super::{OvenState, OvenStatus, StateDescriptor};
use crate::control::pid::Stage;
use crate::profile::Profile;
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; OvenState::COUNT] {
    [
        // Index 0 — Idle
        StateDescriptor {
            id: OvenState::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1 — Preheat
        StateDescriptor {
            id: OvenState::Preheat,
            name: "Preheat",
            on_enter: Some(heating_enter),
            on_exit: None,
            on_update: preheat_update,
        },
        // Index 2 — Soak
        StateDescriptor {
            id: OvenState::Soak,
            name: "Soak",
            on_enter: None,
            on_exit: None,
            on_update: soak_update,
        },
        // Index 3 — Reflow
        StateDescriptor {
            id: OvenState::Reflow,
            name: "Reflow",
            on_enter: None,
            on_exit: None,
            on_update: reflow_update,
        },
        // Index 4 — Cool
        StateDescriptor {
            id: OvenState::Cool,
            name: "Cool",
            on_enter: None,
            on_exit: None,
            on_update: cool_update,
        },
        // Index 5 — Complete
        StateDescriptor {
            id: OvenState::Complete,
            name: "Complete",
            on_enter: None,
            on_exit: None,
            on_update: complete_update,
        },
        // Index 6 — TooHot
        StateDescriptor {
            id: OvenState::TooHot,
            name: "TooHot",
            on_enter: None,
            on_exit: None,
            on_update: too_hot_update,
        },
        // Index 7 — Error
        StateDescriptor {
            id: OvenState::Error,
            name: "Error",
            on_enter: Some(error_enter),
            on_exit: Some(error_exit),
            on_update: error_update,
        },
        // Index 8 — Bake
        StateDescriptor {
            id: OvenState::Bake,
            name: "Bake",
            on_enter: Some(heating_enter),
            on_exit: None,
            on_update: bake_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE — waiting for a start press, oven cold
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.status = OvenStatus::Off;
}

fn idle_update(ctx: &mut FsmContext) -> Option<OvenState> {
    // A still-warm oven must cool below room threshold before a new run.
    if ctx.input_c >= ctx.config.room_temp_c {
        return Some(OvenState::TooHot);
    }

    if ctx.take_start_event() {
        ctx.begin_run();
        if ctx.profile == Profile::Bake {
            info!("run start: bake hold at {:.0}C", ctx.setpoint_c);
            return Some(OvenState::Bake);
        }
        info!(
            "run start: {:?} profile, soak ceiling {:.0}C, peak {:.0}C",
            ctx.profile, ctx.soak_max_c, ctx.reflow_max_c
        );
        return Some(OvenState::Preheat);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  PREHEAT / BAKE entry — the only transitions that switch the heat on
// ═══════════════════════════════════════════════════════════════════════════

fn heating_enter(ctx: &mut FsmContext) {
    ctx.status = OvenStatus::On;
}

fn preheat_update(ctx: &mut FsmContext) -> Option<OvenState> {
    // Ramp at full preheat gains until the soak floor is reached.
    if ctx.input_c >= ctx.config.soak_min_c {
        ctx.soak_deadline_ms = ctx.now_ms + u64::from(ctx.soak_micro_period_ms);
        ctx.retune(Stage::Soak);
        ctx.setpoint_c = ctx.config.soak_min_c + ctx.config.soak_step_c;
        return Some(OvenState::Soak);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  SOAK — staircase ramp between soak floor and ceiling
// ═══════════════════════════════════════════════════════════════════════════

fn soak_update(ctx: &mut FsmContext) -> Option<OvenState> {
    if ctx.now_ms > ctx.soak_deadline_ms {
        ctx.soak_deadline_ms = ctx.now_ms + u64::from(ctx.soak_micro_period_ms);
        ctx.setpoint_c += ctx.config.soak_step_c;
        if ctx.setpoint_c > ctx.soak_max_c {
            // Staircase overflowed the ceiling: hand over to the reflow ramp.
            ctx.retune(Stage::Reflow);
            ctx.setpoint_c = ctx.reflow_max_c;
            return Some(OvenState::Reflow);
        }
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  REFLOW — push to peak, then bail out just before it
// ═══════════════════════════════════════════════════════════════════════════

fn reflow_update(ctx: &mut FsmContext) -> Option<OvenState> {
    // Avoid hovering at peak: start the cool-down a fixed margin early.
    if ctx.input_c >= ctx.reflow_max_c - ctx.config.reflow_margin_c {
        ctx.retune(Stage::Reflow);
        ctx.setpoint_c = ctx.config.cool_min_c;
        return Some(OvenState::Cool);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  COOL — heater commanded down, waiting for the oven to drop
// ═══════════════════════════════════════════════════════════════════════════

fn cool_update(ctx: &mut FsmContext) -> Option<OvenState> {
    if ctx.input_c <= ctx.config.cool_min_c {
        ctx.beep_deadline_ms = ctx.now_ms + u64::from(ctx.config.complete_beep_ms);
        ctx.buzzer = true;
        ctx.status = OvenStatus::Off;
        info!("run complete");
        return Some(OvenState::Complete);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  COMPLETE — beep, then back to idle
// ═══════════════════════════════════════════════════════════════════════════

fn complete_update(ctx: &mut FsmContext) -> Option<OvenState> {
    if ctx.now_ms > ctx.beep_deadline_ms {
        ctx.buzzer = false;
        return Some(OvenState::Idle);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  TOO HOT — refuse to start until the oven cools to room threshold
// ═══════════════════════════════════════════════════════════════════════════

fn too_hot_update(ctx: &mut FsmContext) -> Option<OvenState> {
    if ctx.input_c < ctx.config.room_temp_c {
        return Some(OvenState::Idle);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ERROR — sensor fault, heat abandoned until the fault clears
// ═══════════════════════════════════════════════════════════════════════════

fn error_enter(ctx: &mut FsmContext) {
    ctx.status = OvenStatus::Off;
    log::warn!(
        "ERROR: heat abandoned, faults: {}",
        crate::error::describe_faults(ctx.fault_bits)
    );
}

fn error_exit(_ctx: &mut FsmContext) {
    info!("ERROR: faults cleared, ready to restart");
}

fn error_update(ctx: &mut FsmContext) -> Option<OvenState> {
    // Level-triggered: the mask is refreshed every sample, so leaving Error
    // is automatic once the condition clears. No acknowledgment step.
    if !ctx.has_faults() {
        return Some(OvenState::Idle);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  BAKE — indefinite hold, exits only by cancellation
// ═══════════════════════════════════════════════════════════════════════════

fn bake_update(ctx: &mut FsmContext) -> Option<OvenState> {
    ctx.retune(Stage::Bake);
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════
