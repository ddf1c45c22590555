//! Reflow profiles and their stage constants.
//!
//! Three profiles are selectable at the front panel: lead-free solder paste,
//! leaded (Sn63/Pb37-class) paste, and an indefinite low-temperature bake for
//! drying moisture-sensitive parts. The selection is persisted so the oven
//! wakes up in the profile it was last used with.

use serde::{Deserialize, Serialize};

/// Temperature curve selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Profile {
    LeadFree = 0,
    Leaded = 1,
    Bake = 2,
}

/// Stage constants for a staged (preheat/soak/reflow/cool) profile.
///
/// Immutable per profile; `Bake` has no staged curve and therefore no params.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileParams {
    /// Ceiling of the soak staircase ramp (°C).
    pub soak_max_c: f32,
    /// Peak reflow temperature (°C).
    pub reflow_max_c: f32,
    /// Interval between soak setpoint steps (ms).
    pub soak_micro_period_ms: u32,
}

/// Lead-free paste: SAC305-class curve, 250 °C peak.
pub const LEAD_FREE_PARAMS: ProfileParams = ProfileParams {
    soak_max_c: 200.0,
    reflow_max_c: 250.0,
    soak_micro_period_ms: 9_000,
};

/// Leaded paste: Kester EP256-class curve, 224 °C peak.
pub const LEADED_PARAMS: ProfileParams = ProfileParams {
    soak_max_c: 180.0,
    reflow_max_c: 224.0,
    soak_micro_period_ms: 10_000,
};

impl Profile {
    /// Persisted identifier (the byte written to NVS).
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Decode a persisted identifier. Anything outside 0..=2 is invalid.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::LeadFree),
            1 => Some(Self::Leaded),
            2 => Some(Self::Bake),
            _ => None,
        }
    }

    /// The next profile in the front-panel selection cycle.
    pub fn next(self) -> Self {
        match self {
            Self::LeadFree => Self::Leaded,
            Self::Leaded => Self::Bake,
            Self::Bake => Self::LeadFree,
        }
    }

    /// Stage constants, or `None` for the unstaged bake hold.
    pub fn params(self) -> Option<&'static ProfileParams> {
        match self {
            Self::LeadFree => Some(&LEAD_FREE_PARAMS),
            Self::Leaded => Some(&LEADED_PARAMS),
            Self::Bake => None,
        }
    }

    /// Two-letter abbreviation shown in the display's corner.
    pub const fn abbrev(self) -> &'static str {
        match self {
            Self::LeadFree => "LF",
            Self::Leaded => "PB",
            Self::Bake => "BK",
        }
    }
}
